//! # Fee-Mesh Domain Events
//!
//! Every successful mutation in any component emits one of these. The log of
//! recorded events is sufficient to rebuild registry, store and distributor
//! state externally.

use serde::{Deserialize, Serialize};
use shared_types::{
    ActionTag, Address, Asset, ChainId, DeployState, FeeCurrency, FeeId, FeeType, SyncAction,
    U256,
};

/// Outcome reported for an inbound bridge message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// The inner call failed or the payload was not understood; nothing applied.
    Fail,
    /// The inner call applied.
    Success,
}

/// All events that can be recorded on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeEvent {
    // =========================================================================
    // FEE REGISTRY
    // =========================================================================
    ChainAdded {
        chain_id: ChainId,
        target: Address,
    },
    ChainRemoved {
        chain_id: ChainId,
    },
    FeeConfigAdded {
        id: FeeId,
        fee_bps: u64,
        receiver: Address,
        currency: FeeCurrency,
        fee_type: FeeType,
    },
    FeeConfigUpdated {
        id: FeeId,
        fee_bps: u64,
        receiver: Address,
    },
    FeeConfigRemoved {
        id: FeeId,
    },
    ConfigAssigned {
        id: FeeId,
        chain_id: ChainId,
    },
    ConfigUnassigned {
        id: FeeId,
        chain_id: ChainId,
    },
    QueueEntryAdded {
        id: FeeId,
        chain_id: ChainId,
        action: SyncAction,
    },
    QueueEntryDropped {
        id: FeeId,
        chain_id: ChainId,
        action: SyncAction,
    },
    QueueCleared {
        chain_id: ChainId,
        entries: usize,
    },
    DeployStateChanged {
        id: FeeId,
        chain_id: ChainId,
        from: DeployState,
        to: DeployState,
    },

    // =========================================================================
    // RELAY ADAPTER
    // =========================================================================
    ActorAdded {
        chain_id: ChainId,
        actor: Address,
    },
    ActorUpdated {
        chain_id: ChainId,
        actor: Address,
    },
    ActorRemoved {
        chain_id: ChainId,
    },
    MessageSent {
        dst_chain_id: ChainId,
        receiver: Address,
        tag: ActionTag,
        bridge_fee: U256,
    },
    MessageReceived {
        src_chain_id: ChainId,
        tag: Option<ActionTag>,
        status: ExecutionStatus,
    },
    MessageRefunded {
        asset: Asset,
        amount: U256,
    },
    MessageFallback {
        src_chain_id: ChainId,
        asset: Asset,
        amount: U256,
    },
    RefundForwarded {
        asset: Asset,
        to: Address,
        amount: U256,
    },

    // =========================================================================
    // FEE HUB
    // =========================================================================
    RelayerAdded {
        chain_id: ChainId,
        relayer: Address,
    },
    RelayerUpdated {
        chain_id: ChainId,
        relayer: Address,
    },
    RelayerRemoved {
        chain_id: ChainId,
    },
    FeesDeployed {
        chain_id: ChainId,
        entries: usize,
    },
    DeployConfirmed {
        chain_id: ChainId,
        entries: usize,
    },
    FeesSent {
        dst_chain_id: ChainId,
        total_fees: U256,
        bounty_receiver: Address,
    },
    DeployFeeSet {
        amount: U256,
    },
    SendFeeSet {
        amount: U256,
    },
    SendThresholdSet {
        amount: U256,
    },

    // =========================================================================
    // FEE STORE
    // =========================================================================
    FeeSynced {
        id: FeeId,
        fee_bps: u64,
        action: SyncAction,
    },
    FeesCollected {
        id: FeeId,
        amount: U256,
    },
    FeesPrepared {
        total_fees: U256,
        entries: usize,
    },
    FeePurged {
        id: FeeId,
    },
    FeesRestored {
        total_fees: U256,
        surplus: U256,
        shortfall: U256,
    },
    FeeStoreDrained {
        operator: Address,
        amount: U256,
    },
    StoreOperatorSet {
        operator: Address,
    },

    // =========================================================================
    // FEE DISTRIBUTOR
    // =========================================================================
    DistributionStarted,
    DistributionStopped,
    ReceiverAdded {
        name: String,
        account: Address,
        points: u64,
    },
    ReceiverRemoved {
        name: String,
    },
    ReceiverSharesUpdated {
        name: String,
        points: u64,
    },
    SwapPathUpdated {
        name: String,
        path: Vec<Address>,
    },
    TriggerDistributionWhileNotRunning {
        amount: U256,
        queued: usize,
    },
    FeesDistributed {
        amount: U256,
        bounty: U256,
    },
    ReceiverPaid {
        name: String,
        account: Address,
        asset: Asset,
        amount: U256,
        via_deposit: bool,
    },
    BountyPaid {
        receiver: Address,
        asset: Asset,
        amount: U256,
    },
    BountySettingsChanged {
        share_bps: u64,
        in_token: bool,
    },

    // =========================================================================
    // ACCESS CONTROL
    // =========================================================================
    RoleGranted {
        role: String,
        account: Address,
    },
    RoleRevoked {
        role: String,
        account: Address,
    },
}

impl FeeEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ChainAdded { .. }
            | Self::ChainRemoved { .. }
            | Self::FeeConfigAdded { .. }
            | Self::FeeConfigUpdated { .. }
            | Self::FeeConfigRemoved { .. }
            | Self::ConfigAssigned { .. }
            | Self::ConfigUnassigned { .. }
            | Self::QueueEntryAdded { .. }
            | Self::QueueEntryDropped { .. }
            | Self::QueueCleared { .. }
            | Self::DeployStateChanged { .. } => EventTopic::Registry,
            Self::ActorAdded { .. }
            | Self::ActorUpdated { .. }
            | Self::ActorRemoved { .. }
            | Self::MessageSent { .. }
            | Self::MessageReceived { .. }
            | Self::MessageRefunded { .. }
            | Self::MessageFallback { .. }
            | Self::RefundForwarded { .. } => EventTopic::Relay,
            Self::RelayerAdded { .. }
            | Self::RelayerUpdated { .. }
            | Self::RelayerRemoved { .. }
            | Self::FeesDeployed { .. }
            | Self::DeployConfirmed { .. }
            | Self::FeesSent { .. }
            | Self::DeployFeeSet { .. }
            | Self::SendFeeSet { .. }
            | Self::SendThresholdSet { .. } => EventTopic::Hub,
            Self::FeeSynced { .. }
            | Self::FeesCollected { .. }
            | Self::FeesPrepared { .. }
            | Self::FeePurged { .. }
            | Self::FeesRestored { .. }
            | Self::FeeStoreDrained { .. }
            | Self::StoreOperatorSet { .. } => EventTopic::Store,
            Self::DistributionStarted
            | Self::DistributionStopped
            | Self::ReceiverAdded { .. }
            | Self::ReceiverRemoved { .. }
            | Self::ReceiverSharesUpdated { .. }
            | Self::SwapPathUpdated { .. }
            | Self::TriggerDistributionWhileNotRunning { .. }
            | Self::FeesDistributed { .. }
            | Self::ReceiverPaid { .. }
            | Self::BountyPaid { .. }
            | Self::BountySettingsChanged { .. } => EventTopic::Distributor,
            Self::RoleGranted { .. } | Self::RoleRevoked { .. } => EventTopic::Access,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Fee registry mutations.
    Registry,
    /// Relay adapter traffic and actor table.
    Relay,
    /// Hub dispatch and settings.
    Hub,
    /// Fee store mirror.
    Store,
    /// Revenue distribution.
    Distributor,
    /// Role table.
    Access,
    /// All events (no filtering).
    All,
}

/// An event as recorded on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// Global, gap-free sequence number.
    pub sequence: u64,
    /// Chain whose ledger emitted the event.
    pub chain_id: ChainId,
    /// The event itself.
    pub event: FeeEvent,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Chains to include. Empty means all chains.
    pub chains: Vec<ChainId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            chains: Vec::new(),
        }
    }

    /// Create a filter for events from specific chains.
    #[must_use]
    pub fn from_chains(chains: Vec<ChainId>) -> Self {
        Self {
            topics: Vec::new(),
            chains,
        }
    }

    /// Check if a recorded event matches this filter.
    #[must_use]
    pub fn matches(&self, recorded: &RecordedEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&recorded.event.topic());

        let chain_match = self.chains.is_empty() || self.chains.contains(&recorded.chain_id);

        topic_match && chain_match
    }
}
