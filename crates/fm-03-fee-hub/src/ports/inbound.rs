//! # Inbound Ports
//!
//! ## Authorization
//!
//! | Method | Authorized Caller |
//! |--------|-------------------|
//! | `*_relayer`, `set_*` | `DeployerManager` role |
//! | `deploy_fees_with_celer` | Anyone (home chain) |
//! | `deploy_fees_with_celer_confirm` | Local relay adapter only |
//! | `send_fees_with_celer` | Anyone (target chain) |

use crate::domain::{DeployReceipt, HubError, SendReceipt};
use fm_01_fee_registry::SyncQueueDriver;
use fm_02_relay_adapter::{BridgeClient, RelaySender};
use fm_04_fee_store::FeeStore;
use shared_bus::EventBuffer;
use shared_types::{Address, AssetLedger, CallContext, ChainId, FeeSyncDelta, U256};

/// Primary API of the fee hub.
pub trait FeeHubApi {
    /// Configure the remote relayer for a chain.
    ///
    /// # Errors
    /// - `ChainIdZero`, `AddressZero`, `ChainExisting`
    fn add_relayer(
        &mut self,
        chain_id: ChainId,
        relayer: Address,
        events: &mut EventBuffer,
    ) -> Result<(), HubError>;

    /// Replace the relayer for a chain.
    ///
    /// # Errors
    /// - `AddressZero`, `ChainNotExisting`, `RelayerExists`
    fn update_relayer(
        &mut self,
        chain_id: ChainId,
        relayer: Address,
        events: &mut EventBuffer,
    ) -> Result<(), HubError>;

    /// Forget the relayer for a chain.
    ///
    /// # Errors
    /// - `ChainNotExisting`
    fn remove_relayer(&mut self, chain_id: ChainId, events: &mut EventBuffer)
        -> Result<(), HubError>;

    /// Flat fee per deploy message.
    fn set_deploy_fee(&mut self, amount: U256, events: &mut EventBuffer);

    /// Flat fee per remittance.
    fn set_send_fee(&mut self, amount: U256, events: &mut EventBuffer);

    /// Minimum collected total for a remittance.
    fn set_send_threshold(&mut self, amount: U256, events: &mut EventBuffer);

    /// Ship every non-empty sync queue, one bundled message per chain.
    ///
    /// # Errors
    /// - `QueueEmpty`, `AddressZero`, `InsufficientFundsSent`,
    ///   `InsufficientFundsForGas`
    #[allow(clippy::too_many_arguments)]
    fn deploy_fees_with_celer(
        &mut self,
        ctx: CallContext,
        registry: &mut dyn SyncQueueDriver,
        adapter: &mut dyn RelaySender,
        ledger: &mut dyn AssetLedger,
        bridge: &dyn BridgeClient,
        events: &mut EventBuffer,
    ) -> Result<DeployReceipt, HubError>;

    /// A target acknowledged a deploy batch. Returns how many assignments
    /// reached `Synced`.
    ///
    /// # Errors
    /// - `NotAllowed`: caller is not the local adapter
    fn deploy_fees_with_celer_confirm(
        &mut self,
        caller: Address,
        chain_id: ChainId,
        deltas: &[FeeSyncDelta],
        registry: &mut dyn SyncQueueDriver,
        events: &mut EventBuffer,
    ) -> Result<usize, HubError>;

    /// Remit the local store's collected fees to `dst_chain_id`.
    ///
    /// # Errors
    /// - `ThresholdNotMet`, `InsufficientFundsSent`, `InsufficientFundsForGas`
    #[allow(clippy::too_many_arguments)]
    fn send_fees_with_celer(
        &mut self,
        ctx: CallContext,
        dst_chain_id: ChainId,
        bounty_receiver: Address,
        store: &mut FeeStore,
        adapter: &mut dyn RelaySender,
        ledger: &mut dyn AssetLedger,
        bridge: &dyn BridgeClient,
        events: &mut EventBuffer,
    ) -> Result<SendReceipt, HubError>;
}
