//! # Hub Entities

use serde::{Deserialize, Serialize};
use shared_types::{Address, ChainId, U256};

/// Static wiring of one chain's hub.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubConfig {
    /// Chain this hub runs on.
    pub chain_id: ChainId,
    /// Chain hosting the registry and distributor.
    pub home_chain_id: ChainId,
    /// Shared facet address; also the local adapter's identity.
    pub contract: Address,
}

impl HubConfig {
    /// True on the home chain.
    #[must_use]
    pub fn is_home(&self) -> bool {
        self.chain_id == self.home_chain_id
    }
}

/// Admin-tunable prices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubSettings {
    /// Flat fee per deploy message.
    pub deploy_fee: U256,
    /// Flat fee per remittance.
    pub send_fee: U256,
    /// Minimum collected total before a remittance may leave.
    pub send_threshold: U256,
}

/// One chain's share of a deploy run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDispatch {
    /// Target chain.
    pub chain_id: ChainId,
    /// Deltas bundled into the message.
    pub entries: usize,
    /// Bridge fee paid for it.
    pub bridge_fee: U256,
}

/// Result of `deploy_fees_with_celer`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployReceipt {
    /// One entry per dispatched chain, ascending.
    pub dispatches: Vec<ChainDispatch>,
    /// Flat hub fees kept.
    pub flat_fees: U256,
    /// Value returned to the caller.
    pub refunded: U256,
}

impl DeployReceipt {
    /// Total bridge fees paid.
    #[must_use]
    pub fn bridge_fees(&self) -> U256 {
        self.dispatches
            .iter()
            .fold(U256::zero(), |acc, d| acc.saturating_add(d.bridge_fee))
    }
}

/// Result of `send_fees_with_celer`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    /// Fee-token amount escrowed with the bridge.
    pub total_fees: U256,
    /// Bridge fee paid.
    pub bridge_fee: U256,
    /// Value returned to the caller.
    pub refunded: U256,
}
