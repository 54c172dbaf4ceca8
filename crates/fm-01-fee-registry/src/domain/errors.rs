//! # Domain Errors
//!
//! Error types for the Fee Registry. Every variant aborts the call with no
//! state change.

use shared_types::{ChainId, FeeId};
use thiserror::Error;

/// Fee Registry error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Chain id zero is reserved.
    #[error("chain id must be nonzero")]
    ChainIdZero,

    /// Chain already registered.
    #[error("chain {0} already exists")]
    ChainIdExists(ChainId),

    /// Chain not registered.
    #[error("chain {0} does not exist")]
    ChainIdNotExisting(ChainId),

    /// Chain still has assigned configs.
    #[error("chain {chain_id} still has {count} assigned configs")]
    ConfigsAssignedToChain {
        /// Chain being removed
        chain_id: ChainId,
        /// Assignments referencing it
        count: usize,
    },

    /// Fee id zero is reserved.
    #[error("fee config id must be nonzero")]
    ConfigIdZero,

    /// Config not registered.
    #[error("fee config {0} does not exist")]
    ConfigNotExisting(FeeId),

    /// Config already registered.
    #[error("fee config {0} already exists")]
    ConfigExists(FeeId),

    /// Config is still assigned somewhere.
    #[error("fee config {id} is assigned to {chains} chains")]
    ConfigInUse {
        /// Config being removed
        id: FeeId,
        /// Chains it is assigned to
        chains: usize,
    },

    /// Assignment already present.
    #[error("fee config {id} already assigned to chain {chain_id}")]
    ConfigAlreadyAssignedToChain {
        /// Config
        id: FeeId,
        /// Chain
        chain_id: ChainId,
    },

    /// Assignment missing.
    #[error("fee config {id} not assigned to chain {chain_id}")]
    ConfigNotAssignedToChain {
        /// Config
        id: FeeId,
        /// Chain
        chain_id: ChainId,
    },

    /// Fee rate of zero.
    #[error("fee must be nonzero")]
    FeeZero,

    /// Fee rate above 100%.
    #[error("fee {fee_bps} bps exceeds 10000")]
    FeeTooHigh {
        /// Rejected rate
        fee_bps: u64,
    },

    /// Zero receiver or target address.
    #[error("address must be nonzero")]
    AddressZero,
}
