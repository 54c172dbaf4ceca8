//! Node-level errors.
//!
//! Every component error converts into `NodeError` so entrypoints can use
//! `?` across component boundaries. A `NodeError` returned from a
//! transaction means the whole transaction was rolled back.

use crate::container::{ConfigError, Role};
use fm_01_fee_registry::RegistryError;
use fm_02_relay_adapter::RelayError;
use fm_03_fee_hub::HubError;
use fm_04_fee_store::FeeStoreError;
use fm_05_fee_distributor::DistributorError;
use shared_types::{Address, ChainId, EnvelopeError, LedgerError, U256};
use thiserror::Error;

/// Errors surfaced by chain nodes and the mesh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// Caller lacks the role the entrypoint requires.
    #[error("{account} is missing role {role:?}")]
    Unauthorized {
        /// Required role
        role: Role,
        /// Caller
        account: Address,
    },

    /// The component is not deployed on this chain.
    #[error("{component} is not deployed on chain {chain_id}")]
    ComponentMissing {
        /// Component name
        component: &'static str,
        /// Chain
        chain_id: ChainId,
    },

    /// No node for this chain in the mesh.
    #[error("unknown chain {0}")]
    UnknownChain(ChainId),

    /// Attached native value does not match the declared amount.
    #[error("value mismatch: expected {expected}, attached {attached}")]
    ValueMismatch {
        /// Declared amount
        expected: U256,
        /// Attached value
        attached: U256,
    },

    /// Asset not accepted by the receiving component.
    #[error("asset not accepted: {0}")]
    AssetRejected(String),

    /// Bridge-side delivery problem.
    #[error("bridge: {0}")]
    Bridge(String),

    /// Invalid mesh configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Fee registry error.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Relay adapter error.
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// Fee hub error.
    #[error(transparent)]
    Hub(#[from] HubError),

    /// Fee store error.
    #[error(transparent)]
    Store(#[from] FeeStoreError),

    /// Fee distributor error.
    #[error(transparent)]
    Distributor(#[from] DistributorError),

    /// Balance movement rejected.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Envelope could not be encoded or decoded.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

/// Result alias used across the runtime.
pub type NodeResult<T> = Result<T, NodeError>;
