//! # Domain Errors
//!
//! Error types for the Cross-Chain Fee Hub.

use fm_01_fee_registry::RegistryError;
use fm_02_relay_adapter::RelayError;
use fm_04_fee_store::FeeStoreError;
use shared_types::{Address, ChainId, LedgerError, U256};
use thiserror::Error;

/// Fee hub error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    /// No chain has queued entries.
    #[error("sync queue is empty")]
    QueueEmpty,

    /// Zero address, or no relayer configured for a queued chain.
    #[error("address must be nonzero")]
    AddressZero,

    /// Chain id zero.
    #[error("chain id must be nonzero")]
    ChainIdZero,

    /// Relayer already configured for the chain.
    #[error("relayer for chain {0} already exists")]
    ChainExisting(ChainId),

    /// No relayer configured for the chain.
    #[error("no relayer for chain {0}")]
    ChainNotExisting(ChainId),

    /// Update to the relayer already configured.
    #[error("relayer {0} already set")]
    RelayerExists(Address),

    /// Attached value below the flat hub fee.
    #[error("insufficient funds sent: required {required}, provided {provided}")]
    InsufficientFundsSent {
        /// Flat fee due
        required: U256,
        /// Value attached
        provided: U256,
    },

    /// Value left after the flat fee does not cover the bridge.
    #[error("insufficient funds for gas: required {required}, provided {provided}")]
    InsufficientFundsForGas {
        /// Bridge fee quoted
        required: U256,
        /// Value left for it
        provided: U256,
    },

    /// Collected fees below the send threshold.
    #[error("threshold not met: collected {collected}, threshold {threshold}")]
    ThresholdNotMet {
        /// Collected total in the store
        collected: U256,
        /// Configured threshold
        threshold: U256,
    },

    /// Wrong caller or wrong chain for the operation.
    #[error("not allowed: {0}")]
    NotAllowed(String),

    /// Registry rejected the call.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Fee store rejected the call.
    #[error(transparent)]
    Store(#[from] FeeStoreError),

    /// Relay adapter rejected the call.
    #[error(transparent)]
    Relay(RelayError),

    /// Ledger rejected a movement.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<RelayError> for HubError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::MissingGasFees { required, provided } => {
                HubError::InsufficientFundsForGas { required, provided }
            }
            other => HubError::Relay(other),
        }
    }
}
