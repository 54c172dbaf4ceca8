//! # Domain Errors

use shared_types::{Address, Asset, ChainId, EnvelopeError, LedgerError, U256};
use thiserror::Error;

/// Relay adapter error types. Any of these reverts the whole call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Inbound call not made by the registered bridge.
    #[error("caller {0} is not the bridge")]
    NotBridge(Address),

    /// Untrusted peer or wrong direction.
    #[error("not allowed: {0}")]
    NotAllowed(String),

    /// Chain id zero.
    #[error("chain id must be nonzero")]
    ChainIdZero,

    /// Zero address.
    #[error("address must be nonzero")]
    AddressZero,

    /// Actor already registered.
    #[error("actor for chain {0} already exists")]
    ActorExisting(ChainId),

    /// No actor for chain.
    #[error("no actor for chain {0}")]
    ActorNotExisting(ChainId),

    /// Attached value does not cover the outbound bridge fee.
    #[error("missing gas fees: required {required}, provided {provided}")]
    MissingGasFees {
        /// Bridge fee
        required: U256,
        /// Value available
        provided: U256,
    },

    /// `forward_refund` with nothing recorded for the asset.
    #[error("nothing to forward for {0}")]
    NothingToForward(Asset),

    /// Outbound encoding failed.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    /// Ledger rejected a movement.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
