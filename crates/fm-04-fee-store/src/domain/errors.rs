//! # Domain Errors

use shared_types::{FeeId, LedgerError};
use thiserror::Error;

/// Fee Store error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeStoreError {
    /// Add for an id that is live.
    #[error("fee {0} already exists")]
    FeeExists(FeeId),

    /// Update or Delete for an unknown id, or a lookup miss.
    #[error("fee {0} does not exist")]
    FeeNotExisting(FeeId),

    /// Add or Update with a rate outside `1..=10000`.
    #[error("invalid fee {fee_bps} bps for {id}")]
    InvalidFee {
        /// Fee id
        id: FeeId,
        /// Rejected rate
        fee_bps: u64,
    },

    /// `put_fees` for an id that is unknown or retired.
    #[error("fees for {0} not allowed")]
    NotAllowed(FeeId),

    /// Zero amount.
    #[error("zero value not allowed")]
    ZeroValueNotAllowed,

    /// Nothing collected.
    #[error("no fees collected")]
    ZeroFees,

    /// Operator could not cover a restore shortfall.
    #[error("token transfer failed: {0}")]
    TransferFailed(String),

    /// Zero operator address.
    #[error("address must be nonzero")]
    AddressZero,

    /// Ledger rejected a movement.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
