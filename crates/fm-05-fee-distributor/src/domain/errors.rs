//! # Domain Errors

use shared_types::{Address, Asset, LedgerError};
use thiserror::Error;

/// Failures reported by a swap router.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapError {
    /// A path needs at least two hops.
    #[error("swap path too short: {0} hop(s)")]
    PathTooShort(usize),

    /// No pool for a pair on the path.
    #[error("no pool for {from} -> {to}")]
    UnknownPair {
        /// Input token
        from: Address,
        /// Output token
        to: Address,
    },

    /// Ledger rejected a movement during the swap.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Fee distributor error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistributorError {
    /// A receiver with that name exists.
    #[error("receiver {0} already exists")]
    ReceiverExists(String),

    /// No receiver with that name.
    #[error("receiver {0} does not exist")]
    ReceiverNotExisting(String),

    /// Zero account or bounty receiver.
    #[error("address must be nonzero")]
    AddressZero,

    /// Zero point share.
    #[error("points must be nonzero")]
    PointsZero,

    /// Parallel arrays of different length, or empty.
    #[error("wrong data: {names} names, {points} point values")]
    WrongData {
        /// Names supplied
        names: usize,
        /// Point values supplied
        points: usize,
    },

    /// Path rejected by validation or the router.
    #[error("invalid swap path: {0}")]
    InvalidSwapPath(String),

    /// Distribution with no receivers registered.
    #[error("no receivers registered")]
    NoReceivers,

    /// `push_fees` with an asset other than the fee token.
    #[error("wrong token {0}")]
    WrongToken(Asset),

    /// Zero amount.
    #[error("zero value not allowed")]
    ZeroValueNotAllowed,

    /// Bounty share above 100%.
    #[error("bounty share {0} bps exceeds 10000")]
    BountyShareTooHigh(u64),

    /// `start` while running.
    #[error("distribution already running")]
    AlreadyRunning,

    /// `stop` while stopped.
    #[error("distribution not running")]
    NotRunning,

    /// Router failed mid-payout.
    #[error(transparent)]
    Swap(#[from] SwapError),

    /// Ledger rejected a movement.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
