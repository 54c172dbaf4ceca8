//! # Error Types
//!
//! Errors raised by the shared wire and ledger layers.

use crate::entities::{Address, Asset};
use primitive_types::U256;
use thiserror::Error;

/// Failures decoding or encoding a relay envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// The envelope or its inner message is not valid bincode.
    #[error("malformed relay message: {0}")]
    Malformed(String),

    /// The action tag is not one of the known tags.
    #[error("unknown action tag: 0x{0}")]
    UnknownTag(String),

    /// Serialization failed.
    #[error("encoding failed: {0}")]
    Encoding(String),
}

/// Failures moving assets on a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Owner holds less than the requested amount.
    #[error("insufficient {asset} balance for {owner}: required {required}, available {available}")]
    InsufficientBalance {
        /// Asset being moved.
        asset: Asset,
        /// Account being debited.
        owner: Address,
        /// Amount requested.
        required: U256,
        /// Amount held.
        available: U256,
    },

    /// A credit would overflow 256 bits.
    #[error("balance overflow for {owner}")]
    Overflow {
        /// Account being credited.
        owner: Address,
    },

    /// The wrapped-native token is not configured on this ledger.
    #[error("native wrapper not configured")]
    NoNativeWrapper,
}
