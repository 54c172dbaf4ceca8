//! # Fee Store Entities

use serde::{Deserialize, Serialize};
use shared_types::{Address, FeeId, U256};

/// Mirrored fee config.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStoreEntry {
    /// Fee config id.
    pub id: FeeId,
    /// Fee rate in basis points.
    pub fee_bps: u64,
    /// Fee receiver.
    pub target: Address,
    /// Retired by a Delete sync; purged on the next payout pass.
    pub deleted: bool,
}

impl FeeStoreEntry {
    /// True when the entry may be used to charge fees.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.deleted
    }
}

/// Result of a fee calculation: `(net, fee, bps)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    /// Amount after (absolute) or including (relative) the fee.
    pub net: U256,
    /// Fee charged.
    pub fee: U256,
    /// Rate applied.
    pub fee_bps: u64,
}
