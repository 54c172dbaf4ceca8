//! # Registry Entities
//!
//! Fee configs, chains and the sync queue rows that connect them.

use serde::{Deserialize, Serialize};
use shared_types::{Address, ChainId, FeeCurrency, FeeId, FeeType, SyncAction, BPS_DENOMINATOR};

use super::errors::RegistryError;

/// Lowest accepted fee rate.
pub const MIN_FEE_BPS: u64 = 1;

/// Highest accepted fee rate (100%).
pub const MAX_FEE_BPS: u64 = BPS_DENOMINATOR;

/// A (fee, receiver) pair that was replaced by an update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRevision {
    /// Fee rate that was in effect.
    pub fee_bps: u64,
    /// Receiver that was in effect.
    pub receiver: Address,
}

/// Authoritative fee configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Opaque key.
    pub id: FeeId,
    /// Fee rate in basis points.
    pub fee_bps: u64,
    /// Revenue receiver.
    pub receiver: Address,
    /// Currency the fee is charged in.
    pub currency: FeeCurrency,
    /// Transfer leg the fee applies to.
    pub fee_type: FeeType,
    /// Append-only archive of replaced values, oldest first.
    pub history: Vec<FeeRevision>,
}

impl FeeConfig {
    /// Archive the current values and apply new ones.
    pub fn revise(&mut self, fee_bps: u64, receiver: Address) {
        self.history.push(FeeRevision {
            fee_bps: self.fee_bps,
            receiver: self.receiver,
        });
        self.fee_bps = fee_bps;
        self.receiver = receiver;
    }
}

/// A target chain known to the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEntry {
    /// Nonzero, unique chain id.
    pub chain_id: ChainId,
    /// Contract hosting the fee store on that chain.
    pub target: Address,
}

/// One pending change for one chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncQueueEntry {
    /// Fee config id.
    pub id: FeeId,
    /// Target chain.
    pub chain_id: ChainId,
    /// Change kind.
    pub action: SyncAction,
}

/// Reject fee rates outside `1..=10000`.
pub fn validate_fee_bps(fee_bps: u64) -> Result<(), RegistryError> {
    if fee_bps < MIN_FEE_BPS {
        return Err(RegistryError::FeeZero);
    }
    if fee_bps > MAX_FEE_BPS {
        return Err(RegistryError::FeeTooHigh { fee_bps });
    }
    Ok(())
}
