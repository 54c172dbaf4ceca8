//! # Core Domain Entities
//!
//! Value types shared by the registry, the fee store, the distributor and the
//! relay envelope.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

/// Numeric chain identifier. Zero is never a valid chain.
pub type ChainId = u64;

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte account or contract address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Address with every byte set to `byte`. Handy for fixtures.
    #[must_use]
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }

    /// Address whose low 8 bytes hold `value` (big-endian).
    #[must_use]
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = hex::encode(self.0);
        write!(f, "0x{}...{}", &encoded[..8], &encoded[36..])
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

// =============================================================================
// FEE ID (32 bytes)
// =============================================================================

/// Opaque 32-byte fee configuration key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct FeeId(pub [u8; 32]);

impl FeeId {
    /// The zero id.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Derive an id from a human-readable label (Keccak-256).
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let digest = Keccak256::digest(label.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Returns true if this is the zero id.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for FeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for FeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}..", hex::encode(&self.0[..6]))
    }
}

// =============================================================================
// ASSETS
// =============================================================================

/// Something a ledger can hold a balance of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Asset {
    /// The chain's native currency.
    Native,
    /// A token contract.
    Token(Address),
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => write!(f, "native"),
            Asset::Token(addr) => write!(f, "token:{addr}"),
        }
    }
}

/// Currency a fee config is charged in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeCurrency {
    /// Native currency of the chain.
    #[default]
    Native,
    /// An ERC-20 style token.
    Token,
}

/// Which leg of a transfer a fee applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeType {
    /// Applies regardless of direction.
    #[default]
    Default,
    /// Charged on the sending side.
    From,
    /// Charged on the receiving side.
    To,
}

// =============================================================================
// CALL CONTEXT
// =============================================================================

/// Who is calling a chain entrypoint and how much native value they attached.
///
/// The coordinator has already moved `value` to the chain's contract
/// address when a component sees the context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Immediate caller.
    pub caller: Address,
    /// Attached native value.
    pub value: U256,
}

impl CallContext {
    /// Call without attached value.
    #[must_use]
    pub fn new(caller: Address) -> Self {
        Self {
            caller,
            value: U256::zero(),
        }
    }

    /// Call carrying `value` native units.
    #[must_use]
    pub fn with_value(caller: Address, value: U256) -> Self {
        Self { caller, value }
    }
}

// =============================================================================
// SYNC & REMITTANCE DTOs
// =============================================================================

/// Kind of change a sync queue entry carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncAction {
    /// Create the entry on the target.
    Add,
    /// Overwrite fee and target of an existing entry.
    Update,
    /// Retire the entry on the target.
    Delete,
}

/// Propagation lifecycle of one (fee id, chain) assignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeployState {
    /// Not assigned to the chain.
    #[default]
    Unassigned,
    /// Waiting in the chain's sync queue.
    Queued,
    /// Dispatched, awaiting confirmation.
    Pending,
    /// Confirmed applied on the target.
    Synced,
}

/// One materialised change shipped to a fee store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSyncDelta {
    /// Fee config id.
    pub id: FeeId,
    /// Fee rate in basis points (zero for deletes).
    pub fee_bps: u64,
    /// Fee receiver on the target chain (zero for deletes).
    pub target: Address,
    /// Change kind.
    pub action: SyncAction,
    /// Registry dispatch number, echoed back in the confirm.
    pub sequence: u64,
}

/// Collected amount for one fee id inside a remittance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeAmount {
    /// Fee config id.
    pub id: FeeId,
    /// Amount collected under this id.
    pub amount: U256,
}

/// Payout bundle a fee store hands to the hub for remittance home.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendFeesPayload {
    /// Sum of all `fees[*].amount`.
    pub total_fees: U256,
    /// Who triggered the remittance and earns the bounty.
    pub bounty_receiver: Address,
    /// Per-id breakdown.
    pub fees: Vec<FeeAmount>,
}

impl SendFeesPayload {
    /// Recompute the total from the breakdown.
    #[must_use]
    pub fn breakdown_total(&self) -> U256 {
        self.fees
            .iter()
            .fold(U256::zero(), |acc, entry| acc.saturating_add(entry.amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_zero() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::repeat_byte(1).is_zero());
    }

    #[test]
    fn test_address_from_low_u64() {
        let addr = Address::from_low_u64(0x0102);
        assert_eq!(addr.0[18], 0x01);
        assert_eq!(addr.0[19], 0x02);
        assert!(addr.0[..12].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_address_display_is_shortened() {
        let shown = Address::repeat_byte(0xab).to_string();
        assert!(shown.starts_with("0xabababab"));
        assert!(shown.contains("..."));
    }

    #[test]
    fn test_fee_id_from_label_is_deterministic() {
        assert_eq!(FeeId::from_label("swap"), FeeId::from_label("swap"));
        assert_ne!(FeeId::from_label("swap"), FeeId::from_label("bridge"));
        assert!(!FeeId::from_label("swap").is_zero());
    }

    #[test]
    fn test_breakdown_total() {
        let payload = SendFeesPayload {
            total_fees: U256::from(30u64),
            bounty_receiver: Address::ZERO,
            fees: vec![
                FeeAmount { id: FeeId::from_label("a"), amount: U256::from(10u64) },
                FeeAmount { id: FeeId::from_label("b"), amount: U256::from(20u64) },
            ],
        };
        assert_eq!(payload.breakdown_total(), payload.total_fees);
    }
}
