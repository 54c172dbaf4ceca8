//! # Shared Types Crate
//!
//! Primitives and wire types shared by every fee-mesh component.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: anything that crosses a crate or chain
//!   boundary is defined here.
//! - **Decode Once**: relay payloads are decoded into [`RelayMessage`] at the
//!   transport boundary and matched exhaustively afterwards.
//! - **Explicit Ledger**: token movements go through the [`AssetLedger`] port;
//!   components never touch balances ambiently.

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod ledger;

pub use entities::*;
pub use envelope::{tags, ActionTag, MessageEnvelope, RelayMessage};
pub use errors::*;
pub use ledger::{AssetLedger, InMemoryLedger};

pub use primitive_types::U256;

/// Basis-point denominator (100% = 10_000 bps).
pub const BPS_DENOMINATOR: u64 = 10_000;

/// `floor(amount * numerator / denominator)` without a 512-bit intermediate.
///
/// Splits `amount = q * denominator + r`, so the result is
/// `q * numerator + floor(r * numerator / denominator)`. Saturates if the
/// result does not fit (only possible when `numerator > denominator`).
/// Returns zero when `denominator` is zero.
#[must_use]
pub fn mul_div(amount: U256, numerator: u64, denominator: u64) -> U256 {
    if denominator == 0 {
        return U256::zero();
    }
    let denominator_wide = U256::from(denominator);
    let quotient = amount / denominator_wide;
    let remainder = (amount % denominator_wide).low_u64();
    let tail = u128::from(remainder) * u128::from(numerator) / u128::from(denominator);
    quotient
        .saturating_mul(U256::from(numerator))
        .saturating_add(U256::from(tail))
}

/// Fee share of `amount` at `bps` basis points, rounded down.
#[must_use]
pub fn bps_of(amount: U256, bps: u64) -> U256 {
    mul_div(amount, bps, BPS_DENOMINATOR)
}
