//! # Inbound Port - FeeStoreApi
//!
//! ## Authorization (enforced by the chain coordinator)
//!
//! | Method | Authorized Caller |
//! |--------|-------------------|
//! | `sync_fees` | Local relay adapter (inbound `DEPLOY_FEES`) |
//! | `put_fees` | Anyone (trading side) |
//! | `calc_fees_*` | Anyone |
//! | `prepare_to_send_fees` | Local fee hub |
//! | `restore_fees_from_send_fees` | Local relay adapter (bridge refund) |
//! | `collect_fees_from_fee_store` | `StoreManager` role |

use crate::domain::{FeeQuote, FeeStoreError};
use shared_bus::EventBuffer;
use shared_types::{Address, AssetLedger, FeeId, FeeSyncDelta, SendFeesPayload, U256};

/// Primary API of the fee store mirror.
pub trait FeeStoreApi {
    /// Apply a batch of deltas. All or nothing.
    ///
    /// # Errors
    /// - `FeeExists`: Add for a live id
    /// - `FeeNotExisting`: Update/Delete for an unknown id
    /// - `InvalidFee`: Add/Update with a rate outside `1..=10000`
    fn sync_fees(
        &mut self,
        deltas: &[FeeSyncDelta],
        events: &mut EventBuffer,
    ) -> Result<(), FeeStoreError>;

    /// Fee taken out of `amount`.
    fn calc_fees_absolute(&self, id: FeeId, amount: U256) -> Result<FeeQuote, FeeStoreError>;

    /// Fee charged on top of `amount`.
    fn calc_fees_relative(&self, id: FeeId, amount: U256) -> Result<FeeQuote, FeeStoreError>;

    /// Pull `amount` of the fee token from `from` and credit it to `id`.
    fn put_fees(
        &mut self,
        from: Address,
        id: FeeId,
        amount: U256,
        ledger: &mut dyn AssetLedger,
        events: &mut EventBuffer,
    ) -> Result<(), FeeStoreError>;

    /// Build the payout bundle and zero the accumulators.
    fn prepare_to_send_fees(
        &mut self,
        bounty_receiver: Address,
        events: &mut EventBuffer,
    ) -> Result<SendFeesPayload, FeeStoreError>;

    /// Undo a failed remittance. `refunded` is what the bridge returned.
    ///
    /// Not idempotent: the bridge must refund a given transfer at most once.
    fn restore_fees_from_send_fees(
        &mut self,
        payload: &SendFeesPayload,
        refunded: U256,
        ledger: &mut dyn AssetLedger,
        events: &mut EventBuffer,
    ) -> Result<(), FeeStoreError>;

    /// Emergency pull of the whole fee-token balance to the operator.
    fn collect_fees_from_fee_store(
        &mut self,
        ledger: &mut dyn AssetLedger,
        events: &mut EventBuffer,
    ) -> Result<U256, FeeStoreError>;
}
