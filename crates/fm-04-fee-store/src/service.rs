//! Fee Store Service - passive mirror and revenue accumulator
//!
//! Invariant: `collected_total == Σ collected[id]` after every call.

use crate::domain::{FeeQuote, FeeStoreEntry, FeeStoreError};
use crate::ports::inbound::FeeStoreApi;
use shared_bus::{EventBuffer, FeeEvent};
use shared_types::{
    bps_of, Address, Asset, AssetLedger, FeeAmount, FeeId, FeeSyncDelta, LedgerError,
    SendFeesPayload, SyncAction, BPS_DENOMINATOR, U256,
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Target-chain fee store.
#[derive(Clone, Debug)]
pub struct FeeStore {
    /// Address the store holds balances under.
    contract: Address,
    /// Asset fees are collected in.
    fee_token: Asset,
    /// Receives surpluses and emergency pulls, covers shortfalls.
    operator: Address,
    entries: BTreeMap<FeeId, FeeStoreEntry>,
    collected: BTreeMap<FeeId, U256>,
    collected_total: U256,
}

impl FeeStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(contract: Address, fee_token: Asset, operator: Address) -> Self {
        Self {
            contract,
            fee_token,
            operator,
            entries: BTreeMap::new(),
            collected: BTreeMap::new(),
            collected_total: U256::zero(),
        }
    }

    /// Mirrored entry, including retired ones awaiting purge.
    #[must_use]
    pub fn entry(&self, id: FeeId) -> Option<&FeeStoreEntry> {
        self.entries.get(&id)
    }

    /// All mirrored ids, ascending.
    #[must_use]
    pub fn fee_ids(&self) -> Vec<FeeId> {
        self.entries.keys().copied().collect()
    }

    /// Collected amount for one id.
    #[must_use]
    pub fn collected(&self, id: FeeId) -> U256 {
        self.collected.get(&id).copied().unwrap_or_default()
    }

    /// Sum of all collected amounts.
    #[must_use]
    pub fn collected_total(&self) -> U256 {
        self.collected_total
    }

    /// Asset fees are collected in.
    #[must_use]
    pub fn fee_token(&self) -> Asset {
        self.fee_token
    }

    /// Current operator.
    #[must_use]
    pub fn operator(&self) -> Address {
        self.operator
    }

    /// Replace the operator.
    pub fn set_operator(
        &mut self,
        operator: Address,
        events: &mut EventBuffer,
    ) -> Result<(), FeeStoreError> {
        if operator.is_zero() {
            return Err(FeeStoreError::AddressZero);
        }
        self.operator = operator;
        events.emit(FeeEvent::StoreOperatorSet { operator });
        Ok(())
    }

    fn active_entry(&self, id: FeeId) -> Result<&FeeStoreEntry, FeeStoreError> {
        self.entries
            .get(&id)
            .filter(|entry| entry.is_active())
            .ok_or(FeeStoreError::FeeNotExisting(id))
    }

    fn credit(&mut self, id: FeeId, amount: U256) -> Result<(), FeeStoreError> {
        let overflow = LedgerError::Overflow {
            owner: self.contract,
        };
        let total = self
            .collected_total
            .checked_add(amount)
            .ok_or_else(|| overflow.clone())?;
        let slot = self.collected.entry(id).or_default();
        *slot = slot.checked_add(amount).ok_or(overflow)?;
        self.collected_total = total;
        Ok(())
    }

    /// Zero every accumulator and drop retired entries.
    fn reset_collected(&mut self, events: &mut EventBuffer) {
        self.collected.clear();
        self.collected_total = U256::zero();
        let retired: Vec<FeeId> = self
            .entries
            .values()
            .filter(|entry| entry.deleted)
            .map(|entry| entry.id)
            .collect();
        for id in retired {
            self.entries.remove(&id);
            debug!(fee_id = %id, "Retired fee entry purged");
            events.emit(FeeEvent::FeePurged { id });
        }
    }
}

fn validate_fee(id: FeeId, fee_bps: u64) -> Result<(), FeeStoreError> {
    if fee_bps == 0 || fee_bps > BPS_DENOMINATOR {
        return Err(FeeStoreError::InvalidFee { id, fee_bps });
    }
    Ok(())
}

fn apply_delta(
    entries: &mut BTreeMap<FeeId, FeeStoreEntry>,
    delta: &FeeSyncDelta,
) -> Result<bool, FeeStoreError> {
    let id = delta.id;
    match delta.action {
        SyncAction::Add => {
            if entries.get(&id).is_some_and(FeeStoreEntry::is_active) {
                return Err(FeeStoreError::FeeExists(id));
            }
            validate_fee(id, delta.fee_bps)?;
            // A retired entry comes back with its collected balance intact.
            entries.insert(
                id,
                FeeStoreEntry {
                    id,
                    fee_bps: delta.fee_bps,
                    target: delta.target,
                    deleted: false,
                },
            );
            Ok(true)
        }
        SyncAction::Update => {
            let entry = entries
                .get_mut(&id)
                .ok_or(FeeStoreError::FeeNotExisting(id))?;
            validate_fee(id, delta.fee_bps)?;
            entry.fee_bps = delta.fee_bps;
            entry.target = delta.target;
            entry.deleted = false;
            Ok(true)
        }
        SyncAction::Delete => {
            let entry = entries
                .get_mut(&id)
                .ok_or(FeeStoreError::FeeNotExisting(id))?;
            if entry.deleted {
                return Ok(false);
            }
            entry.deleted = true;
            Ok(true)
        }
    }
}

impl FeeStoreApi for FeeStore {
    fn sync_fees(
        &mut self,
        deltas: &[FeeSyncDelta],
        events: &mut EventBuffer,
    ) -> Result<(), FeeStoreError> {
        let mut entries = self.entries.clone();
        let mut staged = EventBuffer::new();

        for delta in deltas {
            if apply_delta(&mut entries, delta)? {
                staged.emit(FeeEvent::FeeSynced {
                    id: delta.id,
                    fee_bps: delta.fee_bps,
                    action: delta.action,
                });
            }
        }

        self.entries = entries;
        info!(deltas = deltas.len(), applied = staged.len(), "Fee deltas synced");
        events.absorb(staged);
        Ok(())
    }

    fn calc_fees_absolute(&self, id: FeeId, amount: U256) -> Result<FeeQuote, FeeStoreError> {
        if amount.is_zero() {
            return Err(FeeStoreError::ZeroValueNotAllowed);
        }
        // One unit cannot be split; it passes through untouched.
        if amount == U256::one() {
            return Ok(FeeQuote {
                net: U256::one(),
                fee: U256::zero(),
                fee_bps: 0,
            });
        }
        let entry = self.active_entry(id)?;
        let fee = bps_of(amount, entry.fee_bps);
        Ok(FeeQuote {
            net: amount - fee,
            fee,
            fee_bps: entry.fee_bps,
        })
    }

    fn calc_fees_relative(&self, id: FeeId, amount: U256) -> Result<FeeQuote, FeeStoreError> {
        if amount.is_zero() {
            return Err(FeeStoreError::ZeroValueNotAllowed);
        }
        let entry = self.active_entry(id)?;
        let fee = bps_of(amount, entry.fee_bps);
        Ok(FeeQuote {
            net: amount.saturating_add(fee),
            fee,
            fee_bps: entry.fee_bps,
        })
    }

    fn put_fees(
        &mut self,
        from: Address,
        id: FeeId,
        amount: U256,
        ledger: &mut dyn AssetLedger,
        events: &mut EventBuffer,
    ) -> Result<(), FeeStoreError> {
        if !self.entries.get(&id).is_some_and(FeeStoreEntry::is_active) {
            return Err(FeeStoreError::NotAllowed(id));
        }
        if amount.is_zero() {
            return Err(FeeStoreError::ZeroValueNotAllowed);
        }

        ledger.transfer(self.fee_token, from, self.contract, amount)?;
        self.credit(id, amount)?;
        debug!(fee_id = %id, %amount, total = %self.collected_total, "Fees collected");
        events.emit(FeeEvent::FeesCollected { id, amount });
        Ok(())
    }

    fn prepare_to_send_fees(
        &mut self,
        bounty_receiver: Address,
        events: &mut EventBuffer,
    ) -> Result<SendFeesPayload, FeeStoreError> {
        if self.collected_total.is_zero() {
            return Err(FeeStoreError::ZeroFees);
        }

        let fees: Vec<FeeAmount> = self
            .collected
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(id, amount)| FeeAmount {
                id: *id,
                amount: *amount,
            })
            .collect();
        let total_fees = self.collected_total;

        events.emit(FeeEvent::FeesPrepared {
            total_fees,
            entries: fees.len(),
        });
        self.reset_collected(events);
        info!(%total_fees, entries = fees.len(), "Payout bundle prepared");

        Ok(SendFeesPayload {
            total_fees,
            bounty_receiver,
            fees,
        })
    }

    fn restore_fees_from_send_fees(
        &mut self,
        payload: &SendFeesPayload,
        refunded: U256,
        ledger: &mut dyn AssetLedger,
        events: &mut EventBuffer,
    ) -> Result<(), FeeStoreError> {
        for fee in &payload.fees {
            // Purged after the failed send: keep a retired stub so the
            // amount is paid out (and the stub purged) on the next pass.
            self.entries.entry(fee.id).or_insert(FeeStoreEntry {
                id: fee.id,
                fee_bps: 0,
                target: Address::ZERO,
                deleted: true,
            });
            self.credit(fee.id, fee.amount)?;
        }

        let expected = payload.breakdown_total();
        let mut surplus = U256::zero();
        let mut shortfall = U256::zero();
        if refunded > expected {
            surplus = refunded - expected;
            ledger.transfer(self.fee_token, self.contract, self.operator, surplus)?;
        } else if refunded < expected {
            shortfall = expected - refunded;
            ledger
                .transfer(self.fee_token, self.operator, self.contract, shortfall)
                .map_err(|e| FeeStoreError::TransferFailed(e.to_string()))?;
        }

        warn!(total_fees = %expected, %refunded, "Remittance restored after bridge refund");
        events.emit(FeeEvent::FeesRestored {
            total_fees: expected,
            surplus,
            shortfall,
        });
        Ok(())
    }

    fn collect_fees_from_fee_store(
        &mut self,
        ledger: &mut dyn AssetLedger,
        events: &mut EventBuffer,
    ) -> Result<U256, FeeStoreError> {
        let amount = ledger.balance_of(self.fee_token, self.contract);
        if amount.is_zero() {
            return Err(FeeStoreError::ZeroFees);
        }

        ledger.transfer(self.fee_token, self.contract, self.operator, amount)?;
        self.reset_collected(events);
        warn!(operator = %self.operator, %amount, "Fee store drained to operator");
        events.emit(FeeEvent::FeeStoreDrained {
            operator: self.operator,
            amount,
        });
        Ok(amount)
    }
}
