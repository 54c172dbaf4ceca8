//! # Asset Ledger Port
//!
//! Outbound port for plain token mechanics (balances, transfers, native
//! wrapping). Token contracts themselves are out of scope; components only
//! see this trait.

use crate::entities::{Address, Asset};
use crate::errors::LedgerError;
use primitive_types::U256;
use std::collections::{BTreeMap, BTreeSet};

/// Balance book of one chain.
pub trait AssetLedger {
    /// Balance of `owner` in `asset`.
    fn balance_of(&self, asset: Asset, owner: Address) -> U256;

    /// Move `amount` of `asset` from `from` to `to`.
    fn transfer(
        &mut self,
        asset: Asset,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError>;

    /// Create `amount` of `asset` at `to`.
    fn mint(&mut self, asset: Asset, to: Address, amount: U256) -> Result<(), LedgerError>;

    /// Destroy `amount` of `asset` held by `from`.
    fn burn(&mut self, asset: Asset, from: Address, amount: U256) -> Result<(), LedgerError>;

    /// Wrapped-native token contract, if one is deployed.
    fn wrapped_native(&self) -> Option<Address>;

    /// Deposit-style transfer into a contract that exposes a deposit hook.
    ///
    /// Returns `Ok(false)` without moving anything when `target` has no hook,
    /// so the caller can fall back to a plain transfer.
    fn deposit_for(
        &mut self,
        target: Address,
        asset: Asset,
        from: Address,
        amount: U256,
    ) -> Result<bool, LedgerError>;

    /// Convert native currency held by `owner` into wrapped-native tokens.
    fn wrap_native(&mut self, owner: Address, amount: U256) -> Result<(), LedgerError> {
        let wrapper = self.wrapped_native().ok_or(LedgerError::NoNativeWrapper)?;
        self.burn(Asset::Native, owner, amount)?;
        self.mint(Asset::Token(wrapper), owner, amount)
    }

    /// Convert wrapped-native tokens held by `owner` back to native currency.
    fn unwrap_native(&mut self, owner: Address, amount: U256) -> Result<(), LedgerError> {
        let wrapper = self.wrapped_native().ok_or(LedgerError::NoNativeWrapper)?;
        self.burn(Asset::Token(wrapper), owner, amount)?;
        self.mint(Asset::Native, owner, amount)
    }
}

// =============================================================================
// IN-MEMORY LEDGER
// =============================================================================

/// Balance book kept in memory. Cloning it is how a chain snapshots balances.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InMemoryLedger {
    balances: BTreeMap<(Asset, Address), U256>,
    wrapped_native: Option<Address>,
    /// Contracts that accept deposit-style transfers.
    deposit_hooks: BTreeSet<Address>,
    /// Amounts received through `deposit_for`, per (target, asset).
    deposits: BTreeMap<(Address, Asset), U256>,
}

impl InMemoryLedger {
    /// Create an empty ledger without a native wrapper.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty ledger with a wrapped-native token at `wrapper`.
    #[must_use]
    pub fn with_native_wrapper(wrapper: Address) -> Self {
        Self {
            wrapped_native: Some(wrapper),
            ..Self::default()
        }
    }

    /// Mark `target` as exposing a deposit hook.
    pub fn register_deposit_hook(&mut self, target: Address) {
        self.deposit_hooks.insert(target);
    }

    /// Total received by `target` through its deposit hook.
    #[must_use]
    pub fn deposited(&self, target: Address, asset: Asset) -> U256 {
        self.deposits
            .get(&(target, asset))
            .copied()
            .unwrap_or_default()
    }

    fn credit(&mut self, asset: Asset, owner: Address, amount: U256) -> Result<(), LedgerError> {
        let balance = self.balances.entry((asset, owner)).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { owner })?;
        Ok(())
    }

    fn debit(&mut self, asset: Asset, owner: Address, amount: U256) -> Result<(), LedgerError> {
        let available = self.balance_of(asset, owner);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset,
                owner,
                required: amount,
                available,
            });
        }
        let remaining = available - amount;
        if remaining.is_zero() {
            self.balances.remove(&(asset, owner));
        } else {
            self.balances.insert((asset, owner), remaining);
        }
        Ok(())
    }
}

impl AssetLedger for InMemoryLedger {
    fn balance_of(&self, asset: Asset, owner: Address) -> U256 {
        self.balances
            .get(&(asset, owner))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(
        &mut self,
        asset: Asset,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        if amount.is_zero() || from == to {
            return Ok(());
        }
        self.debit(asset, from, amount)?;
        self.credit(asset, to, amount)
    }

    fn mint(&mut self, asset: Asset, to: Address, amount: U256) -> Result<(), LedgerError> {
        self.credit(asset, to, amount)
    }

    fn burn(&mut self, asset: Asset, from: Address, amount: U256) -> Result<(), LedgerError> {
        self.debit(asset, from, amount)
    }

    fn wrapped_native(&self) -> Option<Address> {
        self.wrapped_native
    }

    fn deposit_for(
        &mut self,
        target: Address,
        asset: Asset,
        from: Address,
        amount: U256,
    ) -> Result<bool, LedgerError> {
        if !self.deposit_hooks.contains(&target) {
            return Ok(false);
        }
        self.transfer(asset, from, target, amount)?;
        let total = self.deposits.entry((target, asset)).or_default();
        *total = total.saturating_add(amount);
        Ok(true)
    }
}
