//! # Constant-Rate Router
//!
//! Swap router with a fixed exchange rate per token pair. Output of a hop is
//! `⌊amount * num / den⌋`. A swap burns the input from the payer and mints
//! the output to the recipient, so the pool itself has no balances.

use fm_05_fee_distributor::{SwapError, SwapRouter};
use shared_types::{mul_div, Address, Asset, AssetLedger, U256};
use std::collections::BTreeMap;
use tracing::debug;

/// Fixed-rate pools keyed by (from, to).
#[derive(Debug, Clone, Default)]
pub struct ConstantRateRouter {
    rates: BTreeMap<(Address, Address), (u64, u64)>,
}

impl ConstantRateRouter {
    /// Empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a one-directional pool. `den` must be nonzero.
    pub fn set_rate(&mut self, from: Address, to: Address, num: u64, den: u64) {
        self.rates.insert((from, to), (num, den.max(1)));
    }

    /// Add a pool and its inverse.
    pub fn set_pair(&mut self, a: Address, b: Address, num: u64, den: u64) {
        self.set_rate(a, b, num, den);
        self.set_rate(b, a, den.max(1), num.max(1));
    }

    fn quote_hop(&self, amount: U256, from: Address, to: Address) -> Result<U256, SwapError> {
        let (num, den) = self
            .rates
            .get(&(from, to))
            .copied()
            .ok_or(SwapError::UnknownPair { from, to })?;
        Ok(mul_div(amount, num, den))
    }
}

impl SwapRouter for ConstantRateRouter {
    fn get_amounts_out(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>, SwapError> {
        if path.len() < 2 {
            return Err(SwapError::PathTooShort(path.len()));
        }
        let mut amounts = Vec::with_capacity(path.len());
        amounts.push(amount_in);
        let mut current = amount_in;
        for hop in path.windows(2) {
            current = self.quote_hop(current, hop[0], hop[1])?;
            amounts.push(current);
        }
        Ok(amounts)
    }

    fn swap_exact_tokens_for_tokens(
        &self,
        amount_in: U256,
        path: &[Address],
        from: Address,
        to: Address,
        ledger: &mut dyn AssetLedger,
    ) -> Result<U256, SwapError> {
        let amounts = self.get_amounts_out(amount_in, path)?;
        let out = amounts.last().copied().unwrap_or_default();
        let (Some(first), Some(last)) = (path.first(), path.last()) else {
            return Err(SwapError::PathTooShort(path.len()));
        };
        ledger.burn(Asset::Token(*first), from, amount_in)?;
        ledger.mint(Asset::Token(*last), to, out)?;
        debug!(amount_in = %amount_in, amount_out = %out, hops = path.len() - 1, "Swap executed");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::InMemoryLedger;

    fn token(n: u8) -> Address {
        Address::repeat_byte(n)
    }

    #[test]
    fn test_multi_hop_quote() {
        let mut router = ConstantRateRouter::new();
        router.set_rate(token(1), token(2), 2, 1);
        router.set_rate(token(2), token(3), 1, 4);
        let amounts = router
            .get_amounts_out(U256::from(100u64), &[token(1), token(2), token(3)])
            .unwrap();
        assert_eq!(
            amounts,
            vec![U256::from(100u64), U256::from(200u64), U256::from(50u64)]
        );
    }

    #[test]
    fn test_unknown_pair_and_short_path() {
        let router = ConstantRateRouter::new();
        assert_eq!(
            router.get_amounts_out(U256::one(), &[token(1)]),
            Err(SwapError::PathTooShort(1))
        );
        assert_eq!(
            router.get_amounts_out(U256::one(), &[token(1), token(2)]),
            Err(SwapError::UnknownPair {
                from: token(1),
                to: token(2)
            })
        );
    }

    #[test]
    fn test_swap_burns_input_and_mints_output() {
        let mut router = ConstantRateRouter::new();
        router.set_pair(token(1), token(2), 3, 1);
        let mut ledger = InMemoryLedger::new();
        let payer = token(0xAA);
        let payee = token(0xBB);
        ledger.mint(Asset::Token(token(1)), payer, U256::from(10u64)).unwrap();

        let out = router
            .swap_exact_tokens_for_tokens(U256::from(10u64), &[token(1), token(2)], payer, payee, &mut ledger)
            .unwrap();

        assert_eq!(out, U256::from(30u64));
        assert!(ledger.balance_of(Asset::Token(token(1)), payer).is_zero());
        assert_eq!(ledger.balance_of(Asset::Token(token(2)), payee), U256::from(30u64));
    }
}
