//! # Outbound Ports

use crate::domain::SwapError;
use shared_types::{Address, AssetLedger, U256};

/// AMM router used for path validation and payout swaps.
pub trait SwapRouter {
    /// Quote every hop of `path` for `amount_in`. Last element is the output.
    fn get_amounts_out(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>, SwapError>;

    /// Swap `amount_in` of `path[0]` held by `from` into `path.last()` paid
    /// to `to`. Returns the amount received.
    fn swap_exact_tokens_for_tokens(
        &self,
        amount_in: U256,
        path: &[Address],
        from: Address,
        to: Address,
        ledger: &mut dyn AssetLedger,
    ) -> Result<U256, SwapError>;
}
