//! # Distributor Entities

use serde::{Deserialize, Serialize};
use shared_types::{Address, Asset, SendFeesPayload, U256};

/// Default bounty share: 1%.
pub const DEFAULT_BOUNTY_SHARE_BPS: u64 = 100;

/// Static wiring of the distributor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributorConfig {
    /// Shared facet address holding the funds being distributed.
    pub contract: Address,
    /// Token every distribution is denominated in.
    pub fee_token: Address,
    /// Wrapped-native token, if the chain has one.
    pub wrapped_native: Option<Address>,
}

/// One payee.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionReceiver {
    /// Unique name.
    pub name: String,
    /// Point share.
    pub points: u64,
    /// Payout account.
    pub account: Address,
    /// Swap route from the fee token; empty means paid in the fee token.
    pub swap_path: Vec<Address>,
}

impl DistributionReceiver {
    /// Asset the receiver ends up holding.
    #[must_use]
    pub fn payout_asset(&self, fee_token: Address) -> Asset {
        Asset::Token(self.swap_path.last().copied().unwrap_or(fee_token))
    }
}

/// `push_fees` call buffered while distribution is stopped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionQueueEntry {
    /// Fee-token amount already held by the contract.
    pub amount: U256,
    /// Remittance breakdown.
    pub payload: SendFeesPayload,
}

/// Bounty configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BountySettings {
    /// Share of each distribution paid as bounty.
    pub share_bps: u64,
    /// Pay the bounty in the fee token instead of native.
    pub in_token: bool,
    /// Route fee token → wrapped native for native bounties.
    pub swap_path: Vec<Address>,
}

impl Default for BountySettings {
    fn default() -> Self {
        Self {
            share_bps: DEFAULT_BOUNTY_SHARE_BPS,
            in_token: false,
            swap_path: Vec::new(),
        }
    }
}

/// Bounty bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BountyRecord {
    /// Last paid receiver.
    pub last_receiver: Address,
    /// Last paid amount (in the asset it was paid in).
    pub last_amount: U256,
    /// Running total of paid bounties.
    pub total: U256,
}

/// Result of one `push_fees`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    /// Distribution stopped; buffered at this queue length.
    Queued {
        /// Queue length after buffering.
        queued: usize,
    },
    /// Paid out immediately.
    Distributed(DistributionReport),
}

/// Amounts moved by one distribution, denominated in the fee token.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistributionReport {
    /// Amount distributed.
    pub amount: U256,
    /// Bounty carved out.
    pub bounty: U256,
    /// Per receiver, in receiver order.
    pub shares: Vec<(String, U256)>,
}

impl DistributionReport {
    /// Sum paid to receivers.
    #[must_use]
    pub fn paid(&self) -> U256 {
        self.shares
            .iter()
            .fold(U256::zero(), |acc, (_, share)| acc.saturating_add(*share))
    }

    /// Rounding remainder kept by the contract.
    #[must_use]
    pub fn dust(&self) -> U256 {
        self.amount
            .saturating_sub(self.bounty)
            .saturating_sub(self.paid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_asset() {
        let fee_token = Address::repeat_byte(1);
        let mut receiver = DistributionReceiver {
            name: "team".to_string(),
            points: 1,
            account: Address::repeat_byte(2),
            swap_path: Vec::new(),
        };
        assert_eq!(receiver.payout_asset(fee_token), Asset::Token(fee_token));
        receiver.swap_path = vec![fee_token, Address::repeat_byte(3)];
        assert_eq!(
            receiver.payout_asset(fee_token),
            Asset::Token(Address::repeat_byte(3))
        );
    }

    #[test]
    fn test_report_dust() {
        let report = DistributionReport {
            amount: U256::from(100u64),
            bounty: U256::from(1u64),
            shares: vec![("a".to_string(), U256::from(33u64)), ("b".to_string(), U256::from(65u64))],
        };
        assert_eq!(report.paid(), U256::from(98u64));
        assert_eq!(report.dust(), U256::one());
    }
}
