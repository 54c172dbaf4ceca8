//! # FM-05 Fee Distributor
//!
//! Home-chain payout engine. Revenue arrives either as a `SEND_FEES`
//! remittance through the relay adapter or as a direct deposit, and is split
//! by point share across the registered receivers.
//!
//! **Component ID:** 5
//! **Chain:** home only
//!
//! ## Payout Invariant
//!
//! For one distribution of `amount`:
//!
//! ```text
//! bounty + Σ share[i] + dust == amount,   dust < receivers.len()
//! ```
//!
//! Shares are floored; the dust stays in the contract.
//!
//! ## Receivers
//!
//! | Field | Rule |
//! |-------|------|
//! | name | unique |
//! | account | nonzero |
//! | points | nonzero |
//! | swap_path | empty, or starts at the fee token and quotes on the router |

#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    BountyRecord, BountySettings, DistributionQueueEntry, DistributionReceiver,
    DistributionReport, DistributorConfig, DistributorError, PushOutcome, SwapError,
    DEFAULT_BOUNTY_SHARE_BPS,
};
pub use ports::{FeeDistributorApi, SwapRouter};
pub use service::FeeDistributor;
