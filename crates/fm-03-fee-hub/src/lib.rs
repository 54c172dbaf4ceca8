//! # FM-03 Cross-Chain Fee Hub
//!
//! Drives propagation and remittance. On the home chain it drains the
//! registry's sync queues into one `DEPLOY_FEES` message per target chain
//! and applies the confirmations that come back. On a target chain it
//! packages the fee store's collected revenue into a `SEND_FEES`
//! remittance.
//!
//! **Component ID:** 3
//! **Chain:** every chain (deploy on home, send on targets)
//!
//! ## Funding
//!
//! | Operation | Flat fee | Bridge fee | Leftover |
//! |-----------|----------|------------|----------|
//! | `deploy_fees_with_celer` | `deploy_fee` per chain | quoted per message | refunded |
//! | `send_fees_with_celer` | `send_fee` | quoted once | refunded |
//!
//! Under-funding aborts the whole call; nothing is sent partially.

#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{ChainDispatch, DeployReceipt, HubConfig, HubError, HubSettings, SendReceipt};
pub use ports::FeeHubApi;
pub use service::FeeHub;
