//! # FM-04 Fee Store
//!
//! Passive mirror of the home registry on a target chain. Applies synced
//! deltas, quotes fees for the trading side and accumulates collected
//! revenue until the hub pushes it home.
//!
//! **Component ID:** 4  
//! **Chain:** every target chain
//!
//! ## Entry Lifecycle
//!
//! ```text
//! Add ──→ [live] ──Delete──→ [retired] ──payout pass──→ (purged)
//!           ↑                    │
//!           └──── Add/Update ────┘
//! ```
//!
//! A retired entry keeps its collected balance and cannot accrue new fees.
//! It is purged by the next `prepare_to_send_fees` or
//! `collect_fees_from_fee_store`, even if its balance was already zero.

#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{FeeQuote, FeeStoreEntry, FeeStoreError};
pub use ports::FeeStoreApi;
pub use service::FeeStore;
