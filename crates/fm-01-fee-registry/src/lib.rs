//! # FM-01 Fee Registry
//!
//! Home-chain authoritative store of fee configs, target chains, per-pair
//! deploy state and per-chain sync queues.
//!
//! **Component ID:** 1  
//! **Architecture:** Hexagonal (Domain + Ports)  
//! **Chain:** home only
//!
//! ## Deploy State Machine
//!
//! | From | Trigger | To |
//! |------|---------|----|
//! | Unassigned | `assign` | Queued |
//! | Queued / Pending / Synced | `update_fee_config` | Queued |
//! | Queued | hub dispatch | Pending |
//! | Pending | matching confirm | Synced |
//! | any | `unassign` | Unassigned |
//!
//! ## Queue Folding
//!
//! The queue holds at most one entry per (fee id, chain):
//!
//! | Waiting | Incoming | Result |
//! |---------|----------|--------|
//! | Add | Update | Add |
//! | Add | Delete | (dropped) |
//! | Update | Delete | Delete |
//! | Delete | Add | Update |
//!
//! ## Module Structure
//!
//! ```text
//! fm-01-fee-registry/
//! ├── domain/      # FeeConfig, ChainEntry, SyncQueueEntry, RegistryError
//! ├── ports/       # FeeRegistryApi (admin), SyncQueueDriver (hub)
//! └── service.rs   # FeeRegistry
//! ```

#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    validate_fee_bps, ChainEntry, FeeConfig, FeeRevision, RegistryError, SyncQueueEntry,
    MAX_FEE_BPS, MIN_FEE_BPS,
};
pub use ports::{FeeRegistryApi, SyncQueueDriver};
pub use service::FeeRegistry;
