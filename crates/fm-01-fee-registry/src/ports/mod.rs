//! # Ports
//!
//! - `inbound`: admin API and the sync-queue driver surface used by the hub

pub mod inbound;

pub use inbound::{FeeRegistryApi, SyncQueueDriver};
