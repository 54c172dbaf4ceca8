//! # Commit Handlers
//!
//! Side effects applied after a transaction commits.

pub mod metrics;

pub use metrics::{record_events, record_queue_depth, record_transaction, TxOutcome};
