//! # Commit Metrics
//!
//! Turns the events of a committed transaction into Prometheus samples.
//! Reverted transactions never reach this handler.

use fee_telemetry::metric_inc;
use fee_telemetry::metrics::{
    DEPLOY_STATES_SYNCED, DISTRIBUTIONS, LEDGER_TRANSACTIONS, RELAY_MESSAGES_RECEIVED,
    RELAY_MESSAGES_SENT, REMITTANCES, SYNC_QUEUE_DEPTH,
};
use fm_01_fee_registry::FeeRegistry;
use shared_bus::{ExecutionStatus, FeeEvent};
use shared_types::{ChainId, DeployState};

/// Transaction outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    /// State and events applied.
    Committed,
    /// Snapshot restored.
    Reverted,
}

impl TxOutcome {
    fn label(self) -> &'static str {
        match self {
            TxOutcome::Committed => "committed",
            TxOutcome::Reverted => "reverted",
        }
    }
}

/// Count one ledger transaction.
pub fn record_transaction(chain_id: ChainId, outcome: TxOutcome) {
    let chain = chain_id.to_string();
    metric_inc!(LEDGER_TRANSACTIONS, &[chain.as_str(), outcome.label()]);
}

/// Sample every event of a committed transaction.
pub fn record_events(events: &[FeeEvent]) {
    for event in events {
        match event {
            FeeEvent::MessageSent { tag, .. } => {
                let tag = format!("{tag:?}");
                metric_inc!(RELAY_MESSAGES_SENT, &[tag.as_str()]);
            }
            FeeEvent::MessageReceived { tag, status, .. } => {
                let tag = tag.map_or_else(|| "unknown".to_string(), |t| format!("{t:?}"));
                let status = match status {
                    ExecutionStatus::Success => "success",
                    ExecutionStatus::Fail => "fail",
                };
                metric_inc!(RELAY_MESSAGES_RECEIVED, &[tag.as_str(), status]);
            }
            FeeEvent::DeployStateChanged {
                to: DeployState::Synced,
                ..
            } => metric_inc!(DEPLOY_STATES_SYNCED),
            FeeEvent::FeesSent { .. } => metric_inc!(REMITTANCES, &["sent"]),
            FeeEvent::FeesRestored { .. } => metric_inc!(REMITTANCES, &["restored"]),
            FeeEvent::FeesDistributed { .. } => metric_inc!(DISTRIBUTIONS, &["distributed"]),
            FeeEvent::TriggerDistributionWhileNotRunning { .. } => {
                metric_inc!(DISTRIBUTIONS, &["queued"])
            }
            _ => {}
        }
    }
}

/// Refresh the per-chain queue depth gauge from the registry.
pub fn record_queue_depth(registry: &FeeRegistry) {
    for chain_id in registry.chain_ids() {
        let chain = chain_id.to_string();
        SYNC_QUEUE_DEPTH
            .with_label_values(&[chain.as_str()])
            .set(registry.queue(chain_id).len() as f64);
    }
}
