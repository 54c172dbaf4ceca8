//! Prometheus metrics for fee-mesh components.
//!
//! All metrics follow the naming convention: `fm_<component>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, GaugeVec, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // LEDGER TRANSACTIONS
    // =========================================================================

    /// Entrypoint calls by outcome (committed/reverted)
    pub static ref LEDGER_TRANSACTIONS: CounterVec = CounterVec::new(
        Opts::new("fm_node_transactions_total", "Ledger transactions by chain and outcome"),
        &["chain", "outcome"]
    ).expect("metric creation failed");

    /// Time spent executing one ledger transaction
    pub static ref TRANSACTION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "fm_node_transaction_duration_seconds",
            "Time spent executing one ledger transaction"
        ).buckets(exponential_buckets(0.00001, 2.0, 15).unwrap_or_default())
    ).expect("metric creation failed");

    // =========================================================================
    // RELAY METRICS
    // =========================================================================

    /// Outbound bridge messages by tag
    pub static ref RELAY_MESSAGES_SENT: CounterVec = CounterVec::new(
        Opts::new("fm_relay_messages_sent_total", "Messages handed to the bridge"),
        &["tag"]
    ).expect("metric creation failed");

    /// Inbound bridge messages by tag and execution status
    pub static ref RELAY_MESSAGES_RECEIVED: CounterVec = CounterVec::new(
        Opts::new("fm_relay_messages_received_total", "Messages executed from the bridge"),
        &["tag", "status"]  // status: success/fail
    ).expect("metric creation failed");

    // =========================================================================
    // REGISTRY / HUB METRICS
    // =========================================================================

    /// Assignments reaching Synced
    pub static ref DEPLOY_STATES_SYNCED: Counter = Counter::new(
        "fm_registry_assignments_synced_total",
        "Assignments confirmed as applied on their target chain"
    ).expect("metric creation failed");

    /// Entries waiting in each chain's sync queue
    pub static ref SYNC_QUEUE_DEPTH: GaugeVec = GaugeVec::new(
        Opts::new("fm_registry_sync_queue_depth", "Queued sync entries per target chain"),
        &["chain"]
    ).expect("metric creation failed");

    // =========================================================================
    // REVENUE METRICS
    // =========================================================================

    /// Remittances by outcome
    pub static ref REMITTANCES: CounterVec = CounterVec::new(
        Opts::new("fm_store_remittances_total", "Fee remittances by outcome"),
        &["outcome"]  // outcome: sent/restored
    ).expect("metric creation failed");

    /// Distribution runs
    pub static ref DISTRIBUTIONS: CounterVec = CounterVec::new(
        Opts::new("fm_distributor_runs_total", "pushFees calls by outcome"),
        &["outcome"]  // outcome: distributed/queued
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; metrics that are already registered are
/// left in place.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(LEDGER_TRANSACTIONS.clone()),
        Box::new(TRANSACTION_DURATION.clone()),
        Box::new(RELAY_MESSAGES_SENT.clone()),
        Box::new(RELAY_MESSAGES_RECEIVED.clone()),
        Box::new(DEPLOY_STATES_SYNCED.clone()),
        Box::new(SYNC_QUEUE_DEPTH.clone()),
        Box::new(REMITTANCES.clone()),
        Box::new(DISTRIBUTIONS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
