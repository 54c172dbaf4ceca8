//! # Fee-Mesh Node Runtime
//!
//! Boots every chain of the mesh in one process, wires them through the
//! simulated bridge and runs one full fee cycle:
//!
//! ```text
//! home:   add fee config → assign to every target → deploy
//!                                   │
//!                       DEPLOY_FEES │ ▲ DEPLOY_FEES_CONFIRM
//!                                   ▼ │
//! target: store synced → trader pays fees → send fees home
//!                                   │
//!                         SEND_FEES │ (token transfer)
//!                                   ▼
//! home:   distributor pays receivers and the bounty
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (`FM_LOG_LEVEL`, `FM_JSON_LOGS`, `FM_SERVICE_NAME`)
//! 2. Load mesh configuration (`FM_CONFIG`, else built-in defaults)
//! 3. Build and wire the mesh
//! 4. Run the fee cycle, then dump Prometheus metrics

use anyhow::{Context, Result};
use fee_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};
use node_runtime::{DeliveryReport, FeeMeshNetwork, MeshConfig, NodeResult};
use shared_bus::EventFilter;
use shared_types::{Address, Asset, CallContext, FeeCurrency, FeeId, FeeType, U256};
use tracing::{debug, info};

const MAX_DELIVERIES: usize = 64;

fn load_config() -> Result<MeshConfig> {
    let config = MeshConfig::from_env().context("loading mesh configuration")?;
    info!(
        home_chain_id = config.home_chain_id,
        chains = config.chains.len(),
        "Configuration loaded"
    );
    Ok(config)
}

fn log_reports(reports: &[DeliveryReport]) {
    for report in reports {
        info!(
            nonce = report.nonce,
            src = report.src_chain_id,
            dst = report.dst_chain_id,
            tag = ?report.tag,
            outcome = ?report.outcome,
            "Bridge delivery"
        );
    }
}

fn run_fee_cycle(network: &mut FeeMeshNetwork) -> NodeResult<()> {
    let home_id = network.home_chain_id();
    let target_ids: Vec<u64> = network.config().targets().map(|c| c.chain_id).collect();
    let admin = network.admin(home_id)?;
    let fee_id = FeeId::from_label("swap-fee");
    let user = Address::from_low_u64(0xA11CE);

    // =========================================================================
    // PHASE 1: Configure and deploy
    // =========================================================================
    info!("Phase 1: Deploying fee configuration");
    let home = network.node_mut(home_id)?;
    home.add_fee_config(
        admin,
        fee_id,
        30,
        Address::from_low_u64(0xFEE),
        FeeCurrency::Native,
        FeeType::Default,
    )?;
    home.assign_all(admin, fee_id)?;
    home.add_receiver(admin, "treasury", 40_000, Address::from_low_u64(0x7001), Vec::new())?;
    home.add_receiver(admin, "staking", 40_000, Address::from_low_u64(0x7002), Vec::new())?;
    home.add_receiver(admin, "operations", 20_000, Address::from_low_u64(0x7003), Vec::new())?;

    let deploy_value = U256::from(100_000u64);
    home.faucet(Asset::Native, user, deploy_value)?;
    let receipt = home.deploy_fees_with_celer(CallContext::with_value(user, deploy_value))?;
    info!(
        chains = receipt.dispatches.len(),
        bridge_fees = %receipt.bridge_fees(),
        refunded = %receipt.refunded,
        "Deploy dispatched"
    );
    log_reports(&network.deliver_all(MAX_DELIVERIES));

    // =========================================================================
    // PHASE 2: Collect and remit
    // =========================================================================
    info!("Phase 2: Collecting and remitting fees");
    for chain_id in target_ids {
        let trader = Address::from_low_u64(0xB0B0 + chain_id);
        let node = network.node_mut(chain_id)?;
        let fee_token = Asset::Token(node.config().fee_token);
        node.faucet(fee_token, trader, U256::from(1_000_000u64))?;
        node.put_fees(CallContext::new(trader), fee_id, U256::from(250_000u64))?;

        let send_value = U256::from(100_000u64);
        node.faucet(Asset::Native, user, send_value)?;
        let sent = node.send_fees_with_celer(CallContext::with_value(user, send_value), home_id, user)?;
        info!(chain_id, total_fees = %sent.total_fees, bridge_fee = %sent.bridge_fee, "Fees sent home");
    }
    log_reports(&network.deliver_all(MAX_DELIVERIES));

    // =========================================================================
    // PHASE 3: Report
    // =========================================================================
    let home = network.node(home_id)?;
    let home_token = Asset::Token(home.config().fee_token);
    if let Some(distributor) = home.distributor() {
        for receiver in distributor.receivers() {
            info!(
                name = %receiver.name,
                balance = %home.balance_of(home_token, receiver.account),
                "Receiver balance"
            );
        }
        info!(
            bounty_total = %distributor.bounty_record().total,
            "Bounty paid"
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    let _guard = init_telemetry(&telemetry).context("initializing telemetry")?;

    info!("===========================================");
    info!("  Fee-Mesh Node Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let config = load_config()?;
    let mut network = FeeMeshNetwork::new(config).context("building fee mesh")?;

    let mut subscription = network.bus().subscribe(EventFilter::all());
    let monitor = tokio::spawn(async move {
        let mut seen = 0usize;
        while let Some(recorded) = subscription.recv().await {
            debug!(
                sequence = recorded.sequence,
                chain_id = recorded.chain_id,
                topic = ?recorded.event.topic(),
                "Event"
            );
            seen += 1;
        }
        seen
    });

    run_fee_cycle(&mut network).context("running fee cycle")?;
    drop(network);

    let seen = monitor.await.context("event monitor")?;
    info!(events = seen, "Fee cycle complete");
    info!("Metrics:\n{}", encode_metrics().context("encoding metrics")?);
    Ok(())
}
