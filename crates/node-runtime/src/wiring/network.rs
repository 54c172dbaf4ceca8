//! # Fee Mesh Network
//!
//! Builds one `ChainNode` per configured chain, wires them to each other,
//! and plays the bridge between them.
//!
//! ## Wiring (run as deployer transactions)
//!
//! ```text
//! home:    registry.add_chain(target)  hub.add_relayer(target)  adapter.add_actor(target)
//!          distributor bounty share, distribution started
//! target:  hub.add_relayer(home)       adapter.add_actor(home)
//! all:     hub deploy fee, send fee, send threshold
//! ```
//!
//! ## Delivery
//!
//! | Step | Effect |
//! |------|--------|
//! | pop | oldest in-flight message; a transfer is burned from the source bridge escrow and minted to the destination bridge |
//! | execute | bridge calls the destination adapter with `executor_value` attached |
//! | `Fail` with transfer | bridge follows up with the fallback entrypoint |
//! | `Err` | destination reverted; message is kept for `retry_stalled` |
//! | refund | bridge gives up on a transfer; escrow goes back to the source contract |

use crate::adapters::SimulatedBridge;
use crate::container::{ChainConfig, ChainNode, MeshConfig};
use crate::errors::{NodeError, NodeResult};
use fm_02_relay_adapter::{OutboundMessage, TokenTransfer};
use shared_bus::{ExecutionStatus, InMemoryEventBus};
use shared_types::{ActionTag, Asset, CallContext, ChainId, U256};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// What happened to one delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Destination executed the message with this status.
    Executed(ExecutionStatus),
    /// Destination reported `Fail`; the fallback kept the transfer.
    FellBack,
    /// Destination reverted; the message is stalled.
    Reverted(String),
}

/// Delivery record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Source adapter nonce.
    pub nonce: u64,
    /// Source chain.
    pub src_chain_id: ChainId,
    /// Destination chain.
    pub dst_chain_id: ChainId,
    /// Message tag.
    pub tag: ActionTag,
    /// Result.
    pub outcome: DeliveryOutcome,
}

impl DeliveryReport {
    fn new(message: &OutboundMessage, outcome: DeliveryOutcome) -> Self {
        Self {
            nonce: message.nonce,
            src_chain_id: message.src_chain_id,
            dst_chain_id: message.dst_chain_id,
            tag: message.tag,
            outcome,
        }
    }
}

/// All chains of the mesh plus the bridge between them.
pub struct FeeMeshNetwork {
    config: MeshConfig,
    nodes: BTreeMap<ChainId, ChainNode>,
    bridge: Arc<SimulatedBridge>,
    bus: Arc<InMemoryEventBus>,
    executor_value: U256,
    delivered: Vec<OutboundMessage>,
    stalled: VecDeque<OutboundMessage>,
}

impl FeeMeshNetwork {
    /// Build and wire the mesh described by `config`.
    #[instrument(name = "mesh_init", skip(config))]
    pub fn new(config: MeshConfig) -> NodeResult<Self> {
        config.validate()?;
        info!(
            home_chain_id = config.home_chain_id,
            chains = config.chains.len(),
            "Initializing fee mesh"
        );

        // =====================================================================
        // PHASE 1: Shared infrastructure
        // =====================================================================
        let bridge = Arc::new(SimulatedBridge::new(
            config.bridge_base_fee,
            config.bridge_fee_per_byte,
        ));
        let bus = Arc::new(InMemoryEventBus::new());

        // =====================================================================
        // PHASE 2: Chain deployment
        // =====================================================================
        let mut nodes = BTreeMap::new();
        for chain in &config.chains {
            let node = ChainNode::new(
                chain.clone(),
                config.home_chain_id,
                bridge.clone(),
                bus.clone(),
            );
            info!(chain_id = chain.chain_id, home = node.is_home(), "Chain deployed");
            nodes.insert(chain.chain_id, node);
        }

        let mut network = Self {
            executor_value: config.executor_value,
            config,
            nodes,
            bridge,
            bus,
            delivered: Vec::new(),
            stalled: VecDeque::new(),
        };

        // =====================================================================
        // PHASE 3: Cross-chain wiring
        // =====================================================================
        network.wire()?;
        info!("Fee mesh ready");
        Ok(network)
    }

    fn wire(&mut self) -> NodeResult<()> {
        let home = self
            .config
            .home()
            .cloned()
            .ok_or(NodeError::UnknownChain(self.config.home_chain_id))?;
        let targets: Vec<ChainConfig> = self.config.targets().cloned().collect();
        let (deploy_fee, send_fee, send_threshold, bounty_share_bps) = (
            self.config.deploy_fee,
            self.config.send_fee,
            self.config.send_threshold,
            self.config.bounty_share_bps,
        );

        for target in &targets {
            let admin = CallContext::new(home.deployer);
            let node = self.node_mut(home.chain_id)?;
            node.add_chain(admin, target.chain_id, target.contract)?;
            node.add_relayer(admin, target.chain_id, target.contract)?;
            node.add_actor(admin, target.chain_id, target.contract)?;

            let admin = CallContext::new(target.deployer);
            let node = self.node_mut(target.chain_id)?;
            node.add_relayer(admin, home.chain_id, home.contract)?;
            node.add_actor(admin, home.chain_id, home.contract)?;
        }

        for chain in self.config.chains.clone() {
            let admin = CallContext::new(chain.deployer);
            let node = self.node_mut(chain.chain_id)?;
            node.set_deploy_fee(admin, deploy_fee)?;
            node.set_send_fee(admin, send_fee)?;
            node.set_send_threshold(admin, send_threshold)?;
        }

        let admin = CallContext::new(home.deployer);
        let node = self.node_mut(home.chain_id)?;
        node.set_bounty_settings(admin, bounty_share_bps, true)?;
        node.start_distribution(admin)?;
        Ok(())
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Mesh configuration.
    #[must_use]
    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// Node of `chain_id`.
    pub fn node(&self, chain_id: ChainId) -> NodeResult<&ChainNode> {
        self.nodes
            .get(&chain_id)
            .ok_or(NodeError::UnknownChain(chain_id))
    }

    /// Mutable node of `chain_id`.
    pub fn node_mut(&mut self, chain_id: ChainId) -> NodeResult<&mut ChainNode> {
        self.nodes
            .get_mut(&chain_id)
            .ok_or(NodeError::UnknownChain(chain_id))
    }

    /// Home chain id.
    #[must_use]
    pub fn home_chain_id(&self) -> ChainId {
        self.config.home_chain_id
    }

    /// Deployer context of `chain_id` (holds `Admin`).
    pub fn admin(&self, chain_id: ChainId) -> NodeResult<CallContext> {
        Ok(CallContext::new(self.node(chain_id)?.config().deployer))
    }

    /// Event bus shared by every chain.
    #[must_use]
    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    /// The bridge.
    #[must_use]
    pub fn bridge(&self) -> &SimulatedBridge {
        &self.bridge
    }

    /// Messages waiting for delivery.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.bridge.pending()
    }

    /// Messages whose destination reverted.
    #[must_use]
    pub fn stalled(&self) -> usize {
        self.stalled.len()
    }

    /// Native value the bridge attaches to each inbound call.
    pub fn set_executor_value(&mut self, value: U256) {
        self.executor_value = value;
    }

    // =========================================================================
    // DELIVERY
    // =========================================================================

    /// Deliver the oldest in-flight message.
    pub fn deliver_next(&mut self) -> Option<DeliveryReport> {
        let message = self.bridge.pop_next()?;
        if let Err(e) = self.lock_and_mint(&message) {
            warn!(nonce = message.nonce, error = %e, "Transfer could not be bridged");
            let report = DeliveryReport::new(&message, DeliveryOutcome::Reverted(e.to_string()));
            self.stalled.push_back(message);
            return Some(report);
        }
        Some(self.deliver(message))
    }

    /// Deliver until the bridge is empty or `max` messages were handled.
    pub fn deliver_all(&mut self, max: usize) -> Vec<DeliveryReport> {
        let mut reports = Vec::new();
        while reports.len() < max {
            match self.deliver_next() {
                Some(report) => reports.push(report),
                None => break,
            }
        }
        reports
    }

    /// Retry every stalled message once.
    pub fn retry_stalled(&mut self) -> Vec<DeliveryReport> {
        let stalled: Vec<OutboundMessage> = self.stalled.drain(..).collect();
        stalled
            .into_iter()
            .map(|message| self.deliver(message))
            .collect()
    }

    /// Execute an already delivered message a second time. Messages that
    /// carried a transfer are not replayed.
    pub fn redeliver(&mut self, src_chain_id: ChainId, nonce: u64) -> NodeResult<DeliveryReport> {
        let message = self
            .delivered
            .iter()
            .find(|m| m.src_chain_id == src_chain_id && m.nonce == nonce)
            .cloned()
            .ok_or_else(|| {
                NodeError::Bridge(format!("no delivered message {nonce} from chain {src_chain_id}"))
            })?;
        if message.transfer.is_some() {
            return Err(NodeError::Bridge(
                "transfer-carrying messages are not replayed".to_string(),
            ));
        }
        Ok(self.deliver(message))
    }

    /// The bridge gives up on the oldest in-flight transfer and returns it to
    /// the sender.
    pub fn refund_next(&mut self) -> Option<DeliveryReport> {
        let message = self.bridge.take_first(|m| m.transfer.is_some())?;
        let outcome = match self.refund(&message) {
            Ok(status) => DeliveryOutcome::Executed(status),
            Err(e) => {
                warn!(nonce = message.nonce, error = %e, "Refund reverted");
                DeliveryOutcome::Reverted(e.to_string())
            }
        };
        Some(DeliveryReport::new(&message, outcome))
    }

    fn deliver(&mut self, message: OutboundMessage) -> DeliveryReport {
        let outcome = match self.execute(&message) {
            Ok(outcome) => {
                self.delivered.push(message.clone());
                outcome
            }
            Err(e) => {
                warn!(
                    nonce = message.nonce,
                    src_chain_id = message.src_chain_id,
                    dst_chain_id = message.dst_chain_id,
                    error = %e,
                    "Destination reverted, message stalled"
                );
                self.stalled.push_back(message.clone());
                DeliveryOutcome::Reverted(e.to_string())
            }
        };
        info!(
            nonce = message.nonce,
            src_chain_id = message.src_chain_id,
            dst_chain_id = message.dst_chain_id,
            tag = ?message.tag,
            ?outcome,
            "Message delivered"
        );
        DeliveryReport::new(&message, outcome)
    }

    fn execute(&mut self, message: &OutboundMessage) -> NodeResult<DeliveryOutcome> {
        let transfer = match message.transfer {
            Some(transfer) => Some(self.map_transfer(message, transfer)?),
            None => None,
        };
        let executor_value = self.executor_value;
        let dst = self.node_mut(message.dst_chain_id)?;
        let bridge_address = dst.config().bridge;

        let held = dst.balance_of(Asset::Native, bridge_address);
        if held < executor_value {
            dst.faucet(Asset::Native, bridge_address, executor_value - held)?;
        }
        let ctx = CallContext::with_value(bridge_address, executor_value);

        let Some(transfer) = transfer else {
            let status =
                dst.execute_message(ctx, message.src_chain_id, message.sender, message.payload.clone())?;
            return Ok(DeliveryOutcome::Executed(status));
        };

        let status = dst.execute_message_with_transfer(
            ctx,
            message.src_chain_id,
            message.sender,
            message.payload.clone(),
            transfer,
        )?;
        if status == ExecutionStatus::Success {
            return Ok(DeliveryOutcome::Executed(status));
        }
        dst.execute_message_with_transfer_fallback(
            CallContext::new(bridge_address),
            message.src_chain_id,
            message.sender,
            message.payload.clone(),
            transfer,
        )?;
        Ok(DeliveryOutcome::FellBack)
    }

    fn refund(&mut self, message: &OutboundMessage) -> NodeResult<ExecutionStatus> {
        let transfer = message
            .transfer
            .ok_or_else(|| NodeError::Bridge("message carries no transfer".to_string()))?;
        let src = self.node_mut(message.src_chain_id)?;
        let bridge_address = src.config().bridge;
        src.execute_message_with_transfer_refund(
            CallContext::new(bridge_address),
            transfer,
            message.payload.clone(),
        )
    }

    /// Source escrow is burned, the destination bridge receives the mapped
    /// asset as liquidity for the delivery.
    fn lock_and_mint(&mut self, message: &OutboundMessage) -> NodeResult<()> {
        let Some(transfer) = message.transfer else {
            return Ok(());
        };
        let mapped = self.map_transfer(message, transfer)?;

        let src = self.node_mut(message.src_chain_id)?;
        let escrow = src.config().bridge;
        src.burn(transfer.asset, escrow, transfer.amount)?;

        let dst = self.node_mut(message.dst_chain_id)?;
        let liquidity = dst.config().bridge;
        dst.faucet(mapped.asset, liquidity, mapped.amount)
    }

    /// Fee tokens map to the destination fee token; native stays native.
    fn map_transfer(&self, message: &OutboundMessage, transfer: TokenTransfer) -> NodeResult<TokenTransfer> {
        let src = self.node(message.src_chain_id)?.config();
        let dst = self.node(message.dst_chain_id)?.config();
        let asset = match transfer.asset {
            Asset::Token(token) if token == src.fee_token => Asset::Token(dst.fee_token),
            other => other,
        };
        Ok(TokenTransfer {
            asset,
            amount: transfer.amount,
        })
    }
}
