//! # Fee Mesh Scenarios
//!
//! Drives a three-chain mesh (home 1, targets 2 and 3) through the bridge
//! simulator and checks the observable results: ledger balances, component
//! state and the committed event log.
//!
//! Defaults from `MeshConfig::default()`:
//!
//! - deploy and send fee 1000 per call, send threshold 100
//! - bridge fee `500 + 2 * payload bytes`
//! - bounty 100 bps paid in the fee token

use fm_03_fee_hub::{DeployReceipt, HubError, SendReceipt};
use node_runtime::{DeliveryOutcome, DeliveryReport, FeeMeshNetwork, MeshConfig, NodeError, Role};
use shared_bus::{EventFilter, EventTopic, ExecutionStatus, FeeEvent};
use shared_types::{
    tags, Address, Asset, CallContext, ChainId, DeployState, FeeCurrency, FeeId, FeeType, U256,
};

const HOME: ChainId = 1;
const TARGET: ChainId = 2;
const MAX_DELIVERIES: usize = 32;

fn user() -> Address {
    Address::from_low_u64(0xA11CE)
}

fn trader() -> Address {
    Address::from_low_u64(0xB0B)
}

fn keeper() -> Address {
    Address::from_low_u64(0xCAFE)
}

fn fee_a() -> FeeId {
    FeeId::from_label("fee-a")
}

fn mesh() -> FeeMeshNetwork {
    FeeMeshNetwork::new(MeshConfig::default()).unwrap()
}

fn add_fee_a(network: &mut FeeMeshNetwork) {
    let admin = network.admin(HOME).unwrap();
    network
        .node_mut(HOME)
        .unwrap()
        .add_fee_config(
            admin,
            fee_a(),
            30,
            Address::from_low_u64(0xFEE),
            FeeCurrency::Native,
            FeeType::Default,
        )
        .unwrap();
}

fn deploy(network: &mut FeeMeshNetwork) -> DeployReceipt {
    let value = U256::from(100_000u64);
    let home = network.node_mut(HOME).unwrap();
    home.faucet(Asset::Native, user(), value).unwrap();
    home.deploy_fees_with_celer(CallContext::with_value(user(), value))
        .unwrap()
}

/// fee-a assigned to chain 2, deployed and confirmed.
fn synced_mesh() -> FeeMeshNetwork {
    let mut network = mesh();
    add_fee_a(&mut network);
    let admin = network.admin(HOME).unwrap();
    network
        .node_mut(HOME)
        .unwrap()
        .assign(admin, fee_a(), TARGET)
        .unwrap();
    deploy(&mut network);
    network.deliver_all(MAX_DELIVERIES);
    network
}

fn collect(network: &mut FeeMeshNetwork, amount: u64) {
    let node = network.node_mut(TARGET).unwrap();
    let fee_token = Asset::Token(node.config().fee_token);
    node.faucet(fee_token, trader(), U256::from(amount)).unwrap();
    node.put_fees(CallContext::new(trader()), fee_a(), U256::from(amount))
        .unwrap();
}

fn send_home(network: &mut FeeMeshNetwork) -> SendReceipt {
    let value = U256::from(100_000u64);
    let node = network.node_mut(TARGET).unwrap();
    node.faucet(Asset::Native, user(), value).unwrap();
    node.send_fees_with_celer(CallContext::with_value(user(), value), HOME, keeper())
        .unwrap()
}

fn receiver_account(index: u64) -> Address {
    Address::from_low_u64(0x7000 + index)
}

fn add_receivers(network: &mut FeeMeshNetwork) {
    let admin = network.admin(HOME).unwrap();
    let home = network.node_mut(HOME).unwrap();
    home.add_receiver(admin, "p1", 40_000, receiver_account(1), Vec::new())
        .unwrap();
    home.add_receiver(admin, "p2", 40_000, receiver_account(2), Vec::new())
        .unwrap();
    home.add_receiver(admin, "eoa", 20_000, receiver_account(3), Vec::new())
        .unwrap();
}

fn home_token_balance(network: &FeeMeshNetwork, account: Address) -> U256 {
    let home = network.node(HOME).unwrap();
    home.balance_of(Asset::Token(home.config().fee_token), account)
}

fn deploy_state(network: &FeeMeshNetwork, chain_id: ChainId) -> DeployState {
    network
        .node(HOME)
        .unwrap()
        .registry()
        .unwrap()
        .deploy_state(fee_a(), chain_id)
}

fn find(reports: &[DeliveryReport], tag: shared_types::ActionTag) -> &DeliveryReport {
    reports.iter().find(|r| r.tag == tag).unwrap()
}

fn synced_transitions(network: &FeeMeshNetwork) -> usize {
    network
        .bus()
        .events_for_chain(HOME)
        .iter()
        .filter(|e| {
            matches!(
                e,
                FeeEvent::DeployStateChanged {
                    to: DeployState::Synced,
                    ..
                }
            )
        })
        .count()
}

// =============================================================================
// DEPLOY
// =============================================================================

#[test]
fn test_deploy_walks_queued_pending_synced() {
    let mut network = mesh();
    add_fee_a(&mut network);
    let admin = network.admin(HOME).unwrap();
    network
        .node_mut(HOME)
        .unwrap()
        .assign(admin, fee_a(), TARGET)
        .unwrap();
    assert_eq!(deploy_state(&network, TARGET), DeployState::Queued);

    let receipt = deploy(&mut network);
    assert_eq!(receipt.dispatches.len(), 1);
    assert_eq!(receipt.dispatches[0].chain_id, TARGET);
    assert_eq!(receipt.flat_fees, U256::from(1000u64));
    assert_eq!(
        receipt.refunded,
        U256::from(100_000u64) - receipt.flat_fees - receipt.bridge_fees()
    );
    assert_eq!(
        network.node(HOME).unwrap().balance_of(Asset::Native, user()),
        receipt.refunded
    );
    assert_eq!(deploy_state(&network, TARGET), DeployState::Pending);
    assert_eq!(network.pending(), 1);

    let first = network.deliver_next().unwrap();
    assert_eq!(first.tag, tags::DEPLOY_FEES);
    assert_eq!(first.outcome, DeliveryOutcome::Executed(ExecutionStatus::Success));
    let entry = network
        .node(TARGET)
        .unwrap()
        .store()
        .unwrap()
        .entry(fee_a())
        .cloned()
        .unwrap();
    assert_eq!(entry.fee_bps, 30);
    assert!(entry.is_active());
    assert_eq!(deploy_state(&network, TARGET), DeployState::Pending);

    let second = network.deliver_next().unwrap();
    assert_eq!(second.tag, tags::DEPLOY_FEES_CONFIRM);
    assert_eq!(second.src_chain_id, TARGET);
    assert_eq!(second.outcome, DeliveryOutcome::Executed(ExecutionStatus::Success));
    assert_eq!(deploy_state(&network, TARGET), DeployState::Synced);
    assert_eq!(deploy_state(&network, 3), DeployState::Unassigned);
    assert_eq!(network.pending(), 0);
}

#[test]
fn test_failed_deploy_reverts_everything() {
    let mut network = mesh();
    add_fee_a(&mut network);
    let admin = network.admin(HOME).unwrap();
    network
        .node_mut(HOME)
        .unwrap()
        .assign(admin, fee_a(), TARGET)
        .unwrap();
    let history = network.bus().history().len();

    let home = network.node_mut(HOME).unwrap();
    home.faucet(Asset::Native, user(), U256::from(500u64)).unwrap();
    let err = home
        .deploy_fees_with_celer(CallContext::with_value(user(), U256::from(500u64)))
        .unwrap_err();

    assert_eq!(
        err,
        NodeError::Hub(HubError::InsufficientFundsSent {
            required: U256::from(1000u64),
            provided: U256::from(500u64),
        })
    );
    assert_eq!(home.balance_of(Asset::Native, user()), U256::from(500u64));
    assert_eq!(network.bus().history().len(), history);
    assert_eq!(network.pending(), 0);
    assert_eq!(deploy_state(&network, TARGET), DeployState::Queued);
}

#[test]
fn test_deploy_with_cleared_queue_is_rejected() {
    let mut network = mesh();
    add_fee_a(&mut network);
    let admin = network.admin(HOME).unwrap();
    let home = network.node_mut(HOME).unwrap();
    home.assign(admin, fee_a(), TARGET).unwrap();
    assert_eq!(home.clear_queue(admin, TARGET).unwrap(), 1);

    home.faucet(Asset::Native, user(), U256::from(100_000u64))
        .unwrap();
    let err = home
        .deploy_fees_with_celer(CallContext::with_value(user(), U256::from(100_000u64)))
        .unwrap_err();
    assert_eq!(err, NodeError::Hub(HubError::QueueEmpty));
}

#[test]
fn test_duplicate_confirm_is_harmless() {
    let mut network = mesh();
    add_fee_a(&mut network);
    let admin = network.admin(HOME).unwrap();
    network
        .node_mut(HOME)
        .unwrap()
        .assign(admin, fee_a(), TARGET)
        .unwrap();
    deploy(&mut network);
    let reports = network.deliver_all(MAX_DELIVERIES);
    let confirm = find(&reports, tags::DEPLOY_FEES_CONFIRM).clone();
    assert_eq!(synced_transitions(&network), 1);

    let replay = network.redeliver(confirm.src_chain_id, confirm.nonce).unwrap();
    assert_eq!(replay.outcome, DeliveryOutcome::Executed(ExecutionStatus::Success));
    assert_eq!(deploy_state(&network, TARGET), DeployState::Synced);
    assert_eq!(synced_transitions(&network), 1);
}

#[test]
fn test_older_confirm_does_not_sync_newer_revision() {
    let mut network = mesh();
    add_fee_a(&mut network);
    let admin = network.admin(HOME).unwrap();
    network
        .node_mut(HOME)
        .unwrap()
        .assign(admin, fee_a(), TARGET)
        .unwrap();
    deploy(&mut network);
    network
        .node_mut(HOME)
        .unwrap()
        .update_fee_config(admin, fee_a(), 45, Address::from_low_u64(0xFEE))
        .unwrap();
    deploy(&mut network);
    assert_eq!(network.pending(), 2);

    // Both deploys land, then the confirms come back oldest first.
    let add = network.deliver_next().unwrap();
    let update = network.deliver_next().unwrap();
    assert_eq!((add.tag, update.tag), (tags::DEPLOY_FEES, tags::DEPLOY_FEES));

    let stale = network.deliver_next().unwrap();
    assert_eq!(stale.tag, tags::DEPLOY_FEES_CONFIRM);
    assert_eq!(deploy_state(&network, TARGET), DeployState::Pending);
    assert_eq!(synced_transitions(&network), 0);

    let latest = network.deliver_next().unwrap();
    assert_eq!(latest.tag, tags::DEPLOY_FEES_CONFIRM);
    assert_eq!(deploy_state(&network, TARGET), DeployState::Synced);
    let entry = network
        .node(TARGET)
        .unwrap()
        .store()
        .unwrap()
        .entry(fee_a())
        .cloned()
        .unwrap();
    assert_eq!(entry.fee_bps, 45);
}

#[test]
fn test_duplicate_add_fails_without_reply() {
    let mut network = mesh();
    add_fee_a(&mut network);
    let admin = network.admin(HOME).unwrap();
    network
        .node_mut(HOME)
        .unwrap()
        .assign(admin, fee_a(), TARGET)
        .unwrap();
    deploy(&mut network);
    let reports = network.deliver_all(MAX_DELIVERIES);
    let add = find(&reports, tags::DEPLOY_FEES).clone();

    let replay = network.redeliver(add.src_chain_id, add.nonce).unwrap();
    assert_eq!(replay.outcome, DeliveryOutcome::Executed(ExecutionStatus::Fail));
    assert_eq!(network.pending(), 0);
}

#[test]
fn test_unassign_retires_then_purges_entry() {
    let mut network = synced_mesh();
    collect(&mut network, 1_000);

    let admin = network.admin(HOME).unwrap();
    network
        .node_mut(HOME)
        .unwrap()
        .unassign(admin, fee_a(), TARGET)
        .unwrap();
    assert_eq!(deploy_state(&network, TARGET), DeployState::Unassigned);
    deploy(&mut network);
    network.deliver_all(MAX_DELIVERIES);

    let store = network.node(TARGET).unwrap().store().unwrap();
    let entry = store.entry(fee_a()).unwrap();
    assert!(entry.deleted);
    assert_eq!(store.collected(fee_a()), U256::from(1_000u64));

    let receipt = send_home(&mut network);
    assert_eq!(receipt.total_fees, U256::from(1_000u64));
    let store = network.node(TARGET).unwrap().store().unwrap();
    assert!(store.entry(fee_a()).is_none());
    assert!(network
        .bus()
        .events_for_chain(TARGET)
        .contains(&FeeEvent::FeePurged { id: fee_a() }));
}

#[test]
fn test_executor_without_gas_stalls_then_retries() {
    let mut network = mesh();
    add_fee_a(&mut network);
    let admin = network.admin(HOME).unwrap();
    network
        .node_mut(HOME)
        .unwrap()
        .assign(admin, fee_a(), TARGET)
        .unwrap();
    deploy(&mut network);

    network.set_executor_value(U256::one());
    let report = network.deliver_next().unwrap();
    assert!(matches!(report.outcome, DeliveryOutcome::Reverted(_)));
    assert_eq!(network.stalled(), 1);
    assert!(network
        .node(TARGET)
        .unwrap()
        .store()
        .unwrap()
        .entry(fee_a())
        .is_none());

    network.set_executor_value(U256::from(100_000u64));
    let retried = network.retry_stalled();
    assert_eq!(retried.len(), 1);
    assert_eq!(
        retried[0].outcome,
        DeliveryOutcome::Executed(ExecutionStatus::Success)
    );
    assert_eq!(network.stalled(), 0);
    network.deliver_all(MAX_DELIVERIES);
    assert_eq!(deploy_state(&network, TARGET), DeployState::Synced);
}

// =============================================================================
// COLLECT AND REMIT
// =============================================================================

#[test]
fn test_fee_quotes_follow_synced_entry() {
    let network = synced_mesh();
    let node = network.node(TARGET).unwrap();

    let quote = node
        .calc_fees_absolute(fee_a(), U256::from(10_000u64))
        .unwrap();
    assert_eq!(quote.fee, U256::from(30u64));
    assert_eq!(quote.net, U256::from(9_970u64));

    let relative = node
        .calc_fees_relative(fee_a(), U256::from(10_000u64))
        .unwrap();
    assert_eq!(relative.net, U256::from(10_030u64));

    let single = node.calc_fees_absolute(fee_a(), U256::one()).unwrap();
    assert_eq!(single.net, U256::one());
    assert!(single.fee.is_zero());
}

#[test]
fn test_remittance_is_distributed_at_home() {
    let mut network = synced_mesh();
    add_receivers(&mut network);
    collect(&mut network, 250_000);

    let receipt = send_home(&mut network);
    assert_eq!(receipt.total_fees, U256::from(250_000u64));
    assert!(network
        .node(TARGET)
        .unwrap()
        .store()
        .unwrap()
        .collected_total()
        .is_zero());

    let reports = network.deliver_all(MAX_DELIVERIES);
    assert_eq!(
        find(&reports, tags::SEND_FEES).outcome,
        DeliveryOutcome::Executed(ExecutionStatus::Success)
    );

    assert_eq!(home_token_balance(&network, keeper()), U256::from(2_500u64));
    assert_eq!(home_token_balance(&network, receiver_account(1)), U256::from(99_000u64));
    assert_eq!(home_token_balance(&network, receiver_account(2)), U256::from(99_000u64));
    assert_eq!(home_token_balance(&network, receiver_account(3)), U256::from(49_500u64));
    let distributor = network.node(HOME).unwrap().distributor().unwrap();
    assert_eq!(distributor.bounty_record().total, U256::from(2_500u64));
    assert_eq!(distributor.bounty_record().last_receiver, keeper());
}

#[test]
fn test_send_below_threshold_is_rejected() {
    let mut network = synced_mesh();
    let node = network.node_mut(TARGET).unwrap();
    node.faucet(Asset::Native, user(), U256::from(100_000u64))
        .unwrap();

    let err = node
        .send_fees_with_celer(CallContext::with_value(user(), U256::from(100_000u64)), HOME, keeper())
        .unwrap_err();
    assert_eq!(
        err,
        NodeError::Hub(HubError::ThresholdNotMet {
            collected: U256::zero(),
            threshold: U256::from(100u64),
        })
    );
    assert_eq!(node.balance_of(Asset::Native, user()), U256::from(100_000u64));
}

#[test]
fn test_bridge_refund_restores_store() {
    let mut network = synced_mesh();
    collect(&mut network, 250_000);
    send_home(&mut network);

    let report = network.refund_next().unwrap();
    assert_eq!(report.tag, tags::SEND_FEES);
    assert_eq!(report.outcome, DeliveryOutcome::Executed(ExecutionStatus::Success));
    assert_eq!(network.pending(), 0);
    // The refunded transfer left flight; it cannot be credited twice.
    assert!(network.refund_next().is_none());

    let node = network.node(TARGET).unwrap();
    let store = node.store().unwrap();
    assert_eq!(store.collected_total(), U256::from(250_000u64));
    assert_eq!(store.collected(fee_a()), U256::from(250_000u64));
    assert_eq!(
        node.balance_of(store.fee_token(), node.contract()),
        U256::from(250_000u64)
    );
    assert!(network
        .bus()
        .events_for_chain(TARGET)
        .contains(&FeeEvent::FeesRestored {
            total_fees: U256::from(250_000u64),
            surplus: U256::zero(),
            shortfall: U256::zero(),
        }));
}

#[test]
fn test_failed_push_falls_back_and_strands_funds() {
    let mut network = synced_mesh();
    collect(&mut network, 250_000);
    send_home(&mut network);

    let reports = network.deliver_all(MAX_DELIVERIES);
    assert_eq!(find(&reports, tags::SEND_FEES).outcome, DeliveryOutcome::FellBack);

    let admin = network.admin(HOME).unwrap();
    let home = network.node_mut(HOME).unwrap();
    let token = Asset::Token(home.config().fee_token);
    assert_eq!(home.adapter().stranded(token), U256::from(250_000u64));

    let rescue = Address::from_low_u64(0x5AFE);
    let forwarded = home.forward_refund(admin, token, rescue).unwrap();
    assert_eq!(forwarded, U256::from(250_000u64));
    assert_eq!(home.balance_of(token, rescue), U256::from(250_000u64));
    assert!(home.adapter().stranded(token).is_zero());
}

// =============================================================================
// DISTRIBUTION
// =============================================================================

#[test]
fn test_paused_distribution_buffers_remittance() {
    let mut network = synced_mesh();
    let admin = network.admin(HOME).unwrap();
    network
        .node_mut(HOME)
        .unwrap()
        .stop_distribution(admin)
        .unwrap();
    collect(&mut network, 250_000);
    send_home(&mut network);

    let reports = network.deliver_all(MAX_DELIVERIES);
    assert_eq!(
        find(&reports, tags::SEND_FEES).outcome,
        DeliveryOutcome::Executed(ExecutionStatus::Success)
    );
    assert_eq!(network.node(HOME).unwrap().distributor().unwrap().queue_len(), 1);

    add_receivers(&mut network);
    let drained = network
        .node_mut(HOME)
        .unwrap()
        .start_distribution(admin)
        .unwrap();
    assert_eq!(drained, 1);
    assert_eq!(home_token_balance(&network, receiver_account(1)), U256::from(99_000u64));
    assert_eq!(home_token_balance(&network, keeper()), U256::from(2_500u64));
}

#[test]
fn test_direct_push_pays_caller_bounty() {
    let mut network = mesh();
    add_receivers(&mut network);
    let home = network.node_mut(HOME).unwrap();
    let token = Asset::Token(home.config().fee_token);
    let amount = U256::from(10_000u64);
    home.faucet(token, trader(), amount).unwrap();

    home.push_fees(CallContext::new(trader()), token, amount)
        .unwrap();
    assert_eq!(home.balance_of(token, trader()), U256::from(100u64));
    assert_eq!(home.balance_of(token, receiver_account(3)), U256::from(1_980u64));

    let err = home
        .push_fees(CallContext::new(trader()), Asset::Native, amount)
        .unwrap_err();
    assert_eq!(
        err,
        NodeError::ValueMismatch {
            expected: amount,
            attached: U256::zero(),
        }
    );
}

// =============================================================================
// ACCESS CONTROL
// =============================================================================

#[test]
fn test_roles_gate_admin_entrypoints() {
    let mut network = mesh();
    let admin = network.admin(HOME).unwrap();
    let manager = Address::from_low_u64(0x3A3A);
    let home = network.node_mut(HOME).unwrap();

    let add = |home: &mut node_runtime::ChainNode| {
        home.add_fee_config(
            CallContext::new(manager),
            fee_a(),
            30,
            Address::from_low_u64(0xFEE),
            FeeCurrency::Native,
            FeeType::Default,
        )
    };
    assert_eq!(
        add(&mut *home).unwrap_err(),
        NodeError::Unauthorized {
            role: Role::FeeManager,
            account: manager,
        }
    );

    assert!(home.grant_role(admin, Role::FeeManager, manager).unwrap());
    assert!(home.has_role(Role::FeeManager, manager));
    add(&mut *home).unwrap();

    assert!(home.revoke_role(admin, Role::FeeManager, manager).unwrap());
    assert!(matches!(
        home.remove_fee_config(CallContext::new(manager), fee_a()),
        Err(NodeError::Unauthorized { .. })
    ));
}

// =============================================================================
// EVENT BUS
// =============================================================================

#[tokio::test]
async fn test_subscribers_see_committed_hub_events() {
    let mut network = mesh();
    let mut subscription = network
        .bus()
        .subscribe(EventFilter::topics(vec![EventTopic::Hub]));
    add_fee_a(&mut network);
    let admin = network.admin(HOME).unwrap();
    network
        .node_mut(HOME)
        .unwrap()
        .assign(admin, fee_a(), TARGET)
        .unwrap();
    deploy(&mut network);

    let recorded = subscription.recv().await.unwrap();
    assert_eq!(recorded.chain_id, HOME);
    assert_eq!(
        recorded.event,
        FeeEvent::FeesDeployed {
            chain_id: TARGET,
            entries: 1,
        }
    );
    assert!(subscription.try_recv().unwrap().is_none());
}
