//! # Chain Node
//!
//! One chain of the mesh: its `LedgerState`, the swap router it trades
//! through, and handles to the shared bridge and event bus.
//!
//! ## Transactions
//!
//! Every public entrypoint runs through `transact`:
//!
//! ```text
//! snapshot state
//!   → move attached value caller → contract
//!   → run the component call with a fresh EventBuffer
//!   → Ok:  publish events, submit outbox to the bridge
//!   → Err: restore snapshot, drop events and outbox
//! ```

use crate::adapters::{ConstantRateRouter, LocalFacets};
use crate::container::config::ChainConfig;
use crate::container::roles::Role;
use crate::container::state::{ChainFacets, LedgerState};
use crate::errors::{NodeError, NodeResult};
use crate::handlers::metrics::{record_events, record_queue_depth, record_transaction, TxOutcome};
use fee_telemetry::metrics::TRANSACTION_DURATION;
use fee_telemetry::time_histogram;
use fm_01_fee_registry::{FeeRegistry, FeeRegistryApi};
use fm_02_relay_adapter::{BridgeClient, InboundCall, RelayAdapter, RelayApi, TokenTransfer};
use fm_03_fee_hub::{DeployReceipt, FeeHub, FeeHubApi, SendReceipt};
use fm_04_fee_store::{FeeQuote, FeeStore, FeeStoreApi};
use fm_05_fee_distributor::{FeeDistributor, FeeDistributorApi, PushOutcome};
use shared_bus::{EventBuffer, EventPublisher, ExecutionStatus};
use shared_types::{
    Address, Asset, AssetLedger, CallContext, ChainId, FeeCurrency, FeeId, FeeType,
    SendFeesPayload, SyncAction, U256,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Per-transaction environment handed to the call body.
pub struct TxEnv<'a> {
    /// Shared contract address of this chain.
    pub contract: Address,
    /// Outbound bridge.
    pub bridge: &'a dyn BridgeClient,
    /// Swap router.
    pub router: &'a ConstantRateRouter,
}

/// One chain of the mesh.
pub struct ChainNode {
    config: ChainConfig,
    home_chain_id: ChainId,
    state: LedgerState,
    router: ConstantRateRouter,
    bridge: Arc<dyn BridgeClient>,
    publisher: Arc<dyn EventPublisher>,
}

impl ChainNode {
    /// Deploy a fresh chain.
    pub fn new(
        config: ChainConfig,
        home_chain_id: ChainId,
        bridge: Arc<dyn BridgeClient>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        let state = LedgerState::deploy(&config, home_chain_id);
        Self {
            config,
            home_chain_id,
            state,
            router: ConstantRateRouter::new(),
            bridge,
            publisher,
        }
    }

    // =========================================================================
    // READERS
    // =========================================================================

    /// Chain id.
    #[must_use]
    pub fn chain_id(&self) -> ChainId {
        self.config.chain_id
    }

    /// True on the home chain.
    #[must_use]
    pub fn is_home(&self) -> bool {
        self.config.chain_id == self.home_chain_id
    }

    /// Static configuration.
    #[must_use]
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Shared contract address.
    #[must_use]
    pub fn contract(&self) -> Address {
        self.config.contract
    }

    /// Full persistent state.
    #[must_use]
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Fee registry (home only).
    #[must_use]
    pub fn registry(&self) -> Option<&FeeRegistry> {
        self.state.facets.registry.as_ref()
    }

    /// Relay adapter.
    #[must_use]
    pub fn adapter(&self) -> &RelayAdapter {
        &self.state.adapter
    }

    /// Fee hub.
    #[must_use]
    pub fn hub(&self) -> &FeeHub {
        &self.state.facets.hub
    }

    /// Fee store (targets only).
    #[must_use]
    pub fn store(&self) -> Option<&FeeStore> {
        self.state.facets.store.as_ref()
    }

    /// Fee distributor (home only).
    #[must_use]
    pub fn distributor(&self) -> Option<&FeeDistributor> {
        self.state.facets.distributor.as_ref()
    }

    /// Balance of `owner` in `asset`.
    #[must_use]
    pub fn balance_of(&self, asset: Asset, owner: Address) -> U256 {
        self.state.facets.bank.balance_of(asset, owner)
    }

    /// Received through `owner`'s deposit hook.
    #[must_use]
    pub fn deposited(&self, owner: Address, asset: Asset) -> U256 {
        self.state.facets.bank.deposited(owner, asset)
    }

    /// True if `account` holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role, account: Address) -> bool {
        self.state.facets.roles.has(role, account)
    }

    /// Router pools, for setup.
    pub fn router_mut(&mut self) -> &mut ConstantRateRouter {
        &mut self.router
    }

    /// Quote a fee deducted from `amount`.
    pub fn calc_fees_absolute(&self, id: FeeId, amount: U256) -> NodeResult<FeeQuote> {
        Ok(self.require_store()?.calc_fees_absolute(id, amount)?)
    }

    /// Quote a fee charged on top of `amount`.
    pub fn calc_fees_relative(&self, id: FeeId, amount: U256) -> NodeResult<FeeQuote> {
        Ok(self.require_store()?.calc_fees_relative(id, amount)?)
    }

    fn require_store(&self) -> NodeResult<&FeeStore> {
        self.store().ok_or(NodeError::ComponentMissing {
            component: "fee store",
            chain_id: self.chain_id(),
        })
    }

    // =========================================================================
    // OFF-LEDGER SETUP
    // =========================================================================

    /// Credit `amount` of `asset` to `to` outside any transaction.
    pub fn faucet(&mut self, asset: Asset, to: Address, amount: U256) -> NodeResult<()> {
        self.state.facets.bank.mint(asset, to, amount)?;
        Ok(())
    }

    /// Destroy `amount` of `asset` held by `from` outside any transaction.
    pub fn burn(&mut self, asset: Asset, from: Address, amount: U256) -> NodeResult<()> {
        self.state.facets.bank.burn(asset, from, amount)?;
        Ok(())
    }

    /// Mark `target` as a contract with a deposit hook.
    pub fn register_deposit_hook(&mut self, target: Address) {
        self.state.facets.bank.register_deposit_hook(target);
    }

    // =========================================================================
    // TRANSACTION CORE
    // =========================================================================

    fn transact<T>(
        &mut self,
        op: &'static str,
        ctx: CallContext,
        body: impl FnOnce(&mut LedgerState, &TxEnv<'_>, &mut EventBuffer) -> NodeResult<T>,
    ) -> NodeResult<T> {
        let _timer = time_histogram!(TRANSACTION_DURATION);
        let chain_id = self.config.chain_id;
        let snapshot = self.state.clone();
        let mut events = EventBuffer::new();
        let env = TxEnv {
            contract: self.config.contract,
            bridge: self.bridge.as_ref(),
            router: &self.router,
        };

        let result = attach_value(&mut self.state.facets, ctx, env.contract)
            .and_then(|()| body(&mut self.state, &env, &mut events));

        match result {
            Ok(value) => {
                let outbox = self.state.adapter.take_outbox();
                let events = events.into_events();
                record_events(&events);
                if let Some(registry) = &self.state.facets.registry {
                    record_queue_depth(registry);
                }
                debug!(chain_id, op, events = events.len(), messages = outbox.len(), "Transaction committed");
                if !events.is_empty() {
                    self.publisher.publish(chain_id, events);
                }
                for message in outbox {
                    self.bridge.submit(message);
                }
                record_transaction(chain_id, TxOutcome::Committed);
                Ok(value)
            }
            Err(e) => {
                self.state = snapshot;
                warn!(chain_id, op, caller = %ctx.caller, error = %e, "Transaction reverted");
                record_transaction(chain_id, TxOutcome::Reverted);
                Err(e)
            }
        }
    }

    fn transact_as<T>(
        &mut self,
        op: &'static str,
        ctx: CallContext,
        role: Role,
        body: impl FnOnce(&mut LedgerState, &TxEnv<'_>, &mut EventBuffer) -> NodeResult<T>,
    ) -> NodeResult<T> {
        self.transact(op, ctx, |state, env, events| {
            if !state.facets.roles.has(role, ctx.caller) {
                return Err(NodeError::Unauthorized {
                    role,
                    account: ctx.caller,
                });
            }
            body(state, env, events)
        })
    }

    // =========================================================================
    // ACCESS CONTROL
    // =========================================================================

    /// Grant `role` to `account`. Admin only.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn grant_role(&mut self, ctx: CallContext, role: Role, account: Address) -> NodeResult<bool> {
        self.transact_as("grant_role", ctx, Role::Admin, |state, _, events| {
            Ok(state.facets.roles.grant(role, account, events))
        })
    }

    /// Revoke `role` from `account`. Admin only.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn revoke_role(&mut self, ctx: CallContext, role: Role, account: Address) -> NodeResult<bool> {
        self.transact_as("revoke_role", ctx, Role::Admin, |state, _, events| {
            Ok(state.facets.roles.revoke(role, account, events))
        })
    }

    // =========================================================================
    // FEE REGISTRY (FeeManager)
    // =========================================================================

    fn registry_tx<T>(
        &mut self,
        op: &'static str,
        ctx: CallContext,
        call: impl FnOnce(&mut FeeRegistry, &mut EventBuffer) -> Result<T, fm_01_fee_registry::RegistryError>,
    ) -> NodeResult<T> {
        self.transact_as(op, ctx, Role::FeeManager, |state, _, events| {
            Ok(call(state.facets.registry_mut()?, events)?)
        })
    }

    /// Register a target chain.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn add_chain(&mut self, ctx: CallContext, chain_id: ChainId, target: Address) -> NodeResult<()> {
        self.registry_tx("add_chain", ctx, |r, e| r.add_chain(chain_id, target, e))
    }

    /// Remove a target chain.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn remove_chain(&mut self, ctx: CallContext, chain_id: ChainId) -> NodeResult<()> {
        self.registry_tx("remove_chain", ctx, |r, e| r.remove_chain(chain_id, e))
    }

    /// Create a fee config.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn add_fee_config(
        &mut self,
        ctx: CallContext,
        id: FeeId,
        fee_bps: u64,
        receiver: Address,
        currency: FeeCurrency,
        fee_type: FeeType,
    ) -> NodeResult<()> {
        self.registry_tx("add_fee_config", ctx, |r, e| {
            r.add_fee_config(id, fee_bps, receiver, currency, fee_type, e)
        })
    }

    /// Change a fee config; assigned chains get an `Update` queued.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn update_fee_config(
        &mut self,
        ctx: CallContext,
        id: FeeId,
        fee_bps: u64,
        receiver: Address,
    ) -> NodeResult<()> {
        self.registry_tx("update_fee_config", ctx, |r, e| {
            r.update_fee_config(id, fee_bps, receiver, e)
        })
    }

    /// Delete a fee config.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn remove_fee_config(&mut self, ctx: CallContext, id: FeeId) -> NodeResult<()> {
        self.registry_tx("remove_fee_config", ctx, |r, e| r.remove_fee_config(id, e))
    }

    /// Assign a config to a chain.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn assign(&mut self, ctx: CallContext, id: FeeId, chain_id: ChainId) -> NodeResult<()> {
        self.registry_tx("assign", ctx, |r, e| r.assign(id, chain_id, e))
    }

    /// Unassign a config from a chain.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn unassign(&mut self, ctx: CallContext, id: FeeId, chain_id: ChainId) -> NodeResult<()> {
        self.registry_tx("unassign", ctx, |r, e| r.unassign(id, chain_id, e))
    }

    /// Assign a config to every chain.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn assign_all(&mut self, ctx: CallContext, id: FeeId) -> NodeResult<usize> {
        self.registry_tx("assign_all", ctx, |r, e| r.assign_all(id, e))
    }

    /// Unassign a config from every chain.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn unassign_all(&mut self, ctx: CallContext, id: FeeId) -> NodeResult<usize> {
        self.registry_tx("unassign_all", ctx, |r, e| r.unassign_all(id, e))
    }

    /// Queue an arbitrary action for an assigned pair.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn queue_up_manually(
        &mut self,
        ctx: CallContext,
        id: FeeId,
        chain_id: ChainId,
        action: SyncAction,
    ) -> NodeResult<()> {
        self.registry_tx("queue_up_manually", ctx, |r, e| {
            r.queue_up_manually(id, chain_id, action, e)
        })
    }

    /// Drop a chain's queue.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn clear_queue(&mut self, ctx: CallContext, chain_id: ChainId) -> NodeResult<usize> {
        self.registry_tx("clear_queue", ctx, |r, e| r.clear_queue(chain_id, e))
    }

    // =========================================================================
    // RELAY ADAPTER (RelayManager / bridge)
    // =========================================================================

    /// Register the trusted peer for a chain.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn add_actor(&mut self, ctx: CallContext, chain_id: ChainId, actor: Address) -> NodeResult<()> {
        self.transact_as("add_actor", ctx, Role::RelayManager, |state, _, events| {
            Ok(state.adapter.add_actor(chain_id, actor, events)?)
        })
    }

    /// Replace the trusted peer for a chain.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn update_actor(&mut self, ctx: CallContext, chain_id: ChainId, actor: Address) -> NodeResult<()> {
        self.transact_as("update_actor", ctx, Role::RelayManager, |state, _, events| {
            Ok(state.adapter.update_actor(chain_id, actor, events)?)
        })
    }

    /// Forget the trusted peer for a chain.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn remove_actor(&mut self, ctx: CallContext, chain_id: ChainId) -> NodeResult<()> {
        self.transact_as("remove_actor", ctx, Role::RelayManager, |state, _, events| {
            Ok(state.adapter.remove_actor(chain_id, events)?)
        })
    }

    /// Sweep stranded `asset` to `to`.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn forward_refund(&mut self, ctx: CallContext, asset: Asset, to: Address) -> NodeResult<U256> {
        self.transact_as("forward_refund", ctx, Role::RelayManager, |state, _, events| {
            let LedgerState { adapter, facets } = state;
            Ok(adapter.forward_refund(asset, to, &mut facets.bank, events)?)
        })
    }

    /// Bridge entrypoint: plain message.
    #[instrument(skip(self, message), fields(chain_id = self.config.chain_id))]
    pub fn execute_message(
        &mut self,
        ctx: CallContext,
        src_chain_id: ChainId,
        sender: Address,
        message: Vec<u8>,
    ) -> NodeResult<ExecutionStatus> {
        let call = inbound(ctx, src_chain_id, sender, message);
        self.transact("execute_message", ctx, |state, env, events| {
            let LedgerState { adapter, facets } = state;
            let mut dispatcher = LocalFacets::new(facets, env.contract, env.router);
            Ok(adapter.execute_message(call, &mut dispatcher, env.bridge, events)?)
        })
    }

    /// Bridge entrypoint: message with a token transfer. The bridge credits
    /// the transfer to the contract before the message runs.
    #[instrument(skip(self, message), fields(chain_id = self.config.chain_id))]
    pub fn execute_message_with_transfer(
        &mut self,
        ctx: CallContext,
        src_chain_id: ChainId,
        sender: Address,
        message: Vec<u8>,
        transfer: TokenTransfer,
    ) -> NodeResult<ExecutionStatus> {
        let call = inbound(ctx, src_chain_id, sender, message);
        self.transact("execute_message_with_transfer", ctx, |state, env, events| {
            let LedgerState { adapter, facets } = state;
            facets
                .bank
                .transfer(transfer.asset, ctx.caller, env.contract, transfer.amount)?;
            let mut dispatcher = LocalFacets::new(facets, env.contract, env.router);
            Ok(adapter.execute_message_with_transfer(
                call,
                transfer,
                &mut dispatcher,
                env.bridge,
                events,
            )?)
        })
    }

    /// Bridge entrypoint: one of our transfers came back undelivered.
    #[instrument(skip(self, message), fields(chain_id = self.config.chain_id))]
    pub fn execute_message_with_transfer_refund(
        &mut self,
        ctx: CallContext,
        transfer: TokenTransfer,
        message: Vec<u8>,
    ) -> NodeResult<ExecutionStatus> {
        self.transact("execute_message_with_transfer_refund", ctx, |state, env, events| {
            let LedgerState { adapter, facets } = state;
            facets
                .bank
                .transfer(transfer.asset, ctx.caller, env.contract, transfer.amount)?;
            let mut dispatcher = LocalFacets::new(facets, env.contract, env.router);
            Ok(adapter.execute_message_with_transfer_refund(
                ctx.caller,
                transfer,
                &message,
                &mut dispatcher,
                events,
            )?)
        })
    }

    /// Bridge entrypoint: execution of a transfer message reported `Fail`;
    /// the already credited funds stay here.
    #[instrument(skip(self, message), fields(chain_id = self.config.chain_id))]
    pub fn execute_message_with_transfer_fallback(
        &mut self,
        ctx: CallContext,
        src_chain_id: ChainId,
        sender: Address,
        message: Vec<u8>,
        transfer: TokenTransfer,
    ) -> NodeResult<ExecutionStatus> {
        let call = inbound(ctx, src_chain_id, sender, message);
        self.transact("execute_message_with_transfer_fallback", ctx, |state, _, events| {
            let LedgerState { adapter, facets } = state;
            Ok(adapter.execute_message_with_transfer_fallback(
                call,
                transfer,
                &mut facets.bank,
                events,
            )?)
        })
    }

    // =========================================================================
    // FEE HUB
    // =========================================================================

    fn hub_admin_tx(
        &mut self,
        op: &'static str,
        ctx: CallContext,
        call: impl FnOnce(&mut FeeHub, &mut EventBuffer) -> Result<(), fm_03_fee_hub::HubError>,
    ) -> NodeResult<()> {
        self.transact_as(op, ctx, Role::DeployerManager, |state, _, events| {
            Ok(call(&mut state.facets.hub, events)?)
        })
    }

    /// Register the relayer for a chain.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn add_relayer(&mut self, ctx: CallContext, chain_id: ChainId, relayer: Address) -> NodeResult<()> {
        self.hub_admin_tx("add_relayer", ctx, |h, e| h.add_relayer(chain_id, relayer, e))
    }

    /// Replace the relayer for a chain.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn update_relayer(&mut self, ctx: CallContext, chain_id: ChainId, relayer: Address) -> NodeResult<()> {
        self.hub_admin_tx("update_relayer", ctx, |h, e| h.update_relayer(chain_id, relayer, e))
    }

    /// Forget the relayer for a chain.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn remove_relayer(&mut self, ctx: CallContext, chain_id: ChainId) -> NodeResult<()> {
        self.hub_admin_tx("remove_relayer", ctx, |h, e| h.remove_relayer(chain_id, e))
    }

    /// Flat fee per deploy message.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn set_deploy_fee(&mut self, ctx: CallContext, amount: U256) -> NodeResult<()> {
        self.hub_admin_tx("set_deploy_fee", ctx, |h, e| {
            h.set_deploy_fee(amount, e);
            Ok(())
        })
    }

    /// Flat fee per remittance.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn set_send_fee(&mut self, ctx: CallContext, amount: U256) -> NodeResult<()> {
        self.hub_admin_tx("set_send_fee", ctx, |h, e| {
            h.set_send_fee(amount, e);
            Ok(())
        })
    }

    /// Minimum collected total for a remittance.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn set_send_threshold(&mut self, ctx: CallContext, amount: U256) -> NodeResult<()> {
        self.hub_admin_tx("set_send_threshold", ctx, |h, e| {
            h.set_send_threshold(amount, e);
            Ok(())
        })
    }

    /// Ship every queued delta batch. Permissionless; paid by `ctx.value`.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn deploy_fees_with_celer(&mut self, ctx: CallContext) -> NodeResult<DeployReceipt> {
        self.transact("deploy_fees_with_celer", ctx, |state, env, events| {
            let LedgerState { adapter, facets } = state;
            let chain_id = facets.chain_id;
            let ChainFacets {
                registry, hub, bank, ..
            } = facets;
            let registry = registry.as_mut().ok_or(NodeError::ComponentMissing {
                component: "fee registry",
                chain_id,
            })?;
            Ok(hub.deploy_fees_with_celer(ctx, registry, adapter, bank, env.bridge, events)?)
        })
    }

    /// Remit collected fees to `dst_chain_id`. Permissionless; paid by
    /// `ctx.value`.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn send_fees_with_celer(
        &mut self,
        ctx: CallContext,
        dst_chain_id: ChainId,
        bounty_receiver: Address,
    ) -> NodeResult<SendReceipt> {
        self.transact("send_fees_with_celer", ctx, |state, env, events| {
            let LedgerState { adapter, facets } = state;
            let chain_id = facets.chain_id;
            let ChainFacets { store, hub, bank, .. } = facets;
            let store = store.as_mut().ok_or(NodeError::ComponentMissing {
                component: "fee store",
                chain_id,
            })?;
            Ok(hub.send_fees_with_celer(
                ctx,
                dst_chain_id,
                bounty_receiver,
                store,
                adapter,
                bank,
                env.bridge,
                events,
            )?)
        })
    }

    // =========================================================================
    // FEE STORE
    // =========================================================================

    /// Deposit `amount` of the fee token under `id`. Permissionless.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn put_fees(&mut self, ctx: CallContext, id: FeeId, amount: U256) -> NodeResult<()> {
        self.transact("put_fees", ctx, |state, _, events| {
            let ChainFacets { store, bank, chain_id, .. } = &mut state.facets;
            let store = store.as_mut().ok_or(NodeError::ComponentMissing {
                component: "fee store",
                chain_id: *chain_id,
            })?;
            Ok(store.put_fees(ctx.caller, id, amount, bank, events)?)
        })
    }

    /// Drain the store's token balance to its operator.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn collect_fees_from_fee_store(&mut self, ctx: CallContext) -> NodeResult<U256> {
        self.transact_as("collect_fees_from_fee_store", ctx, Role::StoreManager, |state, _, events| {
            let ChainFacets { store, bank, chain_id, .. } = &mut state.facets;
            let store = store.as_mut().ok_or(NodeError::ComponentMissing {
                component: "fee store",
                chain_id: *chain_id,
            })?;
            Ok(store.collect_fees_from_fee_store(bank, events)?)
        })
    }

    /// Replace the store operator.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn set_store_operator(&mut self, ctx: CallContext, operator: Address) -> NodeResult<()> {
        self.transact_as("set_store_operator", ctx, Role::StoreManager, |state, _, events| {
            Ok(state.facets.store_mut()?.set_operator(operator, events)?)
        })
    }

    // =========================================================================
    // FEE DISTRIBUTOR
    // =========================================================================

    fn distributor_tx<T>(
        &mut self,
        op: &'static str,
        ctx: CallContext,
        call: impl FnOnce(
            &mut FeeDistributor,
            &mut dyn AssetLedger,
            &ConstantRateRouter,
            &mut EventBuffer,
        ) -> Result<T, fm_05_fee_distributor::DistributorError>,
    ) -> NodeResult<T> {
        self.transact_as(op, ctx, Role::DistributorManager, |state, env, events| {
            let chain_id = state.facets.chain_id;
            let ChainFacets {
                distributor, bank, ..
            } = &mut state.facets;
            let distributor = distributor.as_mut().ok_or(NodeError::ComponentMissing {
                component: "fee distributor",
                chain_id,
            })?;
            Ok(call(distributor, bank, env.router, events)?)
        })
    }

    /// Start paying out; drains buffered pushes.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn start_distribution(&mut self, ctx: CallContext) -> NodeResult<usize> {
        self.distributor_tx("start_distribution", ctx, |d, bank, router, e| d.start(bank, router, e))
    }

    /// Stop paying out; later pushes are buffered.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn stop_distribution(&mut self, ctx: CallContext) -> NodeResult<()> {
        self.distributor_tx("stop_distribution", ctx, |d, _, _, e| d.stop(e))
    }

    /// Register a payee.
    #[instrument(skip(self, swap_path), fields(chain_id = self.config.chain_id))]
    pub fn add_receiver(
        &mut self,
        ctx: CallContext,
        name: &str,
        points: u64,
        account: Address,
        swap_path: Vec<Address>,
    ) -> NodeResult<()> {
        self.distributor_tx("add_receiver", ctx, |d, _, router, e| {
            d.add_receiver(name, points, account, swap_path, router, e)
        })
    }

    /// Remove a payee.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn remove_receiver(&mut self, ctx: CallContext, name: &str) -> NodeResult<()> {
        self.distributor_tx("remove_receiver", ctx, |d, _, _, e| d.remove_receiver(name, e))
    }

    /// Bulk point update.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn update_receiver_shares(
        &mut self,
        ctx: CallContext,
        names: &[String],
        points: &[u64],
    ) -> NodeResult<()> {
        self.distributor_tx("update_receiver_shares", ctx, |d, _, _, e| {
            d.update_receiver_shares(names, points, e)
        })
    }

    /// Replace a payee's swap path.
    #[instrument(skip(self, swap_path), fields(chain_id = self.config.chain_id))]
    pub fn update_swap_path(
        &mut self,
        ctx: CallContext,
        name: &str,
        swap_path: Vec<Address>,
    ) -> NodeResult<()> {
        self.distributor_tx("update_swap_path", ctx, |d, _, router, e| {
            d.update_swap_path(name, swap_path, router, e)
        })
    }

    /// Bounty share and denomination.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn set_bounty_settings(&mut self, ctx: CallContext, share_bps: u64, in_token: bool) -> NodeResult<()> {
        self.distributor_tx("set_bounty_settings", ctx, |d, _, _, e| {
            d.set_bounty_settings(share_bps, in_token, e)
        })
    }

    /// Route from the fee token to wrapped native for native bounties.
    #[instrument(skip(self, swap_path), fields(chain_id = self.config.chain_id))]
    pub fn set_bounty_swap_path(&mut self, ctx: CallContext, swap_path: Vec<Address>) -> NodeResult<()> {
        self.distributor_tx("set_bounty_swap_path", ctx, |d, _, router, e| {
            d.set_bounty_swap_path(swap_path, router, e)
        })
    }

    /// Direct deposit for distribution. Tokens are pulled from the caller;
    /// native must be attached as value. The caller earns the bounty.
    #[instrument(skip(self), fields(chain_id = self.config.chain_id))]
    pub fn push_fees(&mut self, ctx: CallContext, asset: Asset, amount: U256) -> NodeResult<PushOutcome> {
        self.transact("push_fees", ctx, |state, env, events| {
            let chain_id = state.facets.chain_id;
            let ChainFacets {
                distributor, bank, ..
            } = &mut state.facets;
            let distributor = distributor.as_mut().ok_or(NodeError::ComponentMissing {
                component: "fee distributor",
                chain_id,
            })?;
            match asset {
                Asset::Native if ctx.value != amount => {
                    return Err(NodeError::ValueMismatch {
                        expected: amount,
                        attached: ctx.value,
                    })
                }
                Asset::Native => {}
                Asset::Token(_) => bank.transfer(asset, ctx.caller, env.contract, amount)?,
            }
            let payload = SendFeesPayload {
                total_fees: amount,
                bounty_receiver: ctx.caller,
                fees: Vec::new(),
            };
            Ok(distributor.push_fees(asset, amount, &payload, bank, env.router, events)?)
        })
    }
}

fn attach_value(facets: &mut ChainFacets, ctx: CallContext, contract: Address) -> NodeResult<()> {
    if !ctx.value.is_zero() {
        facets
            .bank
            .transfer(Asset::Native, ctx.caller, contract, ctx.value)?;
    }
    Ok(())
}

fn inbound(ctx: CallContext, src_chain_id: ChainId, sender: Address, message: Vec<u8>) -> InboundCall {
    InboundCall {
        caller: ctx.caller,
        value: ctx.value,
        src_chain_id,
        sender,
        message,
    }
}
