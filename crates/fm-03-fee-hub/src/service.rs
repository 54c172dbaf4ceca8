//! Fee Hub Service
//!
//! ## Deploy run
//!
//! ```text
//! queued chains ──none──→ QueueEmpty
//!      │
//! relayer per chain ──missing──→ AddressZero
//!      │
//! value ≥ deploy_fee × chains ──no──→ InsufficientFundsSent
//!      │
//! for each chain: drain queue → adapter.deploy_fees(budget)
//!      │                              └─short──→ InsufficientFundsForGas
//! refund what is left of the budget
//! ```

use crate::domain::{ChainDispatch, DeployReceipt, HubConfig, HubError, HubSettings, SendReceipt};
use crate::ports::inbound::FeeHubApi;
use fm_01_fee_registry::SyncQueueDriver;
use fm_02_relay_adapter::{BridgeClient, RelaySender};
use fm_04_fee_store::{FeeStore, FeeStoreApi};
use shared_bus::{EventBuffer, FeeEvent};
use shared_types::{Address, Asset, AssetLedger, CallContext, ChainId, FeeSyncDelta, U256};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Cross-chain fee hub of one chain.
#[derive(Clone, Debug)]
pub struct FeeHub {
    config: HubConfig,
    settings: HubSettings,
    /// chainId → remote relay adapter used for dispatch.
    relayers: BTreeMap<ChainId, Address>,
}

impl FeeHub {
    /// Create a hub with zero fees and no relayers.
    #[must_use]
    pub fn new(config: HubConfig) -> Self {
        Self {
            config,
            settings: HubSettings::default(),
            relayers: BTreeMap::new(),
        }
    }

    /// Static wiring.
    #[must_use]
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Current prices.
    #[must_use]
    pub fn settings(&self) -> &HubSettings {
        &self.settings
    }

    /// Relayer configured for a chain.
    #[must_use]
    pub fn relayer(&self, chain_id: ChainId) -> Option<Address> {
        self.relayers.get(&chain_id).copied()
    }

    /// All (chain, relayer) pairs, ascending by chain.
    #[must_use]
    pub fn relayers(&self) -> Vec<(ChainId, Address)> {
        self.relayers.iter().map(|(c, r)| (*c, *r)).collect()
    }

    fn refund(
        &self,
        to: Address,
        amount: U256,
        ledger: &mut dyn AssetLedger,
    ) -> Result<(), HubError> {
        if !amount.is_zero() {
            ledger.transfer(Asset::Native, self.config.contract, to, amount)?;
        }
        Ok(())
    }
}

impl FeeHubApi for FeeHub {
    fn add_relayer(
        &mut self,
        chain_id: ChainId,
        relayer: Address,
        events: &mut EventBuffer,
    ) -> Result<(), HubError> {
        if chain_id == 0 {
            return Err(HubError::ChainIdZero);
        }
        if relayer.is_zero() {
            return Err(HubError::AddressZero);
        }
        if self.relayers.contains_key(&chain_id) {
            return Err(HubError::ChainExisting(chain_id));
        }
        self.relayers.insert(chain_id, relayer);
        info!(chain_id, relayer = %relayer, "Relayer added");
        events.emit(FeeEvent::RelayerAdded { chain_id, relayer });
        Ok(())
    }

    fn update_relayer(
        &mut self,
        chain_id: ChainId,
        relayer: Address,
        events: &mut EventBuffer,
    ) -> Result<(), HubError> {
        if relayer.is_zero() {
            return Err(HubError::AddressZero);
        }
        let slot = self
            .relayers
            .get_mut(&chain_id)
            .ok_or(HubError::ChainNotExisting(chain_id))?;
        if *slot == relayer {
            return Err(HubError::RelayerExists(relayer));
        }
        *slot = relayer;
        info!(chain_id, relayer = %relayer, "Relayer updated");
        events.emit(FeeEvent::RelayerUpdated { chain_id, relayer });
        Ok(())
    }

    fn remove_relayer(
        &mut self,
        chain_id: ChainId,
        events: &mut EventBuffer,
    ) -> Result<(), HubError> {
        self.relayers
            .remove(&chain_id)
            .ok_or(HubError::ChainNotExisting(chain_id))?;
        info!(chain_id, "Relayer removed");
        events.emit(FeeEvent::RelayerRemoved { chain_id });
        Ok(())
    }

    fn set_deploy_fee(&mut self, amount: U256, events: &mut EventBuffer) {
        self.settings.deploy_fee = amount;
        events.emit(FeeEvent::DeployFeeSet { amount });
    }

    fn set_send_fee(&mut self, amount: U256, events: &mut EventBuffer) {
        self.settings.send_fee = amount;
        events.emit(FeeEvent::SendFeeSet { amount });
    }

    fn set_send_threshold(&mut self, amount: U256, events: &mut EventBuffer) {
        self.settings.send_threshold = amount;
        events.emit(FeeEvent::SendThresholdSet { amount });
    }

    fn deploy_fees_with_celer(
        &mut self,
        ctx: CallContext,
        registry: &mut dyn SyncQueueDriver,
        adapter: &mut dyn RelaySender,
        ledger: &mut dyn AssetLedger,
        bridge: &dyn BridgeClient,
        events: &mut EventBuffer,
    ) -> Result<DeployReceipt, HubError> {
        if !self.config.is_home() {
            return Err(HubError::NotAllowed(
                "fees are deployed from the home chain".to_string(),
            ));
        }

        let chains = registry.chains_with_queue();
        if chains.is_empty() {
            return Err(HubError::QueueEmpty);
        }

        let mut routes = Vec::with_capacity(chains.len());
        for chain_id in chains {
            let relayer = self
                .relayer(chain_id)
                .filter(|relayer| !relayer.is_zero())
                .ok_or(HubError::AddressZero)?;
            let target = registry.target_of(chain_id).ok_or(HubError::AddressZero)?;
            routes.push((chain_id, relayer, target));
        }

        let flat_fees = self
            .settings
            .deploy_fee
            .saturating_mul(U256::from(routes.len()));
        if ctx.value < flat_fees {
            return Err(HubError::InsufficientFundsSent {
                required: flat_fees,
                provided: ctx.value,
            });
        }

        let mut budget = ctx.value - flat_fees;
        let mut dispatches = Vec::with_capacity(routes.len());
        for (chain_id, relayer, target) in routes {
            let deltas = registry.take_for_dispatch(chain_id, events)?;
            let entries = deltas.len();
            let bridge_fee = adapter.deploy_fees(
                relayer, target, chain_id, deltas, budget, ledger, bridge, events,
            )?;
            budget -= bridge_fee;

            debug!(chain_id, entries, %bridge_fee, "Deploy message dispatched");
            events.emit(FeeEvent::FeesDeployed { chain_id, entries });
            dispatches.push(ChainDispatch {
                chain_id,
                entries,
                bridge_fee,
            });
        }

        self.refund(ctx.caller, budget, ledger)?;
        info!(
            chains = dispatches.len(),
            %flat_fees,
            refunded = %budget,
            "Fee deploy run complete"
        );
        Ok(DeployReceipt {
            dispatches,
            flat_fees,
            refunded: budget,
        })
    }

    fn deploy_fees_with_celer_confirm(
        &mut self,
        caller: Address,
        chain_id: ChainId,
        deltas: &[FeeSyncDelta],
        registry: &mut dyn SyncQueueDriver,
        events: &mut EventBuffer,
    ) -> Result<usize, HubError> {
        if caller != self.config.contract {
            return Err(HubError::NotAllowed(format!(
                "confirm from {caller}, expected the local adapter"
            )));
        }
        let synced = registry.confirm_deployed(chain_id, deltas, events);
        info!(chain_id, entries = deltas.len(), synced, "Deploy confirmed");
        events.emit(FeeEvent::DeployConfirmed {
            chain_id,
            entries: synced,
        });
        Ok(synced)
    }

    fn send_fees_with_celer(
        &mut self,
        ctx: CallContext,
        dst_chain_id: ChainId,
        bounty_receiver: Address,
        store: &mut FeeStore,
        adapter: &mut dyn RelaySender,
        ledger: &mut dyn AssetLedger,
        bridge: &dyn BridgeClient,
        events: &mut EventBuffer,
    ) -> Result<SendReceipt, HubError> {
        if self.config.is_home() {
            return Err(HubError::NotAllowed(
                "fees are remitted from target chains".to_string(),
            ));
        }

        let collected = store.collected_total();
        if collected < self.settings.send_threshold {
            return Err(HubError::ThresholdNotMet {
                collected,
                threshold: self.settings.send_threshold,
            });
        }
        if ctx.value < self.settings.send_fee {
            return Err(HubError::InsufficientFundsSent {
                required: self.settings.send_fee,
                provided: ctx.value,
            });
        }
        if bounty_receiver.is_zero() {
            return Err(HubError::AddressZero);
        }
        let target = self
            .relayer(dst_chain_id)
            .ok_or(HubError::ChainNotExisting(dst_chain_id))?;

        let payload = store.prepare_to_send_fees(bounty_receiver, events)?;
        let total_fees = payload.total_fees;
        let budget = ctx.value - self.settings.send_fee;
        let bridge_fee = adapter.send_fees(
            target,
            store.fee_token(),
            total_fees,
            dst_chain_id,
            payload,
            budget,
            ledger,
            bridge,
            events,
        )?;

        let refunded = budget - bridge_fee;
        self.refund(ctx.caller, refunded, ledger)?;

        info!(dst_chain_id, %total_fees, %bridge_fee, bounty_receiver = %bounty_receiver, "Fees sent home");
        events.emit(FeeEvent::FeesSent {
            dst_chain_id,
            total_fees,
            bounty_receiver,
        });
        Ok(SendReceipt {
            total_fees,
            bridge_fee,
            refunded,
        })
    }
}
