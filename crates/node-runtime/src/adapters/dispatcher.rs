//! # Local Facet Dispatcher
//!
//! Implements the relay adapter's `InboundDispatcher` port over the
//! components of one chain.
//!
//! | Inbound message | Component call |
//! |-----------------|----------------|
//! | `DEPLOY_FEES` | `FeeStore::sync_fees` |
//! | `DEPLOY_FEES_CONFIRM` | `FeeHub::deploy_fees_with_celer_confirm` (caller = contract) |
//! | `SEND_FEES` | `FeeDistributor::push_fees` |
//! | bridge refund | `FeeStore::restore_fees_from_send_fees` |
//!
//! Each call runs against a nested snapshot of the facets: on `Err` the
//! facets are restored, so a failed inner call leaves no trace while the
//! enclosing bridge transaction still commits with a `Fail` status.

use crate::container::ChainFacets;
use crate::errors::{NodeError, NodeResult};
use fm_02_relay_adapter::InboundDispatcher;
use fm_03_fee_hub::FeeHubApi;
use fm_04_fee_store::FeeStoreApi;
use fm_05_fee_distributor::{FeeDistributorApi, PushOutcome, SwapRouter};
use shared_bus::EventBuffer;
use shared_types::{Address, Asset, AssetLedger, ChainId, FeeSyncDelta, SendFeesPayload, U256};
use tracing::debug;

/// Dispatcher bound to one chain's facets for the duration of a call.
pub struct LocalFacets<'a> {
    facets: &'a mut ChainFacets,
    contract: Address,
    router: &'a dyn SwapRouter,
}

impl<'a> LocalFacets<'a> {
    /// Bind the dispatcher.
    pub fn new(facets: &'a mut ChainFacets, contract: Address, router: &'a dyn SwapRouter) -> Self {
        Self {
            facets,
            contract,
            router,
        }
    }

    fn guarded<T>(
        &mut self,
        call: impl FnOnce(&mut ChainFacets, Address, &dyn SwapRouter) -> NodeResult<T>,
    ) -> NodeResult<T> {
        let snapshot = self.facets.clone();
        let result = call(self.facets, self.contract, self.router);
        if result.is_err() {
            *self.facets = snapshot;
        }
        result
    }
}

impl InboundDispatcher for LocalFacets<'_> {
    type Error = NodeError;

    fn ledger(&mut self) -> &mut dyn AssetLedger {
        &mut self.facets.bank
    }

    fn sync_fees(&mut self, deltas: &[FeeSyncDelta], events: &mut EventBuffer) -> NodeResult<()> {
        self.guarded(|facets, _, _| {
            facets.store_mut()?.sync_fees(deltas, events)?;
            Ok(())
        })
    }

    fn confirm_deploy(
        &mut self,
        src_chain_id: ChainId,
        deltas: &[FeeSyncDelta],
        events: &mut EventBuffer,
    ) -> NodeResult<()> {
        self.guarded(|facets, contract, _| {
            let chain_id = facets.chain_id;
            let ChainFacets { registry, hub, .. } = facets;
            let registry = registry.as_mut().ok_or(NodeError::ComponentMissing {
                component: "fee registry",
                chain_id,
            })?;
            hub.deploy_fees_with_celer_confirm(contract, src_chain_id, deltas, registry, events)?;
            Ok(())
        })
    }

    fn push_fees(
        &mut self,
        asset: Asset,
        amount: U256,
        payload: &SendFeesPayload,
        events: &mut EventBuffer,
    ) -> NodeResult<()> {
        self.guarded(|facets, _, router| {
            let chain_id = facets.chain_id;
            let ChainFacets {
                distributor, bank, ..
            } = facets;
            let distributor = distributor.as_mut().ok_or(NodeError::ComponentMissing {
                component: "fee distributor",
                chain_id,
            })?;
            let outcome = distributor.push_fees(asset, amount, payload, bank, router, events)?;
            if let PushOutcome::Queued { queued } = outcome {
                debug!(queued, "Remittance buffered while distribution is stopped");
            }
            Ok(())
        })
    }

    fn restore_fees(
        &mut self,
        payload: &SendFeesPayload,
        asset: Asset,
        refunded: U256,
        events: &mut EventBuffer,
    ) -> NodeResult<()> {
        self.guarded(|facets, _, _| {
            let ChainFacets { store, bank, chain_id, .. } = facets;
            let store = store.as_mut().ok_or(NodeError::ComponentMissing {
                component: "fee store",
                chain_id: *chain_id,
            })?;
            if asset != store.fee_token() {
                return Err(NodeError::AssetRejected(format!(
                    "refund in {asset}, store collects {}",
                    store.fee_token()
                )));
            }
            store.restore_fees_from_send_fees(payload, refunded, bank, events)?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ConstantRateRouter;
    use crate::container::{ChainConfig, LedgerState};
    use shared_bus::FeeEvent;
    use shared_types::{FeeAmount, FeeId, SyncAction};

    fn target() -> (LedgerState, ChainConfig) {
        let config = ChainConfig::with_defaults(2);
        (LedgerState::deploy(&config, 1), config)
    }

    fn add(id: &str, fee_bps: u64) -> FeeSyncDelta {
        FeeSyncDelta {
            id: FeeId::from_label(id),
            fee_bps,
            target: Address::repeat_byte(0x11),
            action: SyncAction::Add,
            sequence: 1,
        }
    }

    #[test]
    fn test_sync_reaches_store() {
        let (mut state, config) = target();
        let router = ConstantRateRouter::new();
        let mut events = EventBuffer::new();
        let mut dispatcher = LocalFacets::new(&mut state.facets, config.contract, &router);

        dispatcher.sync_fees(&[add("a", 100)], &mut events).unwrap();

        let store = state.facets.store.as_ref().unwrap();
        assert!(store.entry(FeeId::from_label("a")).is_some());
        assert!(!events.is_empty());
    }

    #[test]
    fn test_failed_inner_call_restores_facets() {
        let (mut state, config) = target();
        let router = ConstantRateRouter::new();
        let mut events = EventBuffer::new();
        let mut dispatcher = LocalFacets::new(&mut state.facets, config.contract, &router);

        // second delta is invalid, the first must not survive
        let result = dispatcher.sync_fees(&[add("a", 100), add("b", 0)], &mut events);

        assert!(result.is_err());
        let store = state.facets.store.as_ref().unwrap();
        assert!(store.entry(FeeId::from_label("a")).is_none());
    }

    #[test]
    fn test_confirm_without_registry_is_component_missing() {
        let (mut state, config) = target();
        let router = ConstantRateRouter::new();
        let mut events = EventBuffer::new();
        let mut dispatcher = LocalFacets::new(&mut state.facets, config.contract, &router);

        let result = dispatcher.confirm_deploy(1, &[add("a", 100)], &mut events);
        assert_eq!(
            result,
            Err(NodeError::ComponentMissing {
                component: "fee registry",
                chain_id: 2
            })
        );
    }

    #[test]
    fn test_restore_rejects_foreign_asset() {
        let (mut state, config) = target();
        let router = ConstantRateRouter::new();
        let mut events = EventBuffer::new();
        let mut dispatcher = LocalFacets::new(&mut state.facets, config.contract, &router);
        let payload = SendFeesPayload {
            total_fees: U256::from(5u64),
            bounty_receiver: Address::repeat_byte(0x99),
            fees: vec![FeeAmount {
                id: FeeId::from_label("a"),
                amount: U256::from(5u64),
            }],
        };

        let result = dispatcher.restore_fees(&payload, Asset::Native, U256::from(5u64), &mut events);

        assert!(matches!(result, Err(NodeError::AssetRejected(_))));
        assert!(!events
            .events()
            .iter()
            .any(|e| matches!(e, FeeEvent::FeesRestored { .. })));
    }
}
