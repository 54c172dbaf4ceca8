//! # Ledger State
//!
//! Everything one chain persists, as plain owned values. Cloning a
//! `LedgerState` is how a transaction snapshots the chain.
//!
//! ## Deployment per chain
//!
//! | Component | Home | Target |
//! |-----------|------|--------|
//! | Fee Registry | yes | - |
//! | Relay Adapter | yes | yes |
//! | Fee Hub | yes | yes |
//! | Fee Store | - | yes |
//! | Fee Distributor | yes | - |

use crate::container::config::ChainConfig;
use crate::container::roles::RoleTable;
use crate::errors::NodeError;
use fm_01_fee_registry::FeeRegistry;
use fm_02_relay_adapter::{AdapterConfig, RelayAdapter};
use fm_03_fee_hub::{FeeHub, HubConfig};
use fm_04_fee_store::FeeStore;
use fm_05_fee_distributor::{DistributorConfig, FeeDistributor};
use shared_types::{Asset, ChainId, InMemoryLedger};

/// Components reachable from the relay adapter's inbound dispatch, plus the
/// bank and role table they share.
#[derive(Debug, Clone)]
pub struct ChainFacets {
    /// Chain this state belongs to.
    pub chain_id: ChainId,
    /// Authoritative fee registry (home only).
    pub registry: Option<FeeRegistry>,
    /// Deploy and remittance orchestration.
    pub hub: FeeHub,
    /// Fee mirror and revenue accumulator (targets only).
    pub store: Option<FeeStore>,
    /// Revenue payout (home only).
    pub distributor: Option<FeeDistributor>,
    /// Asset balances of every account on this chain.
    pub bank: InMemoryLedger,
    /// Local access control.
    pub roles: RoleTable,
}

impl ChainFacets {
    /// Registry, or `ComponentMissing`.
    pub fn registry_mut(&mut self) -> Result<&mut FeeRegistry, NodeError> {
        let chain_id = self.chain_id;
        self.registry.as_mut().ok_or(NodeError::ComponentMissing {
            component: "fee registry",
            chain_id,
        })
    }

    /// Store, or `ComponentMissing`.
    pub fn store_mut(&mut self) -> Result<&mut FeeStore, NodeError> {
        let chain_id = self.chain_id;
        self.store.as_mut().ok_or(NodeError::ComponentMissing {
            component: "fee store",
            chain_id,
        })
    }

    /// Distributor, or `ComponentMissing`.
    pub fn distributor_mut(&mut self) -> Result<&mut FeeDistributor, NodeError> {
        let chain_id = self.chain_id;
        self.distributor.as_mut().ok_or(NodeError::ComponentMissing {
            component: "fee distributor",
            chain_id,
        })
    }
}

/// Full persistent state of one chain.
#[derive(Debug, Clone)]
pub struct LedgerState {
    /// Bridge endpoint; owns the outbox of the running transaction.
    pub adapter: RelayAdapter,
    /// Everything else.
    pub facets: ChainFacets,
}

impl LedgerState {
    /// Fresh deployment for `config`.
    #[must_use]
    pub fn deploy(config: &ChainConfig, home_chain_id: ChainId) -> Self {
        let is_home = config.chain_id == home_chain_id;

        let bank = match config.wrapped_native {
            Some(wrapper) => InMemoryLedger::with_native_wrapper(wrapper),
            None => InMemoryLedger::new(),
        };

        let adapter = RelayAdapter::new(AdapterConfig {
            chain_id: config.chain_id,
            home_chain_id,
            contract: config.contract,
            bridge: config.bridge,
        });

        let hub = FeeHub::new(HubConfig {
            chain_id: config.chain_id,
            home_chain_id,
            contract: config.contract,
        });

        let (registry, store, distributor) = if is_home {
            (
                Some(FeeRegistry::new()),
                None,
                Some(FeeDistributor::new(DistributorConfig {
                    contract: config.contract,
                    fee_token: config.fee_token,
                    wrapped_native: config.wrapped_native,
                })),
            )
        } else {
            (
                None,
                Some(FeeStore::new(
                    config.contract,
                    Asset::Token(config.fee_token),
                    config.operator,
                )),
                None,
            )
        };

        Self {
            adapter,
            facets: ChainFacets {
                chain_id: config.chain_id,
                registry,
                hub,
                store,
                distributor,
                bank,
                roles: RoleTable::with_admin(config.deployer),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_and_target_layout() {
        let home = LedgerState::deploy(&ChainConfig::with_defaults(1), 1);
        assert!(home.facets.registry.is_some());
        assert!(home.facets.distributor.is_some());
        assert!(home.facets.store.is_none());
        assert!(home.adapter.is_home());

        let mut target = LedgerState::deploy(&ChainConfig::with_defaults(2), 1);
        assert!(target.facets.store.is_some());
        assert!(!target.adapter.is_home());
        assert_eq!(
            target.facets.registry_mut().err(),
            Some(NodeError::ComponentMissing {
                component: "fee registry",
                chain_id: 2
            })
        );
    }
}
