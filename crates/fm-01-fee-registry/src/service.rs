//! Fee Registry Service - authoritative state machine
//!
//! ```text
//! [Unassigned] ──assign──→ [Queued] ──dispatch──→ [Pending] ──confirm──→ [Synced]
//!                              ↑                       │                     │
//!                              └────── update ─────────┴─────────────────────┘
//! ```
//!
//! Every dispatched delta carries a sequence number. A pair leaves `Pending`
//! only once each sequence dispatched for it has been confirmed.

use crate::domain::{
    validate_fee_bps, ChainEntry, FeeConfig, RegistryError, SyncQueueEntry,
};
use crate::ports::inbound::{FeeRegistryApi, SyncQueueDriver};
use shared_bus::{EventBuffer, FeeEvent};
use shared_types::{
    Address, ChainId, DeployState, FeeCurrency, FeeId, FeeSyncDelta, FeeType, SyncAction,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Home-chain fee registry.
///
/// Only assigned pairs have a row in `deploy_states`; a missing row reads as
/// [`DeployState::Unassigned`].
#[derive(Clone, Debug, Default)]
pub struct FeeRegistry {
    chains: BTreeMap<ChainId, ChainEntry>,
    configs: BTreeMap<FeeId, FeeConfig>,
    /// Insertion order of `configs`.
    config_order: Vec<FeeId>,
    deploy_states: BTreeMap<(FeeId, ChainId), DeployState>,
    queues: BTreeMap<ChainId, Vec<SyncQueueEntry>>,
    /// Last sequence handed out; never reused.
    dispatch_seq: u64,
    /// Dispatched but unconfirmed sequences per assigned pair.
    in_flight: BTreeMap<(FeeId, ChainId), BTreeSet<u64>>,
}

impl FeeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // READ ACCESSORS
    // =========================================================================

    /// Registered chain ids, ascending.
    #[must_use]
    pub fn chain_ids(&self) -> Vec<ChainId> {
        self.chains.keys().copied().collect()
    }

    /// Chain entry, if registered.
    #[must_use]
    pub fn chain(&self, chain_id: ChainId) -> Option<&ChainEntry> {
        self.chains.get(&chain_id)
    }

    /// Fee config ids in creation order.
    #[must_use]
    pub fn fee_config_ids(&self) -> &[FeeId] {
        &self.config_order
    }

    /// Fee config, if present.
    #[must_use]
    pub fn fee_config(&self, id: FeeId) -> Option<&FeeConfig> {
        self.configs.get(&id)
    }

    /// Queued entries for a chain, oldest first.
    #[must_use]
    pub fn queue(&self, chain_id: ChainId) -> &[SyncQueueEntry] {
        self.queues.get(&chain_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Deploy state of one pair.
    #[must_use]
    pub fn deploy_state(&self, id: FeeId, chain_id: ChainId) -> DeployState {
        self.deploy_states
            .get(&(id, chain_id))
            .copied()
            .unwrap_or_default()
    }

    /// Dispatched sequences still awaiting a confirm, ascending.
    #[must_use]
    pub fn unconfirmed(&self, id: FeeId, chain_id: ChainId) -> Vec<u64> {
        self.in_flight
            .get(&(id, chain_id))
            .map(|pending| pending.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Chains a config is assigned to.
    #[must_use]
    pub fn assigned_chains(&self, id: FeeId) -> Vec<ChainId> {
        self.deploy_states
            .range((id, ChainId::MIN)..=(id, ChainId::MAX))
            .map(|((_, chain_id), _)| *chain_id)
            .collect()
    }

    /// Configs assigned to a chain.
    #[must_use]
    pub fn assigned_configs(&self, chain_id: ChainId) -> Vec<FeeId> {
        self.deploy_states
            .keys()
            .filter(|(_, chain)| *chain == chain_id)
            .map(|(id, _)| *id)
            .collect()
    }

    // =========================================================================
    // INTERNAL HELPERS
    // =========================================================================

    fn require_chain(&self, chain_id: ChainId) -> Result<&ChainEntry, RegistryError> {
        self.chains
            .get(&chain_id)
            .ok_or(RegistryError::ChainIdNotExisting(chain_id))
    }

    fn require_config(&self, id: FeeId) -> Result<&FeeConfig, RegistryError> {
        self.configs
            .get(&id)
            .ok_or(RegistryError::ConfigNotExisting(id))
    }

    fn set_state(
        &mut self,
        id: FeeId,
        chain_id: ChainId,
        to: DeployState,
        events: &mut EventBuffer,
    ) {
        let from = self.deploy_state(id, chain_id);
        if from == to {
            return;
        }
        if to == DeployState::Unassigned {
            self.deploy_states.remove(&(id, chain_id));
            self.in_flight.remove(&(id, chain_id));
        } else {
            self.deploy_states.insert((id, chain_id), to);
        }
        events.emit(FeeEvent::DeployStateChanged {
            id,
            chain_id,
            from,
            to,
        });
    }

    /// Queue a change, folding it into any entry already waiting for the
    /// same pair so the queue holds at most one entry per (id, chain).
    fn enqueue(
        &mut self,
        id: FeeId,
        chain_id: ChainId,
        action: SyncAction,
        events: &mut EventBuffer,
    ) {
        let queue = self.queues.entry(chain_id).or_default();
        let existing = queue
            .iter()
            .position(|entry| entry.id == id)
            .map(|index| (index, queue[index].action));

        match (existing, action) {
            (None, _) => {
                queue.push(SyncQueueEntry {
                    id,
                    chain_id,
                    action,
                });
                events.emit(FeeEvent::QueueEntryAdded {
                    id,
                    chain_id,
                    action,
                });
            }
            // A waiting Add or Update is materialised from the current config
            // at dispatch time, so it already carries the newer values.
            (Some((_, SyncAction::Add | SyncAction::Update)), SyncAction::Add | SyncAction::Update) => {}
            (Some((_, SyncAction::Delete)), SyncAction::Delete) => {}
            // The target never saw the Add.
            (Some((index, SyncAction::Add)), SyncAction::Delete) => {
                queue.remove(index);
                events.emit(FeeEvent::QueueEntryDropped {
                    id,
                    chain_id,
                    action: SyncAction::Add,
                });
            }
            (Some((index, previous)), replacement) => {
                // Update -> Delete, or a re-assignment over a waiting Delete
                // which the target still holds: send an Update instead.
                let replacement = if previous == SyncAction::Delete {
                    SyncAction::Update
                } else {
                    replacement
                };
                queue[index].action = replacement;
                events.emit(FeeEvent::QueueEntryDropped {
                    id,
                    chain_id,
                    action: previous,
                });
                events.emit(FeeEvent::QueueEntryAdded {
                    id,
                    chain_id,
                    action: replacement,
                });
            }
        }

        if queue.is_empty() {
            self.queues.remove(&chain_id);
        }
    }

    fn build_delta(&self, entry: &SyncQueueEntry, sequence: u64) -> Option<FeeSyncDelta> {
        match entry.action {
            SyncAction::Delete => Some(FeeSyncDelta {
                id: entry.id,
                fee_bps: 0,
                target: Address::ZERO,
                action: SyncAction::Delete,
                sequence,
            }),
            action => self.configs.get(&entry.id).map(|config| FeeSyncDelta {
                id: entry.id,
                fee_bps: config.fee_bps,
                target: config.receiver,
                action,
                sequence,
            }),
        }
    }

    /// Drop one confirmed sequence. True when it was the last one in flight
    /// for the pair.
    fn settle(&mut self, id: FeeId, chain_id: ChainId, sequence: u64) -> Option<bool> {
        let pending = self.in_flight.get_mut(&(id, chain_id))?;
        if !pending.remove(&sequence) {
            return None;
        }
        let drained = pending.is_empty();
        if drained {
            self.in_flight.remove(&(id, chain_id));
        }
        Some(drained)
    }
}

// =============================================================================
// ADMIN API
// =============================================================================

impl FeeRegistryApi for FeeRegistry {
    fn add_chain(
        &mut self,
        chain_id: ChainId,
        target: Address,
        events: &mut EventBuffer,
    ) -> Result<(), RegistryError> {
        if chain_id == 0 {
            return Err(RegistryError::ChainIdZero);
        }
        if target.is_zero() {
            return Err(RegistryError::AddressZero);
        }
        if self.chains.contains_key(&chain_id) {
            return Err(RegistryError::ChainIdExists(chain_id));
        }

        self.chains.insert(chain_id, ChainEntry { chain_id, target });
        info!(chain_id, target = %target, "Chain added");
        events.emit(FeeEvent::ChainAdded { chain_id, target });
        Ok(())
    }

    fn remove_chain(
        &mut self,
        chain_id: ChainId,
        events: &mut EventBuffer,
    ) -> Result<(), RegistryError> {
        self.require_chain(chain_id)?;
        let count = self.assigned_configs(chain_id).len();
        if count > 0 {
            return Err(RegistryError::ConfigsAssignedToChain { chain_id, count });
        }

        if let Some(queue) = self.queues.remove(&chain_id) {
            events.emit(FeeEvent::QueueCleared {
                chain_id,
                entries: queue.len(),
            });
        }
        self.chains.remove(&chain_id);
        info!(chain_id, "Chain removed");
        events.emit(FeeEvent::ChainRemoved { chain_id });
        Ok(())
    }

    fn add_fee_config(
        &mut self,
        id: FeeId,
        fee_bps: u64,
        receiver: Address,
        currency: FeeCurrency,
        fee_type: FeeType,
        events: &mut EventBuffer,
    ) -> Result<(), RegistryError> {
        if id.is_zero() {
            return Err(RegistryError::ConfigIdZero);
        }
        if self.configs.contains_key(&id) {
            return Err(RegistryError::ConfigExists(id));
        }
        validate_fee_bps(fee_bps)?;
        if receiver.is_zero() {
            return Err(RegistryError::AddressZero);
        }

        self.configs.insert(
            id,
            FeeConfig {
                id,
                fee_bps,
                receiver,
                currency,
                fee_type,
                history: Vec::new(),
            },
        );
        self.config_order.push(id);
        info!(fee_id = %id, fee_bps, "Fee config added");
        events.emit(FeeEvent::FeeConfigAdded {
            id,
            fee_bps,
            receiver,
            currency,
            fee_type,
        });
        Ok(())
    }

    fn update_fee_config(
        &mut self,
        id: FeeId,
        fee_bps: u64,
        receiver: Address,
        events: &mut EventBuffer,
    ) -> Result<(), RegistryError> {
        self.require_config(id)?;
        validate_fee_bps(fee_bps)?;
        if receiver.is_zero() {
            return Err(RegistryError::AddressZero);
        }

        if let Some(config) = self.configs.get_mut(&id) {
            config.revise(fee_bps, receiver);
        }
        events.emit(FeeEvent::FeeConfigUpdated {
            id,
            fee_bps,
            receiver,
        });

        let chains = self.assigned_chains(id);
        for chain_id in &chains {
            self.set_state(id, *chain_id, DeployState::Queued, events);
            self.enqueue(id, *chain_id, SyncAction::Update, events);
        }
        info!(fee_id = %id, fee_bps, requeued = chains.len(), "Fee config updated");
        Ok(())
    }

    fn remove_fee_config(
        &mut self,
        id: FeeId,
        events: &mut EventBuffer,
    ) -> Result<(), RegistryError> {
        self.require_config(id)?;
        let chains = self.assigned_chains(id).len();
        if chains > 0 {
            return Err(RegistryError::ConfigInUse { id, chains });
        }

        self.configs.remove(&id);
        self.config_order.retain(|existing| *existing != id);
        info!(fee_id = %id, "Fee config removed");
        events.emit(FeeEvent::FeeConfigRemoved { id });
        Ok(())
    }

    fn assign(
        &mut self,
        id: FeeId,
        chain_id: ChainId,
        events: &mut EventBuffer,
    ) -> Result<(), RegistryError> {
        self.require_config(id)?;
        self.require_chain(chain_id)?;
        if self.deploy_state(id, chain_id) != DeployState::Unassigned {
            return Err(RegistryError::ConfigAlreadyAssignedToChain { id, chain_id });
        }

        events.emit(FeeEvent::ConfigAssigned { id, chain_id });
        self.set_state(id, chain_id, DeployState::Queued, events);
        self.enqueue(id, chain_id, SyncAction::Add, events);
        debug!(fee_id = %id, chain_id, "Config assigned");
        Ok(())
    }

    fn unassign(
        &mut self,
        id: FeeId,
        chain_id: ChainId,
        events: &mut EventBuffer,
    ) -> Result<(), RegistryError> {
        self.require_config(id)?;
        self.require_chain(chain_id)?;
        if self.deploy_state(id, chain_id) == DeployState::Unassigned {
            return Err(RegistryError::ConfigNotAssignedToChain { id, chain_id });
        }

        events.emit(FeeEvent::ConfigUnassigned { id, chain_id });
        self.set_state(id, chain_id, DeployState::Unassigned, events);
        self.enqueue(id, chain_id, SyncAction::Delete, events);
        debug!(fee_id = %id, chain_id, "Config unassigned");
        Ok(())
    }

    fn assign_all(&mut self, id: FeeId, events: &mut EventBuffer) -> Result<usize, RegistryError> {
        self.require_config(id)?;
        let targets: Vec<ChainId> = self
            .chains
            .keys()
            .copied()
            .filter(|chain_id| self.deploy_state(id, *chain_id) == DeployState::Unassigned)
            .collect();

        for chain_id in &targets {
            self.assign(id, *chain_id, events)?;
        }
        Ok(targets.len())
    }

    fn unassign_all(
        &mut self,
        id: FeeId,
        events: &mut EventBuffer,
    ) -> Result<usize, RegistryError> {
        self.require_config(id)?;
        let targets = self.assigned_chains(id);
        for chain_id in &targets {
            self.unassign(id, *chain_id, events)?;
        }
        Ok(targets.len())
    }

    fn queue_up_manually(
        &mut self,
        id: FeeId,
        chain_id: ChainId,
        action: SyncAction,
        events: &mut EventBuffer,
    ) -> Result<(), RegistryError> {
        self.require_chain(chain_id)?;
        let assigned = self.deploy_state(id, chain_id) != DeployState::Unassigned;
        if action == SyncAction::Delete {
            // Assigned pairs leave the target through `unassign`.
            if assigned {
                return Err(RegistryError::ConfigAlreadyAssignedToChain { id, chain_id });
            }
        } else {
            self.require_config(id)?;
            if !assigned {
                return Err(RegistryError::ConfigNotAssignedToChain { id, chain_id });
            }
            self.set_state(id, chain_id, DeployState::Queued, events);
        }

        self.enqueue(id, chain_id, action, events);
        warn!(fee_id = %id, chain_id, ?action, "Sync entry queued manually");
        Ok(())
    }

    fn clear_queue(
        &mut self,
        chain_id: ChainId,
        events: &mut EventBuffer,
    ) -> Result<usize, RegistryError> {
        self.require_chain(chain_id)?;
        let entries = self.queues.remove(&chain_id).map_or(0, |queue| queue.len());
        events.emit(FeeEvent::QueueCleared { chain_id, entries });
        warn!(chain_id, entries, "Sync queue cleared");
        Ok(entries)
    }
}

// =============================================================================
// HUB DRIVER
// =============================================================================

impl SyncQueueDriver for FeeRegistry {
    fn chains_with_queue(&self) -> Vec<ChainId> {
        self.queues
            .iter()
            .filter(|(_, queue)| !queue.is_empty())
            .map(|(chain_id, _)| *chain_id)
            .collect()
    }

    fn target_of(&self, chain_id: ChainId) -> Option<Address> {
        self.chain(chain_id).map(|entry| entry.target)
    }

    fn take_for_dispatch(
        &mut self,
        chain_id: ChainId,
        events: &mut EventBuffer,
    ) -> Result<Vec<FeeSyncDelta>, RegistryError> {
        self.require_chain(chain_id)?;
        let queue = self.queues.remove(&chain_id).unwrap_or_default();

        let mut deltas = Vec::with_capacity(queue.len());
        for entry in &queue {
            let sequence = self.dispatch_seq + 1;
            let Some(delta) = self.build_delta(entry, sequence) else {
                warn!(fee_id = %entry.id, chain_id, "Queued config vanished, skipping");
                continue;
            };
            self.dispatch_seq = sequence;
            if delta.action != SyncAction::Delete
                && self.deploy_state(entry.id, chain_id) == DeployState::Queued
            {
                self.in_flight
                    .entry((entry.id, chain_id))
                    .or_default()
                    .insert(sequence);
                self.set_state(entry.id, chain_id, DeployState::Pending, events);
            }
            deltas.push(delta);
        }

        debug!(chain_id, entries = deltas.len(), "Sync queue drained for dispatch");
        Ok(deltas)
    }

    fn confirm_deployed(
        &mut self,
        chain_id: ChainId,
        deltas: &[FeeSyncDelta],
        events: &mut EventBuffer,
    ) -> usize {
        let mut synced = 0;
        for delta in deltas {
            if delta.action == SyncAction::Delete {
                continue;
            }
            // Unknown sequences are duplicates or belong to a retired
            // assignment.
            let Some(drained) = self.settle(delta.id, chain_id, delta.sequence) else {
                debug!(fee_id = %delta.id, chain_id, sequence = delta.sequence, "Confirm ignored");
                continue;
            };
            // Queued means a newer revision is already waiting.
            if drained && self.deploy_state(delta.id, chain_id) == DeployState::Pending {
                self.set_state(delta.id, chain_id, DeployState::Synced, events);
                synced += 1;
            }
        }
        debug!(chain_id, synced, "Deploy confirmation applied");
        synced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN_B: ChainId = 2;
    const CHAIN_C: ChainId = 3;

    fn fee_a() -> FeeId {
        FeeId::from_label("fee-a")
    }

    fn receiver() -> Address {
        Address::repeat_byte(0x11)
    }

    fn registry_with_chains() -> (FeeRegistry, EventBuffer) {
        let mut registry = FeeRegistry::new();
        let mut events = EventBuffer::new();
        registry
            .add_chain(CHAIN_B, Address::repeat_byte(0xb0), &mut events)
            .unwrap();
        registry
            .add_chain(CHAIN_C, Address::repeat_byte(0xc0), &mut events)
            .unwrap();
        registry
            .add_fee_config(
                fee_a(),
                100,
                receiver(),
                FeeCurrency::Native,
                FeeType::Default,
                &mut events,
            )
            .unwrap();
        (registry, events)
    }

    #[test]
    fn test_add_chain_validation() {
        let mut registry = FeeRegistry::new();
        let mut events = EventBuffer::new();
        assert_eq!(
            registry.add_chain(0, Address::repeat_byte(1), &mut events),
            Err(RegistryError::ChainIdZero)
        );
        assert_eq!(
            registry.add_chain(2, Address::ZERO, &mut events),
            Err(RegistryError::AddressZero)
        );
        registry.add_chain(2, Address::repeat_byte(1), &mut events).unwrap();
        assert_eq!(
            registry.add_chain(2, Address::repeat_byte(1), &mut events),
            Err(RegistryError::ChainIdExists(2))
        );
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_add_fee_config_validation() {
        let (mut registry, mut events) = registry_with_chains();
        let add = |registry: &mut FeeRegistry, id, fee, receiver, events: &mut EventBuffer| {
            registry.add_fee_config(id, fee, receiver, FeeCurrency::Token, FeeType::From, events)
        };
        let id = FeeId::from_label("other");
        assert_eq!(
            add(&mut registry, FeeId::ZERO, 10, receiver(), &mut events),
            Err(RegistryError::ConfigIdZero)
        );
        assert_eq!(
            add(&mut registry, fee_a(), 10, receiver(), &mut events),
            Err(RegistryError::ConfigExists(fee_a()))
        );
        assert_eq!(
            add(&mut registry, id, 0, receiver(), &mut events),
            Err(RegistryError::FeeZero)
        );
        assert_eq!(
            add(&mut registry, id, 10_001, receiver(), &mut events),
            Err(RegistryError::FeeTooHigh { fee_bps: 10_001 })
        );
        assert_eq!(
            add(&mut registry, id, 10, Address::ZERO, &mut events),
            Err(RegistryError::AddressZero)
        );
        assert!(add(&mut registry, id, 10, receiver(), &mut events).is_ok());
        assert_eq!(registry.fee_config_ids(), &[fee_a(), id]);
    }

    #[test]
    fn test_assign_queues_add() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();

        assert_eq!(
            registry.queue(CHAIN_B),
            &[SyncQueueEntry {
                id: fee_a(),
                chain_id: CHAIN_B,
                action: SyncAction::Add
            }]
        );
        assert_eq!(registry.deploy_state(fee_a(), CHAIN_B), DeployState::Queued);
        assert_eq!(registry.deploy_state(fee_a(), CHAIN_C), DeployState::Unassigned);
    }

    #[test]
    fn test_assign_twice_rejected() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();
        assert_eq!(
            registry.assign(fee_a(), CHAIN_B, &mut events),
            Err(RegistryError::ConfigAlreadyAssignedToChain {
                id: fee_a(),
                chain_id: CHAIN_B
            })
        );
    }

    #[test]
    fn test_assign_unknown_chain_or_config() {
        let (mut registry, mut events) = registry_with_chains();
        assert_eq!(
            registry.assign(fee_a(), 99, &mut events),
            Err(RegistryError::ChainIdNotExisting(99))
        );
        let missing = FeeId::from_label("missing");
        assert_eq!(
            registry.assign(missing, CHAIN_B, &mut events),
            Err(RegistryError::ConfigNotExisting(missing))
        );
    }

    #[test]
    fn test_full_lifecycle_reaches_synced() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();

        let deltas = registry.take_for_dispatch(CHAIN_B, &mut events).unwrap();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].fee_bps, 100);
        assert_eq!(deltas[0].target, receiver());
        assert!(registry.queue(CHAIN_B).is_empty());
        assert_eq!(registry.deploy_state(fee_a(), CHAIN_B), DeployState::Pending);

        assert_eq!(registry.confirm_deployed(CHAIN_B, &deltas, &mut events), 1);
        assert_eq!(registry.deploy_state(fee_a(), CHAIN_B), DeployState::Synced);
    }

    #[test]
    fn test_duplicate_confirm_is_noop() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();
        let deltas = registry.take_for_dispatch(CHAIN_B, &mut events).unwrap();
        registry.confirm_deployed(CHAIN_B, &deltas, &mut events);

        let before = events.len();
        assert_eq!(registry.confirm_deployed(CHAIN_B, &deltas, &mut events), 0);
        assert_eq!(events.len(), before);
        assert_eq!(registry.deploy_state(fee_a(), CHAIN_B), DeployState::Synced);
    }

    #[test]
    fn test_stale_confirm_keeps_newer_revision_queued() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();
        let deltas = registry.take_for_dispatch(CHAIN_B, &mut events).unwrap();
        registry
            .update_fee_config(fee_a(), 200, receiver(), &mut events)
            .unwrap();

        assert_eq!(registry.confirm_deployed(CHAIN_B, &deltas, &mut events), 0);
        assert_eq!(registry.deploy_state(fee_a(), CHAIN_B), DeployState::Queued);
        assert!(registry.unconfirmed(fee_a(), CHAIN_B).is_empty());
    }

    #[test]
    fn test_stale_confirm_keeps_newer_dispatch_pending() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();
        let first = registry.take_for_dispatch(CHAIN_B, &mut events).unwrap();
        registry
            .update_fee_config(fee_a(), 200, receiver(), &mut events)
            .unwrap();
        let second = registry.take_for_dispatch(CHAIN_B, &mut events).unwrap();
        assert_eq!((first[0].fee_bps, second[0].fee_bps), (100, 200));
        assert!(second[0].sequence > first[0].sequence);

        assert_eq!(registry.confirm_deployed(CHAIN_B, &first, &mut events), 0);
        assert_eq!(registry.deploy_state(fee_a(), CHAIN_B), DeployState::Pending);
        assert_eq!(registry.unconfirmed(fee_a(), CHAIN_B), vec![second[0].sequence]);

        // Replaying the stale confirm changes nothing.
        assert_eq!(registry.confirm_deployed(CHAIN_B, &first, &mut events), 0);
        assert_eq!(registry.deploy_state(fee_a(), CHAIN_B), DeployState::Pending);

        assert_eq!(registry.confirm_deployed(CHAIN_B, &second, &mut events), 1);
        assert_eq!(registry.deploy_state(fee_a(), CHAIN_B), DeployState::Synced);
    }

    #[test]
    fn test_out_of_order_confirms_wait_for_every_dispatch() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();
        let first = registry.take_for_dispatch(CHAIN_B, &mut events).unwrap();
        registry
            .update_fee_config(fee_a(), 200, receiver(), &mut events)
            .unwrap();
        let second = registry.take_for_dispatch(CHAIN_B, &mut events).unwrap();

        assert_eq!(registry.confirm_deployed(CHAIN_B, &second, &mut events), 0);
        assert_eq!(registry.deploy_state(fee_a(), CHAIN_B), DeployState::Pending);
        assert_eq!(registry.confirm_deployed(CHAIN_B, &first, &mut events), 1);
        assert_eq!(registry.deploy_state(fee_a(), CHAIN_B), DeployState::Synced);
    }

    #[test]
    fn test_confirm_from_before_reassignment_is_ignored() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();
        let old = registry.take_for_dispatch(CHAIN_B, &mut events).unwrap();
        registry.unassign(fee_a(), CHAIN_B, &mut events).unwrap();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();
        let fresh = registry.take_for_dispatch(CHAIN_B, &mut events).unwrap();
        assert_eq!(fresh[0].action, SyncAction::Update);

        assert_eq!(registry.confirm_deployed(CHAIN_B, &old, &mut events), 0);
        assert_eq!(registry.deploy_state(fee_a(), CHAIN_B), DeployState::Pending);
        assert_eq!(registry.confirm_deployed(CHAIN_B, &fresh, &mut events), 1);
    }

    #[test]
    fn test_update_requeues_every_assignment_once() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign_all(fee_a(), &mut events).unwrap();
        for chain_id in [CHAIN_B, CHAIN_C] {
            let deltas = registry.take_for_dispatch(chain_id, &mut events).unwrap();
            registry.confirm_deployed(chain_id, &deltas, &mut events);
        }

        registry
            .update_fee_config(fee_a(), 150, receiver(), &mut events)
            .unwrap();
        registry
            .update_fee_config(fee_a(), 175, receiver(), &mut events)
            .unwrap();

        for chain_id in [CHAIN_B, CHAIN_C] {
            assert_eq!(registry.deploy_state(fee_a(), chain_id), DeployState::Queued);
            assert_eq!(
                registry.queue(chain_id),
                &[SyncQueueEntry {
                    id: fee_a(),
                    chain_id,
                    action: SyncAction::Update
                }]
            );
        }
        let deltas = registry.take_for_dispatch(CHAIN_B, &mut events).unwrap();
        assert_eq!(deltas[0].fee_bps, 175);
        assert_eq!(registry.fee_config(fee_a()).unwrap().history.len(), 2);
    }

    #[test]
    fn test_update_keeps_undispatched_add() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();
        registry
            .update_fee_config(fee_a(), 300, receiver(), &mut events)
            .unwrap();

        assert_eq!(registry.queue(CHAIN_B).len(), 1);
        assert_eq!(registry.queue(CHAIN_B)[0].action, SyncAction::Add);
        let deltas = registry.take_for_dispatch(CHAIN_B, &mut events).unwrap();
        assert_eq!(deltas[0].fee_bps, 300);
    }

    #[test]
    fn test_unassign_undispatched_add_drops_entry() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();
        registry.unassign(fee_a(), CHAIN_B, &mut events).unwrap();

        assert!(registry.queue(CHAIN_B).is_empty());
        assert!(registry.chains_with_queue().is_empty());
        assert_eq!(registry.deploy_state(fee_a(), CHAIN_B), DeployState::Unassigned);
    }

    #[test]
    fn test_unassign_after_sync_queues_delete() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();
        let deltas = registry.take_for_dispatch(CHAIN_B, &mut events).unwrap();
        registry.confirm_deployed(CHAIN_B, &deltas, &mut events);

        registry.unassign(fee_a(), CHAIN_B, &mut events).unwrap();
        let deltas = registry.take_for_dispatch(CHAIN_B, &mut events).unwrap();
        assert_eq!(
            deltas,
            vec![FeeSyncDelta {
                id: fee_a(),
                fee_bps: 0,
                target: Address::ZERO,
                action: SyncAction::Delete,
                sequence: 2
            }]
        );
    }

    #[test]
    fn test_reassign_over_waiting_delete_becomes_update() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();
        let _ = registry.take_for_dispatch(CHAIN_B, &mut events).unwrap();
        registry.unassign(fee_a(), CHAIN_B, &mut events).unwrap();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();

        assert_eq!(registry.queue(CHAIN_B).len(), 1);
        assert_eq!(registry.queue(CHAIN_B)[0].action, SyncAction::Update);
        assert_eq!(registry.deploy_state(fee_a(), CHAIN_B), DeployState::Queued);
    }

    #[test]
    fn test_remove_fee_config_in_use() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign(fee_a(), CHAIN_C, &mut events).unwrap();
        assert_eq!(
            registry.remove_fee_config(fee_a(), &mut events),
            Err(RegistryError::ConfigInUse {
                id: fee_a(),
                chains: 1
            })
        );

        registry.unassign(fee_a(), CHAIN_C, &mut events).unwrap();
        registry.remove_fee_config(fee_a(), &mut events).unwrap();
        assert!(registry.fee_config(fee_a()).is_none());
        assert!(registry.fee_config_ids().is_empty());
    }

    #[test]
    fn test_delete_for_removed_config_still_dispatches() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();
        let _ = registry.take_for_dispatch(CHAIN_B, &mut events).unwrap();
        registry.unassign(fee_a(), CHAIN_B, &mut events).unwrap();
        registry.remove_fee_config(fee_a(), &mut events).unwrap();

        let deltas = registry.take_for_dispatch(CHAIN_B, &mut events).unwrap();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].action, SyncAction::Delete);
    }

    #[test]
    fn test_remove_chain_guards() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();
        assert_eq!(
            registry.remove_chain(CHAIN_B, &mut events),
            Err(RegistryError::ConfigsAssignedToChain {
                chain_id: CHAIN_B,
                count: 1
            })
        );
        assert_eq!(
            registry.remove_chain(42, &mut events),
            Err(RegistryError::ChainIdNotExisting(42))
        );
        registry.remove_chain(CHAIN_C, &mut events).unwrap();
        assert_eq!(registry.chain_ids(), vec![CHAIN_B]);
    }

    #[test]
    fn test_assign_all_skips_assigned_chains() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();
        assert_eq!(registry.assign_all(fee_a(), &mut events).unwrap(), 1);
        assert_eq!(registry.assigned_chains(fee_a()), vec![CHAIN_B, CHAIN_C]);
        assert_eq!(registry.unassign_all(fee_a(), &mut events).unwrap(), 2);
        assert!(registry.assigned_chains(fee_a()).is_empty());
    }

    #[test]
    fn test_manual_queue_and_clear() {
        let (mut registry, mut events) = registry_with_chains();
        assert_eq!(
            registry.queue_up_manually(fee_a(), CHAIN_B, SyncAction::Update, &mut events),
            Err(RegistryError::ConfigNotAssignedToChain {
                id: fee_a(),
                chain_id: CHAIN_B
            })
        );
        registry
            .queue_up_manually(fee_a(), CHAIN_B, SyncAction::Delete, &mut events)
            .unwrap();
        assert_eq!(registry.chains_with_queue(), vec![CHAIN_B]);
        assert_eq!(registry.clear_queue(CHAIN_B, &mut events).unwrap(), 1);
        assert!(registry.chains_with_queue().is_empty());
    }

    #[test]
    fn test_manual_delete_refused_while_assigned() {
        let (mut registry, mut events) = registry_with_chains();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();
        let refused = Err(RegistryError::ConfigAlreadyAssignedToChain {
            id: fee_a(),
            chain_id: CHAIN_B,
        });

        assert_eq!(
            registry.queue_up_manually(fee_a(), CHAIN_B, SyncAction::Delete, &mut events),
            refused
        );
        assert_eq!(registry.deploy_state(fee_a(), CHAIN_B), DeployState::Queued);
        assert_eq!(registry.queue(CHAIN_B).len(), 1);
        assert_eq!(registry.queue(CHAIN_B)[0].action, SyncAction::Add);

        let deltas = registry.take_for_dispatch(CHAIN_B, &mut events).unwrap();
        registry.confirm_deployed(CHAIN_B, &deltas, &mut events);
        assert_eq!(
            registry.queue_up_manually(fee_a(), CHAIN_B, SyncAction::Delete, &mut events),
            refused
        );
        assert_eq!(registry.deploy_state(fee_a(), CHAIN_B), DeployState::Synced);
        assert!(registry.queue(CHAIN_B).is_empty());
    }

    #[test]
    fn test_mutations_emit_state_changes() {
        let (mut registry, _) = registry_with_chains();
        let mut events = EventBuffer::new();
        registry.assign(fee_a(), CHAIN_B, &mut events).unwrap();
        assert_eq!(
            events.events(),
            &[
                FeeEvent::ConfigAssigned {
                    id: fee_a(),
                    chain_id: CHAIN_B
                },
                FeeEvent::DeployStateChanged {
                    id: fee_a(),
                    chain_id: CHAIN_B,
                    from: DeployState::Unassigned,
                    to: DeployState::Queued
                },
                FeeEvent::QueueEntryAdded {
                    id: fee_a(),
                    chain_id: CHAIN_B,
                    action: SyncAction::Add
                },
            ]
        );
    }
}
