//! # Inbound Ports
//!
//! ## Authorization (enforced by the chain coordinator)
//!
//! | Method | Authorized Caller |
//! |--------|-------------------|
//! | `FeeRegistryApi::*` | `FeeManager` role |
//! | `SyncQueueDriver::*` | Local fee hub only |

use crate::domain::RegistryError;
use shared_bus::EventBuffer;
use shared_types::{Address, ChainId, FeeCurrency, FeeId, FeeSyncDelta, FeeType, SyncAction};

/// Admin surface of the registry.
///
/// Every successful mutation stages at least one event in `events`.
pub trait FeeRegistryApi {
    /// Register a target chain and the fee store contract on it.
    ///
    /// # Errors
    /// - `ChainIdZero`, `AddressZero`, `ChainIdExists`
    fn add_chain(
        &mut self,
        chain_id: ChainId,
        target: Address,
        events: &mut EventBuffer,
    ) -> Result<(), RegistryError>;

    /// Forget a chain. Drops its sync queue.
    ///
    /// # Errors
    /// - `ChainIdNotExisting`, `ConfigsAssignedToChain`
    fn remove_chain(&mut self, chain_id: ChainId, events: &mut EventBuffer)
        -> Result<(), RegistryError>;

    /// Create a fee config.
    ///
    /// # Errors
    /// - `ConfigIdZero`, `ConfigExists`, `FeeZero`, `FeeTooHigh`, `AddressZero`
    fn add_fee_config(
        &mut self,
        id: FeeId,
        fee_bps: u64,
        receiver: Address,
        currency: FeeCurrency,
        fee_type: FeeType,
        events: &mut EventBuffer,
    ) -> Result<(), RegistryError>;

    /// Replace fee and receiver, archiving the old pair. Re-queues every
    /// existing assignment.
    ///
    /// # Errors
    /// - `ConfigNotExisting`, `FeeZero`, `FeeTooHigh`, `AddressZero`
    fn update_fee_config(
        &mut self,
        id: FeeId,
        fee_bps: u64,
        receiver: Address,
        events: &mut EventBuffer,
    ) -> Result<(), RegistryError>;

    /// Delete a config that no chain references.
    ///
    /// # Errors
    /// - `ConfigNotExisting`, `ConfigInUse`
    fn remove_fee_config(&mut self, id: FeeId, events: &mut EventBuffer)
        -> Result<(), RegistryError>;

    /// Assign a config to one chain and queue an `Add`.
    ///
    /// # Errors
    /// - `ConfigNotExisting`, `ChainIdNotExisting`, `ConfigAlreadyAssignedToChain`
    fn assign(
        &mut self,
        id: FeeId,
        chain_id: ChainId,
        events: &mut EventBuffer,
    ) -> Result<(), RegistryError>;

    /// Remove an assignment and queue a `Delete`.
    ///
    /// # Errors
    /// - `ConfigNotExisting`, `ChainIdNotExisting`, `ConfigNotAssignedToChain`
    fn unassign(
        &mut self,
        id: FeeId,
        chain_id: ChainId,
        events: &mut EventBuffer,
    ) -> Result<(), RegistryError>;

    /// Assign to every chain that does not have it yet. Returns the number of
    /// new assignments.
    fn assign_all(&mut self, id: FeeId, events: &mut EventBuffer) -> Result<usize, RegistryError>;

    /// Unassign from every chain that has it. Returns the number removed.
    fn unassign_all(&mut self, id: FeeId, events: &mut EventBuffer)
        -> Result<usize, RegistryError>;

    /// Escape hatch: push an entry onto a chain's queue.
    ///
    /// `Add`/`Update` need an assigned pair and move it back to `Queued`.
    /// `Delete` is only for unassigned pairs, to retire an entry the target
    /// still holds (`ConfigAlreadyAssignedToChain` otherwise; use `unassign`).
    fn queue_up_manually(
        &mut self,
        id: FeeId,
        chain_id: ChainId,
        action: SyncAction,
        events: &mut EventBuffer,
    ) -> Result<(), RegistryError>;

    /// Drop every queued entry for a chain. Returns the number dropped.
    fn clear_queue(&mut self, chain_id: ChainId, events: &mut EventBuffer)
        -> Result<usize, RegistryError>;
}

/// Hub-facing surface: drain queues into deltas, apply confirmations.
pub trait SyncQueueDriver {
    /// Chains whose queue is non-empty, ascending.
    fn chains_with_queue(&self) -> Vec<ChainId>;

    /// Fee store contract registered for a chain.
    fn target_of(&self, chain_id: ChainId) -> Option<Address>;

    /// Drain a chain's queue into deltas built from the current configs and
    /// move the included assignments `Queued -> Pending`. Each delta gets a
    /// fresh sequence number.
    fn take_for_dispatch(
        &mut self,
        chain_id: ChainId,
        events: &mut EventBuffer,
    ) -> Result<Vec<FeeSyncDelta>, RegistryError>;

    /// Apply a confirmation. A pair reaches `Synced` once every sequence
    /// dispatched for it is confirmed; unknown sequences are ignored.
    /// Returns how many assignments reached `Synced`.
    fn confirm_deployed(
        &mut self,
        chain_id: ChainId,
        deltas: &[FeeSyncDelta],
        events: &mut EventBuffer,
    ) -> usize;
}
