//! # Inbound Ports
//!
//! ## Authorization
//!
//! | Method | Authorized Caller |
//! |--------|-------------------|
//! | `RelaySender::*` | Local fee hub only |
//! | `RelayApi::*_actor`, `forward_refund` | `RelayManager` role |
//! | `execute_message*` (inherent) | The bridge, on behalf of a registered actor |

use crate::domain::RelayError;
use crate::ports::outbound::BridgeClient;
use shared_bus::EventBuffer;
use shared_types::{Address, Asset, AssetLedger, ChainId, FeeSyncDelta, SendFeesPayload, U256};

/// Outbound dispatch used by the hub.
///
/// `budget` is the native value the caller has set aside for the bridge
/// fee; `MissingGasFees` is returned when it falls short.
pub trait RelaySender {
    /// Home → target: ship a delta batch. Home chain only.
    #[allow(clippy::too_many_arguments)]
    fn deploy_fees(
        &mut self,
        relayer: Address,
        target: Address,
        chain_id: ChainId,
        deltas: Vec<FeeSyncDelta>,
        budget: U256,
        ledger: &mut dyn AssetLedger,
        bridge: &dyn BridgeClient,
        events: &mut EventBuffer,
    ) -> Result<U256, RelayError>;

    /// Target → home: remit collected fees with an escrowed transfer.
    /// Target chains only.
    #[allow(clippy::too_many_arguments)]
    fn send_fees(
        &mut self,
        target: Address,
        asset: Asset,
        amount: U256,
        dst_chain_id: ChainId,
        payload: SendFeesPayload,
        budget: U256,
        ledger: &mut dyn AssetLedger,
        bridge: &dyn BridgeClient,
        events: &mut EventBuffer,
    ) -> Result<U256, RelayError>;
}

/// Actor administration and stranded-asset recovery.
pub trait RelayApi {
    /// Register the trusted peer for a chain.
    fn add_actor(
        &mut self,
        chain_id: ChainId,
        actor: Address,
        events: &mut EventBuffer,
    ) -> Result<(), RelayError>;

    /// Replace the trusted peer for a chain.
    fn update_actor(
        &mut self,
        chain_id: ChainId,
        actor: Address,
        events: &mut EventBuffer,
    ) -> Result<(), RelayError>;

    /// Forget the trusted peer for a chain.
    fn remove_actor(&mut self, chain_id: ChainId, events: &mut EventBuffer)
        -> Result<(), RelayError>;

    /// Sweep assets stranded by a bridge fallback to `to`.
    fn forward_refund(
        &mut self,
        asset: Asset,
        to: Address,
        ledger: &mut dyn AssetLedger,
        events: &mut EventBuffer,
    ) -> Result<U256, RelayError>;
}
