//! # Outbound Ports
//!
//! Dependencies the adapter drives.

use crate::domain::OutboundMessage;
use shared_bus::EventBuffer;
use shared_types::{Asset, AssetLedger, ChainId, FeeSyncDelta, SendFeesPayload, U256};
use std::fmt::Display;

/// External message bridge.
///
/// Delivery guarantees are the bridge's concern; the adapter only quotes
/// fees and hands over committed messages.
pub trait BridgeClient: Send + Sync {
    /// Fee charged to carry `payload`.
    fn calc_fee(&self, payload: &[u8]) -> U256;

    /// Accept a message for delivery.
    fn submit(&self, message: OutboundMessage);
}

/// Local facets an inbound message may target.
///
/// Implementations run each call atomically: on `Err` nothing the call
/// touched may remain changed.
pub trait InboundDispatcher {
    /// Failure of an inner call. Only rendered into logs.
    type Error: Display;

    /// Ledger of the local chain.
    fn ledger(&mut self) -> &mut dyn AssetLedger;

    /// `DEPLOY_FEES`: apply deltas on the local fee store.
    fn sync_fees(
        &mut self,
        deltas: &[FeeSyncDelta],
        events: &mut EventBuffer,
    ) -> Result<(), Self::Error>;

    /// `DEPLOY_FEES_CONFIRM`: hand the echoed batch to the local hub.
    fn confirm_deploy(
        &mut self,
        src_chain_id: ChainId,
        deltas: &[FeeSyncDelta],
        events: &mut EventBuffer,
    ) -> Result<(), Self::Error>;

    /// `SEND_FEES`: hand received revenue to the local distributor.
    fn push_fees(
        &mut self,
        asset: Asset,
        amount: U256,
        payload: &SendFeesPayload,
        events: &mut EventBuffer,
    ) -> Result<(), Self::Error>;

    /// Bridge refund of a `SEND_FEES` remittance: restore the local store.
    fn restore_fees(
        &mut self,
        payload: &SendFeesPayload,
        asset: Asset,
        refunded: U256,
        events: &mut EventBuffer,
    ) -> Result<(), Self::Error>;
}
