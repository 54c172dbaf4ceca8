//! # FM-02 Relay Transport Adapter
//!
//! The only component that talks to the bridge. Wraps outbound payloads in
//! the relay envelope, pays bridge fees, and authenticates, decodes and
//! routes inbound deliveries to local facets.
//!
//! **Component ID:** 2
//! **Chain:** every chain (home and targets)
//!
//! ## Trust Boundary
//!
//! An inbound call is accepted only when the immediate caller is the bridge
//! AND the claimed sender is the actor registered for the claimed source
//! chain. Authorization failures revert; everything after authorization
//! reports `Success` or `Fail` instead of reverting, so the bridge never
//! retries a message the destination cannot process.
//!
//! ## Routing
//!
//! | Tag | Home | Target |
//! |-----|------|--------|
//! | `DEPLOY_FEES` | - | store `sync_fees`, then reply `DEPLOY_FEES_CONFIRM` |
//! | `DEPLOY_FEES_CONFIRM` | hub confirm | - |
//! | `SEND_FEES` | distributor `push_fees` | - |
//!
//! ## Refund vs Fallback
//!
//! - *refund*: the bridge returns our own outbound transfer. A `SEND_FEES`
//!   remittance is restored into the local store.
//! - *fallback*: execution at the destination failed and the bridge leaves
//!   the funds here. They are held until `forward_refund`.

#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    ActorTable, AdapterConfig, InboundCall, OutboundMessage, RelayError, TokenTransfer,
};
pub use ports::{BridgeClient, InboundDispatcher, RelayApi, RelaySender};
pub use service::RelayAdapter;
