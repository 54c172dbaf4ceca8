//! # Ports
//!
//! - `inbound`: what local callers may ask of the adapter
//! - `outbound`: the bridge client and the local facets inbound messages
//!   are dispatched to

pub mod inbound;
pub mod outbound;

pub use inbound::{RelayApi, RelaySender};
pub use outbound::{BridgeClient, InboundDispatcher};
