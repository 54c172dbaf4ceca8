//! # Ports
//!
//! The hub only exposes inbound ports. It drives the registry, the fee
//! store and the relay adapter through their own inbound ports.

pub mod inbound;

pub use inbound::FeeHubApi;
