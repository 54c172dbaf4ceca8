//! # Mesh Wiring
//!
//! Connects chain nodes through the simulated bridge.

pub mod network;

pub use network::{DeliveryOutcome, DeliveryReport, FeeMeshNetwork};
