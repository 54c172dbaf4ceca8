//! # Node Runtime Library
//!
//! Per-chain coordinator for the fee mesh, exposed as a library for tests
//! and the `node-runtime` binary.
//!
//! ## Architectural Patterns
//!
//! - **Hexagonal Architecture**: components own their domain logic; this
//!   crate supplies the adapters behind their outbound ports
//! - **Ledger transactions**: every entrypoint commits or reverts as a unit
//! - **Event log**: committed `FeeEvent`s are the only observable output
//!
//! ## Layout
//!
//! - `container/` - configuration, roles, chain state and `ChainNode`
//! - `adapters/` - bridge, router and inbound dispatcher implementations
//! - `handlers/` - commit-time metrics
//! - `wiring/` - `FeeMeshNetwork`, the multi-chain harness

#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

pub mod adapters;
pub mod container;
pub mod errors;
pub mod handlers;
pub mod wiring;

pub use container::{ChainConfig, ChainNode, MeshConfig, Role};
pub use errors::{NodeError, NodeResult};
pub use wiring::{DeliveryOutcome, DeliveryReport, FeeMeshNetwork};
