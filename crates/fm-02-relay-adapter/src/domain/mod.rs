//! # Domain Module
//!
//! Core domain types for the Relay Transport Adapter.

pub mod actors;
pub mod entities;
pub mod errors;

pub use actors::ActorTable;
pub use entities::*;
pub use errors::*;
