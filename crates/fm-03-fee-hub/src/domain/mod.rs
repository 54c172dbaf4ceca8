//! # Domain Module
//!
//! Core domain types for the Cross-Chain Fee Hub.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
