//! # Domain Module
//!
//! Core domain types for the Fee Distributor.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
