//! # Domain Module
//!
//! Core domain types for the Fee Store.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
