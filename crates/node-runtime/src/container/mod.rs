//! # Chain Container
//!
//! Owned state and entrypoints of one chain.
//!
//! - `config`: mesh and per-chain configuration
//! - `roles`: local access control
//! - `state`: the components of one chain as plain owned values
//! - `node`: `ChainNode`, which runs every entrypoint as an atomic
//!   transaction over that state

pub mod config;
pub mod node;
pub mod roles;
pub mod state;

pub use config::{ChainConfig, ConfigError, MeshConfig, CONFIG_ENV_VAR};
pub use node::{ChainNode, TxEnv};
pub use roles::{Role, RoleTable};
pub use state::{ChainFacets, LedgerState};
