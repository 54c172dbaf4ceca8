//! # Mesh Configuration
//!
//! Static description of every chain in the mesh plus the hub, bridge and
//! distributor prices.
//!
//! ## Sources
//!
//! | Source | How |
//! |--------|-----|
//! | built-in | `MeshConfig::default()`: home chain 1, targets 2 and 3 |
//! | file | `MeshConfig::from_file(path)`, JSON |
//! | env | `FM_CONFIG=<path>` picked up by `MeshConfig::from_env()` |

use serde::{Deserialize, Serialize};
use shared_types::{Address, ChainId, BPS_DENOMINATOR, U256};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV_VAR: &str = "FM_CONFIG";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No chains configured.
    #[error("mesh has no chains")]
    NoChains,

    /// Chain id zero.
    #[error("chain id must be nonzero")]
    ChainIdZero,

    /// Same chain id twice.
    #[error("chain {0} configured twice")]
    DuplicateChain(ChainId),

    /// `home_chain_id` not among the chains.
    #[error("home chain {0} is not configured")]
    MissingHomeChain(ChainId),

    /// A required address is zero.
    #[error("chain {chain_id}: {field} must be nonzero")]
    AddressZero {
        /// Chain
        chain_id: ChainId,
        /// Field name
        field: &'static str,
    },

    /// Bounty share above 100%.
    #[error("bounty share {0} bps exceeds 10000")]
    BountyShareTooHigh(u64),

    /// File could not be read.
    #[error("cannot read config {path}: {reason}")]
    Io {
        /// Path
        path: String,
        /// Underlying error
        reason: String,
    },

    /// File is not valid JSON for this schema.
    #[error("cannot parse config: {0}")]
    Parse(String),
}

/// One chain of the mesh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain id.
    pub chain_id: ChainId,
    /// Shared address of every facet on this chain.
    pub contract: Address,
    /// The bridge's address on this chain.
    pub bridge: Address,
    /// Token fees are collected and distributed in.
    pub fee_token: Address,
    /// Wrapped-native token, if deployed.
    #[serde(default)]
    pub wrapped_native: Option<Address>,
    /// Account holding `Admin` after deployment.
    pub deployer: Address,
    /// Fee store operator (restore shortfalls, emergency pulls).
    pub operator: Address,
}

impl ChainConfig {
    /// Deterministic addresses derived from the chain id.
    #[must_use]
    pub fn with_defaults(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            contract: Address::from_low_u64(0x1000 + chain_id),
            bridge: Address::from_low_u64(0x2000 + chain_id),
            fee_token: Address::from_low_u64(0x3000 + chain_id),
            wrapped_native: Some(Address::from_low_u64(0x4000 + chain_id)),
            deployer: Address::from_low_u64(0xD000),
            operator: Address::from_low_u64(0xE000),
        }
    }
}

/// Complete mesh configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Chain hosting the registry and distributor.
    pub home_chain_id: ChainId,
    /// All chains, home included.
    pub chains: Vec<ChainConfig>,
    /// Flat hub fee per deploy message.
    pub deploy_fee: U256,
    /// Flat hub fee per remittance.
    pub send_fee: U256,
    /// Minimum collected total before a remittance.
    pub send_threshold: U256,
    /// Bridge fee: fixed part.
    pub bridge_base_fee: U256,
    /// Bridge fee: per payload byte.
    pub bridge_fee_per_byte: U256,
    /// Distributor bounty share.
    pub bounty_share_bps: u64,
    /// Native value the bridge executor attaches to each inbound call.
    pub executor_value: U256,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            home_chain_id: 1,
            chains: vec![
                ChainConfig::with_defaults(1),
                ChainConfig::with_defaults(2),
                ChainConfig::with_defaults(3),
            ],
            deploy_fee: U256::from(1_000u64),
            send_fee: U256::from(1_000u64),
            send_threshold: U256::from(100u64),
            bridge_base_fee: U256::from(500u64),
            bridge_fee_per_byte: U256::from(2u64),
            bounty_share_bps: 100,
            executor_value: U256::from(100_000u64),
        }
    }
}

impl MeshConfig {
    /// Load from `FM_CONFIG` when set, else defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the mesh cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chains.is_empty() {
            return Err(ConfigError::NoChains);
        }
        let mut seen = BTreeSet::new();
        for chain in &self.chains {
            if chain.chain_id == 0 {
                return Err(ConfigError::ChainIdZero);
            }
            if !seen.insert(chain.chain_id) {
                return Err(ConfigError::DuplicateChain(chain.chain_id));
            }
            for (field, address) in [
                ("contract", chain.contract),
                ("bridge", chain.bridge),
                ("fee_token", chain.fee_token),
                ("deployer", chain.deployer),
                ("operator", chain.operator),
            ] {
                if address.is_zero() {
                    return Err(ConfigError::AddressZero {
                        chain_id: chain.chain_id,
                        field,
                    });
                }
            }
        }
        if !seen.contains(&self.home_chain_id) {
            return Err(ConfigError::MissingHomeChain(self.home_chain_id));
        }
        if self.bounty_share_bps > BPS_DENOMINATOR {
            return Err(ConfigError::BountyShareTooHigh(self.bounty_share_bps));
        }
        Ok(())
    }

    /// Config of one chain.
    #[must_use]
    pub fn chain(&self, chain_id: ChainId) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.chain_id == chain_id)
    }

    /// Config of the home chain.
    #[must_use]
    pub fn home(&self) -> Option<&ChainConfig> {
        self.chain(self.home_chain_id)
    }

    /// Every chain except home, in configuration order.
    pub fn targets(&self) -> impl Iterator<Item = &ChainConfig> {
        self.chains
            .iter()
            .filter(move |c| c.chain_id != self.home_chain_id)
    }
}
