//! # Actor Table
//!
//! One trusted remote peer per chain. The only source of inbound
//! authorization.

use super::errors::RelayError;
use serde::{Deserialize, Serialize};
use shared_types::{Address, ChainId};
use std::collections::BTreeMap;

/// chainId → trusted remote adapter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorTable {
    actors: BTreeMap<ChainId, Address>,
}

impl ActorTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the peer for a chain.
    pub fn add(&mut self, chain_id: ChainId, actor: Address) -> Result<(), RelayError> {
        validate(chain_id, actor)?;
        if self.actors.contains_key(&chain_id) {
            return Err(RelayError::ActorExisting(chain_id));
        }
        self.actors.insert(chain_id, actor);
        Ok(())
    }

    /// Replace the peer for a chain.
    pub fn update(&mut self, chain_id: ChainId, actor: Address) -> Result<(), RelayError> {
        validate(chain_id, actor)?;
        let slot = self
            .actors
            .get_mut(&chain_id)
            .ok_or(RelayError::ActorNotExisting(chain_id))?;
        *slot = actor;
        Ok(())
    }

    /// Forget the peer for a chain.
    pub fn remove(&mut self, chain_id: ChainId) -> Result<Address, RelayError> {
        self.actors
            .remove(&chain_id)
            .ok_or(RelayError::ActorNotExisting(chain_id))
    }

    /// Peer for a chain.
    #[must_use]
    pub fn get(&self, chain_id: ChainId) -> Option<Address> {
        self.actors.get(&chain_id).copied()
    }

    /// True when `sender` is the registered peer for `chain_id`.
    #[must_use]
    pub fn is_trusted(&self, chain_id: ChainId, sender: Address) -> bool {
        self.get(chain_id) == Some(sender)
    }

    /// All (chain, peer) pairs, ascending by chain.
    #[must_use]
    pub fn entries(&self) -> Vec<(ChainId, Address)> {
        self.actors.iter().map(|(c, a)| (*c, *a)).collect()
    }
}

fn validate(chain_id: ChainId, actor: Address) -> Result<(), RelayError> {
    if chain_id == 0 {
        return Err(RelayError::ChainIdZero);
    }
    if actor.is_zero() {
        return Err(RelayError::AddressZero);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_actor_per_chain() {
        let mut table = ActorTable::new();
        table.add(2, Address::repeat_byte(1)).unwrap();
        assert_eq!(
            table.add(2, Address::repeat_byte(2)),
            Err(RelayError::ActorExisting(2))
        );
        table.update(2, Address::repeat_byte(2)).unwrap();
        assert!(table.is_trusted(2, Address::repeat_byte(2)));
        assert!(!table.is_trusted(2, Address::repeat_byte(1)));
    }

    #[test]
    fn test_missing_actor() {
        let mut table = ActorTable::new();
        assert_eq!(
            table.update(7, Address::repeat_byte(1)),
            Err(RelayError::ActorNotExisting(7))
        );
        assert_eq!(table.remove(7), Err(RelayError::ActorNotExisting(7)));
    }

    #[test]
    fn test_validation() {
        let mut table = ActorTable::new();
        assert_eq!(table.add(0, Address::repeat_byte(1)), Err(RelayError::ChainIdZero));
        assert_eq!(table.add(3, Address::ZERO), Err(RelayError::AddressZero));
        assert!(table.entries().is_empty());
    }
}
