//! # Relay Entities

use serde::{Deserialize, Serialize};
use shared_types::{ActionTag, Address, Asset, ChainId, U256};

/// Static wiring of one chain's adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Chain this adapter runs on.
    pub chain_id: ChainId,
    /// Chain hosting the registry and distributor.
    pub home_chain_id: ChainId,
    /// Shared address of every local facet.
    pub contract: Address,
    /// The bridge's address on this chain: the only accepted inbound caller
    /// and the recipient of bridge fees and escrowed transfers.
    pub bridge: Address,
}

impl AdapterConfig {
    /// True on the home chain.
    #[must_use]
    pub fn is_home(&self) -> bool {
        self.chain_id == self.home_chain_id
    }
}

/// Token amount travelling with a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTransfer {
    /// Asset on the chain where it is observed.
    pub asset: Asset,
    /// Amount.
    pub amount: U256,
}

/// A message handed to the bridge after the sending transaction commits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Per-adapter sequence number.
    pub nonce: u64,
    /// Sending chain.
    pub src_chain_id: ChainId,
    /// Sending adapter.
    pub sender: Address,
    /// Destination chain.
    pub dst_chain_id: ChainId,
    /// Destination adapter.
    pub receiver: Address,
    /// Action tag (also inside `payload`).
    pub tag: ActionTag,
    /// Encoded envelope.
    pub payload: Vec<u8>,
    /// Escrowed transfer, if any.
    pub transfer: Option<TokenTransfer>,
    /// Bridge fee paid.
    pub fee: U256,
}

/// Bridge-invoked inbound call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundCall {
    /// Immediate caller; must be the bridge.
    pub caller: Address,
    /// Native value attached (already credited to the contract).
    pub value: U256,
    /// Claimed source chain.
    pub src_chain_id: ChainId,
    /// Claimed sending adapter.
    pub sender: Address,
    /// Encoded envelope.
    pub message: Vec<u8>,
}
