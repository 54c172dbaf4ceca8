//! # Simulated Bridge
//!
//! In-process stand-in for the message bus connecting the chains. Every
//! chain node submits committed outbound messages here; the mesh pops them
//! in submission order and executes them on the destination node.
//!
//! Fee model: `base_fee + fee_per_byte * payload.len()`.

use fm_02_relay_adapter::{BridgeClient, OutboundMessage};
use parking_lot::Mutex;
use shared_types::U256;
use std::collections::VecDeque;
use tracing::debug;

/// FIFO message queue with a linear fee schedule.
#[derive(Debug, Default)]
pub struct SimulatedBridge {
    base_fee: U256,
    fee_per_byte: U256,
    in_flight: Mutex<VecDeque<OutboundMessage>>,
}

impl SimulatedBridge {
    /// Create a bridge with the given fee schedule.
    #[must_use]
    pub fn new(base_fee: U256, fee_per_byte: U256) -> Self {
        Self {
            base_fee,
            fee_per_byte,
            in_flight: Mutex::new(VecDeque::new()),
        }
    }

    /// Messages waiting for delivery.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Peek at the queue without consuming it.
    #[must_use]
    pub fn snapshot(&self) -> Vec<OutboundMessage> {
        self.in_flight.lock().iter().cloned().collect()
    }

    /// Take the oldest message.
    pub fn pop_next(&self) -> Option<OutboundMessage> {
        self.in_flight.lock().pop_front()
    }

    /// Take the oldest message matching `predicate`.
    pub fn take_first(&self, predicate: impl Fn(&OutboundMessage) -> bool) -> Option<OutboundMessage> {
        let mut queue = self.in_flight.lock();
        let position = queue.iter().position(predicate)?;
        queue.remove(position)
    }
}

impl BridgeClient for SimulatedBridge {
    fn calc_fee(&self, payload: &[u8]) -> U256 {
        self.base_fee
            .saturating_add(self.fee_per_byte.saturating_mul(U256::from(payload.len())))
    }

    fn submit(&self, message: OutboundMessage) {
        debug!(
            nonce = message.nonce,
            src_chain_id = message.src_chain_id,
            dst_chain_id = message.dst_chain_id,
            tag = ?message.tag,
            "Bridge accepted message"
        );
        self.in_flight.lock().push_back(message);
    }
}
