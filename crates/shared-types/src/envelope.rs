//! # Relay Envelope
//!
//! Wire format exchanged through the bridge:
//! `{what: 32-byte action tag, target: address, message: bytes}`.
//!
//! The envelope is decoded exactly once, at the transport boundary, into the
//! [`RelayMessage`] tagged union. Inner messages:
//!
//! | Tag | `message` |
//! |-----|-----------|
//! | `DEPLOY_FEES` | encoded fee-store batch sync call (`Vec<FeeSyncDelta>`) |
//! | `DEPLOY_FEES_CONFIRM` | the original `DEPLOY_FEES` message, echoed back |
//! | `SEND_FEES` | `SendFeesPayload` |

use crate::entities::{Address, FeeSyncDelta, SendFeesPayload};
use crate::errors::EnvelopeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte action discriminator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionTag(pub [u8; 32]);

impl fmt::Debug for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label: Vec<u8> = self.0.iter().copied().take_while(|b| *b != 0).collect();
        match std::str::from_utf8(&label) {
            Ok(text) if !text.is_empty() => write!(f, "{text}"),
            _ => write!(f, "0x{}", hex::encode(self.0)),
        }
    }
}

/// Right-pad an ASCII label into a 32-byte tag.
const fn label_tag(label: &[u8]) -> ActionTag {
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < label.len() && i < 32 {
        out[i] = label[i];
        i += 1;
    }
    ActionTag(out)
}

/// Known action tags.
pub mod tags {
    use super::{label_tag, ActionTag};

    /// Home → target: apply a batch of fee deltas.
    pub const DEPLOY_FEES: ActionTag = label_tag(b"DEPLOY_FEES");
    /// Target → home: acknowledge an applied batch.
    pub const DEPLOY_FEES_CONFIRM: ActionTag = label_tag(b"DEPLOY_FEES_CONFIRM");
    /// Target → home: remit collected fees (carries a token transfer).
    pub const SEND_FEES: ActionTag = label_tag(b"SEND_FEES");
}

/// Raw envelope as carried by the bridge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// Action tag.
    pub what: ActionTag,
    /// Local contract the inner message is meant for.
    pub target: Address,
    /// Opaque inner message.
    pub message: Vec<u8>,
}

impl MessageEnvelope {
    /// Serialize for the bridge.
    pub fn encode(&self) -> Result<Vec<u8>, EnvelopeError> {
        bincode::serialize(self).map_err(|e| EnvelopeError::Encoding(e.to_string()))
    }

    /// Parse bytes delivered by the bridge.
    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        bincode::deserialize(bytes).map_err(|e| EnvelopeError::Malformed(e.to_string()))
    }
}

/// Decoded relay message. Every inbound payload becomes one of these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayMessage {
    /// Apply deltas on the target's fee store.
    DeployFees {
        /// Fee store address on the target chain.
        target: Address,
        /// Batch to apply.
        deltas: Vec<FeeSyncDelta>,
    },
    /// Acknowledge a deploy batch.
    DeployFeesConfirm {
        /// Hub address on the home chain.
        target: Address,
        /// The batch exactly as it was deployed.
        deltas: Vec<FeeSyncDelta>,
    },
    /// Remit collected fees.
    SendFees {
        /// Distributor address on the home chain.
        target: Address,
        /// Remittance breakdown.
        payload: SendFeesPayload,
    },
}

impl RelayMessage {
    /// Tag this message travels under.
    #[must_use]
    pub fn tag(&self) -> ActionTag {
        match self {
            RelayMessage::DeployFees { .. } => tags::DEPLOY_FEES,
            RelayMessage::DeployFeesConfirm { .. } => tags::DEPLOY_FEES_CONFIRM,
            RelayMessage::SendFees { .. } => tags::SEND_FEES,
        }
    }

    /// Build the raw envelope.
    pub fn to_envelope(&self) -> Result<MessageEnvelope, EnvelopeError> {
        let (target, message) = match self {
            RelayMessage::DeployFees { target, deltas }
            | RelayMessage::DeployFeesConfirm { target, deltas } => (*target, encode_inner(deltas)?),
            RelayMessage::SendFees { target, payload } => (*target, encode_inner(payload)?),
        };
        Ok(MessageEnvelope {
            what: self.tag(),
            target,
            message,
        })
    }

    /// Encode straight to bridge bytes.
    pub fn encode(&self) -> Result<Vec<u8>, EnvelopeError> {
        self.to_envelope()?.encode()
    }

    /// Decode an envelope into the tagged union.
    pub fn from_envelope(envelope: MessageEnvelope) -> Result<Self, EnvelopeError> {
        let MessageEnvelope {
            what,
            target,
            message,
        } = envelope;
        match what {
            tags::DEPLOY_FEES => Ok(RelayMessage::DeployFees {
                target,
                deltas: decode_inner(&message)?,
            }),
            tags::DEPLOY_FEES_CONFIRM => Ok(RelayMessage::DeployFeesConfirm {
                target,
                deltas: decode_inner(&message)?,
            }),
            tags::SEND_FEES => Ok(RelayMessage::SendFees {
                target,
                payload: decode_inner(&message)?,
            }),
            unknown => Err(EnvelopeError::UnknownTag(hex::encode(unknown.0))),
        }
    }

    /// Decode bridge bytes into the tagged union.
    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        Self::from_envelope(MessageEnvelope::decode(bytes)?)
    }
}

fn encode_inner<T: Serialize>(value: &T) -> Result<Vec<u8>, EnvelopeError> {
    bincode::serialize(value).map_err(|e| EnvelopeError::Encoding(e.to_string()))
}

fn decode_inner<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, EnvelopeError> {
    bincode::deserialize(bytes).map_err(|e| EnvelopeError::Malformed(e.to_string()))
}
