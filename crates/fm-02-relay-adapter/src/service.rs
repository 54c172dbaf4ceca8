//! Relay Adapter Service
//!
//! Inbound pipeline for every bridge entrypoint:
//!
//! ```text
//! caller == bridge? ──no──→ Err(NotBridge)
//!        │yes
//! sender == actor[src]? ──no──→ Err(NotAllowed)
//!        │yes
//! decode envelope ──err──→ Ok(Fail)
//!        │
//! envelope.target == contract? ──no──→ Ok(Fail)
//!        │
//! dispatch by tag ──inner err──→ Ok(Fail)   (inner effects discarded)
//!        │
//!     Ok(Success)
//! ```

use crate::domain::{
    ActorTable, AdapterConfig, InboundCall, OutboundMessage, RelayError, TokenTransfer,
};
use crate::ports::inbound::{RelayApi, RelaySender};
use crate::ports::outbound::{BridgeClient, InboundDispatcher};
use shared_bus::{EventBuffer, ExecutionStatus, FeeEvent};
use shared_types::{
    ActionTag, Address, Asset, AssetLedger, ChainId, FeeSyncDelta, RelayMessage,
    SendFeesPayload, U256,
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Outcome of routing one decoded message.
struct Routed {
    status: ExecutionStatus,
    tag: Option<ActionTag>,
    /// Native value spent on a reply message.
    spent: U256,
}

impl Routed {
    fn fail(tag: Option<ActionTag>) -> Self {
        Self {
            status: ExecutionStatus::Fail,
            tag,
            spent: U256::zero(),
        }
    }
}

/// Relay transport adapter of one chain.
#[derive(Clone, Debug)]
pub struct RelayAdapter {
    config: AdapterConfig,
    actors: ActorTable,
    /// Messages waiting for the enclosing transaction to commit.
    outbox: Vec<OutboundMessage>,
    /// Assets the bridge left with us after a failed delivery.
    stranded: BTreeMap<Asset, U256>,
    next_nonce: u64,
}

impl RelayAdapter {
    /// Create an adapter with an empty actor table.
    #[must_use]
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            config,
            actors: ActorTable::new(),
            outbox: Vec::new(),
            stranded: BTreeMap::new(),
            next_nonce: 0,
        }
    }

    /// Static wiring.
    #[must_use]
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// True on the home chain.
    #[must_use]
    pub fn is_home(&self) -> bool {
        self.config.is_home()
    }

    /// Trusted peer for a chain.
    #[must_use]
    pub fn actor(&self, chain_id: ChainId) -> Option<Address> {
        self.actors.get(chain_id)
    }

    /// The whole actor table.
    #[must_use]
    pub fn actors(&self) -> &ActorTable {
        &self.actors
    }

    /// Stranded amount recorded for an asset.
    #[must_use]
    pub fn stranded(&self, asset: Asset) -> U256 {
        self.stranded.get(&asset).copied().unwrap_or_default()
    }

    /// Messages queued by the current transaction.
    #[must_use]
    pub fn outbox(&self) -> &[OutboundMessage] {
        &self.outbox
    }

    /// Take the committed outbox for submission to the bridge.
    pub fn take_outbox(&mut self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.outbox)
    }

    // =========================================================================
    // BRIDGE ENTRYPOINTS
    // =========================================================================

    /// Message without a token transfer.
    pub fn execute_message<D: InboundDispatcher + ?Sized>(
        &mut self,
        call: InboundCall,
        dispatcher: &mut D,
        bridge: &dyn BridgeClient,
        events: &mut EventBuffer,
    ) -> Result<ExecutionStatus, RelayError> {
        self.execute_inbound(call, None, dispatcher, bridge, events)
    }

    /// Message whose transfer the bridge has already credited to us.
    pub fn execute_message_with_transfer<D: InboundDispatcher + ?Sized>(
        &mut self,
        call: InboundCall,
        transfer: TokenTransfer,
        dispatcher: &mut D,
        bridge: &dyn BridgeClient,
        events: &mut EventBuffer,
    ) -> Result<ExecutionStatus, RelayError> {
        self.execute_inbound(call, Some(transfer), dispatcher, bridge, events)
    }

    /// The bridge gave up on one of our transfers and returned the funds.
    ///
    /// A `SEND_FEES` remittance is restored into the fee store; anything
    /// else is recorded as stranded for `forward_refund`.
    pub fn execute_message_with_transfer_refund<D: InboundDispatcher + ?Sized>(
        &mut self,
        caller: Address,
        transfer: TokenTransfer,
        message: &[u8],
        dispatcher: &mut D,
        events: &mut EventBuffer,
    ) -> Result<ExecutionStatus, RelayError> {
        if caller != self.config.bridge {
            return Err(RelayError::NotBridge(caller));
        }
        events.emit(FeeEvent::MessageRefunded {
            asset: transfer.asset,
            amount: transfer.amount,
        });

        let status = match RelayMessage::decode(message) {
            Ok(RelayMessage::SendFees { payload, .. }) => {
                let mut nested = EventBuffer::new();
                match dispatcher.restore_fees(&payload, transfer.asset, transfer.amount, &mut nested)
                {
                    Ok(()) => {
                        events.absorb(nested);
                        ExecutionStatus::Success
                    }
                    Err(e) => {
                        warn!(error = %e, "Restore after refund failed");
                        ExecutionStatus::Fail
                    }
                }
            }
            Ok(other) => {
                warn!(tag = ?other.tag(), "Refund for a message that carries no remittance");
                ExecutionStatus::Fail
            }
            Err(e) => {
                warn!(error = %e, "Refund with undecodable message");
                ExecutionStatus::Fail
            }
        };

        if status == ExecutionStatus::Fail {
            self.strand(transfer);
        }
        info!(asset = %transfer.asset, amount = %transfer.amount, ?status, "Bridge refund processed");
        Ok(status)
    }

    /// Destination execution failed; the transferred funds stay with us.
    pub fn execute_message_with_transfer_fallback(
        &mut self,
        call: InboundCall,
        transfer: TokenTransfer,
        ledger: &mut dyn AssetLedger,
        events: &mut EventBuffer,
    ) -> Result<ExecutionStatus, RelayError> {
        self.authenticate(&call)?;
        self.strand(transfer);
        self.refund_value(call.caller, call.value, ledger)?;
        warn!(
            src_chain_id = call.src_chain_id,
            asset = %transfer.asset,
            amount = %transfer.amount,
            "Transfer stranded by bridge fallback"
        );
        events.emit(FeeEvent::MessageFallback {
            src_chain_id: call.src_chain_id,
            asset: transfer.asset,
            amount: transfer.amount,
        });
        Ok(ExecutionStatus::Success)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn authenticate(&self, call: &InboundCall) -> Result<(), RelayError> {
        if call.caller != self.config.bridge {
            return Err(RelayError::NotBridge(call.caller));
        }
        if !self.actors.is_trusted(call.src_chain_id, call.sender) {
            return Err(RelayError::NotAllowed(format!(
                "sender {} is not the actor for chain {}",
                call.sender, call.src_chain_id
            )));
        }
        Ok(())
    }

    fn execute_inbound<D: InboundDispatcher + ?Sized>(
        &mut self,
        call: InboundCall,
        transfer: Option<TokenTransfer>,
        dispatcher: &mut D,
        bridge: &dyn BridgeClient,
        events: &mut EventBuffer,
    ) -> Result<ExecutionStatus, RelayError> {
        self.authenticate(&call)?;
        let routed = self.route(&call, transfer, dispatcher, bridge, events)?;

        let leftover = call.value.saturating_sub(routed.spent);
        self.refund_value(call.caller, leftover, dispatcher.ledger())?;

        info!(
            src_chain_id = call.src_chain_id,
            tag = ?routed.tag,
            status = ?routed.status,
            "Inbound message executed"
        );
        events.emit(FeeEvent::MessageReceived {
            src_chain_id: call.src_chain_id,
            tag: routed.tag,
            status: routed.status,
        });
        Ok(routed.status)
    }

    fn route<D: InboundDispatcher + ?Sized>(
        &mut self,
        call: &InboundCall,
        transfer: Option<TokenTransfer>,
        dispatcher: &mut D,
        bridge: &dyn BridgeClient,
        events: &mut EventBuffer,
    ) -> Result<Routed, RelayError> {
        let message = match RelayMessage::decode(&call.message) {
            Ok(message) => message,
            Err(e) => {
                warn!(src_chain_id = call.src_chain_id, error = %e, "Undecodable inbound message");
                return Ok(Routed::fail(None));
            }
        };
        let tag = Some(message.tag());

        let target = match &message {
            RelayMessage::DeployFees { target, .. }
            | RelayMessage::DeployFeesConfirm { target, .. }
            | RelayMessage::SendFees { target, .. } => *target,
        };
        if target != self.config.contract {
            warn!(target = %target, "Inbound message addressed to another contract");
            return Ok(Routed::fail(tag));
        }

        let mut nested = EventBuffer::new();
        let inner = match &message {
            RelayMessage::DeployFees { deltas, .. } => dispatcher.sync_fees(deltas, &mut nested),
            RelayMessage::DeployFeesConfirm { deltas, .. } => {
                dispatcher.confirm_deploy(call.src_chain_id, deltas, &mut nested)
            }
            RelayMessage::SendFees { payload, .. } => {
                let Some(transfer) = transfer else {
                    warn!("SEND_FEES arrived without a token transfer");
                    return Ok(Routed::fail(tag));
                };
                dispatcher.push_fees(transfer.asset, transfer.amount, payload, &mut nested)
            }
        };
        if let Err(e) = inner {
            warn!(tag = ?tag, error = %e, "Inner call failed");
            return Ok(Routed::fail(tag));
        }
        events.absorb(nested);

        // An applied batch is acknowledged in the same transaction; the
        // caller pays for the reply or the whole call reverts.
        let spent = match message {
            RelayMessage::DeployFees { deltas, .. } => self.send(
                call.src_chain_id,
                call.sender,
                RelayMessage::DeployFeesConfirm {
                    target: call.sender,
                    deltas,
                },
                None,
                call.value,
                dispatcher.ledger(),
                bridge,
                events,
            )?,
            _ => U256::zero(),
        };

        Ok(Routed {
            status: ExecutionStatus::Success,
            tag,
            spent,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn send(
        &mut self,
        dst_chain_id: ChainId,
        receiver: Address,
        message: RelayMessage,
        transfer: Option<TokenTransfer>,
        budget: U256,
        ledger: &mut dyn AssetLedger,
        bridge: &dyn BridgeClient,
        events: &mut EventBuffer,
    ) -> Result<U256, RelayError> {
        let payload = message.encode()?;
        let fee = bridge.calc_fee(&payload);
        if budget < fee {
            return Err(RelayError::MissingGasFees {
                required: fee,
                provided: budget,
            });
        }

        ledger.transfer(Asset::Native, self.config.contract, self.config.bridge, fee)?;
        if let Some(transfer) = transfer {
            ledger.transfer(
                transfer.asset,
                self.config.contract,
                self.config.bridge,
                transfer.amount,
            )?;
        }

        let tag = message.tag();
        self.outbox.push(OutboundMessage {
            nonce: self.next_nonce,
            src_chain_id: self.config.chain_id,
            sender: self.config.contract,
            dst_chain_id,
            receiver,
            tag,
            payload,
            transfer,
            fee,
        });
        self.next_nonce += 1;

        debug!(dst_chain_id, tag = ?tag, bridge_fee = %fee, "Message queued for bridge");
        events.emit(FeeEvent::MessageSent {
            dst_chain_id,
            receiver,
            tag,
            bridge_fee: fee,
        });
        Ok(fee)
    }

    fn refund_value(
        &self,
        to: Address,
        amount: U256,
        ledger: &mut dyn AssetLedger,
    ) -> Result<(), RelayError> {
        if !amount.is_zero() {
            ledger.transfer(Asset::Native, self.config.contract, to, amount)?;
        }
        Ok(())
    }

    fn strand(&mut self, transfer: TokenTransfer) {
        let slot = self.stranded.entry(transfer.asset).or_default();
        *slot = slot.saturating_add(transfer.amount);
    }
}

impl RelaySender for RelayAdapter {
    fn deploy_fees(
        &mut self,
        relayer: Address,
        target: Address,
        chain_id: ChainId,
        deltas: Vec<FeeSyncDelta>,
        budget: U256,
        ledger: &mut dyn AssetLedger,
        bridge: &dyn BridgeClient,
        events: &mut EventBuffer,
    ) -> Result<U256, RelayError> {
        if !self.is_home() {
            return Err(RelayError::NotAllowed(
                "deploy_fees is only available on the home chain".to_string(),
            ));
        }
        if relayer.is_zero() {
            return Err(RelayError::AddressZero);
        }
        self.send(
            chain_id,
            relayer,
            RelayMessage::DeployFees { target, deltas },
            None,
            budget,
            ledger,
            bridge,
            events,
        )
    }

    fn send_fees(
        &mut self,
        target: Address,
        asset: Asset,
        amount: U256,
        dst_chain_id: ChainId,
        payload: SendFeesPayload,
        budget: U256,
        ledger: &mut dyn AssetLedger,
        bridge: &dyn BridgeClient,
        events: &mut EventBuffer,
    ) -> Result<U256, RelayError> {
        if self.is_home() {
            return Err(RelayError::NotAllowed(
                "send_fees is only available on target chains".to_string(),
            ));
        }
        let receiver = self
            .actors
            .get(dst_chain_id)
            .ok_or(RelayError::ActorNotExisting(dst_chain_id))?;
        self.send(
            dst_chain_id,
            receiver,
            RelayMessage::SendFees { target, payload },
            Some(TokenTransfer { asset, amount }),
            budget,
            ledger,
            bridge,
            events,
        )
    }
}

impl RelayApi for RelayAdapter {
    fn add_actor(
        &mut self,
        chain_id: ChainId,
        actor: Address,
        events: &mut EventBuffer,
    ) -> Result<(), RelayError> {
        self.actors.add(chain_id, actor)?;
        info!(chain_id, actor = %actor, "Actor added");
        events.emit(FeeEvent::ActorAdded { chain_id, actor });
        Ok(())
    }

    fn update_actor(
        &mut self,
        chain_id: ChainId,
        actor: Address,
        events: &mut EventBuffer,
    ) -> Result<(), RelayError> {
        self.actors.update(chain_id, actor)?;
        info!(chain_id, actor = %actor, "Actor updated");
        events.emit(FeeEvent::ActorUpdated { chain_id, actor });
        Ok(())
    }

    fn remove_actor(
        &mut self,
        chain_id: ChainId,
        events: &mut EventBuffer,
    ) -> Result<(), RelayError> {
        self.actors.remove(chain_id)?;
        info!(chain_id, "Actor removed");
        events.emit(FeeEvent::ActorRemoved { chain_id });
        Ok(())
    }

    fn forward_refund(
        &mut self,
        asset: Asset,
        to: Address,
        ledger: &mut dyn AssetLedger,
        events: &mut EventBuffer,
    ) -> Result<U256, RelayError> {
        if to.is_zero() {
            return Err(RelayError::AddressZero);
        }
        let amount = self
            .stranded
            .remove(&asset)
            .filter(|amount| !amount.is_zero())
            .ok_or(RelayError::NothingToForward(asset))?;

        ledger.transfer(asset, self.config.contract, to, amount)?;
        info!(asset = %asset, to = %to, %amount, "Stranded funds forwarded");
        events.emit(FeeEvent::RefundForwarded { asset, to, amount });
        Ok(amount)
    }
}
