//! Fee Distributor Service
//!
//! ```text
//! push_fees(asset, amount)
//!     │
//!     ├─ native? ──→ wrap
//!     ├─ stopped? ──→ queue (drained FIFO on start)
//!     ▼
//! bounty = amount × share_bps / 10000 ──→ bounty receiver (token or native)
//!     ▼
//! net = amount − bounty
//!     ▼
//! per receiver: net × points / total_points ──swap?──→ deposit hook or transfer
//! ```

use crate::domain::{
    BountyRecord, BountySettings, DistributionQueueEntry, DistributionReceiver,
    DistributionReport, DistributorConfig, DistributorError, PushOutcome,
};
use crate::ports::inbound::FeeDistributorApi;
use crate::ports::outbound::SwapRouter;
use shared_bus::{EventBuffer, FeeEvent};
use shared_types::{
    bps_of, mul_div, Address, Asset, AssetLedger, SendFeesPayload, BPS_DENOMINATOR, U256,
};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Label used in events for the bounty route.
const BOUNTY_PATH_LABEL: &str = "<bounty>";

/// Home-chain revenue distributor.
#[derive(Clone, Debug)]
pub struct FeeDistributor {
    config: DistributorConfig,
    running: bool,
    /// Ordered payees.
    receivers: Vec<DistributionReceiver>,
    total_points: u64,
    queue: VecDeque<DistributionQueueEntry>,
    bounty: BountySettings,
    bounty_record: BountyRecord,
}

impl FeeDistributor {
    /// Create a stopped distributor with no receivers.
    #[must_use]
    pub fn new(config: DistributorConfig) -> Self {
        Self {
            config,
            running: false,
            receivers: Vec::new(),
            total_points: 0,
            queue: VecDeque::new(),
            bounty: BountySettings::default(),
            bounty_record: BountyRecord::default(),
        }
    }

    /// Static wiring.
    #[must_use]
    pub fn config(&self) -> &DistributorConfig {
        &self.config
    }

    /// True while pushes are paid out immediately.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Payees in order.
    #[must_use]
    pub fn receivers(&self) -> &[DistributionReceiver] {
        &self.receivers
    }

    /// Payee by name.
    #[must_use]
    pub fn receiver(&self, name: &str) -> Option<&DistributionReceiver> {
        self.receivers.iter().find(|r| r.name == name)
    }

    /// Sum of all receiver points.
    #[must_use]
    pub fn total_points(&self) -> u64 {
        self.total_points
    }

    /// Buffered pushes.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Bounty configuration.
    #[must_use]
    pub fn bounty_settings(&self) -> &BountySettings {
        &self.bounty
    }

    /// Bounty bookkeeping.
    #[must_use]
    pub fn bounty_record(&self) -> &BountyRecord {
        &self.bounty_record
    }

    fn fee_asset(&self) -> Asset {
        Asset::Token(self.config.fee_token)
    }

    fn position(&self, name: &str) -> Result<usize, DistributorError> {
        self.receivers
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| DistributorError::ReceiverNotExisting(name.to_string()))
    }

    fn recount_points(&mut self) {
        self.total_points = self
            .receivers
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.points));
    }

    /// Route must start at the fee token and be quotable by the router.
    fn validate_path(
        &self,
        path: &[Address],
        router: &dyn SwapRouter,
    ) -> Result<(), DistributorError> {
        if path.len() < 2 {
            return Err(DistributorError::InvalidSwapPath(format!(
                "{} hop(s), need at least 2",
                path.len()
            )));
        }
        if path[0] != self.config.fee_token {
            return Err(DistributorError::InvalidSwapPath(format!(
                "path starts at {}, expected the fee token",
                path[0]
            )));
        }
        router
            .get_amounts_out(U256::from(BPS_DENOMINATOR), path)
            .map_err(|e| DistributorError::InvalidSwapPath(e.to_string()))?;
        Ok(())
    }

    // =========================================================================
    // PAYOUT
    // =========================================================================

    fn distribute(
        &mut self,
        amount: U256,
        payload: &SendFeesPayload,
        ledger: &mut dyn AssetLedger,
        router: &dyn SwapRouter,
        events: &mut EventBuffer,
    ) -> Result<DistributionReport, DistributorError> {
        if self.receivers.is_empty() || self.total_points == 0 {
            return Err(DistributorError::NoReceivers);
        }

        let bounty = if payload.bounty_receiver.is_zero() {
            U256::zero()
        } else {
            bps_of(amount, self.bounty.share_bps)
        };
        if !bounty.is_zero() {
            self.pay_bounty(payload.bounty_receiver, bounty, ledger, router, events)?;
        }

        let net = amount - bounty;
        let mut shares = Vec::with_capacity(self.receivers.len());
        for receiver in &self.receivers {
            let share = mul_div(net, receiver.points, self.total_points);
            if !share.is_zero() {
                self.pay_receiver(receiver, share, ledger, router, events)?;
            }
            shares.push((receiver.name.clone(), share));
        }

        let report = DistributionReport {
            amount,
            bounty,
            shares,
        };
        info!(%amount, %bounty, dust = %report.dust(), "Fees distributed");
        events.emit(FeeEvent::FeesDistributed { amount, bounty });
        Ok(report)
    }

    fn pay_bounty(
        &mut self,
        to: Address,
        amount: U256,
        ledger: &mut dyn AssetLedger,
        router: &dyn SwapRouter,
        events: &mut EventBuffer,
    ) -> Result<(), DistributorError> {
        let contract = self.config.contract;
        let (asset, paid) = if self.bounty.in_token {
            ledger.transfer(self.fee_asset(), contract, to, amount)?;
            (self.fee_asset(), amount)
        } else {
            let wrapped = if self.config.wrapped_native == Some(self.config.fee_token) {
                amount
            } else if self.bounty.swap_path.is_empty() {
                return Err(DistributorError::InvalidSwapPath(
                    "native bounty needs a route to the wrapped native token".to_string(),
                ));
            } else {
                router.swap_exact_tokens_for_tokens(
                    amount,
                    &self.bounty.swap_path,
                    contract,
                    contract,
                    ledger,
                )?
            };
            ledger.unwrap_native(contract, wrapped)?;
            ledger.transfer(Asset::Native, contract, to, wrapped)?;
            (Asset::Native, wrapped)
        };

        self.bounty_record.last_receiver = to;
        self.bounty_record.last_amount = paid;
        self.bounty_record.total = self.bounty_record.total.saturating_add(paid);
        debug!(receiver = %to, asset = %asset, amount = %paid, "Bounty paid");
        events.emit(FeeEvent::BountyPaid {
            receiver: to,
            asset,
            amount: paid,
        });
        Ok(())
    }

    fn pay_receiver(
        &self,
        receiver: &DistributionReceiver,
        share: U256,
        ledger: &mut dyn AssetLedger,
        router: &dyn SwapRouter,
        events: &mut EventBuffer,
    ) -> Result<(), DistributorError> {
        let contract = self.config.contract;
        let asset = receiver.payout_asset(self.config.fee_token);
        let amount = if receiver.swap_path.is_empty() {
            share
        } else {
            router.swap_exact_tokens_for_tokens(
                share,
                &receiver.swap_path,
                contract,
                contract,
                ledger,
            )?
        };

        let via_deposit = ledger.deposit_for(receiver.account, asset, contract, amount)?;
        if !via_deposit {
            ledger.transfer(asset, contract, receiver.account, amount)?;
        }
        debug!(receiver = %receiver.name, asset = %asset, %amount, via_deposit, "Receiver paid");
        events.emit(FeeEvent::ReceiverPaid {
            name: receiver.name.clone(),
            account: receiver.account,
            asset,
            amount,
            via_deposit,
        });
        Ok(())
    }
}

impl FeeDistributorApi for FeeDistributor {
    fn start(
        &mut self,
        ledger: &mut dyn AssetLedger,
        router: &dyn SwapRouter,
        events: &mut EventBuffer,
    ) -> Result<usize, DistributorError> {
        if self.running {
            return Err(DistributorError::AlreadyRunning);
        }
        self.running = true;
        events.emit(FeeEvent::DistributionStarted);

        let mut drained = 0;
        while let Some(entry) = self.queue.pop_front() {
            self.distribute(entry.amount, &entry.payload, ledger, router, events)?;
            drained += 1;
        }
        info!(drained, "Distribution started");
        Ok(drained)
    }

    fn stop(&mut self, events: &mut EventBuffer) -> Result<(), DistributorError> {
        if !self.running {
            return Err(DistributorError::NotRunning);
        }
        self.running = false;
        info!("Distribution stopped");
        events.emit(FeeEvent::DistributionStopped);
        Ok(())
    }

    fn add_receiver(
        &mut self,
        name: &str,
        points: u64,
        account: Address,
        swap_path: Vec<Address>,
        router: &dyn SwapRouter,
        events: &mut EventBuffer,
    ) -> Result<(), DistributorError> {
        if self.receiver(name).is_some() {
            return Err(DistributorError::ReceiverExists(name.to_string()));
        }
        if account.is_zero() {
            return Err(DistributorError::AddressZero);
        }
        if points == 0 {
            return Err(DistributorError::PointsZero);
        }
        if !swap_path.is_empty() {
            self.validate_path(&swap_path, router)?;
        }

        self.receivers.push(DistributionReceiver {
            name: name.to_string(),
            points,
            account,
            swap_path,
        });
        self.recount_points();
        info!(name, account = %account, points, "Receiver added");
        events.emit(FeeEvent::ReceiverAdded {
            name: name.to_string(),
            account,
            points,
        });
        Ok(())
    }

    fn remove_receiver(
        &mut self,
        name: &str,
        events: &mut EventBuffer,
    ) -> Result<(), DistributorError> {
        let index = self.position(name)?;
        self.receivers.remove(index);
        self.recount_points();
        info!(name, "Receiver removed");
        events.emit(FeeEvent::ReceiverRemoved {
            name: name.to_string(),
        });
        Ok(())
    }

    fn update_receiver_shares(
        &mut self,
        names: &[String],
        points: &[u64],
        events: &mut EventBuffer,
    ) -> Result<(), DistributorError> {
        if names.len() != points.len() || names.is_empty() {
            return Err(DistributorError::WrongData {
                names: names.len(),
                points: points.len(),
            });
        }

        // Validate everything before touching anything.
        let mut updates = Vec::with_capacity(names.len());
        for (name, points) in names.iter().zip(points) {
            if *points == 0 {
                return Err(DistributorError::PointsZero);
            }
            updates.push((self.position(name)?, *points));
        }

        for (index, points) in updates {
            let receiver = &mut self.receivers[index];
            receiver.points = points;
            events.emit(FeeEvent::ReceiverSharesUpdated {
                name: receiver.name.clone(),
                points,
            });
        }
        self.recount_points();
        info!(updated = names.len(), total_points = self.total_points, "Receiver shares updated");
        Ok(())
    }

    fn update_swap_path(
        &mut self,
        name: &str,
        swap_path: Vec<Address>,
        router: &dyn SwapRouter,
        events: &mut EventBuffer,
    ) -> Result<(), DistributorError> {
        let index = self.position(name)?;
        if !swap_path.is_empty() {
            self.validate_path(&swap_path, router)?;
        }
        self.receivers[index].swap_path = swap_path.clone();
        events.emit(FeeEvent::SwapPathUpdated {
            name: name.to_string(),
            path: swap_path,
        });
        Ok(())
    }

    fn set_bounty_settings(
        &mut self,
        share_bps: u64,
        in_token: bool,
        events: &mut EventBuffer,
    ) -> Result<(), DistributorError> {
        if share_bps > BPS_DENOMINATOR {
            return Err(DistributorError::BountyShareTooHigh(share_bps));
        }
        self.bounty.share_bps = share_bps;
        self.bounty.in_token = in_token;
        events.emit(FeeEvent::BountySettingsChanged {
            share_bps,
            in_token,
        });
        Ok(())
    }

    fn set_bounty_swap_path(
        &mut self,
        swap_path: Vec<Address>,
        router: &dyn SwapRouter,
        events: &mut EventBuffer,
    ) -> Result<(), DistributorError> {
        if !swap_path.is_empty() {
            self.validate_path(&swap_path, router)?;
            if swap_path.last().copied() != self.config.wrapped_native {
                return Err(DistributorError::InvalidSwapPath(
                    "bounty route must end at the wrapped native token".to_string(),
                ));
            }
        }
        self.bounty.swap_path = swap_path.clone();
        events.emit(FeeEvent::SwapPathUpdated {
            name: BOUNTY_PATH_LABEL.to_string(),
            path: swap_path,
        });
        Ok(())
    }

    fn push_fees(
        &mut self,
        asset: Asset,
        amount: U256,
        payload: &SendFeesPayload,
        ledger: &mut dyn AssetLedger,
        router: &dyn SwapRouter,
        events: &mut EventBuffer,
    ) -> Result<PushOutcome, DistributorError> {
        if amount.is_zero() {
            return Err(DistributorError::ZeroValueNotAllowed);
        }
        match asset {
            Asset::Native if self.config.wrapped_native == Some(self.config.fee_token) => {
                ledger.wrap_native(self.config.contract, amount)?;
            }
            Asset::Token(token) if token == self.config.fee_token => {}
            other => return Err(DistributorError::WrongToken(other)),
        }

        if !self.running {
            self.queue.push_back(DistributionQueueEntry {
                amount,
                payload: payload.clone(),
            });
            let queued = self.queue.len();
            warn!(%amount, queued, "Fees pushed while distribution is stopped");
            events.emit(FeeEvent::TriggerDistributionWhileNotRunning { amount, queued });
            return Ok(PushOutcome::Queued { queued });
        }

        let report = self.distribute(amount, payload, ledger, router, events)?;
        Ok(PushOutcome::Distributed(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SwapError;
    use shared_types::{FeeAmount, FeeId, InMemoryLedger};

    fn contract() -> Address {
        Address::repeat_byte(0xaa)
    }

    fn fee_token() -> Address {
        Address::repeat_byte(0x70)
    }

    fn weth() -> Address {
        Address::repeat_byte(0x77)
    }

    fn other_token() -> Address {
        Address::repeat_byte(0x71)
    }

    fn bounty_receiver() -> Address {
        Address::repeat_byte(0x99)
    }

    /// Router with 1:2 pools from the fee token to `other_token` and `weth`.
    struct DoublingRouter;

    impl SwapRouter for DoublingRouter {
        fn get_amounts_out(
            &self,
            amount_in: U256,
            path: &[Address],
        ) -> Result<Vec<U256>, SwapError> {
            if path.len() < 2 {
                return Err(SwapError::PathTooShort(path.len()));
            }
            let mut amounts = vec![amount_in];
            for hop in path.windows(2) {
                if hop[0] != fee_token() || (hop[1] != other_token() && hop[1] != weth()) {
                    return Err(SwapError::UnknownPair {
                        from: hop[0],
                        to: hop[1],
                    });
                }
                let last = amounts[amounts.len() - 1];
                amounts.push(last * U256::from(2u64));
            }
            Ok(amounts)
        }

        fn swap_exact_tokens_for_tokens(
            &self,
            amount_in: U256,
            path: &[Address],
            from: Address,
            to: Address,
            ledger: &mut dyn AssetLedger,
        ) -> Result<U256, SwapError> {
            let amounts = self.get_amounts_out(amount_in, path)?;
            let out = amounts[amounts.len() - 1];
            ledger.burn(Asset::Token(path[0]), from, amount_in)?;
            ledger.mint(Asset::Token(path[path.len() - 1]), to, out)?;
            Ok(out)
        }
    }

    fn distributor() -> FeeDistributor {
        FeeDistributor::new(DistributorConfig {
            contract: contract(),
            fee_token: fee_token(),
            wrapped_native: Some(weth()),
        })
    }

    fn payload(total: u64) -> SendFeesPayload {
        SendFeesPayload {
            total_fees: U256::from(total),
            bounty_receiver: bounty_receiver(),
            fees: vec![FeeAmount {
                id: FeeId::from_label("fee-a"),
                amount: U256::from(total),
            }],
        }
    }

    fn funded_ledger(amount: u64) -> InMemoryLedger {
        let mut ledger = InMemoryLedger::with_native_wrapper(weth());
        ledger
            .mint(Asset::Token(fee_token()), contract(), U256::from(amount))
            .unwrap();
        ledger
    }

    fn scenario_b() -> (FeeDistributor, EventBuffer) {
        let mut d = distributor();
        let mut events = EventBuffer::new();
        let router = DoublingRouter;
        d.add_receiver("P1", 40_000, Address::repeat_byte(1), Vec::new(), &router, &mut events)
            .unwrap();
        d.add_receiver("P2", 40_000, Address::repeat_byte(2), Vec::new(), &router, &mut events)
            .unwrap();
        d.add_receiver("Eoa", 20_000, Address::repeat_byte(3), Vec::new(), &router, &mut events)
            .unwrap();
        d.set_bounty_settings(100, true, &mut events).unwrap();
        d.start(&mut InMemoryLedger::new(), &router, &mut events).unwrap();
        (d, events)
    }

    #[test]
    fn test_scenario_b_pro_rata_payout() {
        let (mut d, mut events) = scenario_b();
        let amount = 2_000_000_000_000_000_000u128;
        let mut ledger = InMemoryLedger::with_native_wrapper(weth());
        ledger
            .mint(Asset::Token(fee_token()), contract(), U256::from(amount))
            .unwrap();

        let outcome = d
            .push_fees(
                Asset::Token(fee_token()),
                U256::from(amount),
                &payload(0),
                &mut ledger,
                &DoublingRouter,
                &mut events,
            )
            .unwrap();

        let PushOutcome::Distributed(report) = outcome else {
            panic!("expected an immediate distribution");
        };
        let bounty = U256::from(amount / 100);
        let net = U256::from(amount) - bounty;
        assert_eq!(report.bounty, bounty);
        let token = Asset::Token(fee_token());
        assert_eq!(ledger.balance_of(token, Address::repeat_byte(1)), net * U256::from(4u64) / U256::from(10u64));
        assert_eq!(ledger.balance_of(token, Address::repeat_byte(2)), net * U256::from(4u64) / U256::from(10u64));
        assert_eq!(ledger.balance_of(token, Address::repeat_byte(3)), net * U256::from(2u64) / U256::from(10u64));
        assert_eq!(ledger.balance_of(token, bounty_receiver()), bounty);
        assert_eq!(report.paid() + report.bounty, U256::from(amount));
    }

    #[test]
    fn test_rounding_dust_stays_in_contract() {
        let (mut d, mut events) = scenario_b();
        let mut ledger = funded_ledger(7);
        let outcome = d
            .push_fees(
                Asset::Token(fee_token()),
                U256::from(7u64),
                &payload(7),
                &mut ledger,
                &DoublingRouter,
                &mut events,
            )
            .unwrap();
        let PushOutcome::Distributed(report) = outcome else {
            panic!("expected an immediate distribution");
        };
        // 1% of 7 floors to zero; shares are 2, 2, 1.
        assert!(report.bounty.is_zero());
        assert_eq!(report.paid(), U256::from(5u64));
        assert!(report.dust() < U256::from(d.receivers().len()));
        assert_eq!(
            ledger.balance_of(Asset::Token(fee_token()), contract()),
            report.dust()
        );
    }

    #[test]
    fn test_stopped_distributor_queues_and_drains_fifo() {
        let mut d = distributor();
        let mut events = EventBuffer::new();
        let router = DoublingRouter;
        d.add_receiver("only", 1, Address::repeat_byte(1), Vec::new(), &router, &mut events)
            .unwrap();
        d.set_bounty_settings(0, true, &mut events).unwrap();
        let mut ledger = funded_ledger(30);

        for amount in [10u64, 20] {
            let outcome = d
                .push_fees(
                    Asset::Token(fee_token()),
                    U256::from(amount),
                    &payload(amount),
                    &mut ledger,
                    &router,
                    &mut events,
                )
                .unwrap();
            assert!(matches!(outcome, PushOutcome::Queued { .. }));
        }
        assert_eq!(d.queue_len(), 2);
        assert!(events.events().iter().any(|e| matches!(
            e,
            FeeEvent::TriggerDistributionWhileNotRunning { queued: 2, .. }
        )));

        let drained = d.start(&mut ledger, &router, &mut events).unwrap();
        assert_eq!(drained, 2);
        assert_eq!(d.queue_len(), 0);
        let amounts: Vec<U256> = events
            .events()
            .iter()
            .filter_map(|e| match e {
                FeeEvent::FeesDistributed { amount, .. } => Some(*amount),
                _ => None,
            })
            .collect();
        assert_eq!(amounts, vec![U256::from(10u64), U256::from(20u64)]);
        assert_eq!(
            ledger.balance_of(Asset::Token(fee_token()), Address::repeat_byte(1)),
            U256::from(30u64)
        );
    }

    #[test]
    fn test_push_validation() {
        let (mut d, mut events) = scenario_b();
        let mut ledger = funded_ledger(10);
        assert_eq!(
            d.push_fees(
                Asset::Token(fee_token()),
                U256::zero(),
                &payload(0),
                &mut ledger,
                &DoublingRouter,
                &mut events
            ),
            Err(DistributorError::ZeroValueNotAllowed)
        );
        assert_eq!(
            d.push_fees(
                Asset::Token(other_token()),
                U256::one(),
                &payload(1),
                &mut ledger,
                &DoublingRouter,
                &mut events
            ),
            Err(DistributorError::WrongToken(Asset::Token(other_token())))
        );
        // Native is only accepted when the fee token is the native wrapper.
        assert_eq!(
            d.push_fees(
                Asset::Native,
                U256::one(),
                &payload(1),
                &mut ledger,
                &DoublingRouter,
                &mut events
            ),
            Err(DistributorError::WrongToken(Asset::Native))
        );
    }

    #[test]
    fn test_native_push_is_wrapped() {
        let mut d = FeeDistributor::new(DistributorConfig {
            contract: contract(),
            fee_token: weth(),
            wrapped_native: Some(weth()),
        });
        let mut events = EventBuffer::new();
        let mut ledger = InMemoryLedger::with_native_wrapper(weth());
        ledger.mint(Asset::Native, contract(), U256::from(100u64)).unwrap();

        let outcome = d
            .push_fees(
                Asset::Native,
                U256::from(100u64),
                &payload(100),
                &mut ledger,
                &DoublingRouter,
                &mut events,
            )
            .unwrap();
        assert_eq!(outcome, PushOutcome::Queued { queued: 1 });
        assert!(ledger.balance_of(Asset::Native, contract()).is_zero());
        assert_eq!(
            ledger.balance_of(Asset::Token(weth()), contract()),
            U256::from(100u64)
        );
    }

    #[test]
    fn test_no_receivers() {
        let mut d = distributor();
        let mut events = EventBuffer::new();
        let mut ledger = funded_ledger(10);
        d.start(&mut ledger, &DoublingRouter, &mut events).unwrap();
        assert_eq!(
            d.push_fees(
                Asset::Token(fee_token()),
                U256::from(10u64),
                &payload(10),
                &mut ledger,
                &DoublingRouter,
                &mut events
            ),
            Err(DistributorError::NoReceivers)
        );
    }

    #[test]
    fn test_receiver_swap_and_deposit_hook() {
        let mut d = distributor();
        let mut events = EventBuffer::new();
        let router = DoublingRouter;
        let vault = Address::repeat_byte(0x55);
        d.add_receiver(
            "vault",
            1,
            vault,
            vec![fee_token(), other_token()],
            &router,
            &mut events,
        )
        .unwrap();
        d.set_bounty_settings(0, true, &mut events).unwrap();
        d.start(&mut InMemoryLedger::new(), &router, &mut events).unwrap();

        let mut ledger = funded_ledger(10);
        ledger.register_deposit_hook(vault);
        d.push_fees(
            Asset::Token(fee_token()),
            U256::from(10u64),
            &payload(10),
            &mut ledger,
            &router,
            &mut events,
        )
        .unwrap();

        assert_eq!(
            ledger.deposited(vault, Asset::Token(other_token())),
            U256::from(20u64)
        );
        assert!(events.events().iter().any(|e| matches!(
            e,
            FeeEvent::ReceiverPaid { via_deposit: true, .. }
        )));
    }

    #[test]
    fn test_native_bounty_swaps_and_unwraps() {
        let (mut d, mut events) = scenario_b();
        d.set_bounty_settings(1_000, false, &mut events).unwrap();
        d.set_bounty_swap_path(vec![fee_token(), weth()], &DoublingRouter, &mut events)
            .unwrap();
        let mut ledger = funded_ledger(100);

        d.push_fees(
            Asset::Token(fee_token()),
            U256::from(100u64),
            &payload(100),
            &mut ledger,
            &DoublingRouter,
            &mut events,
        )
        .unwrap();

        // 10% of 100, doubled by the route.
        assert_eq!(
            ledger.balance_of(Asset::Native, bounty_receiver()),
            U256::from(20u64)
        );
        assert_eq!(d.bounty_record().last_amount, U256::from(20u64));
        assert_eq!(d.bounty_record().total, U256::from(20u64));
    }

    #[test]
    fn test_invalid_swap_path_rejected_up_front() {
        let mut d = distributor();
        let mut events = EventBuffer::new();
        let router = DoublingRouter;
        let result = d.add_receiver(
            "broken",
            1,
            Address::repeat_byte(1),
            vec![fee_token(), Address::repeat_byte(0x42)],
            &router,
            &mut events,
        );
        assert!(matches!(result, Err(DistributorError::InvalidSwapPath(_))));
        assert!(d.receivers().is_empty());

        let result = d.set_bounty_swap_path(vec![fee_token(), other_token()], &router, &mut events);
        assert!(matches!(result, Err(DistributorError::InvalidSwapPath(_))));
    }

    #[test]
    fn test_receiver_crud_guards() {
        let (mut d, mut events) = scenario_b();
        let router = DoublingRouter;
        assert_eq!(
            d.add_receiver("P1", 1, Address::repeat_byte(9), Vec::new(), &router, &mut events),
            Err(DistributorError::ReceiverExists("P1".to_string()))
        );
        assert_eq!(
            d.add_receiver("X", 1, Address::ZERO, Vec::new(), &router, &mut events),
            Err(DistributorError::AddressZero)
        );
        assert_eq!(
            d.add_receiver("X", 0, Address::repeat_byte(9), Vec::new(), &router, &mut events),
            Err(DistributorError::PointsZero)
        );
        assert_eq!(
            d.remove_receiver("nobody", &mut events),
            Err(DistributorError::ReceiverNotExisting("nobody".to_string()))
        );
        d.remove_receiver("Eoa", &mut events).unwrap();
        assert_eq!(d.total_points(), 80_000);
    }

    #[test]
    fn test_update_shares() {
        let (mut d, mut events) = scenario_b();
        assert_eq!(
            d.update_receiver_shares(&["P1".to_string()], &[1, 2], &mut events),
            Err(DistributorError::WrongData {
                names: 1,
                points: 2
            })
        );
        assert_eq!(
            d.update_receiver_shares(&["ghost".to_string()], &[1], &mut events),
            Err(DistributorError::ReceiverNotExisting("ghost".to_string()))
        );
        d.update_receiver_shares(&["P1".to_string(), "P2".to_string()], &[10, 10], &mut events)
            .unwrap();
        assert_eq!(d.total_points(), 20_020);
    }

    #[test]
    fn test_start_stop_guards() {
        let (mut d, mut events) = scenario_b();
        assert_eq!(
            d.start(&mut InMemoryLedger::new(), &DoublingRouter, &mut events),
            Err(DistributorError::AlreadyRunning)
        );
        d.stop(&mut events).unwrap();
        assert_eq!(d.stop(&mut events), Err(DistributorError::NotRunning));
    }

    #[test]
    fn test_bounty_share_bounds() {
        let mut d = distributor();
        let mut events = EventBuffer::new();
        assert_eq!(d.bounty_settings().share_bps, 100);
        assert_eq!(
            d.set_bounty_settings(10_001, true, &mut events),
            Err(DistributorError::BountyShareTooHigh(10_001))
        );
    }
}
