//! # Inbound Port - FeeDistributorApi
//!
//! ## Authorization (enforced by the chain coordinator)
//!
//! | Method | Authorized Caller |
//! |--------|-------------------|
//! | `push_fees` | Local relay adapter, or anyone depositing directly |
//! | everything else | `DistributorManager` role |

use crate::domain::{DistributorError, PushOutcome};
use crate::ports::outbound::SwapRouter;
use shared_bus::EventBuffer;
use shared_types::{Address, Asset, AssetLedger, SendFeesPayload, U256};

/// Primary API of the fee distributor.
pub trait FeeDistributorApi {
    /// Start distributing and drain buffered pushes in FIFO order.
    /// Returns how many were drained.
    fn start(
        &mut self,
        ledger: &mut dyn AssetLedger,
        router: &dyn SwapRouter,
        events: &mut EventBuffer,
    ) -> Result<usize, DistributorError>;

    /// Stop distributing; later pushes are buffered.
    fn stop(&mut self, events: &mut EventBuffer) -> Result<(), DistributorError>;

    /// Register a payee. A non-empty path is validated against the router.
    fn add_receiver(
        &mut self,
        name: &str,
        points: u64,
        account: Address,
        swap_path: Vec<Address>,
        router: &dyn SwapRouter,
        events: &mut EventBuffer,
    ) -> Result<(), DistributorError>;

    /// Remove a payee.
    fn remove_receiver(&mut self, name: &str, events: &mut EventBuffer)
        -> Result<(), DistributorError>;

    /// Bulk point update.
    ///
    /// # Errors
    /// - `WrongData`: lengths differ or both are empty
    /// - `ReceiverNotExisting`, `PointsZero`
    fn update_receiver_shares(
        &mut self,
        names: &[String],
        points: &[u64],
        events: &mut EventBuffer,
    ) -> Result<(), DistributorError>;

    /// Replace a payee's swap path.
    fn update_swap_path(
        &mut self,
        name: &str,
        swap_path: Vec<Address>,
        router: &dyn SwapRouter,
        events: &mut EventBuffer,
    ) -> Result<(), DistributorError>;

    /// Bounty share and denomination.
    fn set_bounty_settings(
        &mut self,
        share_bps: u64,
        in_token: bool,
        events: &mut EventBuffer,
    ) -> Result<(), DistributorError>;

    /// Route used to turn the fee token into native for bounties.
    fn set_bounty_swap_path(
        &mut self,
        swap_path: Vec<Address>,
        router: &dyn SwapRouter,
        events: &mut EventBuffer,
    ) -> Result<(), DistributorError>;

    /// Distribute `amount` of `asset`, already held by the contract.
    ///
    /// # Errors
    /// - `ZeroValueNotAllowed`, `WrongToken`, `NoReceivers`
    fn push_fees(
        &mut self,
        asset: Asset,
        amount: U256,
        payload: &SendFeesPayload,
        ledger: &mut dyn AssetLedger,
        router: &dyn SwapRouter,
        events: &mut EventBuffer,
    ) -> Result<PushOutcome, DistributorError>;
}
