//! # Ports
//!
//! - `inbound`: admin surface and `push_fees`
//! - `outbound`: the swap router

pub mod inbound;
pub mod outbound;

pub use inbound::FeeDistributorApi;
pub use outbound::SwapRouter;
