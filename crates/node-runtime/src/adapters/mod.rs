//! # Adapter Implementations
//!
//! Concrete implementations of the components' outbound ports:
//!
//! | Port | Adapter |
//! |------|---------|
//! | `BridgeClient` (fm-02) | `SimulatedBridge` |
//! | `InboundDispatcher` (fm-02) | `LocalFacets` |
//! | `SwapRouter` (fm-05) | `ConstantRateRouter` |

pub mod bridge;
pub mod dispatcher;
pub mod router;

pub use bridge::SimulatedBridge;
pub use dispatcher::LocalFacets;
pub use router::ConstantRateRouter;
