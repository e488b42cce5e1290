//! The privileged side of the capture bridge.
//!
//! The [`Coordinator`] is the only component allowed to enumerate a tab's
//! frames and run code inside one. It answers [`BridgeRequest`]s from the
//! page orchestrator, dispatching the capture-core routines against the
//! [`FrameHost`]'s view of the target frame and relaying their results
//! back as structured replies. It also owns the incidental privileged
//! plumbing: the active-tab cache, badge updates, and the
//! navigation-triggered auto-scan.
//!
//! [`BridgeRequest`]: lectern_bridge_interface::BridgeRequest

mod bridge;
mod host;
mod ops;

pub use bridge::LocalBridge;
pub use host::{FrameHost, FrameInfo, HostError, NavigationEvent, PageSink};
pub use ops::{Coordinator, CoordinatorConfig};
