//! The page-level capture orchestrator.
//!
//! A root actor owns the single in-flight capture session: it resolves
//! the target frame through the bridge, opens the transcript panel, starts
//! the capture driver, retries or reloads the frame on failure, animates a
//! smoothed progress value for the presentation layer, and sequences batch
//! captures. The orchestrator talks to the privileged side exclusively
//! through [`BridgeTransport`] and hears from the in-frame driver through a
//! session-bound window channel; it holds no host privileges of its own.
//!
//! [`BridgeTransport`]: lectern_bridge_interface::BridgeTransport

pub mod actors;
pub mod config;
pub mod flow;
pub mod progress;
pub mod router;
pub mod runtime;

pub use actors::{RootActor, RootArgs, RootMsg, SessionState, handle_page_request, spawn_root};
pub use config::SessionConfig;
pub use flow::VideoOutcome;
pub use progress::{AnimatorConfig, ProgressAnimator};
pub use router::WindowRouter;
pub use runtime::{ProgressFrame, SessionLifecycleEvent, SessionRuntime};
