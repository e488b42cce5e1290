//! Wire types for the capture bridge.
//!
//! Three directional channels, all tagged unions keyed by an `action`
//! field so any message-passing host can route them:
//!
//! - [`BridgeRequest`]/[`BridgeReply`]: page orchestrator to privileged
//!   coordinator, request/response.
//! - [`PageRequest`]/[`PageReply`]: popup/coordinator to page, request/response.
//! - [`WindowMessage`]: capture driver (in the player frame) up to the
//!   page orchestrator, fire-and-forget progress stream.
//!
//! Errors never cross a context boundary as native errors; they travel as
//! [`Failure`] payloads inside replies.

mod bridge;
mod failure;
mod page;
mod transport;
mod window;

pub use bridge::{BridgeReply, BridgeRequest};
pub use failure::{Failure, FailureKind};
pub use page::{PageReply, PageRequest, VideoSummary};
pub use transport::{BridgeTransport, TransportError};
pub use window::{ProcessingState, TranscriptProgress, WindowMessage, WindowSink};

pub const PROTOCOL_VERSION: u32 = 1;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct TabId(pub i64);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct FrameId(pub i64);

/// One browsing-context frame within a tab. Resolved lazily per capture
/// and never reused across a frame reload.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct FrameLocation {
    #[serde(rename = "tabId")]
    pub tab: TabId,
    #[serde(rename = "frameId")]
    pub frame: FrameId,
}

impl FrameLocation {
    pub fn new(tab: TabId, frame: FrameId) -> Self {
        Self { tab, frame }
    }
}

impl std::fmt::Display for FrameLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tab {} frame {}", self.tab.0, self.frame.0)
    }
}
