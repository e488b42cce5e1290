use std::sync::Arc;

use lectern_bridge_interface::{FrameId, FrameLocation, PageRequest, TabId};
use lectern_capture_core::FrameDom;

/// The main document of a tab, as opposed to its iframes.
pub const MAIN_FRAME: FrameId = FrameId(0);

#[derive(Debug, Clone, thiserror::Error)]
pub enum HostError {
    #[error("tab {} no longer exists", (.0).0)]
    TabGone(TabId),
    #[error("frame {0} no longer exists")]
    FrameGone(FrameLocation),
    #[error("host unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct FrameInfo {
    pub frame: FrameId,
    pub url: String,
}

/// A completed navigation, as observed by the host.
#[derive(Debug, Clone)]
pub struct NavigationEvent {
    pub tab: TabId,
    pub frame: FrameId,
    pub url: String,
}

/// Privileged capabilities the host environment grants the coordinator:
/// frame enumeration and the ability to run code in a specific frame
/// (surfaced here as handing out that frame's [`FrameDom`]).
///
/// Any operation may fail because the tab or frame has been torn down in
/// the meantime; callers treat that as unknown state, not progress.
#[async_trait::async_trait]
pub trait FrameHost: Send + Sync {
    /// The tab currently interacting with the user, if the host knows it.
    async fn active_tab(&self) -> Option<TabId>;

    async fn frames(&self, tab: TabId) -> Result<Vec<FrameInfo>, HostError>;

    async fn frame_dom(&self, location: FrameLocation) -> Result<Arc<dyn FrameDom>, HostError>;

    async fn reload_frame(&self, location: FrameLocation) -> Result<(), HostError>;

    /// Hard reload of the whole tab. Only ever triggered by the user.
    async fn reload_tab(&self, tab: TabId) -> Result<(), HostError>;

    /// Update the toolbar badge; a count of zero clears it.
    fn set_badge(&self, count: usize);
}

/// Downward channel to a tab's page context, used for scan triggers.
#[async_trait::async_trait]
pub trait PageSink: Send + Sync {
    async fn send(&self, tab: TabId, request: PageRequest);
}
