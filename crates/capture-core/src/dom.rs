use std::sync::Arc;

/// One interactive control in the frame, as much of it as the opener needs.
#[derive(Debug, Clone, Default)]
pub struct ButtonView {
    /// Visible text content.
    pub label: String,
    /// Accessible label, when the control carries one.
    pub aria_label: Option<String>,
    /// Whether the control reports an active/pressed state.
    pub pressed: bool,
}

/// One cue element inside a transcript list.
#[derive(Debug, Clone)]
pub struct CueView {
    /// The element's DOM id, when it has one (`transcript-cue-N` on the
    /// player this was tuned against).
    pub dom_id: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollMetrics {
    pub top: f64,
    pub content_height: f64,
    pub viewport_height: f64,
    pub viewport_width: f64,
}

impl ScrollMetrics {
    /// The largest reachable scroll offset.
    pub fn max_top(&self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }
}

/// A scrollable list element that may be (or contain) the transcript.
pub trait CuePanel: Send + Sync {
    fn visible(&self) -> bool;
    fn cues(&self) -> Vec<CueView>;
    /// Full text content, used by the timestamp-shape heuristic.
    fn text(&self) -> String;
    fn metrics(&self) -> ScrollMetrics;
    fn scroll_to(&self, top: f64);
    fn scroll_by(&self, delta: f64);
}

/// Host-side view of the player frame's document.
///
/// Implementations are snapshots over live state: each call re-reads the
/// frame, so a lazily rendering player is observed as it loads. All methods
/// are infallible by contract; a frame that has navigated away simply
/// reports no panels and no buttons.
pub trait FrameDom: Send + Sync {
    /// The panel the player itself marks as the loaded transcript list,
    /// when that marker is present.
    fn marked_panel(&self) -> Option<Arc<dyn CuePanel>>;
    /// Every list-like element currently in the document.
    fn list_panels(&self) -> Vec<Arc<dyn CuePanel>>;
    fn buttons(&self) -> Vec<ButtonView>;
    /// Click the `index`th button from the last `buttons()` snapshot.
    fn press(&self, index: usize) -> bool;
    /// Hand the finished transcript to the host's download mechanism.
    fn save_file(&self, file_name: &str, contents: &str) -> bool;
}
