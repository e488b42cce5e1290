use lectern_bridge_interface::Failure;

/// Lifecycle notifications for the presentation layer (overlay, popup).
///
/// On `Failed` the UI is expected to swap its Cancel action for Retry and
/// Close; Retry is simply a new `ProcessVideo` request, Close reports the
/// failure to whoever is waiting.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionLifecycleEvent {
    #[serde(rename_all = "camelCase")]
    Started {
        session_id: String,
        video_id: u32,
        title: String,
        /// True when this capture runs under a batch: the shared batch UI
        /// replaces the per-video overlay and its cancel control.
        batch: bool,
    },
    #[serde(rename_all = "camelCase")]
    Completed {
        session_id: String,
        file_name: String,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        session_id: String,
        error: Failure,
        can_retry: bool,
    },
    #[serde(rename_all = "camelCase")]
    Ended { session_id: String },
    #[serde(rename_all = "camelCase")]
    BatchAdvanced { completed: usize, total: usize },
    #[serde(rename_all = "camelCase")]
    BatchFinished { total: usize },
}

/// One frame of the smoothed progress animation.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressFrame {
    pub session_id: String,
    /// Displayed fraction, 0..=1. Non-decreasing within one attempt.
    pub displayed: f64,
    pub message: String,
}

/// Rendering sink for everything the user sees. The orchestrator pushes;
/// the presentation layer draws. Implementations must not block.
pub trait SessionRuntime: Send + Sync {
    fn emit_progress(&self, frame: ProgressFrame);
    fn emit_lifecycle(&self, event: SessionLifecycleEvent);
}
