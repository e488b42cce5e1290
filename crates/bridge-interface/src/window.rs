use crate::Failure;

/// Stage markers the capture driver reports as it leaves the scanning
/// loop. The driver never reports a fraction of 1.0 before `Complete`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProcessingState {
    Processing,
    Formatting,
    Saving,
    Complete,
    Cancelled,
}

/// One progress report from the driver's scan loop.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptProgress {
    #[serde(default)]
    pub segments: usize,
    /// Completion fraction in `0..=0.99` while scanning; derived from
    /// timestamps when available, scroll position otherwise.
    #[serde(default)]
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_new_segments: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_timestamp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_started: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_state: Option<ProcessingState>,
}

impl TranscriptProgress {
    pub fn started() -> Self {
        Self {
            has_started: Some(true),
            ..Default::default()
        }
    }

    pub fn state(state: ProcessingState) -> Self {
        Self {
            processing_state: Some(state),
            ..Default::default()
        }
    }
}

/// In-frame driver → page orchestrator, one-way. Bound to the session that
/// started the capture rather than broadcast.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum WindowMessage {
    TranscriptButtonClicked {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<Failure>,
    },
    TranscriptProgress(TranscriptProgress),
}

/// Receiving end of the window channel. Emission must never block the
/// sender's loop; a sink with nobody listening simply drops the message.
pub trait WindowSink: Send + Sync {
    fn emit(&self, message: WindowMessage);
}

impl WindowSink for tokio::sync::mpsc::UnboundedSender<WindowMessage> {
    fn emit(&self, message: WindowMessage) {
        let _ = self.send(message);
    }
}
