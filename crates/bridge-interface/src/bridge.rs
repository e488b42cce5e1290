use crate::{Failure, FrameId, TabId};

/// Page orchestrator → privileged coordinator.
///
/// `ResetTranscriptPanel` and `UpdateBadge` are fire-and-forget; everything
/// else expects a [`BridgeReply`]. `ReloadTab` is only ever issued as an
/// explicit user action, never by the retry machinery, whose automatic
/// remedy is `ReloadFrame`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum BridgeRequest {
    GetTabId,
    #[serde(rename_all = "camelCase")]
    FindFrameId {
        tab_id: TabId,
        video_id: String,
        video_src: String,
    },
    #[serde(rename_all = "camelCase")]
    CheckTranscriptOpen { tab_id: TabId, frame_id: FrameId },
    #[serde(rename_all = "camelCase")]
    ClickTranscriptButton { tab_id: TabId, frame_id: FrameId },
    #[serde(rename_all = "camelCase")]
    ScrollToTop { tab_id: TabId, frame_id: FrameId },
    #[serde(rename_all = "camelCase")]
    CaptureTranscriptContinuous {
        tab_id: TabId,
        frame_id: FrameId,
        video_title: String,
    },
    #[serde(rename_all = "camelCase")]
    ResetTranscriptPanel { tab_id: TabId, frame_id: FrameId },
    #[serde(rename_all = "camelCase")]
    ReloadFrame { tab_id: TabId, frame_id: FrameId },
    #[serde(rename_all = "camelCase")]
    CancelCapture { tab_id: TabId, frame_id: FrameId },
    UpdateBadge { count: usize },
    #[serde(rename_all = "camelCase")]
    ReloadTab { tab_id: TabId },
}

/// Coordinator → page orchestrator responses.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BridgeReply {
    #[serde(rename_all = "camelCase")]
    TabId { tab_id: TabId },
    #[serde(rename_all = "camelCase")]
    FrameId { frame_id: FrameId },
    #[serde(rename_all = "camelCase")]
    TranscriptOpen { is_open: bool },
    Ack {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<Failure>,
    },
    #[serde(rename_all = "camelCase")]
    Capture {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<Failure>,
    },
    Error { error: Failure },
}

impl BridgeReply {
    pub fn ok() -> Self {
        BridgeReply::Ack {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: Failure) -> Self {
        BridgeReply::Ack {
            success: false,
            error: Some(error),
        }
    }

    /// The failure carried by this reply, if it represents one.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            BridgeReply::Ack {
                error: Some(e),
                success: false,
                ..
            } => Some(e),
            BridgeReply::Capture {
                error: Some(e),
                success: false,
                ..
            } => Some(e),
            BridgeReply::Error { error } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::FailureKind;

    use super::*;

    #[test]
    fn requests_round_trip_with_action_tags() {
        let req = BridgeRequest::FindFrameId {
            tab_id: TabId(4),
            video_id: "123456789".into(),
            video_src: "https://player.vimeo.com/video/123456789".into(),
        };

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["action"], "findFrameId");
        assert_eq!(json["tabId"], 4);
        assert_eq!(json["videoId"], "123456789");

        let back: BridgeRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn capture_reply_round_trips() {
        let reply = BridgeReply::Capture {
            success: false,
            file_name: None,
            text: None,
            error: Some(Failure::new(FailureKind::CaptureFailed, "boom")),
        };

        let json = serde_json::to_string(&reply).unwrap();
        let back: BridgeReply = serde_json::from_str(&json).unwrap();
        assert_eq!(back.failure().unwrap().kind, FailureKind::CaptureFailed);
    }
}
