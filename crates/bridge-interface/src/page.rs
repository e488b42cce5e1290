use crate::Failure;

/// Popup or coordinator → page context.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PageRequest {
    ScanForVideos,
    /// Navigation-triggered scan; same behaviour as `ScanForVideos` but the
    /// reply is not awaited by anyone.
    AutoScanForVideos,
    #[serde(rename_all = "camelCase")]
    ProcessVideo { video_id: u32 },
    #[serde(rename_all = "camelCase")]
    ProcessAllVideos { video_ids: Vec<u32> },
    CancelCapture,
}

/// The DOM-free view of a detected video, as listed in the popup.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub id: u32,
    pub video_id: String,
    pub title: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PageReply {
    Videos { videos: Vec<VideoSummary> },
    #[serde(rename_all = "camelCase")]
    Capture {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<Failure>,
    },
    Ack { success: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_all_round_trips() {
        let req = PageRequest::ProcessAllVideos {
            video_ids: vec![0, 2],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["action"], "processAllVideos");
        assert_eq!(json["videoIds"][1], 2);
        assert_eq!(serde_json::from_value::<PageRequest>(json).unwrap(), req);
    }
}
