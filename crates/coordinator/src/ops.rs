use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lectern_bridge_interface::{
    BridgeReply, BridgeRequest, Failure, FailureKind, FrameLocation, PageRequest,
    ProcessingState, TabId, TranscriptProgress, WindowMessage, WindowSink,
};
use lectern_capture_core::{
    DriverConfig, OpenerConfig, driver, is_transcript_open, open_transcript,
    scroll_to_top,
};
use tokio_util::sync::CancellationToken;

use crate::host::{FrameHost, HostError, MAIN_FRAME, NavigationEvent, PageSink};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CoordinatorConfig {
    /// Domain fragment a frame URL must contain to be the player frame.
    pub provider_domain: String,
    /// Domain fragment gating the navigation-triggered auto-scan.
    pub lms_domain: String,
    /// Settle delay between a completed navigation and the auto-scan.
    pub auto_scan_settle: Duration,
    pub opener: OpenerConfig,
    pub driver: DriverConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            provider_domain: "vimeo.com".to_string(),
            lms_domain: "lms.example.edu".to_string(),
            auto_scan_settle: Duration::from_millis(1500),
            opener: OpenerConfig::default(),
            driver: DriverConfig::default(),
        }
    }
}

/// Handles [`BridgeRequest`]s with the privileges the [`FrameHost`] grants.
///
/// Every reply is well-formed even when the underlying tab or frame has
/// vanished; the failure travels inside the reply payload, never as a
/// transport-level error from here.
pub struct Coordinator {
    host: Arc<dyn FrameHost>,
    window_sink: Arc<dyn WindowSink>,
    pages: Arc<dyn PageSink>,
    config: CoordinatorConfig,
    active_tab: Mutex<Option<TabId>>,
    captures: Mutex<HashMap<FrameLocation, CancellationToken>>,
}

impl Coordinator {
    pub fn new(
        host: Arc<dyn FrameHost>,
        window_sink: Arc<dyn WindowSink>,
        pages: Arc<dyn PageSink>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            host,
            window_sink,
            pages,
            config,
            active_tab: Mutex::new(None),
            captures: Mutex::new(HashMap::new()),
        }
    }

    /// Record the tab a message arrived from; the most recent sender is the
    /// fallback answer for `GetTabId`.
    pub fn note_sender_tab(&self, tab: TabId) {
        *self.active_tab.lock().unwrap() = Some(tab);
    }

    /// Host hook for tab-activation events.
    pub fn on_tab_activated(&self, tab: TabId) {
        *self.active_tab.lock().unwrap() = Some(tab);
    }

    pub async fn handle_from(&self, sender: TabId, request: BridgeRequest) -> BridgeReply {
        self.note_sender_tab(sender);
        self.handle(request).await
    }

    pub async fn handle(&self, request: BridgeRequest) -> BridgeReply {
        match request {
            BridgeRequest::GetTabId => self.get_tab_id().await,
            BridgeRequest::FindFrameId {
                tab_id,
                video_id,
                video_src,
            } => self.find_frame_id(tab_id, &video_id, &video_src).await,
            BridgeRequest::CheckTranscriptOpen { tab_id, frame_id } => {
                self.check_transcript_open(FrameLocation::new(tab_id, frame_id))
                    .await
            }
            BridgeRequest::ClickTranscriptButton { tab_id, frame_id } => {
                self.click_transcript_button(FrameLocation::new(tab_id, frame_id))
                    .await
            }
            BridgeRequest::ScrollToTop { tab_id, frame_id } => {
                self.scroll_to_top(FrameLocation::new(tab_id, frame_id)).await
            }
            BridgeRequest::CaptureTranscriptContinuous {
                tab_id,
                frame_id,
                video_title,
            } => {
                self.capture(FrameLocation::new(tab_id, frame_id), &video_title)
                    .await
            }
            BridgeRequest::ResetTranscriptPanel { tab_id, frame_id } => {
                self.reset_panel(FrameLocation::new(tab_id, frame_id)).await
            }
            BridgeRequest::ReloadFrame { tab_id, frame_id } => {
                self.reload_frame(FrameLocation::new(tab_id, frame_id)).await
            }
            BridgeRequest::CancelCapture { tab_id, frame_id } => {
                self.cancel_capture(FrameLocation::new(tab_id, frame_id))
            }
            BridgeRequest::UpdateBadge { count } => {
                self.host.set_badge(count);
                BridgeReply::ok()
            }
            BridgeRequest::ReloadTab { tab_id } => self.reload_tab(tab_id).await,
        }
    }

    /// Navigation hook: completed main-frame navigations on the LMS domain
    /// schedule a page scan once the page has had a moment to settle.
    pub async fn handle_navigation(&self, event: NavigationEvent) {
        if event.frame != MAIN_FRAME || !event.url.contains(&self.config.lms_domain) {
            return;
        }

        tracing::debug!(tab = event.tab.0, url = %event.url, "auto_scan_scheduled");
        tokio::time::sleep(self.config.auto_scan_settle).await;
        self.pages
            .send(event.tab, PageRequest::AutoScanForVideos)
            .await;
    }

    async fn get_tab_id(&self) -> BridgeReply {
        let cached = *self.active_tab.lock().unwrap();
        let tab = match cached {
            Some(tab) => Some(tab),
            None => self.host.active_tab().await,
        };

        match tab {
            Some(tab_id) => BridgeReply::TabId { tab_id },
            None => BridgeReply::Error {
                error: Failure::new(FailureKind::TabNotFound, "Could not get tab ID"),
            },
        }
    }

    async fn find_frame_id(&self, tab: TabId, video_id: &str, video_src: &str) -> BridgeReply {
        let frames = match self.host.frames(tab).await {
            Ok(frames) => frames,
            Err(e) => return BridgeReply::Error {
                error: host_failure(e),
            },
        };

        let target = frames.iter().find(|frame| {
            frame.url.contains(&self.config.provider_domain)
                && (frame.url.contains(video_id) || frame.url.contains(video_src))
        });

        match target {
            Some(frame) => {
                tracing::debug!(tab = tab.0, frame = frame.frame.0, "target_frame_found");
                BridgeReply::FrameId {
                    frame_id: frame.frame,
                }
            }
            None => BridgeReply::Error {
                error: Failure::new(FailureKind::FrameNotFound, "Frame not found"),
            },
        }
    }

    async fn check_transcript_open(&self, location: FrameLocation) -> BridgeReply {
        match self.host.frame_dom(location).await {
            Ok(dom) => BridgeReply::TranscriptOpen {
                is_open: is_transcript_open(dom.as_ref()),
            },
            Err(e) => {
                // Unknown state is reported as "not open"; the caller will
                // go through the opener, which tolerates an open panel.
                tracing::warn!(%location, error = %e, "transcript_check_failed");
                BridgeReply::TranscriptOpen { is_open: false }
            }
        }
    }

    async fn click_transcript_button(&self, location: FrameLocation) -> BridgeReply {
        let dom = match self.host.frame_dom(location).await {
            Ok(dom) => dom,
            Err(e) => return BridgeReply::failed(host_failure(e)),
        };

        let token = self.capture_token(location);
        match open_transcript(dom, &self.config.opener, self.window_sink.clone(), token).await {
            Ok(()) => BridgeReply::ok(),
            Err(failure) => BridgeReply::failed(failure),
        }
    }

    async fn scroll_to_top(&self, location: FrameLocation) -> BridgeReply {
        match self.host.frame_dom(location).await {
            Ok(dom) => BridgeReply::Ack {
                success: scroll_to_top(dom.as_ref()),
                error: None,
            },
            Err(e) => BridgeReply::failed(host_failure(e)),
        }
    }

    async fn capture(&self, location: FrameLocation, video_title: &str) -> BridgeReply {
        let dom = match self.host.frame_dom(location).await {
            Ok(dom) => dom,
            Err(e) => {
                return BridgeReply::Capture {
                    success: false,
                    file_name: None,
                    text: None,
                    error: Some(host_failure(e)),
                };
            }
        };

        tracing::info!(%location, title = %video_title, "capture_injected");
        let token = self.capture_token(location);
        let result = driver::run(
            dom,
            video_title,
            &self.config.driver,
            self.window_sink.clone(),
            token,
        )
        .await;

        match result {
            Ok(output) => BridgeReply::Capture {
                success: true,
                file_name: Some(output.file_name),
                text: Some(output.text),
                error: None,
            },
            Err(failure) => BridgeReply::Capture {
                success: false,
                file_name: None,
                text: None,
                error: Some(failure),
            },
        }
    }

    async fn reset_panel(&self, location: FrameLocation) -> BridgeReply {
        // Best-effort: scroll the panel back up and leave it open for the
        // user to review. Failures are logged, never propagated.
        match self.host.frame_dom(location).await {
            Ok(dom) => {
                scroll_to_top(dom.as_ref());
            }
            Err(e) => {
                tracing::debug!(%location, error = %e, "reset_panel_skipped");
            }
        }
        BridgeReply::ok()
    }

    async fn reload_frame(&self, location: FrameLocation) -> BridgeReply {
        // The frame's execution context dies with the reload; any capture
        // still bound to it must not outlive it.
        self.cancel_location(location);

        match self.host.reload_frame(location).await {
            Ok(()) => BridgeReply::ok(),
            Err(e) => BridgeReply::failed(host_failure(e)),
        }
    }

    fn cancel_capture(&self, location: FrameLocation) -> BridgeReply {
        let had_capture = self.cancel_location(location);
        tracing::info!(%location, had_capture, "capture_cancel_requested");

        self.window_sink
            .emit(WindowMessage::TranscriptProgress(TranscriptProgress::state(
                ProcessingState::Cancelled,
            )));

        BridgeReply::ok()
    }

    async fn reload_tab(&self, tab: TabId) -> BridgeReply {
        match self.host.reload_tab(tab).await {
            Ok(()) => BridgeReply::ok(),
            Err(e) => BridgeReply::failed(host_failure(e)),
        }
    }

    fn capture_token(&self, location: FrameLocation) -> CancellationToken {
        self.captures
            .lock()
            .unwrap()
            .entry(location)
            .or_default()
            .clone()
    }

    fn cancel_location(&self, location: FrameLocation) -> bool {
        match self.captures.lock().unwrap().remove(&location) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

fn host_failure(error: HostError) -> Failure {
    let kind = match &error {
        HostError::TabGone(_) => FailureKind::TabNotFound,
        HostError::FrameGone(_) => FailureKind::FrameNotFound,
        HostError::Unavailable(_) => FailureKind::CaptureFailed,
    };
    Failure::new(kind, error.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use lectern_bridge_interface::FrameId;
    use lectern_capture_core::{ButtonView, CuePanel, CueView, FrameDom};

    use super::*;

    #[derive(Default)]
    struct FakeHost {
        active: Mutex<Option<TabId>>,
        frames: Mutex<HashMap<TabId, Vec<crate::host::FrameInfo>>>,
        doms: Mutex<HashMap<FrameLocation, Arc<dyn FrameDom>>>,
        badge: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl FrameHost for FakeHost {
        async fn active_tab(&self) -> Option<TabId> {
            *self.active.lock().unwrap()
        }

        async fn frames(&self, tab: TabId) -> Result<Vec<crate::host::FrameInfo>, HostError> {
            self.frames
                .lock()
                .unwrap()
                .get(&tab)
                .cloned()
                .ok_or(HostError::TabGone(tab))
        }

        async fn frame_dom(&self, location: FrameLocation) -> Result<Arc<dyn FrameDom>, HostError> {
            self.doms
                .lock()
                .unwrap()
                .get(&location)
                .cloned()
                .ok_or(HostError::FrameGone(location))
        }

        async fn reload_frame(&self, _location: FrameLocation) -> Result<(), HostError> {
            Ok(())
        }

        async fn reload_tab(&self, _tab: TabId) -> Result<(), HostError> {
            Ok(())
        }

        fn set_badge(&self, count: usize) {
            self.badge.store(count, Ordering::SeqCst);
        }
    }

    struct NullPages;

    #[async_trait::async_trait]
    impl PageSink for NullPages {
        async fn send(&self, _tab: TabId, _request: PageRequest) {}
    }

    /// A frame whose transcript never ends, for cancellation tests.
    struct EndlessFrame;

    struct EndlessPanel {
        top: Mutex<f64>,
        count: Mutex<u64>,
    }

    impl CuePanel for EndlessPanel {
        fn visible(&self) -> bool {
            true
        }
        fn cues(&self) -> Vec<CueView> {
            let count = *self.count.lock().unwrap();
            (0..=count)
                .map(|i| CueView {
                    dom_id: Some(format!("transcript-cue-{i}")),
                    text: format!("cue {i}"),
                })
                .collect()
        }
        fn text(&self) -> String {
            "0:30".to_string()
        }
        fn metrics(&self) -> lectern_capture_core::ScrollMetrics {
            lectern_capture_core::ScrollMetrics {
                top: *self.top.lock().unwrap(),
                content_height: 1_000_000.0,
                viewport_height: 400.0,
                viewport_width: 640.0,
            }
        }
        fn scroll_to(&self, top: f64) {
            *self.top.lock().unwrap() = top;
        }
        fn scroll_by(&self, delta: f64) {
            *self.top.lock().unwrap() += delta;
            *self.count.lock().unwrap() += 1;
        }
    }

    impl FrameDom for EndlessFrame {
        fn marked_panel(&self) -> Option<Arc<dyn CuePanel>> {
            Some(Arc::new(EndlessPanel {
                top: Mutex::new(0.0),
                count: Mutex::new(0),
            }))
        }
        fn list_panels(&self) -> Vec<Arc<dyn CuePanel>> {
            vec![]
        }
        fn buttons(&self) -> Vec<ButtonView> {
            vec![]
        }
        fn press(&self, _index: usize) -> bool {
            false
        }
        fn save_file(&self, _file_name: &str, _contents: &str) -> bool {
            true
        }
    }

    fn window_channel() -> (
        Arc<tokio::sync::mpsc::UnboundedSender<WindowMessage>>,
        tokio::sync::mpsc::UnboundedReceiver<WindowMessage>,
    ) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (Arc::new(tx), rx)
    }

    fn coordinator(host: Arc<FakeHost>) -> (Arc<Coordinator>, tokio::sync::mpsc::UnboundedReceiver<WindowMessage>) {
        let (tx, rx) = window_channel();
        let coordinator = Arc::new(Coordinator::new(
            host,
            tx,
            Arc::new(NullPages),
            CoordinatorConfig::default(),
        ));
        (coordinator, rx)
    }

    #[tokio::test]
    async fn frame_resolution_matches_provider_and_id() {
        let host = Arc::new(FakeHost::default());
        host.frames.lock().unwrap().insert(
            TabId(1),
            vec![
                crate::host::FrameInfo {
                    frame: FrameId(3),
                    url: "https://cdn.example.com/widget".into(),
                },
                crate::host::FrameInfo {
                    frame: FrameId(7),
                    url: "https://player.vimeo.com/video/123456789".into(),
                },
            ],
        );
        let (coordinator, _rx) = coordinator(host);

        let reply = coordinator
            .handle(BridgeRequest::FindFrameId {
                tab_id: TabId(1),
                video_id: "123456789".into(),
                video_src: "https://player.vimeo.com/video/123456789?h=abc".into(),
            })
            .await;
        assert_eq!(reply, BridgeReply::FrameId { frame_id: FrameId(7) });

        let miss = coordinator
            .handle(BridgeRequest::FindFrameId {
                tab_id: TabId(1),
                video_id: "987".into(),
                video_src: "https://player.vimeo.com/video/987".into(),
            })
            .await;
        assert_eq!(miss.failure().unwrap().kind, FailureKind::FrameNotFound);
    }

    #[tokio::test]
    async fn dead_tab_maps_to_tab_not_found() {
        let (coordinator, _rx) = coordinator(Arc::new(FakeHost::default()));

        let reply = coordinator
            .handle(BridgeRequest::FindFrameId {
                tab_id: TabId(9),
                video_id: "1".into(),
                video_src: "x".into(),
            })
            .await;
        assert_eq!(reply.failure().unwrap().kind, FailureKind::TabNotFound);
    }

    #[tokio::test]
    async fn sender_observation_feeds_tab_id() {
        let (coordinator, _rx) = coordinator(Arc::new(FakeHost::default()));

        let reply = coordinator
            .handle_from(TabId(42), BridgeRequest::GetTabId)
            .await;
        assert_eq!(reply, BridgeReply::TabId { tab_id: TabId(42) });
    }

    #[tokio::test]
    async fn transcript_check_on_dead_frame_reports_closed() {
        let (coordinator, _rx) = coordinator(Arc::new(FakeHost::default()));

        let reply = coordinator
            .handle(BridgeRequest::CheckTranscriptOpen {
                tab_id: TabId(1),
                frame_id: FrameId(2),
            })
            .await;
        assert_eq!(reply, BridgeReply::TranscriptOpen { is_open: false });
    }

    #[tokio::test]
    async fn badge_count_passes_through() {
        let host = Arc::new(FakeHost::default());
        let (coordinator, _rx) = coordinator(host.clone());

        coordinator
            .handle(BridgeRequest::UpdateBadge { count: 3 })
            .await;
        assert_eq!(host.badge.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_capture_stops_inflight_driver() {
        let host = Arc::new(FakeHost::default());
        let location = FrameLocation::new(TabId(1), FrameId(2));
        host.doms
            .lock()
            .unwrap()
            .insert(location, Arc::new(EndlessFrame));
        let (coordinator, _rx) = coordinator(host);

        let capture = tokio::spawn({
            let coordinator = coordinator.clone();
            async move {
                coordinator
                    .handle(BridgeRequest::CaptureTranscriptContinuous {
                        tab_id: TabId(1),
                        frame_id: FrameId(2),
                        video_title: "endless".into(),
                    })
                    .await
            }
        });

        tokio::time::sleep(Duration::from_secs(3)).await;
        coordinator
            .handle(BridgeRequest::CancelCapture {
                tab_id: TabId(1),
                frame_id: FrameId(2),
            })
            .await;

        let reply = capture.await.unwrap();
        assert_eq!(
            reply.failure().unwrap().kind,
            FailureKind::CancelledByUser
        );
    }
}
