//! The scroll-and-scan capture driver.
//!
//! Runs entirely inside the player frame's context: locate the transcript
//! panel (tolerating lazy rendering), crawl it from the top with a paced
//! scroll-and-scan loop until the list stops yielding, then clean the text
//! and hand it to the host's download mechanism. Every internal failure
//! resolves as a structured [`Failure`]; nothing escapes the driver as a
//! panic or error type the message channel could not carry.

use std::sync::Arc;
use std::time::Duration;

use lectern_bridge_interface::{
    Failure, FailureKind, ProcessingState, TranscriptProgress, WindowMessage, WindowSink,
};
use lectern_transcript::{strip_standalone_timestamps, tidy, with_txt_extension};
use tokio_util::sync::CancellationToken;

use crate::dom::{CuePanel, FrameDom};
use crate::panel::locate_panel;
use crate::scanner::TranscriptScanner;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DriverConfig {
    /// Grace period before the first locate attempt, covering the panel's
    /// opening animation.
    pub initial_settle: Duration,
    /// Wall-clock spacing of scroll/scan ticks.
    pub poll_interval: Duration,
    /// Hard cap on ticks, in case the container keeps re-flowing.
    pub max_ticks: u32,
    /// Absolute wall-clock bound on the scanning loop.
    pub safety_timeout: Duration,
    /// Consecutive quiet ticks before content counts as exhausted.
    pub idle_ticks: u32,
    /// How close to the bottom (in pixels) counts as "at the bottom".
    /// Tuned against one specific widget layout; retune, don't inline.
    pub near_bottom_px: f64,
    /// Pause before heavy text processing and again before the save, so a
    /// progress UI can visibly catch up.
    pub pacing_delay: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            initial_settle: Duration::from_secs(1),
            poll_interval: Duration::from_millis(250),
            max_ticks: 250,
            safety_timeout: Duration::from_secs(45),
            idle_ticks: 3,
            near_bottom_px: 10.0,
            pacing_delay: Duration::from_millis(500),
        }
    }
}

impl DriverConfig {
    /// Scroll step in pixels, adapted to the viewport: wider panels scroll
    /// faster, clamped to a sane band.
    pub fn scroll_step(&self, viewport_width: f64) -> f64 {
        (225.0 + viewport_width / 5.0).clamp(120.0, 400.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutput {
    pub file_name: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanEnd {
    ReachedEnd,
    MaxTicks,
    Timeout,
}

/// Run one complete capture attempt against `dom`.
///
/// The returned future suspends only on timers and honours `cancel` at the
/// top of every tick and between the final processing stages. Each attempt
/// owns a fresh cue set; retries never see a predecessor's state.
pub async fn run(
    dom: Arc<dyn FrameDom>,
    video_title: &str,
    config: &DriverConfig,
    runtime: Arc<dyn WindowSink>,
    cancel: CancellationToken,
) -> Result<CaptureOutput, Failure> {
    tokio::select! {
        _ = cancel.cancelled() => return Err(Failure::cancelled()),
        _ = tokio::time::sleep(config.initial_settle) => {}
    }

    let Some(panel) = locate_panel(dom.as_ref()) else {
        tracing::warn!("transcript_container_not_found");
        return Err(Failure::new(
            FailureKind::ContainerNotFound,
            "Transcript container not found after trying multiple methods",
        ));
    };

    panel.scroll_to(0.0);

    let mut scanner = TranscriptScanner::new();
    scanner.absorb(&panel.cues());

    runtime.emit(WindowMessage::TranscriptProgress(
        TranscriptProgress::started(),
    ));

    let end = scan_loop(panel.as_ref(), &mut scanner, config, &runtime, &cancel).await?;
    tracing::info!(reason = ?end, segments = scanner.cue_count(), "capture_scan_complete");

    finish(dom.as_ref(), scanner, video_title, config, &runtime, &cancel).await
}

async fn scan_loop(
    panel: &dyn CuePanel,
    scanner: &mut TranscriptScanner,
    config: &DriverConfig,
    runtime: &Arc<dyn WindowSink>,
    cancel: &CancellationToken,
) -> Result<ScanEnd, Failure> {
    let deadline = tokio::time::Instant::now() + config.safety_timeout;
    let scroll_step = config.scroll_step(panel.metrics().viewport_width);

    let mut last_top = f64::NEG_INFINITY;
    let mut last_count = 0usize;
    let mut quiet_ticks = 0u32;

    for _tick in 0..config.max_ticks {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("capture_cancelled_mid_scan");
                return Err(Failure::cancelled());
            }
            _ = tokio::time::sleep_until(deadline) => {
                return Ok(ScanEnd::Timeout);
            }
            _ = tokio::time::sleep(config.poll_interval) => {}
        }

        panel.scroll_by(scroll_step);

        let delta = scanner.absorb(&panel.cues());
        let metrics = panel.metrics();

        runtime.emit(WindowMessage::TranscriptProgress(TranscriptProgress {
            segments: delta.total,
            progress: scanner.progress(&metrics),
            has_new_segments: Some(delta.found_new()),
            latest_timestamp: Some(scanner.latest_timestamp()),
            estimated_duration: Some(scanner.estimated_duration()),
            ..Default::default()
        }));

        // Three independent end-of-content signals: the scroll offset froze,
        // we are within the near-bottom band, and the cue count froze.
        let scroll_frozen = metrics.top == last_top;
        let near_bottom = metrics.top + metrics.viewport_height >= metrics.content_height - config.near_bottom_px;
        let count_frozen = delta.total == last_count && delta.total > 0;

        if (scroll_frozen || near_bottom) && count_frozen {
            quiet_ticks += 1;
            if quiet_ticks >= config.idle_ticks {
                return Ok(ScanEnd::ReachedEnd);
            }
        } else {
            quiet_ticks = 0;
        }

        last_top = metrics.top;
        last_count = delta.total;
    }

    Ok(ScanEnd::MaxTicks)
}

async fn finish(
    dom: &dyn FrameDom,
    scanner: TranscriptScanner,
    video_title: &str,
    config: &DriverConfig,
    runtime: &Arc<dyn WindowSink>,
    cancel: &CancellationToken,
) -> Result<CaptureOutput, Failure> {
    if cancel.is_cancelled() {
        return Err(Failure::cancelled());
    }

    runtime.emit(WindowMessage::TranscriptProgress(
        TranscriptProgress::state(ProcessingState::Processing),
    ));
    tokio::time::sleep(config.pacing_delay).await;

    if cancel.is_cancelled() {
        return Err(Failure::cancelled());
    }

    let assembled = strip_standalone_timestamps(&scanner.assemble());

    runtime.emit(WindowMessage::TranscriptProgress(
        TranscriptProgress::state(ProcessingState::Formatting),
    ));
    let text = tidy(&assembled);

    runtime.emit(WindowMessage::TranscriptProgress(
        TranscriptProgress::state(ProcessingState::Saving),
    ));
    let file_name = with_txt_extension(video_title);

    runtime.emit(WindowMessage::TranscriptProgress(TranscriptProgress {
        progress: 1.0,
        processing_state: Some(ProcessingState::Complete),
        ..Default::default()
    }));

    // Let the progress UI visibly reach 100% before the download appears.
    tokio::time::sleep(config.pacing_delay).await;

    if cancel.is_cancelled() {
        return Err(Failure::cancelled());
    }

    if !dom.save_file(&file_name, &text) {
        tracing::error!(%file_name, "transcript_save_failed");
        return Err(Failure::new(
            FailureKind::CaptureFailed,
            "Failed to hand transcript to the download mechanism",
        ));
    }

    tracing::info!(%file_name, chars = text.len(), "transcript_saved");
    Ok(CaptureOutput { file_name, text })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use lectern_bridge_interface::ProcessingState;

    use super::*;
    use crate::dom::{ButtonView, CueView, ScrollMetrics};

    /// A virtualized transcript list: cues materialise as the scroll
    /// offset advances, the way the real panel lazily loads.
    struct FakePanel {
        state: Mutex<PanelState>,
    }

    struct PanelState {
        top: f64,
        all_cues: Vec<CueView>,
        revealed: usize,
    }

    const CONTENT_HEIGHT: f64 = 2000.0;
    const VIEWPORT_HEIGHT: f64 = 400.0;

    impl FakePanel {
        fn with_cues(cues: Vec<(&str, &str)>) -> Arc<Self> {
            Arc::new(Self {
                state: Mutex::new(PanelState {
                    top: 0.0,
                    all_cues: cues
                        .into_iter()
                        .map(|(id, text)| CueView {
                            dom_id: Some(id.to_string()),
                            text: text.to_string(),
                        })
                        .collect(),
                    revealed: 1,
                }),
            })
        }
    }

    impl CuePanel for FakePanel {
        fn visible(&self) -> bool {
            true
        }

        fn cues(&self) -> Vec<CueView> {
            let state = self.state.lock().unwrap();
            state.all_cues[..state.revealed.min(state.all_cues.len())].to_vec()
        }

        fn text(&self) -> String {
            self.cues()
                .iter()
                .map(|c| c.text.clone())
                .collect::<Vec<_>>()
                .join("\n")
        }

        fn metrics(&self) -> ScrollMetrics {
            let state = self.state.lock().unwrap();
            ScrollMetrics {
                top: state.top,
                content_height: CONTENT_HEIGHT,
                viewport_height: VIEWPORT_HEIGHT,
                viewport_width: 640.0,
            }
        }

        fn scroll_to(&self, top: f64) {
            self.state.lock().unwrap().top = top;
        }

        fn scroll_by(&self, delta: f64) {
            let mut state = self.state.lock().unwrap();
            state.top = (state.top + delta).clamp(0.0, CONTENT_HEIGHT - VIEWPORT_HEIGHT);
            // Scrolling reveals one more cue per step.
            state.revealed = (state.revealed + 1).min(state.all_cues.len());
        }
    }

    struct FakeFrame {
        panel: Arc<FakePanel>,
        saved: Mutex<Option<(String, String)>>,
    }

    impl FakeFrame {
        fn new(panel: Arc<FakePanel>) -> Arc<Self> {
            Arc::new(Self {
                panel,
                saved: Mutex::new(None),
            })
        }
    }

    impl FrameDom for FakeFrame {
        fn marked_panel(&self) -> Option<Arc<dyn CuePanel>> {
            Some(self.panel.clone())
        }

        fn list_panels(&self) -> Vec<Arc<dyn CuePanel>> {
            vec![self.panel.clone()]
        }

        fn buttons(&self) -> Vec<ButtonView> {
            vec![]
        }

        fn press(&self, _index: usize) -> bool {
            false
        }

        fn save_file(&self, file_name: &str, contents: &str) -> bool {
            *self.saved.lock().unwrap() = Some((file_name.to_string(), contents.to_string()));
            true
        }
    }

    fn runtime() -> (
        Arc<tokio::sync::mpsc::UnboundedSender<WindowMessage>>,
        tokio::sync::mpsc::UnboundedReceiver<WindowMessage>,
    ) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (Arc::new(tx), rx)
    }

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<WindowMessage>) -> Vec<WindowMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn end_to_end_capture_produces_clean_text_and_filename() {
        // Each cue renders its clock and its words as separate lines, the
        // way element inner text comes out of the real panel.
        let panel = FakePanel::with_cues(vec![
            ("transcript-cue-0", "0:01\nHello"),
            ("transcript-cue-1", "0:01\nHello"),
            ("transcript-cue-2", "0:05\nworld."),
        ]);
        let frame = FakeFrame::new(panel);
        let (tx, mut rx) = runtime();

        let output = run(
            frame.clone(),
            "Week 3_ Intro",
            &DriverConfig::default(),
            tx,
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(output.file_name, "Week 3_ Intro.txt");
        assert_eq!(output.text, "Hello world.");

        let saved = frame.saved.lock().unwrap().clone().unwrap();
        assert_eq!(saved.0, output.file_name);
        assert_eq!(saved.1, output.text);

        let messages = drain(&mut rx);
        assert!(matches!(
            messages.first(),
            Some(WindowMessage::TranscriptProgress(p)) if p.has_started == Some(true)
        ));
        let states: Vec<_> = messages
            .iter()
            .filter_map(|m| match m {
                WindowMessage::TranscriptProgress(p) => p.processing_state,
                _ => None,
            })
            .collect();
        assert_eq!(
            states,
            [
                ProcessingState::Processing,
                ProcessingState::Formatting,
                ProcessingState::Saving,
                ProcessingState::Complete,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn frozen_container_terminates_with_single_processing_transition() {
        // One cue, never any more: scroll freezes at the bottom and the
        // count never changes, so the idle-tick rule must end the loop.
        let panel = FakePanel::with_cues(vec![("transcript-cue-0", "0:01 Only cue.")]);
        let frame = FakeFrame::new(panel);
        let (tx, mut rx) = runtime();

        run(
            frame,
            "solo",
            &DriverConfig::default(),
            tx,
            CancellationToken::new(),
        )
        .await
        .unwrap();

        let processing_count = drain(&mut rx)
            .iter()
            .filter(|m| {
                matches!(
                    m,
                    WindowMessage::TranscriptProgress(p)
                        if p.processing_state == Some(ProcessingState::Processing)
                )
            })
            .count();
        assert_eq!(processing_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_loop_without_saving() {
        let cues: Vec<(String, String)> = (0..500)
            .map(|i| (format!("transcript-cue-{i}"), format!("0:{:02} words", i % 60)))
            .collect();
        let panel = FakePanel::with_cues(cues.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect());
        let frame = FakeFrame::new(panel);
        let (tx, _rx) = runtime();
        let cancel = CancellationToken::new();

        let driver = tokio::spawn({
            let frame = frame.clone();
            let cancel = cancel.clone();
            async move {
                run(frame, "cancelled", &DriverConfig::default(), tx, cancel).await
            }
        });

        tokio::time::sleep(Duration::from_secs(2)).await;
        cancel.cancel();

        let result = driver.await.unwrap();
        assert_eq!(result.unwrap_err().kind, FailureKind::CancelledByUser);
        assert!(frame.saved.lock().unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_container_fails_structured() {
        struct EmptyFrame;
        impl FrameDom for EmptyFrame {
            fn marked_panel(&self) -> Option<Arc<dyn CuePanel>> {
                None
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
                false
            }
        }

        let (tx, _rx) = runtime();
        let result = run(
            Arc::new(EmptyFrame),
            "missing",
            &DriverConfig::default(),
            tx,
            CancellationToken::new(),
        )
        .await;

        assert_eq!(result.unwrap_err().kind, FailureKind::ContainerNotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn reflowing_container_hits_safety_timeout() {
        /// A panel whose scroll offset jitters forever and keeps "finding"
        /// new cues, defeating the end-of-content heuristic.
        struct RestlessPanel {
            state: Mutex<(f64, u64)>,
        }

        impl CuePanel for RestlessPanel {
            fn visible(&self) -> bool {
                true
            }
            fn cues(&self) -> Vec<CueView> {
                let count = self.state.lock().unwrap().1;
                (0..=count)
                    .map(|i| CueView {
                        dom_id: Some(format!("transcript-cue-{i}")),
                        text: format!("cue {i}"),
                    })
                    .collect()
            }
            fn text(&self) -> String {
                "0:01".to_string()
            }
            fn metrics(&self) -> ScrollMetrics {
                ScrollMetrics {
                    top: self.state.lock().unwrap().0,
                    content_height: 1_000_000.0,
                    viewport_height: 400.0,
                    viewport_width: 640.0,
                }
            }
            fn scroll_to(&self, top: f64) {
                self.state.lock().unwrap().0 = top;
            }
            fn scroll_by(&self, delta: f64) {
                let mut state = self.state.lock().unwrap();
                state.0 += delta;
                state.1 += 1;
            }
        }

        struct RestlessFrame(Arc<RestlessPanel>);
        impl FrameDom for RestlessFrame {
            fn marked_panel(&self) -> Option<Arc<dyn CuePanel>> {
                Some(self.0.clone())
            }
            fn list_panels(&self) -> Vec<Arc<dyn CuePanel>> {
                vec![self.0.clone()]
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

        let panel = Arc::new(RestlessPanel {
            state: Mutex::new((0.0, 0)),
        });
        let (tx, _rx) = runtime();

        // Tick cap would need 250 ticks * 250ms = 62.5s; the 45s safety
        // timeout must fire first and still resolve successfully.
        let started = tokio::time::Instant::now();
        let result = run(
            Arc::new(RestlessFrame(panel)),
            "restless",
            &DriverConfig::default(),
            tx,
            CancellationToken::new(),
        )
        .await;

        assert!(result.is_ok());
        assert!(started.elapsed() < Duration::from_secs(50));
    }
}
