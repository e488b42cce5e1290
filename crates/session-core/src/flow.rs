//! The per-video capture sequence and its retry ladder.
//!
//! Every step is a bridge round-trip that can fail because the tab or
//! frame vanished, the player widget is slow, or the transcript truly is
//! not there. Failures climb a ladder: retry the step a few times with
//! fixed spacing, then reload the affected frame and run the whole
//! sequence once more against a fresh frame resolution, then give up and
//! let the user decide. Cancellation is checked at the top of every
//! continuation; a torn-down session never acts again.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lectern_bridge_interface::{
    BridgeReply, BridgeRequest, BridgeTransport, Failure, FailureKind, FrameId, FrameLocation,
    PageReply, TabId,
};
use lectern_locator::{DetectedVideo, PageDom};
use tokio_util::sync::CancellationToken;

use crate::config::SessionConfig;
use crate::progress::ProgressAnimator;

/// Terminal result of one video's capture, after all automatic remedies.
#[derive(Debug, Clone)]
pub enum VideoOutcome {
    Success {
        file_name: String,
        text: Option<String>,
    },
    Failed {
        error: Failure,
    },
}

impl VideoOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, VideoOutcome::Success { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            VideoOutcome::Failed { error } if error.kind == FailureKind::CancelledByUser
        )
    }

    pub fn to_page_reply(&self) -> PageReply {
        match self {
            VideoOutcome::Success { file_name, .. } => PageReply::Capture {
                success: true,
                file_name: Some(file_name.clone()),
                error: None,
            },
            VideoOutcome::Failed { error } => PageReply::Capture {
                success: false,
                file_name: None,
                error: Some(error.clone()),
            },
        }
    }
}

pub(crate) struct FlowCtx {
    pub session_id: String,
    pub bridge: Arc<dyn BridgeTransport>,
    pub animator: Arc<Mutex<ProgressAnimator>>,
    pub cancel: CancellationToken,
    pub config: SessionConfig,
    /// Filled in once the frame is resolved; cleared again when the frame
    /// is reloaded, since the old location must never be reused.
    pub location: Arc<Mutex<Option<FrameLocation>>>,
}

impl FlowCtx {
    fn milestone(&self, target: f64, message: &str) {
        self.animator.lock().unwrap().milestone(target, message);
    }

    /// Sleep unless the session is cancelled first. Returns false on
    /// cancellation.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    async fn request(&self, request: BridgeRequest) -> Result<BridgeReply, Failure> {
        self.bridge.request(request).await.map_err(|e| {
            // Transport silence means unknown state; treat as a retryable
            // failure that made no progress.
            Failure::new(FailureKind::CaptureFailed, e.to_string())
        })
    }

    fn store_location(&self, location: FrameLocation) {
        *self.location.lock().unwrap() = Some(location);
    }

    fn take_location(&self) -> Option<FrameLocation> {
        self.location.lock().unwrap().take()
    }

    fn current_location(&self) -> Option<FrameLocation> {
        *self.location.lock().unwrap()
    }
}

fn reply_failure(reply: BridgeReply, fallback: FailureKind, context: &str) -> Failure {
    reply
        .failure()
        .cloned()
        .unwrap_or_else(|| Failure::new(fallback, context))
}

async fn with_step_retry<T, F, Fut>(ctx: &FlowCtx, step: &'static str, op: F) -> Result<T, Failure>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, Failure>>,
{
    let mut last = None;

    for attempt in 1..=ctx.config.step_attempts {
        if ctx.cancel.is_cancelled() {
            return Err(Failure::cancelled());
        }

        match op().await {
            Ok(value) => return Ok(value),
            Err(failure) if !failure.is_retryable() => return Err(failure),
            Err(failure) => {
                tracing::warn!(step, attempt, error = %failure, "step_failed");
                last = Some(failure);
                if attempt < ctx.config.step_attempts
                    && !ctx.pause(ctx.config.step_retry_delay).await
                {
                    return Err(Failure::cancelled());
                }
            }
        }
    }

    Err(last.unwrap_or_else(|| Failure::new(FailureKind::CaptureFailed, "step failed")))
}

async fn resolve_tab(ctx: &FlowCtx) -> Result<TabId, Failure> {
    match ctx.request(BridgeRequest::GetTabId).await? {
        BridgeReply::TabId { tab_id } => Ok(tab_id),
        other => Err(reply_failure(
            other,
            FailureKind::TabNotFound,
            "Could not get tab ID",
        )),
    }
}

async fn resolve_frame(ctx: &FlowCtx, tab: TabId, video: &DetectedVideo) -> Result<FrameId, Failure> {
    let request = BridgeRequest::FindFrameId {
        tab_id: tab,
        video_id: video.provider_video_id.clone(),
        video_src: video.source_url.clone(),
    };
    match ctx.request(request).await? {
        BridgeReply::FrameId { frame_id } => Ok(frame_id),
        other => Err(reply_failure(
            other,
            FailureKind::FrameNotFound,
            "Could not find the video frame",
        )),
    }
}

async fn check_open(ctx: &FlowCtx, location: FrameLocation) -> bool {
    let request = BridgeRequest::CheckTranscriptOpen {
        tab_id: location.tab,
        frame_id: location.frame,
    };
    matches!(
        ctx.request(request).await,
        Ok(BridgeReply::TranscriptOpen { is_open: true })
    )
}

async fn open_panel(ctx: &FlowCtx, location: FrameLocation) -> Result<(), Failure> {
    let request = BridgeRequest::ClickTranscriptButton {
        tab_id: location.tab,
        frame_id: location.frame,
    };
    match ctx.request(request).await? {
        BridgeReply::Ack { success: true, .. } => Ok(()),
        other => Err(reply_failure(
            other,
            FailureKind::ButtonNotFound,
            "Failed to open transcript panel",
        )),
    }
}

async fn capture(
    ctx: &FlowCtx,
    location: FrameLocation,
    video: &DetectedVideo,
) -> Result<(String, Option<String>), Failure> {
    let request = BridgeRequest::CaptureTranscriptContinuous {
        tab_id: location.tab,
        frame_id: location.frame,
        video_title: video.sanitized_filename.clone(),
    };
    match ctx.request(request).await? {
        BridgeReply::Capture {
            success: true,
            file_name,
            text,
            ..
        } => Ok((
            file_name.unwrap_or_else(|| format!("{}.txt", video.sanitized_filename)),
            text,
        )),
        other => Err(reply_failure(
            other,
            FailureKind::CaptureFailed,
            "Failed to capture transcript",
        )),
    }
}

/// One full pass of the per-video sequence. Each step carries its own
/// bounded retry.
async fn run_sequence(
    ctx: &FlowCtx,
    video: &DetectedVideo,
) -> Result<(String, Option<String>), Failure> {
    ctx.milestone(0.05, "Accessing video player...");
    let tab = with_step_retry(ctx, "resolve_tab", || resolve_tab(ctx)).await?;

    ctx.milestone(0.10, "Finding video frame...");
    let frame = with_step_retry(ctx, "resolve_frame", || resolve_frame(ctx, tab, video)).await?;
    let location = FrameLocation::new(tab, frame);
    ctx.store_location(location);
    tracing::debug!(%location, title = %video.title, "frame_resolved");

    ctx.milestone(0.15, "Checking transcript status...");
    if check_open(ctx, location).await {
        ctx.milestone(0.20, "Transcript is already open");
        let _ = ctx
            .request(BridgeRequest::ScrollToTop {
                tab_id: location.tab,
                frame_id: location.frame,
            })
            .await;
    } else {
        ctx.milestone(0.15, "Opening transcript panel...");
        with_step_retry(ctx, "open_transcript", || open_panel(ctx, location)).await?;
        ctx.milestone(0.20, "Transcript opened successfully");
        if !ctx.pause(ctx.config.post_open_settle).await {
            return Err(Failure::cancelled());
        }
    }

    ctx.animator
        .lock()
        .unwrap()
        .begin_capture(tokio::time::Instant::now());

    with_step_retry(ctx, "capture", || capture(ctx, location, video)).await
}

/// Run one video to a terminal outcome, applying the full remedy ladder.
pub(crate) async fn run_video(
    ctx: &FlowCtx,
    video: &DetectedVideo,
    page: &dyn PageDom,
) -> VideoOutcome {
    page.scroll_into_view(video.frame);

    let result = match run_sequence(ctx, video).await {
        Ok(success) => Ok(success),
        Err(failure) if !failure.is_retryable() => Err(failure),
        Err(failure) => {
            tracing::warn!(error = %failure, "sequence_failed_reloading_frame");

            if let Some(location) = ctx.take_location() {
                let _ = ctx
                    .request(BridgeRequest::ReloadFrame {
                        tab_id: location.tab,
                        frame_id: location.frame,
                    })
                    .await;
            }

            if ctx.pause(ctx.config.step_retry_delay).await {
                run_sequence(ctx, video).await
            } else {
                Err(Failure::cancelled())
            }
        }
    };

    match result {
        Ok((file_name, text)) => {
            // Let the bar visibly reach 100%, put the panel back, then
            // linger briefly before the UI disappears.
            if !ctx.pause(ctx.config.pre_reset_delay).await {
                return VideoOutcome::Failed {
                    error: Failure::cancelled(),
                };
            }
            if let Some(location) = ctx.current_location() {
                ctx.bridge
                    .notify(BridgeRequest::ResetTranscriptPanel {
                        tab_id: location.tab,
                        frame_id: location.frame,
                    })
                    .await;
            }
            if !ctx.pause(ctx.config.teardown_delay).await {
                return VideoOutcome::Failed {
                    error: Failure::cancelled(),
                };
            }

            tracing::info!(session_id = %ctx.session_id, %file_name, "video_capture_succeeded");
            VideoOutcome::Success { file_name, text }
        }
        Err(error) => {
            tracing::warn!(session_id = %ctx.session_id, %error, "video_capture_failed");
            VideoOutcome::Failed { error }
        }
    }
}
