use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use lectern_bridge_interface::{
    BridgeRequest, BridgeTransport, Failure, FailureKind, FrameLocation, PageReply, PageRequest,
    ProcessingState, VideoSummary, WindowMessage,
};
use lectern_locator::{DetectedVideo, PageDom, scan_and_badge};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort, SpawnErr};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::actors::session_span;
use crate::config::SessionConfig;
use crate::flow::{FlowCtx, VideoOutcome, run_video};
use crate::progress::ProgressAnimator;
use crate::router::WindowRouter;
use crate::runtime::{ProgressFrame, SessionLifecycleEvent, SessionRuntime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Capturing,
    Batch,
}

pub enum RootMsg {
    /// Re-scan the page and answer with the popup-facing video list.
    Rescan(RpcReplyPort<Vec<VideoSummary>>),
    /// Capture one video; the reply fires when the capture reaches a
    /// terminal outcome, not when it starts.
    StartCapture(u32, RpcReplyPort<VideoOutcome>),
    StartBatch(Vec<u32>, RpcReplyPort<bool>),
    Cancel(RpcReplyPort<()>),
    GetState(RpcReplyPort<SessionState>),
    CaptureFinished {
        session_id: String,
        outcome: VideoOutcome,
    },
    BatchNext,
}

pub struct RootArgs {
    pub runtime: Arc<dyn SessionRuntime>,
    pub bridge: Arc<dyn BridgeTransport>,
    pub page: Arc<dyn PageDom>,
    pub router: WindowRouter,
    pub config: SessionConfig,
}

/// One in-flight capture: the session object the whole crate revolves
/// around. Exactly one exists at a time; starting another tears this one
/// down first.
struct ActiveCapture {
    session_id: String,
    cancel: CancellationToken,
    location: Arc<Mutex<Option<FrameLocation>>>,
    flow_task: tokio::task::JoinHandle<()>,
    animation_task: tokio::task::JoinHandle<()>,
    ingest_task: tokio::task::JoinHandle<()>,
    reply: Option<RpcReplyPort<VideoOutcome>>,
    in_batch: bool,
}

struct BatchRun {
    pending: VecDeque<u32>,
    total: usize,
    completed: usize,
}

pub struct RootState {
    runtime: Arc<dyn SessionRuntime>,
    bridge: Arc<dyn BridgeTransport>,
    page: Arc<dyn PageDom>,
    router: WindowRouter,
    config: SessionConfig,
    videos: Vec<DetectedVideo>,
    active: Option<ActiveCapture>,
    batch: Option<BatchRun>,
}

pub struct RootActor;

pub async fn spawn_root(
    args: RootArgs,
) -> Result<(ActorRef<RootMsg>, tokio::task::JoinHandle<()>), SpawnErr> {
    Actor::spawn(None, RootActor, args).await
}

#[ractor::async_trait]
impl Actor for RootActor {
    type Msg = RootMsg;
    type State = RootState;
    type Arguments = RootArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        Ok(RootState {
            runtime: args.runtime,
            bridge: args.bridge,
            page: args.page,
            router: args.router,
            config: args.config,
            videos: Vec::new(),
            active: None,
            batch: None,
        })
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        teardown_active(state).await;
        Ok(())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            RootMsg::Rescan(reply) => {
                let videos =
                    scan_and_badge(state.page.as_ref(), &state.config.locator, state.bridge.as_ref())
                        .await;
                tracing::info!(count = videos.len(), "page_scan_complete");
                let summaries = videos.iter().map(DetectedVideo::summary).collect();
                state.videos = videos;
                let _ = reply.send(summaries);
            }

            RootMsg::StartCapture(video_id, reply) => {
                teardown_active(state).await;
                state.batch = None;
                start_capture(&myself, state, video_id, Some(reply), false);
            }

            RootMsg::StartBatch(video_ids, reply) => {
                teardown_active(state).await;
                let _ = reply.send(true);

                if video_ids.is_empty() {
                    return Ok(());
                }
                state.batch = Some(BatchRun {
                    total: video_ids.len(),
                    pending: video_ids.into(),
                    completed: 0,
                });
                let _ = myself.send_message(RootMsg::BatchNext);
            }

            RootMsg::Cancel(reply) => {
                teardown_active(state).await;
                state.batch = None;
                let _ = reply.send(());
            }

            RootMsg::GetState(reply) => {
                let session_state = if state.batch.is_some() {
                    SessionState::Batch
                } else if state.active.is_some() {
                    SessionState::Capturing
                } else {
                    SessionState::Idle
                };
                let _ = reply.send(session_state);
            }

            RootMsg::CaptureFinished {
                session_id,
                outcome,
            } => {
                let Some(active) = state.active.take_if(|a| a.session_id == session_id) else {
                    tracing::debug!(%session_id, "stale_capture_result_ignored");
                    return Ok(());
                };

                finish_session(state, active, &outcome);
                advance_batch(&myself, state);
            }

            RootMsg::BatchNext => {
                if state.active.is_some() {
                    return Ok(());
                }
                let Some(batch) = state.batch.as_mut() else {
                    return Ok(());
                };

                match batch.pending.pop_front() {
                    None => {
                        let total = batch.total;
                        state.batch = None;
                        state.runtime
                            .emit_lifecycle(SessionLifecycleEvent::BatchFinished { total });
                    }
                    Some(video_id) => {
                        if state.videos.iter().any(|v| v.id == video_id) {
                            start_capture(&myself, state, video_id, None, true);
                        } else {
                            tracing::warn!(video_id, "batch_video_not_found");
                            batch.completed += 1;
                            state.runtime.emit_lifecycle(SessionLifecycleEvent::BatchAdvanced {
                                completed: batch.completed,
                                total: batch.total,
                            });
                            let _ = myself.send_message(RootMsg::BatchNext);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Tear down the current session, if any: cancel it, propagate the
/// cancellation into the frame, release the window channel, and answer any
/// caller still waiting. Always completes before a successor is set up.
async fn teardown_active(state: &mut RootState) {
    let Some(active) = state.active.take() else {
        return;
    };

    let span = session_span(&active.session_id);
    let _guard = span.enter();
    tracing::info!("session_teardown");

    active.cancel.cancel();

    let location = *active.location.lock().unwrap();
    if let Some(location) = location {
        state
            .bridge
            .notify(BridgeRequest::CancelCapture {
                tab_id: location.tab,
                frame_id: location.frame,
            })
            .await;
    }

    state.router.unbind();
    active.flow_task.abort();
    active.animation_task.abort();
    active.ingest_task.abort();

    if let Some(reply) = active.reply {
        let _ = reply.send(VideoOutcome::Failed {
            error: Failure::cancelled(),
        });
    }

    state
        .runtime
        .emit_lifecycle(SessionLifecycleEvent::Ended {
            session_id: active.session_id,
        });
}

fn start_capture(
    myself: &ActorRef<RootMsg>,
    state: &mut RootState,
    video_id: u32,
    reply: Option<RpcReplyPort<VideoOutcome>>,
    in_batch: bool,
) {
    let Some(video) = state.videos.iter().find(|v| v.id == video_id).cloned() else {
        tracing::warn!(video_id, "video_not_found");
        if let Some(reply) = reply {
            let _ = reply.send(VideoOutcome::Failed {
                error: Failure::new(FailureKind::CaptureFailed, "Video not found"),
            });
        }
        return;
    };

    let session_id = uuid::Uuid::new_v4().to_string();
    let span = session_span(&session_id);
    let _guard = span.enter();
    tracing::info!(video_id, title = %video.title, in_batch, "session_started");

    let cancel = CancellationToken::new();
    let location = Arc::new(Mutex::new(None));
    let animator = Arc::new(Mutex::new(ProgressAnimator::new(
        state.config.animator.clone(),
    )));

    state
        .runtime
        .emit_lifecycle(SessionLifecycleEvent::Started {
            session_id: session_id.clone(),
            video_id,
            title: video.title.clone(),
            batch: in_batch,
        });

    // Fresh window channel, bound to this session only.
    let (window_tx, mut window_rx) = tokio::sync::mpsc::unbounded_channel::<WindowMessage>();
    state.router.bind(window_tx);

    let ingest_task = tokio::spawn({
        let animator = animator.clone();
        let cancel = cancel.clone();
        async move {
            while let Some(message) = window_rx.recv().await {
                match message {
                    WindowMessage::TranscriptButtonClicked { success: true, .. } => {
                        let mut animator = animator.lock().unwrap();
                        if !animator.capture_started() {
                            animator.milestone(0.20, "Transcript opened successfully");
                        }
                    }
                    WindowMessage::TranscriptButtonClicked { success: false, .. } => {}
                    WindowMessage::TranscriptProgress(report) => {
                        if report.processing_state == Some(ProcessingState::Cancelled) {
                            cancel.cancel();
                        } else {
                            animator.lock().unwrap().observe(&report);
                        }
                    }
                }
            }
        }
    });

    let animation_task = tokio::spawn({
        let animator = animator.clone();
        let runtime = state.runtime.clone();
        let cancel = cancel.clone();
        let session_id = session_id.clone();
        let tick = state.config.animation_tick;
        async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(tick) => {}
                }

                let now = tokio::time::Instant::now();
                let (displayed, message, finished) = {
                    let mut animator = animator.lock().unwrap();
                    let displayed = animator.tick(now);
                    (displayed, animator.message().to_string(), animator.finished(now))
                };

                runtime.emit_progress(ProgressFrame {
                    session_id: session_id.clone(),
                    displayed,
                    message,
                });

                if finished {
                    break;
                }
            }
        }
    });

    let flow_task = tokio::spawn({
        let ctx = FlowCtx {
            session_id: session_id.clone(),
            bridge: state.bridge.clone(),
            animator,
            cancel: cancel.clone(),
            config: state.config.clone(),
            location: location.clone(),
        };
        let page = state.page.clone();
        let myself = myself.clone();
        let session_id = session_id.clone();
        let span = session_span(&session_id);
        async move {
            let outcome = run_video(&ctx, &video, page.as_ref()).await;
            let _ = myself.send_message(RootMsg::CaptureFinished {
                session_id,
                outcome,
            });
        }
        .instrument(span)
    });

    state.active = Some(ActiveCapture {
        session_id,
        cancel,
        location,
        flow_task,
        animation_task,
        ingest_task,
        reply,
        in_batch,
    });
}

/// Emit terminal lifecycle events for a finished session and release its
/// resources.
fn finish_session(state: &mut RootState, active: ActiveCapture, outcome: &VideoOutcome) {
    let span = session_span(&active.session_id);
    let _guard = span.enter();

    state.router.unbind();
    active.animation_task.abort();
    active.ingest_task.abort();
    drop(active.flow_task);

    match outcome {
        VideoOutcome::Success { file_name, .. } => {
            tracing::info!(%file_name, "session_completed");
            state
                .runtime
                .emit_lifecycle(SessionLifecycleEvent::Completed {
                    session_id: active.session_id.clone(),
                    file_name: file_name.clone(),
                });
        }
        VideoOutcome::Failed { error } if error.kind == FailureKind::CancelledByUser => {
            tracing::info!("session_cancelled");
            state.runtime.emit_lifecycle(SessionLifecycleEvent::Ended {
                session_id: active.session_id.clone(),
            });
        }
        VideoOutcome::Failed { error } => {
            tracing::warn!(%error, "session_failed");
            state.runtime.emit_lifecycle(SessionLifecycleEvent::Failed {
                session_id: active.session_id.clone(),
                error: error.clone(),
                can_retry: !active.in_batch,
            });
        }
    }

    if let Some(reply) = active.reply {
        let _ = reply.send(outcome.clone());
    }
}

/// After a batch item finishes, report overall progress and line up the
/// next item. A failed item never aborts the batch.
fn advance_batch(myself: &ActorRef<RootMsg>, state: &mut RootState) {
    let Some(batch) = state.batch.as_mut() else {
        return;
    };

    batch.completed += 1;
    state
        .runtime
        .emit_lifecycle(SessionLifecycleEvent::BatchAdvanced {
            completed: batch.completed,
            total: batch.total,
        });

    if batch.pending.is_empty() {
        let total = batch.total;
        state.batch = None;
        state
            .runtime
            .emit_lifecycle(SessionLifecycleEvent::BatchFinished { total });
    } else {
        let _ = myself.send_after(state.config.batch_pause, || RootMsg::BatchNext);
    }
}

/// Entry point for the popup/coordinator side of the page protocol.
pub async fn handle_page_request(root: &ActorRef<RootMsg>, request: PageRequest) -> PageReply {
    match request {
        PageRequest::ScanForVideos | PageRequest::AutoScanForVideos => {
            match root.call(RootMsg::Rescan, None).await {
                Ok(ractor::rpc::CallResult::Success(videos)) => PageReply::Videos { videos },
                _ => PageReply::Videos { videos: vec![] },
            }
        }

        PageRequest::ProcessVideo { video_id } => {
            match root
                .call(|reply| RootMsg::StartCapture(video_id, reply), None)
                .await
            {
                Ok(ractor::rpc::CallResult::Success(outcome)) => outcome.to_page_reply(),
                _ => PageReply::Capture {
                    success: false,
                    file_name: None,
                    error: Some(Failure::new(
                        FailureKind::CaptureFailed,
                        "Capture session dropped",
                    )),
                },
            }
        }

        PageRequest::ProcessAllVideos { video_ids } => {
            let success = matches!(
                root.call(|reply| RootMsg::StartBatch(video_ids, reply), None)
                    .await,
                Ok(ractor::rpc::CallResult::Success(true))
            );
            PageReply::Ack { success }
        }

        PageRequest::CancelCapture => {
            let _ = root.call(RootMsg::Cancel, None).await;
            PageReply::Ack { success: true }
        }
    }
}
