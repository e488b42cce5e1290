//! Run the whole capture protocol against the simulated player.
//!
//!   cargo run --example simulated

use std::sync::Arc;

use lectern_bridge_interface::{FrameId, PageReply, PageRequest, TabId};
use lectern_coordinator::{Coordinator, CoordinatorConfig, LocalBridge, PageSink};
use session_core::{
    ProgressFrame, RootArgs, SessionConfig, SessionLifecycleEvent, SessionRuntime, WindowRouter,
    handle_page_request, spawn_root,
};
use lectern_sim_player::{SimFrameConfig, SimHost, SimPage, SimPlayerFrame, lecture_cues};

struct CliRuntime;

impl SessionRuntime for CliRuntime {
    fn emit_progress(&self, frame: ProgressFrame) {
        let filled = (frame.displayed * 30.0) as usize;
        eprint!(
            "\r[{:<30}] {:>3.0}%  {:<40}",
            "█".repeat(filled),
            frame.displayed * 100.0,
            frame.message
        );
    }

    fn emit_lifecycle(&self, event: SessionLifecycleEvent) {
        match &event {
            SessionLifecycleEvent::Started {
                session_id, title, ..
            } => {
                eprintln!("\n[lifecycle] started session={session_id} title={title:?}");
            }
            SessionLifecycleEvent::Completed {
                session_id,
                file_name,
            } => {
                eprintln!("\n[lifecycle] completed session={session_id} file={file_name}");
            }
            SessionLifecycleEvent::Failed {
                session_id,
                error,
                can_retry,
            } => {
                eprintln!(
                    "\n[lifecycle] failed session={session_id} error={error} retry={can_retry}"
                );
            }
            SessionLifecycleEvent::Ended { session_id } => {
                eprintln!("\n[lifecycle] ended session={session_id}");
            }
            SessionLifecycleEvent::BatchAdvanced { completed, total } => {
                eprintln!("\n[batch] {completed}/{total}");
            }
            SessionLifecycleEvent::BatchFinished { total } => {
                eprintln!("\n[batch] finished all {total}");
            }
        }
    }
}

struct NullPages;

#[async_trait::async_trait]
impl PageSink for NullPages {
    async fn send(&self, _tab: TabId, _request: PageRequest) {}
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

    let tab = TabId(1);
    let host = SimHost::new();
    host.set_active_tab(tab);

    let frame = SimPlayerFrame::new(SimFrameConfig {
        button_available_after_polls: 2,
        cues: lecture_cues(40),
        ..Default::default()
    });
    host.add_frame(
        tab,
        FrameId(10),
        "https://player.vimeo.com/video/123456789",
        frame.clone(),
    );

    let page = Arc::new(SimPage::with_videos(&[(
        "https://player.vimeo.com/video/123456789",
        "Week 1: The Doctrine of Grace",
    )]));

    let router = WindowRouter::new();
    let coordinator = Arc::new(Coordinator::new(
        host.clone(),
        Arc::new(router.clone()),
        Arc::new(NullPages),
        CoordinatorConfig::default(),
    ));
    let bridge = Arc::new(LocalBridge::new(coordinator, tab));

    let (root, _handle) = spawn_root(RootArgs {
        runtime: Arc::new(CliRuntime),
        bridge,
        page,
        router,
        config: SessionConfig::default(),
    })
    .await
    .expect("failed to spawn root actor");

    let videos = match handle_page_request(&root, PageRequest::ScanForVideos).await {
        PageReply::Videos { videos } => videos,
        other => {
            eprintln!("scan failed: {other:?}");
            std::process::exit(1);
        }
    };
    eprintln!("found {} video(s), badge={}", videos.len(), host.badge());

    for video in &videos {
        eprintln!("  #{} {:?} -> {}", video.id, video.title, video.filename);
    }

    let reply = handle_page_request(&root, PageRequest::ProcessVideo { video_id: 0 }).await;
    match reply {
        PageReply::Capture {
            success: true,
            file_name: Some(file_name),
            ..
        } => {
            eprintln!("capture finished: {file_name}");
            if let Some((name, contents)) = frame.saved_files().first() {
                eprintln!("--- {name} ---");
                println!("{contents}");
            }
        }
        other => eprintln!("capture failed: {other:?}"),
    }
}
