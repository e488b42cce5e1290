use std::sync::Arc;
use std::time::Duration;

use lectern_bridge_interface::{Failure, FailureKind, WindowMessage, WindowSink};
use tokio_util::sync::CancellationToken;

use crate::dom::{ButtonView, FrameDom};
use crate::panel::{has_clock_shaped_text, has_tagged_cues};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OpenerConfig {
    /// Retries after the immediate attempt, covering asynchronous widget
    /// initialisation.
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Default for OpenerConfig {
    fn default() -> Self {
        Self {
            retries: 5,
            retry_delay: Duration::from_millis(500),
        }
    }
}

fn label_contains(button: &ButtonView, needle: &str) -> bool {
    button.label.to_lowercase().contains(needle)
}

fn aria_contains(button: &ButtonView, needle: &str) -> bool {
    button
        .aria_label
        .as_deref()
        .is_some_and(|label| label.to_lowercase().contains(needle))
}

/// A control labelled "transcript", the player's primary toggle.
fn find_transcript_button(buttons: &[ButtonView]) -> Option<usize> {
    buttons
        .iter()
        .position(|b| label_contains(b, "transcript") || aria_contains(b, "transcript"))
}

/// The toggle, falling back to caption-flavoured labels.
fn find_toggle(buttons: &[ButtonView]) -> Option<usize> {
    find_transcript_button(buttons).or_else(|| {
        buttons.iter().position(|b| {
            label_contains(b, "cc") || aria_contains(b, "caption") || aria_contains(b, "subtitle")
        })
    })
}

/// Whether the transcript panel is already showing.
///
/// Combines the container marker, a heuristic scan of list elements for
/// cue-shaped children or clock-shaped text, and the toggle's own pressed
/// state. Any one signal is enough.
pub fn is_transcript_open(dom: &dyn FrameDom) -> bool {
    let marker_visible = dom.marked_panel().is_some_and(|panel| panel.visible());

    let heuristic = dom.list_panels().iter().any(|panel| {
        panel.visible() && (has_tagged_cues(panel.as_ref()) || has_clock_shaped_text(panel.as_ref()))
    });

    let pressed = {
        let buttons = dom.buttons();
        find_transcript_button(&buttons).is_some_and(|i| buttons[i].pressed)
    };

    marker_visible || heuristic || pressed
}

/// Find and click the transcript toggle, retrying while the player widget
/// finishes initialising. Reports the outcome upward as a
/// `transcriptButtonClicked` window message as well as in the return value.
pub async fn open_transcript(
    dom: Arc<dyn FrameDom>,
    config: &OpenerConfig,
    runtime: Arc<dyn WindowSink>,
    cancel: CancellationToken,
) -> Result<(), Failure> {
    for attempt in 0..=config.retries {
        if cancel.is_cancelled() {
            return Err(Failure::cancelled());
        }

        if attempt > 0 {
            tokio::select! {
                _ = cancel.cancelled() => return Err(Failure::cancelled()),
                _ = tokio::time::sleep(config.retry_delay) => {}
            }
        }

        let buttons = dom.buttons();
        if let Some(index) = find_toggle(&buttons) {
            tracing::debug!(attempt, "transcript_button_found");
            dom.press(index);
            runtime.emit(WindowMessage::TranscriptButtonClicked {
                success: true,
                error: None,
            });
            return Ok(());
        }
    }

    tracing::warn!(retries = config.retries, "transcript_button_not_found");
    let failure = Failure::new(
        FailureKind::ButtonNotFound,
        "Transcript button not found after multiple attempts",
    );
    runtime.emit(WindowMessage::TranscriptButtonClicked {
        success: false,
        error: Some(failure.clone()),
    });
    Err(failure)
}
