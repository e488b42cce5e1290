use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{CuePanel, FrameDom};

static CLOCK_SHAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{1,2}:\d{2}").unwrap());

const CUE_ID_PREFIX: &str = "transcript-cue-";

pub(crate) fn has_tagged_cues(panel: &dyn CuePanel) -> bool {
    panel
        .cues()
        .iter()
        .any(|cue| cue.dom_id.as_deref().is_some_and(|id| id.starts_with(CUE_ID_PREFIX)))
}

pub(crate) fn has_clock_shaped_text(panel: &dyn CuePanel) -> bool {
    CLOCK_SHAPE.is_match(&panel.text())
}

/// Find the transcript panel, tolerating the player's several renderings.
///
/// Strategies, first match wins: the player's own container marker; any
/// list with `transcript-cue-*` children; any list whose text looks like
/// it contains clock stamps.
pub fn locate_panel(dom: &dyn FrameDom) -> Option<Arc<dyn CuePanel>> {
    if let Some(panel) = dom.marked_panel() {
        return Some(panel);
    }

    let panels = dom.list_panels();

    if let Some(panel) = panels.iter().find(|p| has_tagged_cues(p.as_ref())) {
        return Some(panel.clone());
    }

    panels
        .iter()
        .find(|p| has_clock_shaped_text(p.as_ref()))
        .cloned()
}

/// Best-effort scroll reset. Never fails the caller.
pub fn scroll_to_top(dom: &dyn FrameDom) -> bool {
    match locate_panel(dom) {
        Some(panel) => {
            panel.scroll_to(0.0);
            true
        }
        None => false,
    }
}
