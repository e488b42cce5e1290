use std::sync::{Arc, Mutex};

use lectern_capture_core::{ButtonView, CuePanel, CueView, FrameDom, ScrollMetrics};

#[derive(Debug, Clone)]
pub struct SimFrameConfig {
    /// How many `buttons()` polls return nothing before the toggle exists,
    /// simulating slow widget initialisation.
    pub button_available_after_polls: u32,
    /// Rendered cue texts; multiline entries mimic the real panel's
    /// clock-above-words layout.
    pub cues: Vec<String>,
    pub row_height: f64,
    pub viewport_height: f64,
    pub viewport_width: f64,
    /// Simulate a download mechanism that refuses the file.
    pub fail_saves: bool,
}

impl Default for SimFrameConfig {
    fn default() -> Self {
        Self {
            button_available_after_polls: 0,
            cues: Vec::new(),
            row_height: 40.0,
            viewport_height: 400.0,
            viewport_width: 640.0,
            fail_saves: false,
        }
    }
}

/// Plausible lecture cues, one clock line plus one words line each.
pub fn lecture_cues(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let seconds = i * 4 + 1;
            format!(
                "{}:{:02}\nThis is sentence number {} of the lecture.",
                seconds / 60,
                seconds % 60,
                i + 1
            )
        })
        .collect()
}

#[derive(Debug)]
struct FrameState {
    polls_remaining: u32,
    panel_open: bool,
    top: f64,
    revealed: usize,
    saved: Vec<(String, String)>,
}

struct FrameInner {
    config: SimFrameConfig,
    state: Mutex<FrameState>,
}

impl FrameInner {
    fn content_height(&self) -> f64 {
        self.config.cues.len() as f64 * self.config.row_height
    }

    fn max_top(&self) -> f64 {
        (self.content_height() - self.config.viewport_height).max(0.0)
    }

    fn initially_visible(&self) -> usize {
        ((self.config.viewport_height / self.config.row_height).ceil() as usize)
            .min(self.config.cues.len())
    }

    fn reveal_for(&self, top: f64) -> usize {
        (((top + self.config.viewport_height) / self.config.row_height).ceil() as usize)
            .min(self.config.cues.len())
    }
}

pub struct SimPlayerFrame {
    inner: Arc<FrameInner>,
}

impl SimPlayerFrame {
    pub fn new(config: SimFrameConfig) -> Arc<Self> {
        let polls = config.button_available_after_polls;
        Arc::new(Self {
            inner: Arc::new(FrameInner {
                config,
                state: Mutex::new(FrameState {
                    polls_remaining: polls,
                    panel_open: false,
                    top: 0.0,
                    revealed: 0,
                    saved: Vec::new(),
                }),
            }),
        })
    }

    pub fn panel_open(&self) -> bool {
        self.inner.state.lock().unwrap().panel_open
    }

    /// Files handed to the (simulated) download mechanism, oldest first.
    pub fn saved_files(&self) -> Vec<(String, String)> {
        self.inner.state.lock().unwrap().saved.clone()
    }

    /// Reload the frame: the widget starts over, the panel is closed and
    /// the toggle takes its initialisation polls again. Saved files are a
    /// property of the host, not the frame, and survive.
    pub fn reset(&self) {
        let mut state = self.inner.state.lock().unwrap();
        state.polls_remaining = self.inner.config.button_available_after_polls;
        state.panel_open = false;
        state.top = 0.0;
        state.revealed = 0;
    }
}

struct SimPanel {
    inner: Arc<FrameInner>,
}

impl CuePanel for SimPanel {
    fn visible(&self) -> bool {
        self.inner.state.lock().unwrap().panel_open
    }

    fn cues(&self) -> Vec<CueView> {
        let state = self.inner.state.lock().unwrap();
        self.inner.config.cues[..state.revealed]
            .iter()
            .enumerate()
            .map(|(i, text)| CueView {
                dom_id: Some(format!("transcript-cue-{i}")),
                text: text.clone(),
            })
            .collect()
    }

    fn text(&self) -> String {
        let state = self.inner.state.lock().unwrap();
        self.inner.config.cues[..state.revealed].join("\n")
    }

    fn metrics(&self) -> ScrollMetrics {
        let state = self.inner.state.lock().unwrap();
        ScrollMetrics {
            top: state.top,
            content_height: self.inner.content_height(),
            viewport_height: self.inner.config.viewport_height,
            viewport_width: self.inner.config.viewport_width,
        }
    }

    fn scroll_to(&self, top: f64) {
        let mut state = self.inner.state.lock().unwrap();
        state.top = top.clamp(0.0, self.inner.max_top());
    }

    fn scroll_by(&self, delta: f64) {
        let mut state = self.inner.state.lock().unwrap();
        state.top = (state.top + delta).clamp(0.0, self.inner.max_top());
        // Scrolling is what makes the virtualized list render more rows.
        state.revealed = state.revealed.max(self.inner.reveal_for(state.top));
    }
}

impl FrameDom for SimPlayerFrame {
    fn marked_panel(&self) -> Option<Arc<dyn CuePanel>> {
        if self.panel_open() {
            Some(Arc::new(SimPanel {
                inner: self.inner.clone(),
            }))
        } else {
            None
        }
    }

    fn list_panels(&self) -> Vec<Arc<dyn CuePanel>> {
        self.marked_panel().into_iter().collect()
    }

    fn buttons(&self) -> Vec<ButtonView> {
        let mut state = self.inner.state.lock().unwrap();
        if state.polls_remaining > 0 {
            state.polls_remaining -= 1;
            return vec![ButtonView {
                label: "Play".to_string(),
                aria_label: Some("Play".to_string()),
                pressed: false,
            }];
        }

        vec![
            ButtonView {
                label: "Play".to_string(),
                aria_label: Some("Play".to_string()),
                pressed: false,
            },
            ButtonView {
                label: String::new(),
                aria_label: Some("Show Transcript".to_string()),
                pressed: state.panel_open,
            },
        ]
    }

    fn press(&self, index: usize) -> bool {
        // Index 1 is the transcript toggle once the widget has initialised.
        if index != 1 {
            return false;
        }
        let mut state = self.inner.state.lock().unwrap();
        state.panel_open = true;
        state.revealed = state.revealed.max(self.inner.initially_visible());
        true
    }

    fn save_file(&self, file_name: &str, contents: &str) -> bool {
        if self.inner.config.fail_saves {
            return false;
        }
        self.inner
            .state
            .lock()
            .unwrap()
            .saved
            .push((file_name.to_string(), contents.to_string()));
        true
    }
}
