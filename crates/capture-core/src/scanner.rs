use lectern_transcript::{CueKey, CueSet, clock_to_seconds, leading_timestamp};

use crate::dom::{CueView, ScrollMetrics};

/// Progress fractions are capped below 1.0 until the file is actually
/// saved, so the UI never shows "done" early.
const PROGRESS_CAP: f64 = 0.99;

/// Duration is guessed as 20% past the furthest cue stamp seen so far.
const DURATION_HEADROOM: f64 = 1.2;

#[derive(Debug, Clone, Copy)]
pub struct ScanDelta {
    pub new_cues: usize,
    pub total: usize,
}

impl ScanDelta {
    pub fn found_new(&self) -> bool {
        self.new_cues > 0
    }
}

/// Accumulates cue text across scan passes and estimates how far through
/// the video the captured transcript reaches.
///
/// The cue set is insert-only, which makes repeated passes over the same
/// (partially re-rendered) list idempotent. Both the furthest-seen
/// timestamp and the duration estimate only ever increase.
#[derive(Debug, Default)]
pub struct TranscriptScanner {
    cues: CueSet,
    latest_timestamp: u64,
    estimated_duration: u64,
}

impl TranscriptScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb one scan pass over the panel's currently rendered cues.
    pub fn absorb(&mut self, cues: &[CueView]) -> ScanDelta {
        let mut new_cues = 0;

        for (position, cue) in cues.iter().enumerate() {
            let key = CueKey::from_dom(cue.dom_id.as_deref(), position as u64);
            let text = cue.text.trim();

            if !self.cues.insert(key, text) {
                continue;
            }
            new_cues += 1;

            if let Some(stamp) = leading_timestamp(text) {
                let seconds = clock_to_seconds(stamp);
                if seconds > self.latest_timestamp {
                    self.latest_timestamp = seconds;
                }
                if seconds > self.estimated_duration {
                    self.estimated_duration = (seconds as f64 * DURATION_HEADROOM).ceil() as u64;
                }
            }
        }

        ScanDelta {
            new_cues,
            total: self.cues.len(),
        }
    }

    /// Completion fraction, preferring timestamp evidence over scroll
    /// position, both capped at 0.99.
    pub fn progress(&self, metrics: &ScrollMetrics) -> f64 {
        if self.estimated_duration > 0 && self.latest_timestamp > 0 {
            return (self.latest_timestamp as f64 / self.estimated_duration as f64)
                .min(PROGRESS_CAP);
        }

        let scrollable = match metrics.max_top() {
            m if m > 0.0 => m,
            _ => 1.0,
        };
        (metrics.top / scrollable).min(PROGRESS_CAP)
    }

    pub fn cue_count(&self) -> usize {
        self.cues.len()
    }

    pub fn latest_timestamp(&self) -> u64 {
        self.latest_timestamp
    }

    pub fn estimated_duration(&self) -> u64 {
        self.estimated_duration
    }

    /// All captured cue text in cue order, one cue per line.
    pub fn assemble(&self) -> String {
        self.cues.assemble()
    }
}
