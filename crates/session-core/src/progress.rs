//! The displayed-progress smoothing layer.
//!
//! Separate from the driver's own progress reports: the driver tells us
//! what it observed, this animator decides what the user sees. The
//! displayed value chases a target with a decelerating step and never
//! moves backwards within one attempt; the target advances through
//! coarse setup milestones, then through a blend of elapsed-time
//! projection and the driver's reported fraction, then through the
//! processing-stage milestones, and is finally forced to 1.0 on
//! completion.

use std::time::Duration;

use lectern_bridge_interface::{ProcessingState, TranscriptProgress};
use tokio::time::Instant;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnimatorConfig {
    pub base_speed: f64,
    pub setup_multiplier: f64,
    pub capture_multiplier: f64,
    /// Elapsed time at which the projection alone would reach the ceiling.
    pub capture_ramp: Duration,
    /// The band the capture phase animates inside.
    pub capture_floor: f64,
    pub capture_ceiling: f64,
    /// How much of the driver's reported fraction maps into the band.
    pub observed_scale: f64,
    /// How long the bar holds at 100% before the UI is torn down.
    pub hold_after_complete: Duration,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            base_speed: 0.0005,
            setup_multiplier: 0.01,
            capture_multiplier: 0.015,
            capture_ramp: Duration::from_secs(60),
            capture_floor: 0.2,
            capture_ceiling: 0.95,
            observed_scale: 0.75,
            hold_after_complete: Duration::from_secs(2),
        }
    }
}

#[derive(Debug)]
pub struct ProgressAnimator {
    config: AnimatorConfig,
    displayed: f64,
    target: f64,
    message: String,
    capture_started_at: Option<Instant>,
    observed_progress: f64,
    estimated_duration_secs: f64,
    complete: bool,
    completed_at: Option<Instant>,
}

impl ProgressAnimator {
    pub fn new(config: AnimatorConfig) -> Self {
        Self {
            config,
            displayed: 0.0,
            target: 0.02,
            message: "Preparing for transcript capture...".to_string(),
            capture_started_at: None,
            observed_progress: 0.0,
            estimated_duration_secs: 0.0,
            complete: false,
            completed_at: None,
        }
    }

    /// Advance the target to an orchestration milestone.
    pub fn milestone(&mut self, target: f64, message: impl Into<String>) {
        self.target = target;
        self.message = message.into();
    }

    pub fn begin_capture(&mut self, now: Instant) {
        self.capture_started_at = Some(now);
        self.milestone(self.config.capture_floor, "Starting transcript capture...");
    }

    pub fn capture_started(&self) -> bool {
        self.capture_started_at.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn displayed(&self) -> f64 {
        self.displayed
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn estimated_duration_secs(&self) -> f64 {
        self.estimated_duration_secs
    }

    /// Fold one driver report into the animation state. Reports arriving
    /// before the capture phase has begun are ignored, like the listener
    /// they replace.
    pub fn observe(&mut self, report: &TranscriptProgress) {
        if !self.capture_started() {
            return;
        }

        match report.processing_state {
            Some(ProcessingState::Processing) => {
                self.milestone(0.97, "Processing transcript text...");
            }
            Some(ProcessingState::Formatting) => {
                self.milestone(0.98, "Formatting transcript text...");
            }
            Some(ProcessingState::Saving) => {
                self.milestone(0.99, "Preparing download...");
            }
            Some(ProcessingState::Complete) => {
                self.complete = true;
                self.message = "Transcript download complete!".to_string();
            }
            Some(ProcessingState::Cancelled) => {}
            None => {
                self.message = format!("Segments captured: {}", report.segments);
                self.observed_progress = report.progress;
                if let Some(estimated) = report.estimated_duration
                    && estimated > 0
                {
                    self.estimated_duration_secs = estimated as f64;
                }
            }
        }
    }

    /// One animation step. Returns the new displayed value, which never
    /// decreases: the step is clamped at the target, and a target below
    /// the displayed value simply freezes the bar.
    pub fn tick(&mut self, now: Instant) -> f64 {
        if self.complete {
            if self.completed_at.is_none() {
                self.displayed = 1.0;
                self.completed_at = Some(now);
            }
            return self.displayed;
        }

        if let Some(started) = self.capture_started_at {
            let elapsed = now.duration_since(started).as_secs_f64();
            let ramp = self.config.capture_ramp.as_secs_f64();
            let time_target =
                (self.config.capture_floor + elapsed / ramp).min(self.config.capture_ceiling);

            let candidate = if self.observed_progress > time_target {
                (self.config.capture_floor + self.observed_progress * self.config.observed_scale)
                    .min(self.config.capture_ceiling)
            } else {
                time_target
            };

            // Whichever is further along wins; processing-stage milestones
            // above the ceiling are never pulled back down.
            self.target = self.target.max(candidate);
        }

        if self.displayed < self.target {
            let multiplier = if self.target < self.config.capture_floor {
                self.config.setup_multiplier
            } else if self.capture_started() {
                self.config.capture_multiplier
            } else {
                self.config.setup_multiplier
            };

            let increment = self.config.base_speed * multiplier * (100.0 - self.displayed * 50.0);
            self.displayed = (self.displayed + increment).min(self.target);
        }

        self.displayed
    }

    /// True once the bar has held at 100% for the configured time.
    pub fn finished(&self, now: Instant) -> bool {
        self.completed_at
            .is_some_and(|at| now.duration_since(at) >= self.config.hold_after_complete)
    }
}
