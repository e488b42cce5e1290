use std::time::Duration;

use lectern_locator::LocatorConfig;

use crate::progress::AnimatorConfig;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Attempts per orchestration step before the heavier remedies kick in.
    pub step_attempts: u32,
    pub step_retry_delay: Duration,
    /// Wait after a successful panel open before starting the driver, so
    /// the panel's opening animation cannot race the first scan.
    pub post_open_settle: Duration,
    /// Wait after driver success before resetting the panel, letting the
    /// bar visibly reach 100%.
    pub pre_reset_delay: Duration,
    /// How long the finished UI stays up before teardown.
    pub teardown_delay: Duration,
    /// Pause between batch items.
    pub batch_pause: Duration,
    /// Animation frame spacing for the displayed progress value.
    pub animation_tick: Duration,
    pub animator: AnimatorConfig,
    pub locator: LocatorConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            step_attempts: 3,
            step_retry_delay: Duration::from_secs(1),
            post_open_settle: Duration::from_secs(1),
            pre_reset_delay: Duration::from_millis(500),
            teardown_delay: Duration::from_secs(2),
            batch_pause: Duration::from_secs(1),
            animation_tick: Duration::from_millis(16),
            animator: AnimatorConfig::default(),
            locator: LocatorConfig::default(),
        }
    }
}
