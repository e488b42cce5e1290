//! Simulated player environment for tests and the demo example.
//!
//! [`SimPlayerFrame`] behaves like the real captioning widget: the
//! transcript toggle may take a few polls to exist, the panel only renders
//! once the toggle is pressed, and cues materialise lazily as the panel is
//! scrolled. [`SimHost`] plays the browser: tabs, frames, reloads, badge.
//! [`SimPage`] is the LMS page with its embeds.

mod frame;
mod host;
mod page;

pub use frame::{SimFrameConfig, SimPlayerFrame, lecture_cues};
pub use host::SimHost;
pub use page::SimPage;
