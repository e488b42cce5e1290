pub mod cues;
pub mod filename;
pub mod format;
pub mod timecode;

pub use cues::{CueKey, CueSet};
pub use filename::{sanitize, with_txt_extension};
pub use format::{strip_standalone_timestamps, tidy};
pub use timecode::{clock_to_seconds, leading_timestamp};
