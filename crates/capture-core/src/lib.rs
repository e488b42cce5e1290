//! The in-frame side of the capture protocol: everything that would run
//! inside the player's iframe, written against the [`FrameDom`] trait so a
//! browser bridge, a webview, or a simulated frame can host it unchanged.

pub mod dom;
pub mod driver;
pub mod opener;
pub mod panel;
pub mod scanner;

pub use dom::{ButtonView, CuePanel, CueView, FrameDom, ScrollMetrics};
pub use driver::{CaptureOutput, DriverConfig};
pub use lectern_bridge_interface::WindowSink;
pub use opener::{OpenerConfig, is_transcript_open, open_transcript};
pub use panel::{locate_panel, scroll_to_top};
pub use scanner::{ScanDelta, TranscriptScanner};
