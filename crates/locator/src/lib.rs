//! Finds embedded player frames on the current page and derives a title
//! and filename for each, feeding the badge along the way.

mod page;
mod provider;
mod scan;

pub use page::{EmbedRef, EmbedView, PageDom};
pub use provider::{extract_provider_id, is_provider_embed};
pub use scan::{DetectedVideo, LocatorConfig, scan, scan_and_badge};
