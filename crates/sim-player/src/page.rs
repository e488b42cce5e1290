use std::sync::Mutex;

use lectern_locator::{EmbedRef, EmbedView, PageDom};

/// The LMS page: a fixed list of embeds plus a record of what was
/// scrolled into view.
pub struct SimPage {
    embeds: Vec<EmbedView>,
    scrolled: Mutex<Vec<EmbedRef>>,
}

impl SimPage {
    pub fn new(embeds: Vec<EmbedView>) -> Self {
        Self {
            embeds,
            scrolled: Mutex::new(Vec::new()),
        }
    }

    /// Convenience: one embed per (url, heading) pair, handles assigned in
    /// order.
    pub fn with_videos(videos: &[(&str, &str)]) -> Self {
        Self::new(
            videos
                .iter()
                .enumerate()
                .map(|(i, (url, heading))| EmbedView {
                    handle: EmbedRef(i as u64),
                    source_url: url.to_string(),
                    title_attr: None,
                    nearby_headings: vec![heading.to_string()],
                    image_alts: vec![],
                })
                .collect(),
        )
    }

    pub fn scrolled(&self) -> Vec<EmbedRef> {
        self.scrolled.lock().unwrap().clone()
    }
}

impl PageDom for SimPage {
    fn embeds(&self) -> Vec<EmbedView> {
        self.embeds.clone()
    }

    fn scroll_into_view(&self, embed: EmbedRef) {
        self.scrolled.lock().unwrap().push(embed);
    }
}
