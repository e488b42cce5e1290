/// Opaque handle to an embed element, valid until the next page scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmbedRef(pub u64);

/// Everything the title fallback chain needs to know about one embed, as a
/// plain snapshot so the scan logic stays DOM-free.
#[derive(Debug, Clone)]
pub struct EmbedView {
    pub handle: EmbedRef,
    pub source_url: String,
    /// The embed element's own title attribute.
    pub title_attr: Option<String>,
    /// Headings preceding the embed within three ancestor levels, nearest
    /// first.
    pub nearby_headings: Vec<String>,
    /// Alt texts of images sharing the embed's immediate container.
    pub image_alts: Vec<String>,
}

/// The page context's view of the host document.
pub trait PageDom: Send + Sync {
    /// Embed elements in document order.
    fn embeds(&self) -> Vec<EmbedView>;
    fn scroll_into_view(&self, embed: EmbedRef);
}
