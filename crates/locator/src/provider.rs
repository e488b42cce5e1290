use std::sync::LazyLock;

use regex::Regex;

static PROVIDER_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:vimeo\.com/(?:video/)?|player\.vimeo\.com/video/)(\d+)").unwrap()
});

/// Quick filter for embed elements worth looking at.
pub fn is_provider_embed(url: &str) -> bool {
    url.contains("vimeo")
}

/// The provider's numeric video id, when the URL carries one.
pub fn extract_provider_id(url: &str) -> Option<&str> {
    PROVIDER_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
