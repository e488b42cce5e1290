use lectern_bridge_interface::{BridgeRequest, BridgeTransport, VideoSummary};
use lectern_transcript::sanitize;
use regex::Regex;

use crate::page::{EmbedRef, EmbedView, PageDom};
use crate::provider::{extract_provider_id, is_provider_embed};

#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Patterns stripped from derived titles; the player's embeds carry
    /// attribution suffixes like "<title> from <account> on Vimeo".
    pub boilerplate: Vec<Regex>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        let patterns = [
            r"(?i)from\s+.*on\s+vimeo",
            r"(?i)on\s+vimeo",
            r"(?i)\bfrom\b",
        ];
        Self {
            boilerplate: patterns
                .iter()
                .map(|p| Regex::new(p).unwrap())
                .collect(),
        }
    }
}

/// One video found on the page. Immutable; a re-scan supersedes the whole
/// set rather than mutating it.
#[derive(Debug, Clone)]
pub struct DetectedVideo {
    /// Ordinal of the embed in document order. Embeds skipped for lacking
    /// a provider id still consume an ordinal, so ids are stable across
    /// partial scans.
    pub id: u32,
    pub provider_video_id: String,
    pub source_url: String,
    pub title: String,
    pub sanitized_filename: String,
    pub frame: EmbedRef,
}

impl DetectedVideo {
    /// The DOM-free form sent to the popup.
    pub fn summary(&self) -> VideoSummary {
        VideoSummary {
            id: self.id,
            video_id: self.provider_video_id.clone(),
            title: self.title.clone(),
            filename: self.sanitized_filename.clone(),
        }
    }
}

fn derive_title(embed: &EmbedView, ordinal: usize, config: &LocatorConfig) -> String {
    let picked = embed
        .title_attr
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| {
            embed
                .nearby_headings
                .iter()
                .map(String::as_str)
                .find(|h| !h.trim().is_empty())
        })
        .or_else(|| {
            embed
                .image_alts
                .iter()
                .map(String::as_str)
                .find(|a| !a.trim().is_empty())
        })
        .map(str::to_string)
        .unwrap_or_else(|| format!("Video {}", ordinal + 1));

    let mut title = picked;
    for pattern in &config.boilerplate {
        title = pattern.replace_all(&title, "").into_owned();
    }
    title.trim().to_string()
}

/// Scan the page for provider embeds. Embeds whose URL yields no provider
/// id are skipped silently.
pub fn scan(dom: &dyn PageDom, config: &LocatorConfig) -> Vec<DetectedVideo> {
    let mut videos = Vec::new();

    for (ordinal, embed) in dom.embeds().iter().enumerate() {
        if !is_provider_embed(&embed.source_url) {
            continue;
        }
        let Some(provider_id) = extract_provider_id(&embed.source_url) else {
            continue;
        };

        let title = derive_title(embed, ordinal, config);
        let video = DetectedVideo {
            id: ordinal as u32,
            provider_video_id: provider_id.to_string(),
            source_url: embed.source_url.clone(),
            sanitized_filename: sanitize(&title),
            title,
            frame: embed.handle,
        };

        tracing::debug!(id = video.id, title = %video.title, "video_detected");
        videos.push(video);
    }

    videos
}

/// Scan and report the count to the toolbar badge (zero clears it).
pub async fn scan_and_badge(
    dom: &dyn PageDom,
    config: &LocatorConfig,
    bridge: &dyn BridgeTransport,
) -> Vec<DetectedVideo> {
    let videos = scan(dom, config);
    bridge
        .notify(BridgeRequest::UpdateBadge {
            count: videos.len(),
        })
        .await;
    videos
}
