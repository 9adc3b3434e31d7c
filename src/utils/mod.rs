use url::Url;

use crate::providers;

/// Derive a preview image for providers that publish predictable thumbnail
/// URLs. Everything else gets no thumbnail rather than a guess.
pub fn thumbnail_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?;

    if providers::youtube_host(host) {
        let id = providers::youtube_video_id(&url)?;
        return Some(format!("https://img.youtube.com/vi/{id}/maxresdefault.jpg"));
    }

    if providers::vimeo_host(host) {
        let id = providers::vimeo_video_id(&url)?;
        return Some(format!("https://vumbnail.com/{id}.jpg"));
    }

    None
}

/// Normalize user-entered hashtags: split on commas and whitespace, trim,
/// force a single `#` prefix, drop empties and duplicates (first occurrence
/// wins, order preserved).
pub fn normalize_hashtags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    for token in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        let token = token.trim().trim_start_matches('#');
        if token.is_empty() {
            continue;
        }
        let tag = format!("#{token}");
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    tags
}
