//! Ordered provider table: one entry per recognized service, holding its
//! hostname matcher and its URL resolver. Adding a provider is a single new
//! registry entry; the priority order of the table is part of the
//! contract and must stay stable (YouTube, Vimeo, adult-content providers,
//! file-sharing providers, chat apps).

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::core::classifier::Provider;

/// How a matched provider's content gets presented.
pub enum Resolution {
    /// Canonical URL suitable for an inline frame or direct playback.
    Embed(String),
    /// Clickable external deep link; never rendered inline.
    ExternalLink(String),
    /// Recognized, but the provider cannot be embedded at all.
    NoEmbed,
}

pub struct ProviderEntry {
    pub provider: Provider,
    /// Hostname predicate. Entries must be mutually exclusive by host.
    pub matches: fn(&str) -> bool,
    /// Id extraction + embed construction. `None` means the host matched but
    /// the URL does not carry the expected shape; classification then fails
    /// closed instead of emitting a broken embed URL.
    pub resolve: fn(&Url) -> Option<Resolution>,
}

static REGISTRY: [ProviderEntry; 8] = [
    ProviderEntry {
        provider: Provider::Youtube,
        matches: youtube_host,
        resolve: youtube_resolve,
    },
    ProviderEntry {
        provider: Provider::Vimeo,
        matches: vimeo_host,
        resolve: vimeo_resolve,
    },
    ProviderEntry {
        provider: Provider::Xvideos,
        matches: xvideos_host,
        resolve: xvideos_resolve,
    },
    ProviderEntry {
        provider: Provider::Pornhub,
        matches: pornhub_host,
        resolve: pornhub_resolve,
    },
    ProviderEntry {
        provider: Provider::GoogleDrive,
        matches: gdrive_host,
        resolve: gdrive_resolve,
    },
    ProviderEntry {
        provider: Provider::Dropbox,
        matches: dropbox_host,
        resolve: dropbox_resolve,
    },
    ProviderEntry {
        provider: Provider::Terabox,
        matches: terabox_host,
        resolve: terabox_resolve,
    },
    ProviderEntry {
        provider: Provider::Telegram,
        matches: telegram_host,
        resolve: telegram_resolve,
    },
];

pub fn registry() -> &'static [ProviderEntry] {
    &REGISTRY
}

/// Suffix match with a dot boundary, so `notyoutube.com` does not pass as
/// `youtube.com`.
fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain
        || (host.len() > domain.len()
            && host.ends_with(domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
}

// ---- YouTube ----

pub(crate) fn youtube_host(host: &str) -> bool {
    host == "youtu.be" || domain_matches(host, "youtube.com")
}

/// Known watch-page shapes: `watch?v=<id>`, `youtu.be/<id>`, `embed/<id>`.
pub(crate) fn youtube_video_id(url: &Url) -> Option<String> {
    if url.host_str() == Some("youtu.be") {
        let id = url.path_segments()?.next()?;
        return (!id.is_empty()).then(|| id.to_string());
    }

    if let Some((_, v)) = url.query_pairs().find(|(key, _)| key == "v") {
        return (!v.is_empty()).then(|| v.into_owned());
    }

    let path = url.path().trim_matches('/');
    for prefix in ["embed/", "v/"] {
        if let Some(rest) = path.strip_prefix(prefix) {
            let id = rest.split('/').next().unwrap_or("");
            return (!id.is_empty()).then(|| id.to_string());
        }
    }

    None
}

fn youtube_resolve(url: &Url) -> Option<Resolution> {
    let id = youtube_video_id(url)?;
    Some(Resolution::Embed(format!("https://www.youtube.com/embed/{id}")))
}

// ---- Vimeo ----

pub(crate) fn vimeo_host(host: &str) -> bool {
    domain_matches(host, "vimeo.com")
}

pub(crate) fn vimeo_video_id(url: &Url) -> Option<String> {
    url.path_segments()?
        .find(|segment| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
        .map(|segment| segment.to_string())
}

fn vimeo_resolve(url: &Url) -> Option<Resolution> {
    let id = vimeo_video_id(url)?;
    Some(Resolution::Embed(format!("https://player.vimeo.com/video/{id}")))
}

// ---- XVideos ----

static XVIDEOS_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"video(\d+)").unwrap());

fn xvideos_host(host: &str) -> bool {
    domain_matches(host, "xvideos.com")
}

fn xvideos_resolve(url: &Url) -> Option<Resolution> {
    let id = XVIDEOS_ID_RE.captures(url.path())?.get(1)?.as_str();
    Some(Resolution::Embed(format!(
        "https://www.xvideos.com/embedframe/{id}"
    )))
}

// ---- Pornhub ----

fn pornhub_host(host: &str) -> bool {
    domain_matches(host, "pornhub.com")
}

fn pornhub_resolve(url: &Url) -> Option<Resolution> {
    let (_, viewkey) = url.query_pairs().find(|(key, _)| key == "viewkey")?;
    if viewkey.is_empty() {
        return None;
    }
    Some(Resolution::Embed(format!(
        "https://www.pornhub.com/embed/{viewkey}"
    )))
}

// ---- Google Drive ----

static GDRIVE_FILE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/d/([^/]+)").unwrap());

fn gdrive_host(host: &str) -> bool {
    domain_matches(host, "drive.google.com")
}

fn gdrive_resolve(url: &Url) -> Option<Resolution> {
    let id = GDRIVE_FILE_RE.captures(url.path())?.get(1)?.as_str();
    Some(Resolution::Embed(format!(
        "https://drive.google.com/file/d/{id}/preview"
    )))
}

// ---- Dropbox ----

fn dropbox_host(host: &str) -> bool {
    domain_matches(host, "dropbox.com")
}

/// Shared links play directly once `dl=0` is swapped for `raw=1`; the flag is
/// forced on even when the pasted link carries no query at all.
fn dropbox_resolve(url: &Url) -> Option<Resolution> {
    let mut direct = url.clone();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "dl" && key != "raw")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut pairs = direct.query_pairs_mut();
        pairs.clear();
        pairs.extend_pairs(kept);
        pairs.append_pair("raw", "1");
    }

    Some(Resolution::Embed(direct.to_string()))
}

// ---- TeraBox ----

fn terabox_host(host: &str) -> bool {
    domain_matches(host, "terabox.com")
}

fn terabox_resolve(_url: &Url) -> Option<Resolution> {
    Some(Resolution::NoEmbed)
}

// ---- Telegram ----

fn telegram_host(host: &str) -> bool {
    domain_matches(host, "t.me") || domain_matches(host, "telegram.me")
}

/// Needs both a channel and a message id; shorter paths (bare profiles) are
/// not addressable content.
fn telegram_resolve(url: &Url) -> Option<Resolution> {
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let channel = segments.next()?;
    let message = segments.next()?;
    Some(Resolution::ExternalLink(format!(
        "https://t.me/{channel}/{message}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_matches_requires_dot_boundary() {
        assert!(domain_matches("youtube.com", "youtube.com"));
        assert!(domain_matches("www.youtube.com", "youtube.com"));
        assert!(domain_matches("m.youtube.com", "youtube.com"));
        assert!(!domain_matches("notyoutube.com", "youtube.com"));
        assert!(!domain_matches("youtube.com.evil.example", "youtube.com"));
    }

    #[test]
    fn test_registry_order_is_the_documented_priority() {
        let order: Vec<Provider> = registry().iter().map(|e| e.provider).collect();
        assert_eq!(
            order,
            vec![
                Provider::Youtube,
                Provider::Vimeo,
                Provider::Xvideos,
                Provider::Pornhub,
                Provider::GoogleDrive,
                Provider::Dropbox,
                Provider::Terabox,
                Provider::Telegram,
            ]
        );
    }

    #[test]
    fn test_youtube_video_id_shapes() {
        let cases = [
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ", Some("dQw4w9WgXcQ")),
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=123", Some("dQw4w9WgXcQ")),
            ("https://youtu.be/dQw4w9WgXcQ", Some("dQw4w9WgXcQ")),
            ("https://m.youtube.com/watch?v=dQw4w9WgXcQ", Some("dQw4w9WgXcQ")),
            ("https://www.youtube.com/embed/dQw4w9WgXcQ", Some("dQw4w9WgXcQ")),
            ("https://www.youtube.com/watch?v=", None),
            ("https://youtu.be/", None),
        ];
        for (raw, expected) in cases {
            let url = Url::parse(raw).unwrap();
            assert_eq!(youtube_video_id(&url).as_deref(), expected, "{raw}");
        }
    }

    #[test]
    fn test_vimeo_video_id_is_first_numeric_segment() {
        let url = Url::parse("https://vimeo.com/555000111").unwrap();
        assert_eq!(vimeo_video_id(&url).as_deref(), Some("555000111"));

        let url = Url::parse("https://vimeo.com/video/555000111").unwrap();
        assert_eq!(vimeo_video_id(&url).as_deref(), Some("555000111"));

        let url = Url::parse("https://vimeo.com/about").unwrap();
        assert_eq!(vimeo_video_id(&url), None);
    }

    #[test]
    fn test_dropbox_rewrite_forces_raw_flag() {
        let url = Url::parse("https://www.dropbox.com/s/abc/clip.mp4?dl=0").unwrap();
        match dropbox_resolve(&url) {
            Some(Resolution::Embed(direct)) => {
                assert_eq!(direct, "https://www.dropbox.com/s/abc/clip.mp4?raw=1");
            }
            _ => panic!("expected an embed resolution"),
        }

        let url = Url::parse("https://www.dropbox.com/s/abc/clip.mp4").unwrap();
        match dropbox_resolve(&url) {
            Some(Resolution::Embed(direct)) => {
                assert_eq!(direct, "https://www.dropbox.com/s/abc/clip.mp4?raw=1");
            }
            _ => panic!("expected an embed resolution"),
        }
    }

    #[test]
    fn test_telegram_requires_channel_and_message() {
        let url = Url::parse("https://t.me/channelname/42").unwrap();
        match telegram_resolve(&url) {
            Some(Resolution::ExternalLink(link)) => {
                assert_eq!(link, "https://t.me/channelname/42");
            }
            _ => panic!("expected an external link"),
        }

        let url = Url::parse("https://t.me/channelname").unwrap();
        assert!(telegram_resolve(&url).is_none());
    }
}
