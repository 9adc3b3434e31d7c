use serde::Serialize;
use url::Url;

use crate::providers::{registry, Resolution};

/// Video providers recognized by hostname, in documented priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Youtube,
    Vimeo,
    Xvideos,
    Pornhub,
    #[serde(rename = "gdrive")]
    GoogleDrive,
    Dropbox,
    Terabox,
    Telegram,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Youtube => "youtube",
            Provider::Vimeo => "vimeo",
            Provider::Xvideos => "xvideos",
            Provider::Pornhub => "pornhub",
            Provider::GoogleDrive => "gdrive",
            Provider::Dropbox => "dropbox",
            Provider::Terabox => "terabox",
            Provider::Telegram => "telegram",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying a raw link. Always derived from the stored `url`,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    /// Host did not match any known provider, or the string is not a URL at
    /// all, or the host matched but the expected id shape did not.
    Unrecognized,
    /// Provider recognized; `embed_url` can be loaded in an inline frame.
    Embed { provider: Provider, embed_url: String },
    /// Provider recognized but forbids inline embedding; callers should
    /// offer the original link instead.
    NoEmbed { provider: Provider },
    /// Provider recognized; content is only reachable through an external
    /// deep link (chat apps), never an inline frame.
    ExternalLink { provider: Provider, deep_link: String },
}

impl Classification {
    pub fn provider(&self) -> Option<Provider> {
        match self {
            Classification::Unrecognized => None,
            Classification::Embed { provider, .. }
            | Classification::NoEmbed { provider }
            | Classification::ExternalLink { provider, .. } => Some(*provider),
        }
    }

    pub fn embed_url(&self) -> Option<&str> {
        match self {
            Classification::Embed { embed_url, .. } => Some(embed_url),
            _ => None,
        }
    }

    pub fn is_embeddable(&self) -> bool {
        matches!(self, Classification::Embed { .. })
    }
}

/// Classify a raw link against the ordered provider table.
///
/// Pure string work: no network access, deterministic, idempotent. Malformed
/// input is treated the same as an unknown host. When a host matches but the
/// provider-specific id extraction fails, the result is `Unrecognized` rather
/// than a partial embed URL.
pub fn classify(raw: &str) -> Classification {
    let Ok(url) = Url::parse(raw.trim()) else {
        return Classification::Unrecognized;
    };
    let Some(host) = url.host_str() else {
        return Classification::Unrecognized;
    };

    for entry in registry() {
        if (entry.matches)(host) {
            return match (entry.resolve)(&url) {
                Some(Resolution::Embed(embed_url)) => Classification::Embed {
                    provider: entry.provider,
                    embed_url,
                },
                Some(Resolution::ExternalLink(deep_link)) => Classification::ExternalLink {
                    provider: entry.provider,
                    deep_link,
                },
                Some(Resolution::NoEmbed) => Classification::NoEmbed {
                    provider: entry.provider,
                },
                None => Classification::Unrecognized,
            };
        }
    }

    Classification::Unrecognized
}
