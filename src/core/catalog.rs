use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Label shown for records whose category reference is empty or points to a
/// category that no longer exists.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Raw user-submitted link. Embed URLs are always derived from this,
    /// never stored back into it.
    pub url: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    /// Soft reference to a Category; empty string means uncategorized.
    #[serde(default)]
    pub category_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

/// Active filter criteria for the catalog. All present criteria are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Exact, case-sensitive hashtag match (stored form, `#` included).
    pub hashtag: Option<String>,
    /// Exact category id match.
    pub category_id: Option<String>,
    /// Case-insensitive substring over title, description and url.
    /// An empty string matches everything.
    pub search: Option<String>,
}

impl CatalogFilter {
    pub fn is_empty(&self) -> bool {
        self.hashtag.is_none() && self.category_id.is_none() && self.search.is_none()
    }

    pub fn matches(&self, video: &VideoRecord) -> bool {
        if let Some(tag) = &self.hashtag {
            if !video.hashtags.iter().any(|t| t == tag) {
                return false;
            }
        }

        if let Some(category_id) = &self.category_id {
            if video.category_id != *category_id {
                return false;
            }
        }

        if let Some(needle) = &self.search {
            if !needle.is_empty() {
                let needle = needle.to_lowercase();
                let in_title = video.title.to_lowercase().contains(&needle);
                let in_description = video
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle));
                let in_url = video.url.to_lowercase().contains(&needle);
                if !in_title && !in_description && !in_url {
                    return false;
                }
            }
        }

        true
    }
}

/// Compute the visible subset of the catalog. The result is a subsequence of
/// the input: relative order is preserved and an empty result is a normal
/// outcome, not an error.
pub fn filter_videos<'a>(videos: &'a [VideoRecord], filter: &CatalogFilter) -> Vec<&'a VideoRecord> {
    videos.iter().filter(|v| filter.matches(v)).collect()
}

/// Distinct facet values over the full, unfiltered catalog, for building
/// filter menus. Never restricted by the currently active filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub hashtags: Vec<String>,
    pub category_ids: Vec<String>,
}

impl Facets {
    pub fn collect(videos: &[VideoRecord]) -> Self {
        let mut hashtags = BTreeSet::new();
        let mut category_ids = BTreeSet::new();

        for video in videos {
            for tag in &video.hashtags {
                hashtags.insert(tag.clone());
            }
            if !video.category_id.is_empty() {
                category_ids.insert(video.category_id.clone());
            }
        }

        Self {
            hashtags: hashtags.into_iter().collect(),
            category_ids: category_ids.into_iter().collect(),
        }
    }
}

/// Look up a category by id. Empty and dangling references both resolve to
/// `None`; callers fall back to [`UNCATEGORIZED`].
pub fn resolve_category<'a>(categories: &'a [Category], category_id: &str) -> Option<&'a Category> {
    if category_id.is_empty() {
        return None;
    }
    categories.iter().find(|c| c.id == category_id)
}

pub fn category_label<'a>(categories: &'a [Category], category_id: &str) -> &'a str {
    resolve_category(categories, category_id)
        .map(|c| c.name.as_str())
        .unwrap_or(UNCATEGORIZED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn video(id: &str, title: &str, tags: &[&str], category_id: &str) -> VideoRecord {
        VideoRecord {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            url: format!("https://www.youtube.com/watch?v={id}"),
            hashtags: tags.iter().map(|t| t.to_string()).collect(),
            category_id: category_id.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            thumbnail_url: None,
        }
    }

    fn sample_catalog() -> Vec<VideoRecord> {
        vec![
            video("a", "Rust tutorial", &["#rust", "#tutorial"], "cat1"),
            video("b", "Cooking pasta", &["#food"], "cat2"),
            video("c", "Rust streams", &["#rust"], ""),
        ]
    }

    #[test]
    fn test_hashtag_filter_is_exact_and_case_sensitive() {
        let videos = sample_catalog();
        let filter = CatalogFilter {
            hashtag: Some("#rust".to_string()),
            ..Default::default()
        };
        let ids: Vec<&str> = filter_videos(&videos, &filter)
            .iter()
            .map(|v| v.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);

        let upper = CatalogFilter {
            hashtag: Some("#Rust".to_string()),
            ..Default::default()
        };
        assert!(filter_videos(&videos, &upper).is_empty());

        // the bare word without the '#' prefix is not a stored tag
        let bare = CatalogFilter {
            hashtag: Some("rust".to_string()),
            ..Default::default()
        };
        assert!(filter_videos(&videos, &bare).is_empty());
    }

    #[test]
    fn test_category_filter() {
        let videos = sample_catalog();
        let filter = CatalogFilter {
            category_id: Some("cat2".to_string()),
            ..Default::default()
        };
        let ids: Vec<&str> = filter_videos(&videos, &filter)
            .iter()
            .map(|v| v.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn test_search_matches_any_field_case_insensitively() {
        let mut videos = sample_catalog();
        videos[1].description = Some("A quick WEEKNIGHT dinner".to_string());

        let by_title = CatalogFilter {
            search: Some("rust".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_videos(&videos, &by_title).len(), 2);

        let by_description = CatalogFilter {
            search: Some("weeknight".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_videos(&videos, &by_description).len(), 1);

        let by_url = CatalogFilter {
            search: Some("watch?v=b".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_videos(&videos, &by_url).len(), 1);
    }

    #[test]
    fn test_empty_search_matches_everything() {
        let videos = sample_catalog();
        let filter = CatalogFilter {
            search: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filter_videos(&videos, &filter).len(), videos.len());
    }

    #[test]
    fn test_filters_are_anded_and_order_is_preserved() {
        let videos = sample_catalog();
        let filter = CatalogFilter {
            hashtag: Some("#rust".to_string()),
            search: Some("tutorial".to_string()),
            ..Default::default()
        };
        let ids: Vec<&str> = filter_videos(&videos, &filter)
            .iter()
            .map(|v| v.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_facets_are_distinct_sorted_and_skip_empty_category() {
        let videos = sample_catalog();
        let facets = Facets::collect(&videos);
        assert_eq!(facets.hashtags, vec!["#food", "#rust", "#tutorial"]);
        assert_eq!(facets.category_ids, vec!["cat1", "cat2"]);
    }

    #[test]
    fn test_dangling_category_resolves_to_uncategorized() {
        let categories = vec![Category {
            id: "cat1".to_string(),
            name: "Tutorials".to_string(),
        }];
        assert_eq!(category_label(&categories, "cat1"), "Tutorials");
        assert_eq!(category_label(&categories, "deleted"), UNCATEGORIZED);
        assert_eq!(category_label(&categories, ""), UNCATEGORIZED);
        assert!(resolve_category(&categories, "deleted").is_none());
    }

    #[test]
    fn test_record_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "title": "Minimal",
            "description": null,
            "url": "https://vimeo.com/1",
            "createdAt": "2024-01-01T00:00:00Z"
        }"#;
        let record: VideoRecord = serde_json::from_str(json).unwrap();
        assert!(record.id.is_empty());
        assert!(record.hashtags.is_empty());
        assert!(record.category_id.is_empty());
        assert!(record.thumbnail_url.is_none());
    }
}
