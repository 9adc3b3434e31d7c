//! Client for the hosted document store that owns the catalog. Persistence
//! and auth both live behind this seam; the pure core only ever sees the
//! in-memory snapshots fetched here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::core::{Category, VideoRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store returned HTTP {status} while trying to {context}")]
    Status {
        status: reqwest::StatusCode,
        context: String,
    },
    #[error("malformed document: {0}")]
    Document(#[from] serde_json::Error),
    #[error("sign-in rejected: {0}")]
    Auth(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Fields supplied by the caller when creating a record. The store assigns
/// the id; `created_at` is set once here and never patched afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVideo {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub hashtags: Vec<String>,
    pub category_id: String,
    pub created_at: DateTime<Utc>,
    pub thumbnail_url: Option<String>,
}

/// Partial update for an existing record. `created_at` is immutable and
/// deliberately absent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// Double-optional: outer `None` leaves the stored thumbnail untouched,
    /// `Some(None)` writes an explicit null so a stale derived thumbnail is
    /// cleared whenever the url changes to a provider without one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<Option<String>>,
}

impl VideoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.url.is_none()
            && self.hashtags.is_none()
            && self.category_id.is_none()
            && self.thumbnail_url.is_none()
    }
}

/// Narrow interface to the external persistence collaborator.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Full catalog, newest-first.
    async fn fetch_videos(&self) -> Result<Vec<VideoRecord>>;
    /// All categories, ordered by name.
    async fn fetch_categories(&self) -> Result<Vec<Category>>;
    async fn add_video(&self, video: &NewVideo) -> Result<VideoRecord>;
    async fn update_video(&self, id: &str, changes: &VideoPatch) -> Result<()>;
    async fn delete_video(&self, id: &str) -> Result<()>;
    async fn add_category(&self, name: &str) -> Result<Category>;
    /// Deletes only the category document. Records that still reference it
    /// keep their `category_id` and resolve to the uncategorized label at
    /// display time.
    async fn delete_category(&self, id: &str) -> Result<()>;
}

/// Fetch videos and categories concurrently as one consistent-enough snapshot
/// for the pure catalog filter.
pub async fn fetch_snapshot(
    store: &impl CatalogStore,
) -> Result<(Vec<VideoRecord>, Vec<Category>)> {
    futures::try_join!(store.fetch_videos(), store.fetch_categories())
}

#[derive(Debug, Deserialize)]
struct Session {
    token: String,
}

#[derive(Debug, Deserialize)]
struct CreatedDocument {
    id: String,
}

/// JSON-over-HTTP client for the hosted document API:
/// `GET/POST /{collection}`, `PATCH/DELETE /{collection}/{id}`, with the api
/// key as a query parameter and a bearer token after sign-in.
pub struct DocumentStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    token: Option<String>,
}

impl DocumentStore {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.store.base_url.trim_end_matches('/').to_string(),
            api_key: config.store.api_key.clone(),
            token: None,
        })
    }

    /// Email/password sign-in against the store's auth endpoint. On success
    /// the session token is attached to every subsequent request.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<()> {
        let url = format!("{}/auth/sign-in", self.base_url);
        debug!("Signing in as {}", email);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!("HTTP {status}: {body}")));
        }

        let session: Session = response.json().await?;
        self.token = Some(session.token);
        info!("Signed in as {}", email);
        Ok(())
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.base_url, collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            collection,
            urlencoding::encode(id)
        )
    }

    fn request(&self, method: Method, url: String) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, url)
            .query(&[("key", self.api_key.as_str())]);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn expect_success(
        response: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(StoreError::Status {
                status,
                context: context.to_string(),
            })
        }
    }
}

#[async_trait]
impl CatalogStore for DocumentStore {
    async fn fetch_videos(&self) -> Result<Vec<VideoRecord>> {
        let response = self
            .request(Method::GET, self.collection_url("videos"))
            .send()
            .await?;
        let response = Self::expect_success(response, "fetch videos").await?;

        let body = response.text().await?;
        let mut videos: Vec<VideoRecord> = serde_json::from_str(&body)?;
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        debug!("Fetched {} videos", videos.len());
        Ok(videos)
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>> {
        let response = self
            .request(Method::GET, self.collection_url("categories"))
            .send()
            .await?;
        let response = Self::expect_success(response, "fetch categories").await?;

        let body = response.text().await?;
        let mut categories: Vec<Category> = serde_json::from_str(&body)?;
        categories.sort_by(|a, b| a.name.cmp(&b.name));

        debug!("Fetched {} categories", categories.len());
        Ok(categories)
    }

    async fn add_video(&self, video: &NewVideo) -> Result<VideoRecord> {
        let response = self
            .request(Method::POST, self.collection_url("videos"))
            .json(video)
            .send()
            .await?;
        let response = Self::expect_success(response, "add video").await?;

        let created: CreatedDocument = response.json().await?;
        info!("Created video {}", created.id);

        Ok(VideoRecord {
            id: created.id,
            title: video.title.clone(),
            description: video.description.clone(),
            url: video.url.clone(),
            hashtags: video.hashtags.clone(),
            category_id: video.category_id.clone(),
            created_at: video.created_at,
            thumbnail_url: video.thumbnail_url.clone(),
        })
    }

    async fn update_video(&self, id: &str, changes: &VideoPatch) -> Result<()> {
        let response = self
            .request(Method::PATCH, self.document_url("videos", id))
            .json(changes)
            .send()
            .await?;
        Self::expect_success(response, "update video").await?;
        info!("Updated video {}", id);
        Ok(())
    }

    async fn delete_video(&self, id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, self.document_url("videos", id))
            .send()
            .await?;
        Self::expect_success(response, "delete video").await?;
        info!("Deleted video {}", id);
        Ok(())
    }

    async fn add_category(&self, name: &str) -> Result<Category> {
        let response = self
            .request(Method::POST, self.collection_url("categories"))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        let response = Self::expect_success(response, "add category").await?;

        let created: CreatedDocument = response.json().await?;
        info!("Created category {}", created.id);

        Ok(Category {
            id: created.id,
            name: name.to_string(),
        })
    }

    async fn delete_category(&self, id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, self.document_url("categories", id))
            .send()
            .await?;
        Self::expect_success(response, "delete category").await?;
        info!("Deleted category {}", id);
        Ok(())
    }
}
