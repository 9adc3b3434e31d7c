use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;

use crate::config::Config;
use crate::core::{
    category_label, classify, filter_videos, CatalogFilter, Classification, Facets,
};
use crate::store::{fetch_snapshot, CatalogStore, DocumentStore, NewVideo, VideoPatch};
use crate::utils::{normalize_hashtags, thumbnail_url};

#[derive(Parser)]
#[command(name = "vidshelf")]
#[command(about = "Video catalog with provider-aware link handling")]
#[command(version)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Classify a video link and show how it would be presented
    Classify {
        /// URL to classify
        #[arg(value_name = "URL")]
        url: String,
    },
    /// List catalog videos, optionally filtered
    List {
        /// Only videos carrying this hashtag (exact match, including '#')
        #[arg(long)]
        hashtag: Option<String>,
        /// Only videos in this category id
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive text search over title, description and url
        #[arg(long)]
        search: Option<String>,
    },
    /// Show the hashtag and category facets of the full catalog
    Tags,
    /// Add a video to the catalog
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        description: Option<String>,
        /// Comma- or space-separated hashtags ('#' optional)
        #[arg(long, default_value = "")]
        hashtags: String,
        /// Category id (empty for uncategorized)
        #[arg(long, default_value = "")]
        category: String,
    },
    /// Update fields of an existing video
    Edit {
        /// Video id
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        hashtags: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Remove a video from the catalog
    Rm {
        /// Video id
        id: String,
    },
    /// List categories
    Categories,
    /// Create a category
    AddCategory {
        /// Category name
        name: String,
    },
    /// Delete a category; referencing videos are kept and display as
    /// uncategorized
    RmCategory {
        /// Category id
        id: String,
    },
}

impl Cli {
    /// Load config and open an authenticated store connection. Called only
    /// by the subcommands that actually touch the catalog; `classify` stays
    /// pure and never gets here.
    async fn open_store(&self) -> Result<DocumentStore> {
        let config = Config::load(self.config.as_deref())?;

        let mut store = DocumentStore::new(&config)?;
        if let Some(auth) = &config.auth {
            store.sign_in(&auth.email, &auth.password).await?;
        }
        Ok(store)
    }

    pub async fn run(&self) -> Result<()> {
        if self.verbose {
            println!("Verbose mode enabled");
        }

        match &self.command {
            Command::Classify { url } => {
                println!("{}", presentation(url));
            }

            Command::List {
                hashtag,
                category,
                search,
            } => {
                let store = self.open_store().await?;
                let (videos, categories) = fetch_snapshot(&store).await?;
                let filter = CatalogFilter {
                    hashtag: hashtag.clone(),
                    category_id: category.clone(),
                    search: search.clone(),
                };

                let visible = filter_videos(&videos, &filter);
                if visible.is_empty() {
                    if filter.is_empty() {
                        println!("The catalog is empty");
                    } else {
                        println!("No videos match the active filters");
                    }
                    return Ok(());
                }

                for video in visible {
                    println!("{}  {}", video.id, video.title);
                    if let Some(description) = &video.description {
                        println!("    {}", description);
                    }
                    println!("    category: {}", category_label(&categories, &video.category_id));
                    if !video.hashtags.is_empty() {
                        println!("    tags: {}", video.hashtags.join(" "));
                    }
                    println!("    {}", presentation(&video.url));
                }
            }

            Command::Tags => {
                let store = self.open_store().await?;
                let (videos, categories) = fetch_snapshot(&store).await?;
                let facets = Facets::collect(&videos);

                println!("Hashtags ({}):", facets.hashtags.len());
                for tag in &facets.hashtags {
                    println!("  {}", tag);
                }

                println!("Categories ({}):", facets.category_ids.len());
                for id in &facets.category_ids {
                    println!("  {}  {}", id, category_label(&categories, id));
                }
            }

            Command::Add {
                title,
                url,
                description,
                hashtags,
                category,
            } => {
                if title.trim().is_empty() {
                    anyhow::bail!("title must not be empty");
                }
                if matches!(classify(url), Classification::Unrecognized) {
                    warn!("URL does not match any supported provider; the video will be stored but cannot be embedded");
                }

                let video = NewVideo {
                    title: title.clone(),
                    description: description.clone(),
                    url: url.clone(),
                    hashtags: normalize_hashtags(hashtags),
                    category_id: category.clone(),
                    created_at: Utc::now(),
                    thumbnail_url: thumbnail_url(url),
                };

                let store = self.open_store().await?;
                let created = store.add_video(&video).await?;
                println!("Added {}: {}", created.id, created.title);
            }

            Command::Edit {
                id,
                title,
                url,
                description,
                hashtags,
                category,
            } => {
                let patch = build_patch(
                    title.as_deref(),
                    url.as_deref(),
                    description.as_deref(),
                    hashtags.as_deref(),
                    category.as_deref(),
                )?;
                if patch.is_empty() {
                    anyhow::bail!("nothing to update");
                }

                let store = self.open_store().await?;
                store.update_video(id, &patch).await?;
                println!("Updated {}", id);
            }

            Command::Rm { id } => {
                let store = self.open_store().await?;
                store.delete_video(id).await?;
                println!("Removed {}", id);
            }

            Command::Categories => {
                let store = self.open_store().await?;
                let categories = store.fetch_categories().await?;
                if categories.is_empty() {
                    println!("No categories");
                }
                for category in categories {
                    println!("{}  {}", category.id, category.name);
                }
            }

            Command::AddCategory { name } => {
                if name.trim().is_empty() {
                    anyhow::bail!("category name must not be empty");
                }
                let store = self.open_store().await?;
                let created = store.add_category(name).await?;
                println!("Added category {}: {}", created.id, created.name);
            }

            Command::RmCategory { id } => {
                let store = self.open_store().await?;
                store.delete_category(id).await?;
                println!("Removed category {}", id);
            }
        }

        Ok(())
    }
}

/// Assemble the partial update for `edit`. A present-but-empty title is
/// rejected (titles are non-empty display strings), and whenever the url
/// changes the derived thumbnail is recomputed with it — cleared via an
/// explicit null when the new provider has none, so a stale thumbnail can
/// never outlive the link it was derived from.
fn build_patch(
    title: Option<&str>,
    url: Option<&str>,
    description: Option<&str>,
    hashtags: Option<&str>,
    category: Option<&str>,
) -> Result<VideoPatch> {
    if let Some(title) = title {
        if title.trim().is_empty() {
            anyhow::bail!("title must not be empty");
        }
    }

    Ok(VideoPatch {
        title: title.map(str::to_string),
        description: description.map(str::to_string),
        url: url.map(str::to_string),
        hashtags: hashtags.map(normalize_hashtags),
        category_id: category.map(str::to_string),
        thumbnail_url: url.map(thumbnail_url),
    })
}


fn presentation(url: &str) -> String {
    match classify(url) {
        Classification::Embed {
            provider,
            embed_url,
        } => format!("{}: embed {}", provider, embed_url),
        Classification::NoEmbed { provider } => {
            format!("{}: cannot be embedded, open the original link", provider)
        }
        Classification::ExternalLink {
            provider,
            deep_link,
        } => format!("{}: open externally {}", provider, deep_link),
        Classification::Unrecognized => "unsupported link".to_string(),
    }
}
