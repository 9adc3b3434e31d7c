pub mod catalog;
pub mod classifier;

pub use catalog::{category_label, filter_videos, resolve_category, CatalogFilter, Category, Facets, VideoRecord, UNCATEGORIZED};
pub use classifier::{classify, Classification, Provider};
