pub mod cli;
pub mod config;
pub mod core;
pub mod providers;
pub mod store;
pub mod utils;

pub use core::{classify, CatalogFilter, Category, Classification, Facets, Provider, VideoRecord};
pub use store::{CatalogStore, DocumentStore, StoreError};
