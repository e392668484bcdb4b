//! Outdoor gear catalog engine.
//!
//! Builds an immutable in-memory index from a read-only catalog store and
//! answers two kinds of queries against it: typo-tolerant autocomplete over
//! gear and brand names, and ranked alternative discovery along the
//! category → subcategory → product type hierarchy.
pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod metrics;
pub mod output;
pub mod scoring;
pub mod search;

pub use crate::app::GearCatalog;
pub use crate::catalog::{
    AttributeValue, Brand, BrandId, CatalogSnapshot, CatalogStore, Category, CategoryId,
    CategoryTree, Gear, GearId, Insight, MemoryStore, ProductType, ProductTypeId, Subcategory,
    SubcategoryId,
};
pub use crate::config::Config;
pub use crate::error::{CatalogError, Result};
pub use crate::index::{CatalogIndex, IndexManager, IndexStatus};
pub use crate::metrics::Metrics;
pub use crate::search::{Alternative, AlternativeFilter, GearFilter, Suggestion, Tier};
pub use clap::Parser;
pub use cli::{Cli, Commands, OutputFormat};
