//! Query engines over a built catalog index
pub mod alternatives;
pub mod autocomplete;
pub mod browse;
pub mod cache;

use crate::error::{CatalogError, Result};

pub use alternatives::{find_alternatives, Alternative, AlternativeFilter, Constraints, Tier};
pub use autocomplete::{autocomplete, autocomplete_brands, Completion, Suggestion};
pub use browse::{CatalogStats, CategoryView, GearDetail, GearFilter, SubcategoryView};
pub use cache::{AutocompleteCache, CacheStats};

/// Applies the configured default and rejects non-positive limits.
pub fn resolve_limit(limit: Option<i64>, default: usize) -> Result<usize> {
    match limit {
        None => Ok(default),
        Some(l) if l <= 0 => Err(CatalogError::InvalidLimit(l)),
        Some(l) => Ok(l as usize),
    }
}
