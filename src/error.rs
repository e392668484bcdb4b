use crate::catalog::{EntityKind, GearId};
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Source gear not found: {0}")]
    SourceNotFound(GearId),

    #[error("Catalog store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid limit: {0} (must be positive)")]
    InvalidLimit(i64),

    #[error("Index not ready: no catalog index has been built yet")]
    IndexNotReady,

    #[error("Invalid catalog snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl CatalogError {
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        CatalogError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, CatalogError::StoreUnavailable(_) | CatalogError::IndexNotReady)
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
