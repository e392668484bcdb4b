//! Owns the active index and replaces it on refresh
use crate::catalog::{fetch_snapshot, CatalogStore};
use crate::config::{RefreshConfig, SearchConfig};
use crate::error::{CatalogError, Result};
use crate::index::CatalogIndex;
use crate::metrics::Metrics;
use chrono::{DateTime, Utc};
use log::{info, warn};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Snapshot of the manager's state for health reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStatus {
    pub ready: bool,
    pub version: u64,
    pub gear_count: usize,
    pub brand_count: usize,
    pub built_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Publishes catalog indexes built from the store.
///
/// Readers grab an `Arc` to the active index and keep using it for the rest
/// of their query; a refresh builds the replacement off to the side and only
/// then stores the new handle, so nobody observes a partial index. Refreshes
/// are serialized by `refresh_lock`.
pub struct IndexManager {
    store: Arc<dyn CatalogStore>,
    search: SearchConfig,
    timeout: Duration,
    active: RwLock<Option<Arc<CatalogIndex>>>,
    refresh_lock: tokio::sync::Mutex<()>,
    last_error: RwLock<Option<String>>,
    metrics: Arc<Metrics>,
}

impl IndexManager {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        search: SearchConfig,
        refresh: &RefreshConfig,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            search,
            timeout: refresh.timeout(),
            active: RwLock::new(None),
            refresh_lock: tokio::sync::Mutex::new(()),
            last_error: RwLock::new(None),
            metrics,
        }
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    /// The active index, or `IndexNotReady` before the first successful refresh.
    pub fn current(&self) -> Result<Arc<CatalogIndex>> {
        self.active.read().clone().ok_or(CatalogError::IndexNotReady)
    }

    /// Re-fetches the catalog and swaps in a freshly built index.
    ///
    /// On failure or timeout the previous index stays active and the error is
    /// both recorded in [`IndexStatus::last_error`] and returned. Dropping the
    /// returned future cancels the refresh without touching the active index.
    pub async fn refresh(&self) -> Result<IndexStatus> {
        let _guard = self.refresh_lock.lock().await;
        let start = Instant::now();

        match self.rebuild().await {
            Ok(index) => {
                let version = index.version();
                let gear_count = index.gear().len();
                *self.active.write() = Some(Arc::new(index));
                *self.last_error.write() = None;

                self.metrics.refresh_success.inc();
                self.metrics.index_version.set(version as i64);
                info!(
                    "Catalog index v{version} active ({gear_count} gear) after {:.2}ms",
                    start.elapsed().as_secs_f64() * 1000.0
                );
                Ok(self.status())
            }
            Err(e) => {
                self.metrics.refresh_failures.inc();
                match self.active.read().as_ref() {
                    Some(prior) => warn!(
                        "Catalog refresh failed, keeping index v{}: {e}",
                        prior.version()
                    ),
                    None => warn!("Catalog refresh failed, no index available yet: {e}"),
                }
                *self.last_error.write() = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn rebuild(&self) -> Result<CatalogIndex> {
        let snapshot = tokio::time::timeout(self.timeout, fetch_snapshot(self.store.as_ref()))
            .await
            .map_err(|_| {
                CatalogError::StoreUnavailable(format!(
                    "catalog fetch timed out after {}s",
                    self.timeout.as_secs_f64()
                ))
            })??;

        let search = self.search.clone();
        let index = tokio::task::spawn_blocking(move || CatalogIndex::build(snapshot, &search))
            .await
            .map_err(|e| anyhow::anyhow!("index build task failed: {e}"))??;

        let version = self.active.read().as_ref().map_or(0, |i| i.version()) + 1;
        Ok(index.with_version(version))
    }

    pub fn status(&self) -> IndexStatus {
        let active = self.active.read().clone();
        let last_error = self.last_error.read().clone();
        match active {
            Some(index) => IndexStatus {
                ready: true,
                version: index.version(),
                gear_count: index.gear().len(),
                brand_count: index.brands().len(),
                built_at: Some(index.built_at()),
                last_error,
            },
            None => IndexStatus {
                ready: false,
                version: 0,
                gear_count: 0,
                brand_count: 0,
                built_at: None,
                last_error,
            },
        }
    }
}
