//! Main catalog structure: the query surface handed to serving layers
use crate::catalog::{Brand, CatalogStore, EntityKind, Gear, GearId};
use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::index::{CatalogIndex, IndexManager, IndexStatus};
use crate::metrics::Metrics;
use crate::scoring::{self, classify_match};
use crate::search::{
    self, browse, resolve_limit, Alternative, AlternativeFilter, CatalogStats, CategoryView,
    GearDetail, GearFilter, Suggestion,
};
use log::debug;
use std::sync::Arc;

/// Coordinates the index manager and the query engines.
///
/// Query methods take an `Arc` of the active index for their whole run, so
/// they may execute concurrently with each other and with [`refresh`].
///
/// [`refresh`]: GearCatalog::refresh
pub struct GearCatalog {
    config: Config,
    manager: IndexManager,
    metrics: Arc<Metrics>,
}

impl GearCatalog {
    pub fn new(store: Arc<dyn CatalogStore>, config: Config) -> Result<Self> {
        Self::with_metrics(store, config, Arc::new(Metrics::new()))
    }

    pub fn with_metrics(
        store: Arc<dyn CatalogStore>,
        config: Config,
        metrics: Arc<Metrics>,
    ) -> Result<Self> {
        config.validate()?;
        let manager = IndexManager::new(
            store,
            config.search.clone(),
            &config.refresh,
            metrics.clone(),
        );
        Ok(Self {
            config,
            manager,
            metrics,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Re-fetches the catalog and swaps the active index. See
    /// [`IndexManager::refresh`].
    pub async fn refresh(&self) -> Result<IndexStatus> {
        self.manager.refresh().await
    }

    pub fn status(&self) -> IndexStatus {
        self.manager.status()
    }

    pub fn index(&self) -> Result<Arc<CatalogIndex>> {
        self.manager.current()
    }

    pub fn find_alternatives(
        &self,
        gear_id: &GearId,
        filter: &AlternativeFilter,
    ) -> Result<Vec<Alternative>> {
        let default_limit = self.config.search.alternatives_limit;
        filter.validate(default_limit)?;
        let index = self.manager.current()?;
        self.metrics.alternatives_queries.inc();
        search::find_alternatives(&index, gear_id, filter, &self.config.scoring, default_limit)
    }

    /// Ranked gear for a partial query. Before the first index exists the
    /// store's name-prefix search answers instead.
    pub async fn autocomplete(&self, query: &str, limit: Option<i64>) -> Result<Vec<Suggestion>> {
        let limit = resolve_limit(limit, self.config.search.autocomplete_limit)?;
        if scoring::normalize(query).is_empty() {
            return Ok(Vec::new());
        }
        self.metrics.autocomplete_queries.inc();

        match self.manager.current() {
            Ok(index) => {
                let completion = search::autocomplete(
                    &index,
                    query,
                    limit,
                    self.config.search.fuzzy_max_distance,
                )?;
                if completion.cached {
                    self.metrics.autocomplete_cache_hits.inc();
                }
                Ok(completion.suggestions)
            }
            Err(CatalogError::IndexNotReady) => self.autocomplete_from_store(query, limit).await,
            Err(e) => Err(e),
        }
    }

    async fn autocomplete_from_store(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>> {
        self.metrics.fallback_searches.inc();
        let store = self.manager.store();
        let normalized = scoring::normalize(query);
        let hits = store.search_name_prefix(query).await?;
        let brands = store.fetch_brands().await?;
        debug!("store fallback for '{normalized}': {} name hits", hits.len());

        let mut suggestions = Vec::new();
        for hit in hits.iter().filter(|h| h.kind == EntityKind::Gear) {
            let gear = match store.fetch_gear_by_id(&GearId::new(hit.id.clone())).await {
                Ok(gear) => gear,
                Err(CatalogError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            };
            let Some(kind) = classify_match(&normalized, &gear.name, 0) else {
                continue;
            };
            suggestions.push(Suggestion {
                brand_name: brands
                    .get(gear.brand.index())
                    .map(|b| b.name.clone())
                    .unwrap_or_default(),
                gear,
                tier: kind.tier,
                distance: kind.distance,
                via_brand: false,
            });
        }

        suggestions.sort_by(|a, b| {
            (a.tier, scoring::normalize(&a.gear.name), &a.gear.id).cmp(&(
                b.tier,
                scoring::normalize(&b.gear.name),
                &b.gear.id,
            ))
        });
        suggestions.truncate(limit);
        Ok(suggestions)
    }

    pub fn autocomplete_brands(&self, query: &str, limit: Option<i64>) -> Result<Vec<Brand>> {
        let limit = resolve_limit(limit, self.config.search.autocomplete_limit)?;
        let index = self.manager.current()?;
        self.metrics.autocomplete_queries.inc();
        search::autocomplete_brands(&index, query, limit, self.config.search.fuzzy_max_distance)
    }

    /// Gear by id, with its brand name and insights.
    pub fn gear(&self, id: &GearId) -> Result<GearDetail> {
        let index = self.manager.current()?;
        let gear = browse::gear(&index, id)?;
        Ok(browse::detail(&index, gear))
    }

    pub fn gear_by_name(&self, name: &str) -> Result<GearDetail> {
        let index = self.manager.current()?;
        let gear = browse::gear_by_name(&index, name)?;
        Ok(browse::detail(&index, gear))
    }

    pub fn brand(&self, name: &str) -> Result<Brand> {
        let index = self.manager.current()?;
        browse::brand_by_name(&index, name).cloned()
    }

    pub fn list_gear(
        &self,
        filter: &GearFilter,
        limit: Option<i64>,
        offset: usize,
    ) -> Result<Vec<Gear>> {
        let limit = resolve_limit(limit, self.config.search.alternatives_limit)?;
        let index = self.manager.current()?;
        Ok(browse::list_gear(&index, filter, limit, offset)?
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn categories(&self) -> Result<Vec<CategoryView>> {
        let index = self.manager.current()?;
        Ok(browse::categories(&index))
    }

    pub fn stats(&self) -> Result<CatalogStats> {
        let index = self.manager.current()?;
        Ok(browse::stats(&index))
    }
}
