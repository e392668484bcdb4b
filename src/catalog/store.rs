//! Read-only adapter over the external catalog store
use crate::catalog::model::{
    Brand, CatalogSnapshot, CategoryTree, EntityKind, Gear, GearId, Insight, NameHit,
    ProductTypeId, SubcategoryId,
};
use crate::error::{CatalogError, Result};
use crate::scoring;
use async_trait::async_trait;
use log::debug;
use std::fs;
use std::path::Path;

/// Graph-shaped read API the engines depend on.
///
/// Every call is read-only and safe to retry. Backend failures surface as
/// [`CatalogError::StoreUnavailable`], absent entities as [`CatalogError::NotFound`].
/// Implementations must not cache; the index layer owns caching.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn fetch_category_tree(&self) -> Result<CategoryTree>;

    async fn fetch_brands(&self) -> Result<Vec<Brand>>;

    async fn fetch_gear_by_id(&self, id: &GearId) -> Result<Gear>;

    async fn fetch_gear_by_product_type(&self, product_type: ProductTypeId) -> Result<Vec<Gear>>;

    async fn fetch_gear_by_subcategory(&self, subcategory: SubcategoryId) -> Result<Vec<Gear>>;

    /// Every gear item, including items whose product type is missing from
    /// the tree.
    async fn fetch_all_gear(&self) -> Result<Vec<Gear>>;

    /// Every insight, each naming the gear item it belongs to.
    async fn fetch_insights(&self) -> Result<Vec<Insight>>;

    /// Case-insensitive name prefix search over gear and brands. Only used
    /// while no in-memory index exists.
    async fn search_name_prefix(&self, text: &str) -> Result<Vec<NameHit>>;
}

/// Pulls a full catalog through the adapter: the tree, all brands, all gear
/// and all insights.
///
/// Gear is fetched as a whole rather than per subcategory, so an item that
/// points outside the tree reaches index validation instead of vanishing.
pub async fn fetch_snapshot(store: &dyn CatalogStore) -> Result<CatalogSnapshot> {
    let tree = store.fetch_category_tree().await?;
    let brands = store.fetch_brands().await?;
    let gear = store.fetch_all_gear().await?;
    let insights = store.fetch_insights().await?;
    debug!(
        "Fetched {} gear items, {} brands and {} insights across {} subcategories",
        gear.len(),
        brands.len(),
        insights.len(),
        tree.subcategories.len()
    );
    Ok(CatalogSnapshot {
        tree,
        brands,
        gear,
        insights,
    })
}

/// In-memory graph store backed by a catalog snapshot, typically loaded from
/// a JSON export of the external database.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: CatalogSnapshot,
}

impl MemoryStore {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: CatalogSnapshot = serde_json::from_str(json)
            .map_err(|e| CatalogError::InvalidSnapshot(format!("malformed catalog JSON: {e}")))?;
        Ok(Self::new(snapshot))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CatalogError::StoreUnavailable(format!(
                "failed to read catalog {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&content)
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    fn gear_where<F>(&self, pred: F) -> Vec<Gear>
    where
        F: Fn(&Gear) -> bool,
    {
        self.snapshot.gear.iter().filter(|g| pred(g)).cloned().collect()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn fetch_category_tree(&self) -> Result<CategoryTree> {
        Ok(self.snapshot.tree.clone())
    }

    async fn fetch_brands(&self) -> Result<Vec<Brand>> {
        Ok(self.snapshot.brands.clone())
    }

    async fn fetch_gear_by_id(&self, id: &GearId) -> Result<Gear> {
        self.snapshot
            .gear
            .iter()
            .find(|g| &g.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(EntityKind::Gear, id))
    }

    async fn fetch_gear_by_product_type(&self, product_type: ProductTypeId) -> Result<Vec<Gear>> {
        Ok(self.gear_where(|g| g.product_type == product_type))
    }

    async fn fetch_gear_by_subcategory(&self, subcategory: SubcategoryId) -> Result<Vec<Gear>> {
        let tree = &self.snapshot.tree;
        Ok(self.gear_where(|g| {
            tree.product_type(g.product_type)
                .is_some_and(|pt| pt.subcategory == subcategory)
        }))
    }

    async fn fetch_all_gear(&self) -> Result<Vec<Gear>> {
        Ok(self.snapshot.gear.clone())
    }

    async fn fetch_insights(&self) -> Result<Vec<Insight>> {
        Ok(self.snapshot.insights.clone())
    }

    async fn search_name_prefix(&self, text: &str) -> Result<Vec<NameHit>> {
        let needle = scoring::normalize(text);
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let matches = |name: &str| scoring::normalize(name).starts_with(&needle);

        let brands = self
            .snapshot
            .brands
            .iter()
            .filter(|b| matches(&b.name))
            .map(|b| NameHit {
                kind: EntityKind::Brand,
                id: b.id.to_string(),
                name: b.name.clone(),
            });
        let gear = self
            .snapshot
            .gear
            .iter()
            .filter(|g| matches(&g.name))
            .map(|g| NameHit {
                kind: EntityKind::Gear,
                id: g.id.to_string(),
                name: g.name.clone(),
            });
        Ok(brands.chain(gear).collect())
    }
}
