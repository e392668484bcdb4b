//! Immutable in-memory catalog index built from a store snapshot
pub mod manager;
pub mod prefix;

use crate::catalog::{
    Brand, BrandId, CatalogSnapshot, CategoryTree, Gear, GearId, Insight, Lineage,
    ProductTypeId, SubcategoryId,
};
use crate::config::SearchConfig;
use crate::error::{CatalogError, Result};
use crate::scoring;
use crate::search::cache::AutocompleteCache;
use chrono::{DateTime, Utc};
use log::debug;
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Instant;

pub use manager::{IndexManager, IndexStatus};
pub use prefix::{EntityRef, GearSlot, PrefixIndex};

/// Search structures over one catalog snapshot. Never mutated after
/// [`CatalogIndex::build`] returns, apart from its result cache.
#[derive(Debug)]
pub struct CatalogIndex {
    version: u64,
    built_at: DateTime<Utc>,
    tree: CategoryTree,
    brands: Vec<Brand>,
    /// Sorted by gear id, so ascending slot order is ascending id order.
    gear: Vec<Gear>,
    slots: HashMap<GearId, GearSlot>,
    by_product_type: Vec<Vec<GearSlot>>,
    by_subcategory: Vec<Vec<GearSlot>>,
    by_brand: Vec<Vec<GearSlot>>,
    /// Per gear slot, in snapshot order.
    insights: Vec<Vec<Insight>>,
    insight_count: usize,
    names: PrefixIndex,
    cache: AutocompleteCache,
}

impl CatalogIndex {
    /// Builds an index from a snapshot. Pure: the same snapshot always yields
    /// the same lookups.
    pub fn build(snapshot: CatalogSnapshot, config: &SearchConfig) -> Result<Self> {
        let start = Instant::now();
        let CatalogSnapshot {
            tree,
            brands,
            mut gear,
            insights: tips,
        } = snapshot;

        tree.validate().map_err(CatalogError::InvalidSnapshot)?;
        for (i, brand) in brands.iter().enumerate() {
            if brand.id.index() != i {
                return Err(CatalogError::InvalidSnapshot(format!(
                    "brand '{}' has id {} at position {i}",
                    brand.name, brand.id
                )));
            }
        }

        gear.sort_by(|a, b| a.id.cmp(&b.id));

        let mut slots = HashMap::with_capacity(gear.len());
        let mut by_product_type = vec![Vec::new(); tree.product_types.len()];
        let mut by_subcategory = vec![Vec::new(); tree.subcategories.len()];
        let mut by_brand = vec![Vec::new(); brands.len()];

        for (slot, item) in gear.iter().enumerate() {
            if slots.insert(item.id.clone(), slot).is_some() {
                return Err(CatalogError::InvalidSnapshot(format!(
                    "duplicate gear id {}",
                    item.id
                )));
            }
            let product_type = tree.product_type(item.product_type).ok_or_else(|| {
                CatalogError::InvalidSnapshot(format!(
                    "gear {} references unknown product type {}",
                    item.id, item.product_type
                ))
            })?;
            if item.brand.index() >= brands.len() {
                return Err(CatalogError::InvalidSnapshot(format!(
                    "gear {} references unknown brand {}",
                    item.id, item.brand
                )));
            }
            by_product_type[item.product_type.index()].push(slot);
            by_subcategory[product_type.subcategory.index()].push(slot);
            by_brand[item.brand.index()].push(slot);
        }

        let insight_count = tips.len();
        let mut insights = vec![Vec::new(); gear.len()];
        for tip in tips {
            let slot = *slots.get(&tip.gear).ok_or_else(|| {
                CatalogError::InvalidSnapshot(format!(
                    "insight '{}' references unknown gear {}",
                    tip.summary, tip.gear
                ))
            })?;
            insights[slot].push(tip);
        }

        let gear_tokens: Vec<Vec<String>> =
            gear.par_iter().map(|g| scoring::tokenize(&g.name)).collect();

        let mut names = PrefixIndex::new();
        for (slot, (item, tokens)) in gear.iter().zip(&gear_tokens).enumerate() {
            names.insert(&item.name, tokens, EntityRef::Gear(slot));
        }
        for brand in &brands {
            names.insert(
                &brand.name,
                &scoring::tokenize(&brand.name),
                EntityRef::Brand(brand.id),
            );
        }

        debug!(
            "Built index over {} gear / {} brands ({} tokens) in {:.2}ms",
            gear.len(),
            brands.len(),
            names.token_count(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(Self {
            version: 0,
            built_at: Utc::now(),
            tree,
            brands,
            gear,
            slots,
            by_product_type,
            by_subcategory,
            by_brand,
            insights,
            insight_count,
            names,
            cache: AutocompleteCache::new(config.cache_size),
        })
    }

    pub(crate) fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn tree(&self) -> &CategoryTree {
        &self.tree
    }

    pub fn brands(&self) -> &[Brand] {
        &self.brands
    }

    pub fn brand(&self, id: BrandId) -> Option<&Brand> {
        self.brands.get(id.index())
    }

    /// All gear, in ascending id order.
    pub fn gear(&self) -> &[Gear] {
        &self.gear
    }

    pub fn gear_at(&self, slot: GearSlot) -> &Gear {
        &self.gear[slot]
    }

    pub fn slot_of(&self, id: &GearId) -> Option<GearSlot> {
        self.slots.get(id).copied()
    }

    pub fn gear_by_id(&self, id: &GearId) -> Option<&Gear> {
        self.slot_of(id).map(|slot| &self.gear[slot])
    }

    pub fn lineage(&self, gear: &Gear) -> Option<Lineage<'_>> {
        self.tree.lineage(gear.product_type)
    }

    pub fn product_type_members(&self, id: ProductTypeId) -> &[GearSlot] {
        self.by_product_type.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn subcategory_members(&self, id: SubcategoryId) -> &[GearSlot] {
        self.by_subcategory.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn brand_members(&self, id: BrandId) -> &[GearSlot] {
        self.by_brand.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn insights(&self, slot: GearSlot) -> &[Insight] {
        self.insights.get(slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn insight_count(&self) -> usize {
        self.insight_count
    }

    pub fn names(&self) -> &PrefixIndex {
        &self.names
    }

    pub fn cache(&self) -> &AutocompleteCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, CategoryId, ProductType, Subcategory};

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot {
            tree: CategoryTree {
                categories: vec![Category {
                    id: CategoryId(0),
                    name: "Shelter".into(),
                    subcategories: vec![SubcategoryId(0)],
                }],
                subcategories: vec![Subcategory {
                    id: SubcategoryId(0),
                    name: "Tents".into(),
                    category: CategoryId(0),
                    product_types: vec![ProductTypeId(0), ProductTypeId(1)],
                }],
                product_types: vec![
                    ProductType {
                        id: ProductTypeId(0),
                        name: "Backpacking Tent".into(),
                        subcategory: SubcategoryId(0),
                    },
                    ProductType {
                        id: ProductTypeId(1),
                        name: "Trekking Pole Tent".into(),
                        subcategory: SubcategoryId(0),
                    },
                ],
            },
            brands: vec![Brand::new(BrandId(0), "MSR")],
            gear: vec![
                Gear::new("g-2", "Hubba Hubba", BrandId(0), ProductTypeId(0)),
                Gear::new("g-1", "Elixir", BrandId(0), ProductTypeId(0)),
                Gear::new("g-3", "Front Range", BrandId(0), ProductTypeId(1)),
            ],
            insights: vec![Insight::new("g-2", "Seam seal", "Do it before the first trip.")],
        }
    }

    #[test]
    fn membership_lists_follow_hierarchy() {
        let index = CatalogIndex::build(snapshot(), &SearchConfig::default()).unwrap();
        let ids = |slots: &[GearSlot]| {
            slots
                .iter()
                .map(|s| index.gear_at(*s).id.as_str().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(index.product_type_members(ProductTypeId(0))), vec!["g-1", "g-2"]);
        assert_eq!(ids(index.subcategory_members(SubcategoryId(0))), vec!["g-1", "g-2", "g-3"]);
        assert_eq!(index.brand_members(BrandId(0)).len(), 3);
        assert!(index.product_type_members(ProductTypeId(9)).is_empty());
    }

    #[test]
    fn rejects_duplicate_gear_ids() {
        let mut snap = snapshot();
        snap.gear.push(Gear::new("g-1", "Dup", BrandId(0), ProductTypeId(0)));
        let err = CatalogIndex::build(snap, &SearchConfig::default()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidSnapshot(_)));
    }

    #[test]
    fn rejects_dangling_product_type() {
        let mut snap = snapshot();
        snap.gear.push(Gear::new("g-9", "Orphan", BrandId(0), ProductTypeId(7)));
        assert!(CatalogIndex::build(snap, &SearchConfig::default()).is_err());
    }

    #[test]
    fn insights_follow_their_gear_slot() {
        let index = CatalogIndex::build(snapshot(), &SearchConfig::default()).unwrap();
        let slot = index.slot_of(&GearId::new("g-2")).unwrap();
        assert_eq!(index.insights(slot)[0].summary, "Seam seal");
        assert!(index.insights(0).is_empty());
        assert_eq!(index.insight_count(), 1);

        let mut snap = snapshot();
        snap.insights.push(Insight::new("g-404", "Lost", "No such gear."));
        let err = CatalogIndex::build(snap, &SearchConfig::default()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidSnapshot(_)));
    }

    #[test]
    fn rejects_broken_parent_pointer() {
        let mut snap = snapshot();
        snap.tree.product_types[1].subcategory = SubcategoryId(3);
        assert!(CatalogIndex::build(snap, &SearchConfig::default()).is_err());
    }
}
