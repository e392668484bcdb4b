//! Direct catalog lookups: by id or name, filtered listing, hierarchy, stats
use crate::catalog::{Brand, EntityKind, Gear, GearId, Insight};
use crate::error::{CatalogError, Result};
use crate::index::CatalogIndex;
use crate::scoring;
use serde::{Deserialize, Serialize};

pub fn gear<'a>(index: &'a CatalogIndex, id: &GearId) -> Result<&'a Gear> {
    index
        .gear_by_id(id)
        .ok_or_else(|| CatalogError::not_found(EntityKind::Gear, id))
}

/// Case-insensitive name lookup. With duplicate names the lowest id wins.
pub fn gear_by_name<'a>(index: &'a CatalogIndex, name: &str) -> Result<&'a Gear> {
    let wanted = scoring::normalize(name);
    index
        .gear()
        .iter()
        .find(|g| scoring::normalize(&g.name) == wanted)
        .ok_or_else(|| CatalogError::not_found(EntityKind::Gear, name))
}

/// A gear item together with its brand name and insights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GearDetail {
    #[serde(flatten)]
    pub gear: Gear,
    pub brand_name: String,
    pub insights: Vec<Insight>,
}

pub fn detail(index: &CatalogIndex, gear: &Gear) -> GearDetail {
    GearDetail {
        brand_name: index
            .brand(gear.brand)
            .map(|b| b.name.clone())
            .unwrap_or_default(),
        insights: index
            .slot_of(&gear.id)
            .map(|slot| index.insights(slot).to_vec())
            .unwrap_or_default(),
        gear: gear.clone(),
    }
}

pub fn brand_by_name<'a>(index: &'a CatalogIndex, name: &str) -> Result<&'a Brand> {
    let wanted = scoring::normalize(name);
    index
        .brands()
        .iter()
        .find(|b| scoring::normalize(&b.name) == wanted)
        .ok_or_else(|| CatalogError::not_found(EntityKind::Brand, name))
}

/// Listing filter. Names match case-insensitively; range bounds are strict
/// and exclude gear whose value is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GearFilter {
    pub brand_name: Option<String>,
    pub product_type: Option<String>,
    pub category: Option<String>,
    pub weight_grams_lt: Option<u32>,
    pub weight_grams_gt: Option<u32>,
    pub price_minor_lt: Option<u64>,
    pub price_minor_gt: Option<u64>,
    pub capacity_persons: Option<i64>,
}

impl GearFilter {
    fn matches(&self, index: &CatalogIndex, gear: &Gear) -> bool {
        let same = |wanted: &Option<String>, actual: Option<&str>| match wanted {
            Some(w) => actual.is_some_and(|a| scoring::normalize(a) == scoring::normalize(w)),
            None => true,
        };
        let lineage = index.lineage(gear);

        same(
            &self.brand_name,
            index.brand(gear.brand).map(|b| b.name.as_str()),
        ) && same(
            &self.product_type,
            lineage.map(|l| l.product_type.name.as_str()),
        ) && same(&self.category, lineage.map(|l| l.category.name.as_str()))
            && self
                .weight_grams_lt
                .map_or(true, |b| gear.weight_grams.is_some_and(|w| w < b))
            && self
                .weight_grams_gt
                .map_or(true, |b| gear.weight_grams.is_some_and(|w| w > b))
            && self
                .price_minor_lt
                .map_or(true, |b| gear.price_minor.is_some_and(|p| p < b))
            && self
                .price_minor_gt
                .map_or(true, |b| gear.price_minor.is_some_and(|p| p > b))
            && self
                .capacity_persons
                .map_or(true, |c| gear.capacity_persons() == Some(c))
    }
}

/// Filtered page of gear ordered by name, then id.
pub fn list_gear<'a>(
    index: &'a CatalogIndex,
    filter: &GearFilter,
    limit: usize,
    offset: usize,
) -> Result<Vec<&'a Gear>> {
    if limit == 0 {
        return Err(CatalogError::InvalidLimit(0));
    }
    let mut matching: Vec<(String, &Gear)> = index
        .gear()
        .iter()
        .filter(|g| filter.matches(index, g))
        .map(|g| (scoring::normalize(&g.name), g))
        .collect();
    matching.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));
    Ok(matching
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|(_, g)| g)
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubcategoryView {
    pub name: String,
    pub product_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryView {
    pub name: String,
    pub subcategories: Vec<SubcategoryView>,
}

/// The full category → subcategory → product type hierarchy, in tree order.
pub fn categories(index: &CatalogIndex) -> Vec<CategoryView> {
    let tree = index.tree();
    tree.categories
        .iter()
        .map(|c| CategoryView {
            name: c.name.clone(),
            subcategories: c
                .subcategories
                .iter()
                .filter_map(|id| tree.subcategory(*id))
                .map(|s| SubcategoryView {
                    name: s.name.clone(),
                    product_types: s
                        .product_types
                        .iter()
                        .filter_map(|id| tree.product_type(*id))
                        .map(|p| p.name.clone())
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub gear_count: usize,
    pub brand_count: usize,
    pub category_count: usize,
    pub subcategory_count: usize,
    pub product_type_count: usize,
    pub insight_count: usize,
}

pub fn stats(index: &CatalogIndex) -> CatalogStats {
    let tree = index.tree();
    CatalogStats {
        gear_count: index.gear().len(),
        brand_count: index.brands().len(),
        category_count: tree.categories.len(),
        subcategory_count: tree.subcategories.len(),
        product_type_count: tree.product_types.len(),
        insight_count: index.insight_count(),
    }
}
