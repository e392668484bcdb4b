//! Ranked substitute discovery over the product-type hierarchy
use crate::catalog::{Gear, GearId, ProductType};
use crate::error::{CatalogError, Result};
use crate::index::{CatalogIndex, GearSlot};
use crate::scoring::{self, normalized_delta, ScoringWeights};
use log::debug;
use serde::{Deserialize, Serialize};

/// Caller-supplied constraints. Signed so that negative input can be
/// reported instead of silently wrapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlternativeFilter {
    /// Grams
    pub max_weight: Option<i64>,
    /// Currency minor units
    pub max_price: Option<i64>,
    pub limit: Option<i64>,
    pub capacity_persons: Option<i64>,
    /// Search this product type (by name) instead of the source's own.
    pub product_type: Option<String>,
}

/// A validated [`AlternativeFilter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraints {
    pub max_weight: Option<u64>,
    pub max_price: Option<u64>,
    pub capacity_persons: Option<i64>,
    pub limit: usize,
}

impl AlternativeFilter {
    pub fn validate(&self, default_limit: usize) -> Result<Constraints> {
        let bound = |name: &str, value: Option<i64>| -> Result<Option<u64>> {
            match value {
                Some(v) if v < 0 => Err(CatalogError::InvalidFilter(format!(
                    "{name} must not be negative (got {v})"
                ))),
                Some(v) => Ok(Some(v as u64)),
                None => Ok(None),
            }
        };
        let limit = match self.limit {
            Some(l) if l <= 0 => {
                return Err(CatalogError::InvalidFilter(format!(
                    "limit must be positive (got {l})"
                )))
            }
            Some(l) => l as usize,
            None => default_limit,
        };
        if let Some(c) = self.capacity_persons {
            if c <= 0 {
                return Err(CatalogError::InvalidFilter(format!(
                    "capacity_persons must be positive (got {c})"
                )));
            }
        }
        Ok(Constraints {
            max_weight: bound("max_weight", self.max_weight)?,
            max_price: bound("max_price", self.max_price)?,
            capacity_persons: self.capacity_persons,
            limit,
        })
    }
}

impl Constraints {
    /// Unknown values never violate a bound.
    pub fn admits(&self, gear: &Gear) -> bool {
        fn within(bound: Option<u64>, value: Option<u64>) -> bool {
            match (bound, value) {
                (Some(b), Some(v)) => v <= b,
                _ => true,
            }
        }
        let capacity_ok = match (self.capacity_persons, gear.capacity_persons()) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        };
        within(self.max_weight, gear.weight_grams.map(u64::from))
            && within(self.max_price, gear.price_minor)
            && capacity_ok
    }
}

/// Which relationship made a candidate eligible
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    SameProductType,
    SameSubcategory,
}

impl Tier {
    pub fn weight(self) -> f64 {
        match self {
            Tier::SameProductType => 1.0,
            Tier::SameSubcategory => 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternative {
    pub gear: Gear,
    pub score: f64,
    pub tier: Tier,
}

#[derive(Debug, Clone, Copy)]
struct Scored {
    slot: GearSlot,
    score: f64,
    tier: Tier,
}

/// Case-insensitive product type lookup for the filter's override.
fn product_type_named<'a>(index: &'a CatalogIndex, name: &str) -> Result<&'a ProductType> {
    let wanted = scoring::normalize(name);
    index
        .tree()
        .product_types
        .iter()
        .find(|p| !wanted.is_empty() && scoring::normalize(&p.name) == wanted)
        .ok_or_else(|| CatalogError::InvalidFilter(format!("unknown product type '{name}'")))
}

/// Finds substitutes for `gear_id`.
///
/// Gear of the same product type is considered first; gear from sibling
/// product types in the same subcategory only fills slots tier one leaves
/// open, so it never displaces a same-type candidate. Output is ordered by
/// descending score, ties by ascending gear id.
///
/// With a `product_type` override both tiers are taken relative to that
/// type; the source itself is still never returned.
pub fn find_alternatives(
    index: &CatalogIndex,
    gear_id: &GearId,
    filter: &AlternativeFilter,
    weights: &ScoringWeights,
    default_limit: usize,
) -> Result<Vec<Alternative>> {
    let constraints = filter.validate(default_limit)?;
    let target = filter
        .product_type
        .as_deref()
        .map(|name| product_type_named(index, name))
        .transpose()?;

    let source_slot = index
        .slot_of(gear_id)
        .ok_or_else(|| CatalogError::SourceNotFound(gear_id.clone()))?;
    let source = index.gear_at(source_slot);
    let lineage = index
        .tree()
        .lineage(target.map_or(source.product_type, |p| p.id))
        .ok_or_else(|| {
            CatalogError::InvalidSnapshot(format!(
                "gear {} has no product type lineage",
                source.id
            ))
        })?;
    let target = lineage.product_type.id;

    let score = |slot: GearSlot, tier: Tier| -> Scored {
        let candidate = index.gear_at(slot);
        let weight_delta = normalized_delta(
            source.weight_grams.map(u64::from),
            candidate.weight_grams.map(u64::from),
        );
        let price_delta = normalized_delta(source.price_minor, candidate.price_minor);
        Scored {
            slot,
            score: weights.score(
                tier.weight(),
                weight_delta,
                price_delta,
                candidate.brand == source.brand,
            ),
            tier,
        }
    };

    let mut chosen: Vec<Scored> = index
        .product_type_members(target)
        .iter()
        .copied()
        .filter(|&slot| slot != source_slot && constraints.admits(index.gear_at(slot)))
        .map(|slot| score(slot, Tier::SameProductType))
        .collect();
    rank(index, &mut chosen);
    chosen.truncate(constraints.limit);
    let same_type = chosen.len();

    if chosen.len() < constraints.limit {
        let mut siblings: Vec<Scored> = index
            .subcategory_members(lineage.subcategory.id)
            .iter()
            .copied()
            .filter(|&slot| {
                let gear = index.gear_at(slot);
                slot != source_slot && gear.product_type != target && constraints.admits(gear)
            })
            .map(|slot| score(slot, Tier::SameSubcategory))
            .collect();
        rank(index, &mut siblings);
        siblings.truncate(constraints.limit - chosen.len());
        chosen.extend(siblings);
        rank(index, &mut chosen);
    }

    debug!(
        "alternatives for {} in '{}': {} same type, {} sibling",
        source.id,
        lineage.product_type.name,
        same_type,
        chosen.len() - same_type
    );

    Ok(chosen
        .into_iter()
        .map(|s| Alternative {
            gear: index.gear_at(s.slot).clone(),
            score: s.score,
            tier: s.tier,
        })
        .collect())
}

fn rank(index: &CatalogIndex, scored: &mut [Scored]) {
    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| index.gear_at(a.slot).id.cmp(&index.gear_at(b.slot).id))
    });
}
