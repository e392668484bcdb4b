//! Tiered, typo-tolerant autocomplete over gear and brand names
use crate::catalog::{Brand, EntityKind, Gear};
use crate::error::{CatalogError, Result};
use crate::index::{CatalogIndex, EntityRef, GearSlot};
use crate::scoring::{self, classify_match, MatchKind, MatchTier};
use crate::search::cache::{CacheKey, CachedHit};
use log::debug;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::time::Instant;

const TIERS: [MatchTier; 3] = [MatchTier::Exact, MatchTier::Prefix, MatchTier::Fuzzy];

/// One autocomplete result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub gear: Gear,
    pub brand_name: String,
    pub tier: MatchTier,
    pub distance: usize,
    /// Surfaced because the query matched the brand, not the gear name.
    pub via_brand: bool,
}

/// Result of [`autocomplete`] plus whether it came from the index cache.
#[derive(Debug, Clone)]
pub struct Completion {
    pub suggestions: Vec<Suggestion>,
    pub cached: bool,
}

/// Resolves a partial query to ranked gear.
///
/// Exact full-name matches come first, then token/name prefix matches, then
/// tokens within `fuzzy_cap` edits; a later tier is only consulted while fewer
/// than `limit` results have been collected. A brand match contributes every
/// gear item of that brand. Each gear item appears once, under its best match.
pub fn autocomplete(
    index: &CatalogIndex,
    query: &str,
    limit: usize,
    fuzzy_cap: usize,
) -> Result<Completion> {
    if limit == 0 {
        return Err(CatalogError::InvalidLimit(0));
    }
    let query = scoring::normalize(query);
    if query.is_empty() {
        return Ok(Completion {
            suggestions: Vec::new(),
            cached: false,
        });
    }

    let key = CacheKey {
        scope: EntityKind::Gear,
        query: query.clone(),
        limit,
        fuzzy_cap,
    };
    if let Some(hits) = index.cache().get(&key) {
        return Ok(Completion {
            suggestions: materialize(index, &hits),
            cached: true,
        });
    }

    let start = Instant::now();
    let hits = rank_gear(index, &query, limit, fuzzy_cap);
    debug!(
        "autocomplete '{query}' -> {} hits in {:.3}ms",
        hits.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    let suggestions = materialize(index, &hits);
    index.cache().insert(key, hits);
    Ok(Completion {
        suggestions,
        cached: false,
    })
}

/// Resolves a partial query to ranked brands, using the same tiers.
pub fn autocomplete_brands(
    index: &CatalogIndex,
    query: &str,
    limit: usize,
    fuzzy_cap: usize,
) -> Result<Vec<Brand>> {
    if limit == 0 {
        return Err(CatalogError::InvalidLimit(0));
    }
    let query = scoring::normalize(query);
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let key = CacheKey {
        scope: EntityKind::Brand,
        query: query.clone(),
        limit,
        fuzzy_cap,
    };
    let hits = match index.cache().get(&key) {
        Some(hits) => hits,
        None => {
            let hits = rank_brands(index, &query, limit, fuzzy_cap);
            index.cache().insert(key, hits.clone());
            hits
        }
    };

    Ok(hits
        .iter()
        .filter_map(|hit| match hit.entity {
            EntityRef::Brand(id) => index.brand(id).cloned(),
            EntityRef::Gear(_) => None,
        })
        .collect())
}

fn candidates(index: &CatalogIndex, query: &str, tier: MatchTier, cap: usize) -> BTreeSet<EntityRef> {
    let names = index.names();
    match tier {
        MatchTier::Exact => names.exact(query),
        MatchTier::Prefix => names.prefixed(query),
        MatchTier::Fuzzy => names.fuzzy(query, cap),
    }
}

struct Ranked {
    slot: GearSlot,
    kind: MatchKind,
    via_brand: bool,
    popularity: f64,
    name: String,
}

/// Within-tier order: closeness, popularity (absent is neutral), name, id.
fn compare(a: &Ranked, b: &Ranked) -> Ordering {
    a.kind
        .distance
        .cmp(&b.kind.distance)
        .then_with(|| b.popularity.total_cmp(&a.popularity))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.slot.cmp(&b.slot))
}

fn rank_gear(index: &CatalogIndex, query: &str, limit: usize, cap: usize) -> Vec<CachedHit> {
    let mut out: Vec<CachedHit> = Vec::new();
    let mut seen: HashSet<GearSlot> = HashSet::new();

    for tier in TIERS {
        if out.len() >= limit {
            break;
        }

        let mut best: BTreeMap<GearSlot, (MatchKind, bool)> = BTreeMap::new();
        let mut offer = |slot: GearSlot, kind: MatchKind, via_brand: bool| {
            if seen.contains(&slot) {
                return;
            }
            best.entry(slot)
                .and_modify(|cur| {
                    if (kind, via_brand) < *cur {
                        *cur = (kind, via_brand);
                    }
                })
                .or_insert((kind, via_brand));
        };

        for entity in candidates(index, query, tier, cap) {
            match entity {
                EntityRef::Gear(slot) => {
                    let gear = index.gear_at(slot);
                    if let Some(kind) = classify_match(query, &gear.name, cap) {
                        if kind.tier == tier {
                            offer(slot, kind, false);
                        }
                    }
                }
                EntityRef::Brand(id) => {
                    let Some(brand) = index.brand(id) else {
                        continue;
                    };
                    if let Some(kind) = classify_match(query, &brand.name, cap) {
                        if kind.tier == tier {
                            for &slot in index.brand_members(id) {
                                offer(slot, kind, true);
                            }
                        }
                    }
                }
            }
        }

        let mut ranked: Vec<Ranked> = best
            .into_iter()
            .map(|(slot, (kind, via_brand))| {
                let gear = index.gear_at(slot);
                Ranked {
                    slot,
                    kind,
                    via_brand,
                    popularity: gear.popularity.unwrap_or(0.0),
                    name: scoring::normalize(&gear.name),
                }
            })
            .collect();
        ranked.sort_by(compare);

        for r in ranked.into_iter().take(limit - out.len()) {
            seen.insert(r.slot);
            out.push(CachedHit {
                entity: EntityRef::Gear(r.slot),
                kind: r.kind,
                via_brand: r.via_brand,
            });
        }
    }

    out
}

fn rank_brands(index: &CatalogIndex, query: &str, limit: usize, cap: usize) -> Vec<CachedHit> {
    let mut out: Vec<CachedHit> = Vec::new();
    let mut seen = HashSet::new();

    for tier in TIERS {
        if out.len() >= limit {
            break;
        }
        let mut ranked: Vec<(MatchKind, String, EntityRef)> = candidates(index, query, tier, cap)
            .into_iter()
            .filter_map(|entity| match entity {
                EntityRef::Brand(id) if !seen.contains(&id) => {
                    let brand = index.brand(id)?;
                    let kind = classify_match(query, &brand.name, cap)?;
                    (kind.tier == tier).then(|| (kind, scoring::normalize(&brand.name), entity))
                }
                _ => None,
            })
            .collect();
        ranked.sort_by(|a, b| {
            a.0.distance
                .cmp(&b.0.distance)
                .then_with(|| a.1.cmp(&b.1))
                .then_with(|| a.2.cmp(&b.2))
        });

        for (kind, _, entity) in ranked.into_iter().take(limit - out.len()) {
            if let EntityRef::Brand(id) = entity {
                seen.insert(id);
            }
            out.push(CachedHit {
                entity,
                kind,
                via_brand: false,
            });
        }
    }

    out
}

fn materialize(index: &CatalogIndex, hits: &[CachedHit]) -> Vec<Suggestion> {
    hits.iter()
        .filter_map(|hit| match hit.entity {
            EntityRef::Gear(slot) => {
                let gear = index.gear_at(slot);
                Some(Suggestion {
                    brand_name: index
                        .brand(gear.brand)
                        .map(|b| b.name.clone())
                        .unwrap_or_default(),
                    gear: gear.clone(),
                    tier: hit.kind.tier,
                    distance: hit.kind.distance,
                    via_brand: hit.via_brand,
                })
            }
            EntityRef::Brand(_) => None,
        })
        .collect()
}
