//! Token and full-name lookup tables for autocomplete
use crate::catalog::BrandId;
use crate::scoring::{self, bounded_levenshtein};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

/// Position of a gear item in the index's id-sorted gear table.
pub type GearSlot = usize;

/// A searchable entity. Ordered so that set iteration is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityRef {
    Brand(BrandId),
    Gear(GearSlot),
}

/// Sorted maps from normalized token / full name to the entities carrying it.
/// Ordered keys turn prefix lookups into range scans.
#[derive(Debug, Default)]
pub struct PrefixIndex {
    tokens: BTreeMap<String, BTreeSet<EntityRef>>,
    names: BTreeMap<String, BTreeSet<EntityRef>>,
}

impl PrefixIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entity` under its full normalized name and each token.
    pub fn insert(&mut self, name: &str, tokens: &[String], entity: EntityRef) {
        let full = scoring::normalize(name);
        if full.is_empty() {
            return;
        }
        self.names.entry(full).or_default().insert(entity);
        for token in tokens {
            self.tokens.entry(token.clone()).or_default().insert(entity);
        }
    }

    /// Entities whose full name equals the normalized query.
    pub fn exact(&self, query: &str) -> BTreeSet<EntityRef> {
        self.names.get(query).cloned().unwrap_or_default()
    }

    /// Entities with a token or full name starting with the query.
    pub fn prefixed(&self, query: &str) -> BTreeSet<EntityRef> {
        let mut out = BTreeSet::new();
        if query.is_empty() {
            return out;
        }
        for map in [&self.tokens, &self.names] {
            for (_, entities) in map
                .range::<str, _>((Bound::Included(query), Bound::Unbounded))
                .take_while(|(key, _)| key.starts_with(query))
            {
                out.extend(entities.iter().copied());
            }
        }
        out
    }

    /// Entities with a token within `cap` edits of the query.
    pub fn fuzzy(&self, query: &str, cap: usize) -> BTreeSet<EntityRef> {
        let mut out = BTreeSet::new();
        if query.is_empty() {
            return out;
        }
        for (token, entities) in &self.tokens {
            if bounded_levenshtein(query, token, cap).is_some() {
                out.extend(entities.iter().copied());
            }
        }
        out
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}
