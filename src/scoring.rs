//! Shared ranking primitives: normalization, tokenization, bounded edit
//! distance, match classification and numeric-delta scoring.
use serde::{Deserialize, Serialize};

/// Lowercases, trims and collapses inner whitespace runs to one space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits a name into lowercase tokens on whitespace and hyphens.
pub fn tokenize(name: &str) -> Vec<String> {
    name.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Levenshtein distance between `a` and `b`, or `None` once it is certain to
/// exceed `cap`.
///
/// Uses two rolling rows and stops as soon as every cell of the current row
/// is above the cap, so mismatched tokens are rejected after a few columns.
pub fn bounded_levenshtein(a: &str, b: &str, cap: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len().abs_diff(b.len()) > cap {
        return None;
    }
    if a.is_empty() || b.is_empty() {
        let d = a.len().max(b.len());
        return (d <= cap).then_some(d);
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
            row_min = row_min.min(curr[j + 1]);
        }
        if row_min > cap {
            return None;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let d = prev[b.len()];
    (d <= cap).then_some(d)
}

/// Autocomplete match tiers, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Prefix,
    Fuzzy,
}

/// How a name matched a query and how close the match was.
///
/// `distance` is 0 for exact matches, the number of characters the matched
/// token (or full name) extends past the query for prefix matches, and the
/// edit distance for fuzzy matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchKind {
    pub tier: MatchTier,
    pub distance: usize,
}

/// Classifies `name` against an already-normalized query.
pub fn classify_match(query: &str, name: &str, fuzzy_cap: usize) -> Option<MatchKind> {
    if query.is_empty() {
        return None;
    }
    let full = normalize(name);
    if full == query {
        return Some(MatchKind {
            tier: MatchTier::Exact,
            distance: 0,
        });
    }

    let query_len = query.chars().count();
    let tokens = tokenize(name);

    let prefix = std::iter::once(full.as_str())
        .chain(tokens.iter().map(String::as_str))
        .filter(|t| t.starts_with(query))
        .map(|t| t.chars().count() - query_len)
        .min();
    if let Some(distance) = prefix {
        return Some(MatchKind {
            tier: MatchTier::Prefix,
            distance,
        });
    }

    tokens
        .iter()
        .filter_map(|t| bounded_levenshtein(query, t, fuzzy_cap))
        .min()
        .map(|distance| MatchKind {
            tier: MatchTier::Fuzzy,
            distance,
        })
}

/// `|candidate - source| / max(source, candidate, 1)` clamped to `[0, 1]`.
/// Unknown on either side is the maximal penalty, 1.0.
pub fn normalized_delta(source: Option<u64>, candidate: Option<u64>) -> f64 {
    match (source, candidate) {
        (Some(s), Some(c)) => {
            let denom = s.max(c).max(1) as f64;
            (s.abs_diff(c) as f64 / denom).clamp(0.0, 1.0)
        }
        _ => 1.0,
    }
}

/// Alternative-discovery weights. Expected to sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub tier_weight: f64,
    pub weight_weight: f64,
    pub price_weight: f64,
    pub brand_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            tier_weight: 0.4,
            weight_weight: 0.25,
            price_weight: 0.25,
            brand_weight: 0.1,
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.tier_weight + self.weight_weight + self.price_weight + self.brand_weight
    }

    pub fn is_valid(&self) -> bool {
        let parts = [
            self.tier_weight,
            self.weight_weight,
            self.price_weight,
            self.brand_weight,
        ];
        parts.iter().all(|w| w.is_finite() && *w >= 0.0) && (self.sum() - 1.0).abs() < 1e-6
    }

    pub fn score(
        &self,
        tier_weight: f64,
        weight_delta: f64,
        price_delta: f64,
        brand_match: bool,
    ) -> f64 {
        let brand_bonus = if brand_match { 1.0 } else { 0.0 };
        self.tier_weight * tier_weight
            + self.weight_weight * (1.0 - weight_delta)
            + self.price_weight * (1.0 - price_delta)
            + self.brand_weight * brand_bonus
    }
}
