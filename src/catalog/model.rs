//! Catalog entities and the category hierarchy
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

macro_rules! node_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Position of this node in its id-indexed table.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

node_id!(
    /// Dense id of a top-level category
    CategoryId
);
node_id!(
    /// Dense id of a subcategory
    SubcategoryId
);
node_id!(
    /// Dense id of a product type
    ProductTypeId
);
node_id!(
    /// Dense id of a brand
    BrandId
);

/// Stable, globally unique gear identifier. Ordered lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GearId(pub String);

impl GearId {
    pub fn new(id: impl Into<String>) -> Self {
        GearId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GearId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GearId {
    fn from(s: &str) -> Self {
        GearId(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Category,
    Subcategory,
    ProductType,
    Brand,
    Gear,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Category => write!(f, "category"),
            EntityKind::Subcategory => write!(f, "subcategory"),
            EntityKind::ProductType => write!(f, "product type"),
            EntityKind::Brand => write!(f, "brand"),
            EntityKind::Gear => write!(f, "gear"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<SubcategoryId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub name: String,
    pub category: CategoryId,
    #[serde(default)]
    pub product_types: Vec<ProductTypeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductType {
    pub id: ProductTypeId,
    pub name: String,
    pub subcategory: SubcategoryId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_founded: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_known_for: Option<String>,
}

impl Brand {
    pub fn new(id: BrandId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            country: None,
            website: None,
            year_founded: None,
            description: None,
            best_known_for: None,
        }
    }
}

/// Type-specific attribute value. Opaque to scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl AttributeValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Number(n) => write!(f, "{n}"),
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

/// Attribute key the capacity filter reads.
pub const CAPACITY_ATTRIBUTE: &str = "capacity_persons";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gear {
    pub id: GearId,
    pub name: String,
    pub brand: BrandId,
    pub product_type: ProductTypeId,
    /// Grams. `None` means unknown, never zero.
    #[serde(default)]
    pub weight_grams: Option<u32>,
    /// Currency minor units (cents). `None` means unknown.
    #[serde(default)]
    pub price_minor: Option<u64>,
    /// Relevance hint used to order autocomplete results within a tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Gear {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        brand: BrandId,
        product_type: ProductTypeId,
    ) -> Self {
        Self {
            id: GearId(id.into()),
            name: name.into(),
            brand,
            product_type,
            weight_grams: None,
            price_minor: None,
            popularity: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_weight(mut self, grams: u32) -> Self {
        self.weight_grams = Some(grams);
        self
    }

    pub fn with_price(mut self, minor: u64) -> Self {
        self.price_minor = Some(minor);
        self
    }

    pub fn with_popularity(mut self, popularity: f64) -> Self {
        self.popularity = Some(popularity);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn capacity_persons(&self) -> Option<i64> {
        self.attributes
            .get(CAPACITY_ATTRIBUTE)
            .and_then(AttributeValue::as_number)
            .map(|n| n as i64)
    }
}

/// A usage tip attached to one gear item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub gear: GearId,
    pub summary: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl Insight {
    pub fn new(
        gear: impl Into<String>,
        summary: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            gear: GearId(gear.into()),
            summary: summary.into(),
            content: content.into(),
            category: None,
            source_url: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Category → subcategory → product type tree, stored as id-indexed tables
/// with parent pointers by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTree {
    pub categories: Vec<Category>,
    pub subcategories: Vec<Subcategory>,
    pub product_types: Vec<ProductType>,
}

/// The product type of a gear item together with its ancestors.
#[derive(Debug, Clone, Copy)]
pub struct Lineage<'a> {
    pub category: &'a Category,
    pub subcategory: &'a Subcategory,
    pub product_type: &'a ProductType,
}

impl CategoryTree {
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(id.index()).filter(|c| c.id == id)
    }

    pub fn subcategory(&self, id: SubcategoryId) -> Option<&Subcategory> {
        self.subcategories.get(id.index()).filter(|s| s.id == id)
    }

    pub fn product_type(&self, id: ProductTypeId) -> Option<&ProductType> {
        self.product_types.get(id.index()).filter(|p| p.id == id)
    }

    pub fn lineage(&self, id: ProductTypeId) -> Option<Lineage<'_>> {
        let product_type = self.product_type(id)?;
        let subcategory = self.subcategory(product_type.subcategory)?;
        let category = self.category(subcategory.category)?;
        Some(Lineage {
            category,
            subcategory,
            product_type,
        })
    }

    /// Checks dense ids and that child lists agree with parent pointers.
    pub fn validate(&self) -> Result<(), String> {
        for (i, c) in self.categories.iter().enumerate() {
            if c.id.index() != i {
                return Err(format!("category '{}' has id {} at position {i}", c.name, c.id));
            }
            for sub in &c.subcategories {
                match self.subcategory(*sub) {
                    Some(s) if s.category == c.id => {}
                    _ => {
                        return Err(format!(
                            "category {} lists subcategory {sub} which does not point back",
                            c.id
                        ))
                    }
                }
            }
        }
        for (i, s) in self.subcategories.iter().enumerate() {
            if s.id.index() != i {
                return Err(format!("subcategory '{}' has id {} at position {i}", s.name, s.id));
            }
            let parent = self
                .category(s.category)
                .ok_or_else(|| format!("subcategory {} has unknown parent {}", s.id, s.category))?;
            if !parent.subcategories.contains(&s.id) {
                return Err(format!(
                    "subcategory {} is missing from category {}",
                    s.id, s.category
                ));
            }
            for pt in &s.product_types {
                match self.product_type(*pt) {
                    Some(p) if p.subcategory == s.id => {}
                    _ => {
                        return Err(format!(
                            "subcategory {} lists product type {pt} which does not point back",
                            s.id
                        ))
                    }
                }
            }
        }
        for (i, p) in self.product_types.iter().enumerate() {
            if p.id.index() != i {
                return Err(format!("product type '{}' has id {} at position {i}", p.name, p.id));
            }
            let parent = self.subcategory(p.subcategory).ok_or_else(|| {
                format!("product type {} has unknown parent {}", p.id, p.subcategory)
            })?;
            if !parent.product_types.contains(&p.id) {
                return Err(format!(
                    "product type {} is missing from subcategory {}",
                    p.id, p.subcategory
                ));
            }
        }
        Ok(())
    }
}

/// Everything one full catalog fetch returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(flatten)]
    pub tree: CategoryTree,
    #[serde(default)]
    pub brands: Vec<Brand>,
    #[serde(default)]
    pub gear: Vec<Gear>,
    #[serde(default)]
    pub insights: Vec<Insight>,
}

/// A name hit returned by the store's fallback prefix search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameHit {
    pub kind: EntityKind,
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> CategoryTree {
        CategoryTree {
            categories: vec![Category {
                id: CategoryId(0),
                name: "Shelter".into(),
                subcategories: vec![SubcategoryId(0)],
            }],
            subcategories: vec![Subcategory {
                id: SubcategoryId(0),
                name: "Tents".into(),
                category: CategoryId(0),
                product_types: vec![ProductTypeId(0)],
            }],
            product_types: vec![ProductType {
                id: ProductTypeId(0),
                name: "Backpacking Tent".into(),
                subcategory: SubcategoryId(0),
            }],
        }
    }

    #[test]
    fn lineage_walks_to_the_root() {
        let tree = tree();
        assert!(tree.validate().is_ok());
        let lineage = tree.lineage(ProductTypeId(0)).unwrap();
        assert_eq!(lineage.category.name, "Shelter");
        assert_eq!(lineage.subcategory.name, "Tents");
        assert!(tree.lineage(ProductTypeId(7)).is_none());
    }

    #[test]
    fn validate_catches_one_sided_links() {
        let mut orphaned = tree();
        orphaned.subcategories[0].product_types.clear();
        assert!(orphaned.validate().is_err());

        let mut sparse = tree();
        sparse.product_types[0].id = ProductTypeId(3);
        assert!(sparse.validate().is_err());
    }

    #[test]
    fn insights_default_to_empty() {
        let snapshot: CatalogSnapshot = serde_json::from_str(
            r#"{"categories":[],"subcategories":[],"product_types":[]}"#,
        )
        .unwrap();
        assert!(snapshot.insights.is_empty());

        let insight: Insight = serde_json::from_str(
            r#"{"gear":"msr-hubba-nx","summary":"Pitch fly first","content":"In rain."}"#,
        )
        .unwrap();
        assert_eq!(insight.gear.as_str(), "msr-hubba-nx");
        assert_eq!(insight.category, None);
    }

    #[test]
    fn attributes_parse_untagged() {
        let gear: Gear = serde_json::from_str(
            r#"{"id":"x","name":"X","brand":0,"product_type":0,
                "attributes":{"capacity_persons":2,"freestanding":true,
                              "colors":["green","grey"],"fabric":"20D nylon"}}"#,
        )
        .unwrap();
        assert_eq!(gear.capacity_persons(), Some(2));
        assert_eq!(gear.weight_grams, None);
        assert_eq!(gear.attributes["freestanding"], AttributeValue::Bool(true));
        assert_eq!(gear.attributes["colors"].to_string(), "green, grey");
        assert_eq!(
            gear.attributes["fabric"],
            AttributeValue::Text("20D nylon".into())
        );
    }
}
