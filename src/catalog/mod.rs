//! Catalog data model and store adapter
pub mod model;
pub mod store;

pub use model::{
    AttributeValue, Brand, BrandId, CatalogSnapshot, Category, CategoryId, CategoryTree,
    EntityKind, Gear, GearId, Insight, Lineage, NameHit, ProductType, ProductTypeId, Subcategory,
    SubcategoryId, CAPACITY_ATTRIBUTE,
};
pub use store::{fetch_snapshot, CatalogStore, MemoryStore};
