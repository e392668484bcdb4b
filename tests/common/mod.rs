//! Shared catalog fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use gearfind::catalog::{CatalogStore, NameHit};
use gearfind::config::SearchConfig;
use gearfind::{
    AttributeValue, Brand, BrandId, CatalogError, CatalogIndex, CatalogSnapshot, Category,
    CategoryId, CategoryTree, Gear, GearId, Insight, MemoryStore, ProductType, ProductTypeId,
    Result, Subcategory, SubcategoryId,
};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const BACKPACKING_TENT: ProductTypeId = ProductTypeId(0);
pub const TREKKING_POLE_TENT: ProductTypeId = ProductTypeId(1);
pub const FLAT_TARP: ProductTypeId = ProductTypeId(2);
pub const DOWN_BAG: ProductTypeId = ProductTypeId(3);
pub const QUILT: ProductTypeId = ProductTypeId(4);

pub const MSR: BrandId = BrandId(0);
pub const BIG_AGNES: BrandId = BrandId(1);
pub const NEMO: BrandId = BrandId(2);
pub const ZPACKS: BrandId = BrandId(3);
pub const WESTERN_MOUNTAINEERING: BrandId = BrandId(4);

fn category(id: u32, name: &str, subs: &[u32]) -> Category {
    Category {
        id: CategoryId(id),
        name: name.to_string(),
        subcategories: subs.iter().map(|s| SubcategoryId(*s)).collect(),
    }
}

fn subcategory(id: u32, name: &str, parent: u32, types: &[u32]) -> Subcategory {
    Subcategory {
        id: SubcategoryId(id),
        name: name.to_string(),
        category: CategoryId(parent),
        product_types: types.iter().map(|t| ProductTypeId(*t)).collect(),
    }
}

fn product_type(id: u32, name: &str, parent: u32) -> ProductType {
    ProductType {
        id: ProductTypeId(id),
        name: name.to_string(),
        subcategory: SubcategoryId(parent),
    }
}

fn capacity(n: u32) -> AttributeValue {
    AttributeValue::Number(f64::from(n))
}

pub fn tree() -> CategoryTree {
    CategoryTree {
        categories: vec![
            category(0, "Shelter", &[0, 1]),
            category(1, "Sleep Systems", &[2]),
        ],
        subcategories: vec![
            subcategory(0, "Tents", 0, &[0, 1]),
            subcategory(1, "Tarps", 0, &[2]),
            subcategory(2, "Sleeping Bags", 1, &[3, 4]),
        ],
        product_types: vec![
            product_type(0, "Backpacking Tent", 0),
            product_type(1, "Trekking Pole Tent", 0),
            product_type(2, "Flat Tarp", 1),
            product_type(3, "Down Sleeping Bag", 2),
            product_type(4, "Quilt", 2),
        ],
    }
}

/// A small but realistic outdoor catalog.
pub fn snapshot() -> CatalogSnapshot {
    let mut wm = Brand::new(WESTERN_MOUNTAINEERING, "Western Mountaineering");
    wm.country = Some("USA".to_string());

    CatalogSnapshot {
        tree: tree(),
        brands: vec![
            Brand::new(MSR, "MSR"),
            Brand::new(BIG_AGNES, "Big Agnes"),
            Brand::new(NEMO, "NEMO Equipment"),
            Brand::new(ZPACKS, "Zpacks"),
            wm,
        ],
        gear: vec![
            Gear::new("msr-hubba-nx", "Hubba Hubba NX", MSR, BACKPACKING_TENT)
                .with_weight(1720)
                .with_price(44995)
                .with_popularity(0.9)
                .with_attribute("capacity_persons", capacity(2)),
            Gear::new("msr-elixir-2", "Elixir 2", MSR, BACKPACKING_TENT)
                .with_weight(2320)
                .with_price(27995)
                .with_attribute("capacity_persons", capacity(2)),
            Gear::new("ba-copper-spur", "Copper Spur HV UL2", BIG_AGNES, BACKPACKING_TENT)
                .with_weight(1420)
                .with_price(54995)
                .with_popularity(0.8)
                .with_attribute("capacity_persons", capacity(2)),
            Gear::new("ba-tiger-wall", "Tiger Wall UL2", BIG_AGNES, BACKPACKING_TENT)
                .with_weight(1190)
                .with_price(49995)
                .with_attribute("capacity_persons", capacity(2)),
            Gear::new("nemo-hornet", "Hornet Elite OSMO 2P", NEMO, BACKPACKING_TENT)
                .with_weight(910)
                .with_price(59995)
                .with_attribute("capacity_persons", capacity(2)),
            Gear::new("nemo-dagger", "Dagger OSMO 3P", NEMO, BACKPACKING_TENT)
                .with_price(52995)
                .with_attribute("capacity_persons", capacity(3)),
            Gear::new("zp-duplex", "Duplex", ZPACKS, TREKKING_POLE_TENT)
                .with_weight(539)
                .with_price(69900)
                .with_attribute("capacity_persons", capacity(2)),
            Gear::new("zp-plex-solo", "Plex Solo", ZPACKS, TREKKING_POLE_TENT)
                .with_weight(397)
                .with_price(59900)
                .with_attribute("capacity_persons", capacity(1)),
            Gear::new("msr-wing", "Thru-Hiker 70 Wing", MSR, FLAT_TARP).with_weight(510),
            Gear::new("wm-ultralite", "UltraLite 20", WESTERN_MOUNTAINEERING, DOWN_BAG)
                .with_weight(825)
                .with_price(61000)
                .with_attribute("fill_power", AttributeValue::Number(850.0)),
            Gear::new("wm-summerlite", "SummerLite 32", WESTERN_MOUNTAINEERING, DOWN_BAG)
                .with_weight(540)
                .with_price(52500),
            Gear::new("ba-fishhawk", "Fishhawk 30", BIG_AGNES, DOWN_BAG)
                .with_weight(1080)
                .with_price(27995),
            Gear::new("zp-solo-quilt", "Solo Quilt", ZPACKS, QUILT)
                .with_weight(510)
                .with_price(36900),
        ],
        insights: vec![
            Insight::new(
                "msr-hubba-nx",
                "Pitch the fly first in rain",
                "The footprint and fly can go up before the inner stays dry.",
            )
            .with_category("setup"),
            Insight::new(
                "msr-hubba-nx",
                "Stake the vestibules tight",
                "Loose vestibule doors flap and wake you in gusty wind.",
            ),
            Insight::new(
                "zp-duplex",
                "Carry longer trekking poles",
                "The Duplex pitches best with poles set to 122 cm.",
            )
            .with_category("setup"),
        ],
    }
}

/// The three-tent catalog from the alternative-discovery walkthrough: A and B
/// share a product type, C sits in a sibling type of the same subcategory.
pub fn tent_scenario() -> CatalogSnapshot {
    CatalogSnapshot {
        tree: tree(),
        brands: vec![Brand::new(MSR, "MSR")],
        gear: vec![
            Gear::new("A", "Tent A", MSR, BACKPACKING_TENT)
                .with_weight(1200)
                .with_price(25000),
            Gear::new("B", "Tent B", MSR, BACKPACKING_TENT)
                .with_weight(1400)
                .with_price(22000),
            Gear::new("C", "Tent C", MSR, TREKKING_POLE_TENT)
                .with_weight(1600)
                .with_price(30000),
        ],
        insights: Vec::new(),
    }
}

pub fn index() -> CatalogIndex {
    index_of(snapshot())
}

pub fn index_of(snapshot: CatalogSnapshot) -> CatalogIndex {
    CatalogIndex::build(snapshot, &SearchConfig::default()).expect("fixture snapshot is valid")
}

pub fn ids<'a>(items: impl IntoIterator<Item = &'a Gear>) -> Vec<String> {
    items.into_iter().map(|g| g.id.as_str().to_string()).collect()
}

pub fn gear_id(id: &str) -> GearId {
    GearId::new(id)
}

/// Store wrapper whose availability and latency tests can control.
pub struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
    delay_ms: AtomicU64,
    active_fetches: AtomicUsize,
    max_concurrent_fetches: AtomicUsize,
}

impl FlakyStore {
    pub fn new(snapshot: CatalogSnapshot) -> Arc<Self> {
        Self::with_delay(snapshot, Duration::ZERO)
    }

    pub fn with_delay(snapshot: CatalogSnapshot, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(snapshot),
            failing: AtomicBool::new(false),
            delay_ms: AtomicU64::new(delay.as_millis() as u64),
            active_fetches: AtomicUsize::new(0),
            max_concurrent_fetches: AtomicUsize::new(0),
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_concurrent_fetches.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(CatalogError::StoreUnavailable(
                "connection refused".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CatalogStore for FlakyStore {
    async fn fetch_category_tree(&self) -> Result<CategoryTree> {
        let now = self.active_fetches.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent_fetches.fetch_max(now, Ordering::SeqCst);
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.active_fetches.fetch_sub(1, Ordering::SeqCst);
        self.check()?;
        self.inner.fetch_category_tree().await
    }

    async fn fetch_brands(&self) -> Result<Vec<Brand>> {
        self.check()?;
        self.inner.fetch_brands().await
    }

    async fn fetch_gear_by_id(&self, id: &GearId) -> Result<Gear> {
        self.check()?;
        self.inner.fetch_gear_by_id(id).await
    }

    async fn fetch_gear_by_product_type(&self, product_type: ProductTypeId) -> Result<Vec<Gear>> {
        self.check()?;
        self.inner.fetch_gear_by_product_type(product_type).await
    }

    async fn fetch_gear_by_subcategory(&self, subcategory: SubcategoryId) -> Result<Vec<Gear>> {
        self.check()?;
        self.inner.fetch_gear_by_subcategory(subcategory).await
    }

    async fn fetch_all_gear(&self) -> Result<Vec<Gear>> {
        self.check()?;
        self.inner.fetch_all_gear().await
    }

    async fn fetch_insights(&self) -> Result<Vec<Insight>> {
        self.check()?;
        self.inner.fetch_insights().await
    }

    async fn search_name_prefix(&self, text: &str) -> Result<Vec<NameHit>> {
        self.check()?;
        self.inner.search_name_prefix(text).await
    }
}
