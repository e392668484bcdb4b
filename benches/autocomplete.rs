use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use gearfind::config::SearchConfig;
use gearfind::scoring::ScoringWeights;
use gearfind::search::{autocomplete, find_alternatives};
use gearfind::{
    AlternativeFilter, Brand, BrandId, CatalogIndex, CatalogSnapshot, Category, CategoryId,
    CategoryTree, Gear, GearId, ProductType, ProductTypeId, Subcategory, SubcategoryId,
};
use std::hint::black_box;

const WORDS: &[&str] = &[
    "alpine", "summit", "trail", "ridge", "ultra", "lite", "storm", "cirque", "basin", "canyon",
    "glacier", "tundra", "mesa", "pine", "cedar", "granite", "falcon", "raven", "comet", "ember",
];

/// Synthetic catalog: 4 categories x 4 subcategories x 4 product types,
/// 50 brands, `gear_count` items with generated two or three word names.
fn synthetic_catalog(gear_count: usize) -> CatalogSnapshot {
    let mut tree = CategoryTree::default();
    for c in 0..4u32 {
        let mut category = Category {
            id: CategoryId(c),
            name: format!("Category {c}"),
            subcategories: Vec::new(),
        };
        for s in 0..4u32 {
            let sid = c * 4 + s;
            let mut subcategory = Subcategory {
                id: SubcategoryId(sid),
                name: format!("Subcategory {sid}"),
                category: CategoryId(c),
                product_types: Vec::new(),
            };
            for p in 0..4u32 {
                let pid = sid * 4 + p;
                subcategory.product_types.push(ProductTypeId(pid));
                tree.product_types.push(ProductType {
                    id: ProductTypeId(pid),
                    name: format!("Type {pid}"),
                    subcategory: SubcategoryId(sid),
                });
            }
            category.subcategories.push(SubcategoryId(sid));
            tree.subcategories.push(subcategory);
        }
        tree.categories.push(category);
    }

    let brands: Vec<Brand> = (0..50u32)
        .map(|b| {
            let word = WORDS[b as usize % WORDS.len()];
            Brand::new(BrandId(b), format!("{word} Outfitters {b}"))
        })
        .collect();

    let gear = (0..gear_count)
        .map(|i| {
            let name = if i % 3 == 0 {
                format!(
                    "{} {} {}",
                    WORDS[i % WORDS.len()],
                    WORDS[(i / 7) % WORDS.len()],
                    i
                )
            } else {
                format!("{} {}", WORDS[(i * 3) % WORDS.len()], WORDS[(i / 5) % WORDS.len()])
            };
            Gear::new(
                format!("g{i:06}"),
                name,
                BrandId((i % 50) as u32),
                ProductTypeId((i % 64) as u32),
            )
            .with_weight(300 + (i % 2000) as u32)
            .with_price(5_000 + (i as u64 * 37) % 60_000)
        })
        .collect();

    CatalogSnapshot {
        tree,
        brands,
        gear,
        insights: Vec::new(),
    }
}

fn uncached() -> SearchConfig {
    SearchConfig {
        cache_size: 0,
        ..SearchConfig::default()
    }
}

fn bench_build(c: &mut Criterion) {
    let snapshot = synthetic_catalog(10_000);
    c.bench_function("index_build_10k", |b| {
        b.iter(|| CatalogIndex::build(black_box(snapshot.clone()), &uncached()))
    });
}

fn bench_autocomplete(c: &mut Criterion) {
    let index = CatalogIndex::build(synthetic_catalog(10_000), &uncached())
        .expect("synthetic catalog is valid");

    let mut group = c.benchmark_group("autocomplete_10k");
    for query in ["gla", "glacier", "glacer", "outfitters 7", "zzzz"] {
        group.bench_with_input(BenchmarkId::from_parameter(query), query, |b, q| {
            b.iter(|| autocomplete(&index, black_box(q), 10, 2))
        });
    }
    group.finish();
}

fn bench_alternatives(c: &mut Criterion) {
    let index = CatalogIndex::build(synthetic_catalog(10_000), &uncached())
        .expect("synthetic catalog is valid");
    let source = GearId::new("g000042");
    let filter = AlternativeFilter {
        max_weight: Some(1500),
        ..AlternativeFilter::default()
    };
    let weights = ScoringWeights::default();

    c.bench_function("alternatives_10k", |b| {
        b.iter(|| find_alternatives(&index, black_box(&source), &filter, &weights, 20))
    });
}

criterion_group!(benches, bench_build, bench_autocomplete, bench_alternatives);
criterion_main!(benches);
