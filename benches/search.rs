// Search benchmark over a synthetic catalog
//
// Run with: cargo bench --bench search

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mushroom_catalog::{Catalog, SpeciesRecord};

const GENERA: &[&str] = &["Amanita", "Boletus", "Cantharellus", "Morchella", "Russula", "Lactarius"];
const EPITHETS: &[&str] = &["muscaria", "edulis", "cibarius", "esculenta", "emetica", "deliciosus"];
const ALIASES: &[&str] = &["Fly Agaric", "Porcini", "Chanterelle", "Morel", "Sickener", "Saffron Milkcap"];

fn synthetic_catalog(size: usize) -> Catalog {
    let records = (0..size)
        .map(|i| SpeciesRecord {
            scientific_name: format!("{} {}{}", GENERA[i % GENERA.len()], EPITHETS[i % EPITHETS.len()], i),
            common_name: format!("{}, Variant {}", ALIASES[i % ALIASES.len()], i),
            edibility: Some(if i % 3 == 0 { "Poisonous" } else { "Edible" }.to_string()),
            habitat: Some("Mixed woodland".to_string()),
            description: None,
            image_path: None,
            notes: None,
            kind: None,
        })
        .collect();
    Catalog::from_records(records)
}

fn bench_search(c: &mut Criterion) {
    let catalog = synthetic_catalog(2_000);

    c.bench_function("search_single_prefix", |b| {
        b.iter(|| catalog.search(black_box("ama")).len())
    });
    c.bench_function("search_multi_word", |b| {
        b.iter(|| catalog.search(black_box("boletus porc")).len())
    });
    c.bench_function("search_blank", |b| {
        b.iter(|| catalog.search(black_box("  ")).len())
    });
    c.bench_function("by_scientific_name", |b| {
        b.iter(|| catalog.by_scientific_name(black_box("MORCHELLA ESCULENTA3")).is_some())
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
