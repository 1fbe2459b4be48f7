use criterion::{criterion_group, criterion_main, Criterion};
use engine::tokenizer::tokenize;
use engine::{Engine, Event, GeoPoint, Query, SortMode};

fn seed() -> Vec<Event> {
    serde_json::from_str(include_str!("../../data/events.json")).expect("valid seed corpus")
}

fn bench_tokenize(c: &mut Criterion) {
    let text: String = seed().iter().map(|e| e.description.as_str()).collect::<Vec<_>>().join(" ");
    c.bench_function("tokenize_descriptions", |b| b.iter(|| tokenize(&text)));
}

fn bench_search(c: &mut Criterion) {
    let engine = Engine::default();
    engine.load(seed()).expect("seed corpus loads");
    let query = Query::text("music festval")
        .with_origin(GeoPoint::new(40.7128, -74.0060), Some(5000.0))
        .with_sort(SortMode::Distance);
    c.bench_function("search_fuzzy_geo", |b| b.iter(|| engine.search(&query)));
}

criterion_group!(benches, bench_tokenize, bench_search);
criterion_main!(benches);
