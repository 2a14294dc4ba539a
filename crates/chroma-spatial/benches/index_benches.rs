//! Benchmarks for the colour-space range indexes.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use chroma_spatial::{
    AdaptiveGridHashIndex, ColorPoint, GridHashIndex, LinearIndex, OctreeIndex, QuadtreeIndex,
    RangeIndex,
};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn dataset(n: u64) -> Vec<ColorPoint> {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    (0..n)
        .map(|id| {
            let [r, g, b] = rng.random::<[u8; 3]>();
            ColorPoint::from_rgb(id, format!("{id}.png"), r, g, b)
        })
        .collect()
}

fn build<I: RangeIndex + Default>(points: &[ColorPoint]) -> I {
    let mut index = I::default();
    for p in points {
        index.insert(p.clone());
    }
    index
}

// ============================================================================
// Construction
// ============================================================================

fn bench_insert_10000(c: &mut Criterion) {
    let points = dataset(10_000);
    let mut group = c.benchmark_group("insert_10000");
    group.bench_function("linear", |b| {
        b.iter(|| black_box(build::<LinearIndex>(&points)))
    });
    group.bench_function("grid_hash", |b| {
        b.iter(|| black_box(build::<GridHashIndex>(&points)))
    });
    group.bench_function("adaptive_grid_hash", |b| {
        b.iter(|| black_box(build::<AdaptiveGridHashIndex>(&points)))
    });
    group.bench_function("octree", |b| {
        b.iter(|| black_box(build::<OctreeIndex>(&points)))
    });
    group.bench_function("quadtree", |b| {
        b.iter(|| black_box(build::<QuadtreeIndex>(&points)))
    });
    group.finish();
}

// ============================================================================
// Queries
// ============================================================================

fn bench_query<I: RangeIndex + Default>(c: &mut Criterion, name: &str, points: &[ColorPoint]) {
    let index = build::<I>(points);
    let query = Vec3::new(120.0, 80.0, 200.0);
    let mut group = c.benchmark_group(format!("query_{}", points.len()));
    for threshold in [10.0, 50.0] {
        group.bench_function(format!("{name}_t{threshold}"), |b| {
            b.iter(|| black_box(index.query(black_box(query), threshold).len()))
        });
    }
    group.finish();
}

fn bench_query_100000(c: &mut Criterion) {
    let points = dataset(100_000);
    bench_query::<LinearIndex>(c, "linear", &points);
    bench_query::<GridHashIndex>(c, "grid_hash", &points);
    bench_query::<AdaptiveGridHashIndex>(c, "adaptive_grid_hash", &points);
    bench_query::<OctreeIndex>(c, "octree", &points);
    bench_query::<QuadtreeIndex>(c, "quadtree", &points);
}

fn bench_adaptive_capped(c: &mut Criterion) {
    let index = build::<AdaptiveGridHashIndex>(&dataset(100_000));
    let query = Vec3::new(120.0, 80.0, 200.0);
    c.bench_function("adaptive_grid_hash_capped_10", |b| {
        b.iter(|| black_box(index.query_capped(black_box(query), 50.0, 10).len()))
    });
}

criterion_group!(
    benches,
    bench_insert_10000,
    bench_query_100000,
    bench_adaptive_capped,
);

criterion_main!(benches);
