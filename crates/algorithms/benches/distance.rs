//! Benchmarks for distance fields and the cost surface

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use unreach_algorithms::distance::{cost_distance, euclidean_distance};
use unreach_algorithms::terrain::{cost_surface, CostSurfaceParams};
use unreach_core::{GeoTransform, Raster};

const RESOLUTION: f64 = 250.0;

/// A sparse lattice of "roads": every 64th row plus a diagonal
fn create_sources(size: usize) -> Raster<u8> {
    let mut sources = Raster::new(size, size);
    for row in 0..size {
        for col in 0..size {
            if row % 64 == 0 || row == col {
                sources.set(row, col, 1).unwrap();
            }
        }
    }
    sources
}

fn create_dem(size: usize) -> Raster<f64> {
    let mut dem = Raster::new(size, size);
    dem.set_transform(GeoTransform::new(0.0, size as f64 * RESOLUTION, RESOLUTION, -RESOLUTION));
    for row in 0..size {
        for col in 0..size {
            let base = 1500.0 + (row + col) as f64 * 2.0;
            let variation = ((row * 7 + col * 13) % 100) as f64 * 3.0;
            dem.set(row, col, base + variation).unwrap();
        }
    }
    dem
}

fn bench_euclidean(c: &mut Criterion) {
    let mut group = c.benchmark_group("euclidean_distance");

    for size in [256, 512, 1024, 2048].iter() {
        let sources = create_sources(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| euclidean_distance(black_box(&sources), RESOLUTION).unwrap())
        });
    }

    group.finish();
}

fn bench_cost_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("cost_distance");
    group.sample_size(10);

    for size in [256, 512, 1024].iter() {
        let sources = create_sources(*size);
        let cost = cost_surface(&create_dem(*size), None, &CostSurfaceParams::default())
            .unwrap()
            .cost;

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| cost_distance(black_box(&sources), black_box(&cost), RESOLUTION).unwrap())
        });
    }

    group.finish();
}

fn bench_cost_surface(c: &mut Criterion) {
    let mut group = c.benchmark_group("cost_surface");

    for size in [256, 512, 1024].iter() {
        let dem = create_dem(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| cost_surface(black_box(&dem), None, &CostSurfaceParams::default()).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_euclidean, bench_cost_distance, bench_cost_surface);
criterion_main!(benches);
