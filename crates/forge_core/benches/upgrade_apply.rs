//! Upgrade application benchmarks for forge_core.
//!
//! Run with: `cargo bench -p forge_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use forge_core::prelude::*;
use forge_test_utils::fixtures::{spawn_row, standard_ruleset, standard_world, StandardIds};

const P0: PlayerId = PlayerId(0);

fn army(units: usize) -> (World, StandardIds) {
    let (mut world, ids) = standard_world(1);
    let per_row = 50;
    for row in 0..units.div_ceil(per_row) {
        let count = per_row.min(units - row * per_row);
        let y = i32::try_from(row).unwrap_or(0);
        spawn_row(&mut world, P0, ids.footman, count, (2, 2 + y));
    }
    (world, ids)
}

/// Acquire and lose an additive upgrade over armies of growing size.
pub fn acquire_and_lose(c: &mut Criterion) {
    let mut group = c.benchmark_group("acquire_and_lose");
    for units in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(units), &units, |b, &units| {
            let (mut world, ids) = army(units);
            b.iter(|| {
                world.upgrade_acquire(P0, black_box(ids.iron_forged)).unwrap();
                world.upgrade_lost(P0, black_box(ids.iron_forged)).unwrap();
            });
        });
    }
    group.finish();
}

/// Sight-changing upgrades unmark and re-mark every unit.
pub fn sight_upgrade(c: &mut Criterion) {
    let (mut world, ids) = army(500);
    c.bench_function("sight_upgrade_500", |b| {
        b.iter(|| {
            world.upgrade_acquire(P0, black_box(ids.eagle_eye)).unwrap();
            world.upgrade_lost(P0, black_box(ids.eagle_eye)).unwrap();
        });
    });
}

/// Converting a whole army to another type.
pub fn conversion(c: &mut Criterion) {
    c.bench_function("convert_200_footmen", |b| {
        b.iter_batched(
            || army(200),
            |(mut world, ids)| {
                world.upgrade_acquire(P0, ids.chivalry).unwrap();
                black_box(world.state_hash())
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Building the standard ruleset from RON.
pub fn ruleset_loading(c: &mut Criterion) {
    c.bench_function("load_standard_ruleset", |b| {
        b.iter(|| black_box(standard_ruleset()));
    });
}

criterion_group!(benches, acquire_and_lose, sight_upgrade, conversion, ruleset_loading);
criterion_main!(benches);
