//! Benchmarks for pool generation and drawing
//!
//! Run with: cargo bench --bench draw

use bingo_draw::rng::{Pcg32, Rng, SeedableRng};
use bingo_draw::{DrawOutcome, GameBuilder, GameConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_reset(c: &mut Criterion) {
    let mut group = c.benchmark_group("GameState reset");

    for pool_size in [30i32, 90, 1_000, 100_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(pool_size),
            pool_size,
            |b, &pool_size| {
                let mut game = GameBuilder::new()
                    .with_config(GameConfig::new(1, pool_size, 1))
                    .with_seed(1)
                    .start();
                b.iter(|| {
                    game.reset();
                    game.events().for_each(drop);
                });
            },
        );
    }

    group.finish();
}

fn bench_draw_to_exhaustion(c: &mut Criterion) {
    let mut group = c.benchmark_group("Draw to exhaustion");

    for batch_size in [1usize, 5, 15].iter() {
        group.bench_with_input(
            BenchmarkId::new("90 balls", batch_size),
            batch_size,
            |b, &batch_size| {
                let mut game = GameBuilder::new()
                    .with_config(GameConfig::new(1, 90, batch_size))
                    .with_seed(2)
                    .start();
                b.iter(|| {
                    game.reset();
                    while let DrawOutcome::Drawn(batch) = game.draw_and_finish() {
                        black_box(batch);
                    }
                    game.events().for_each(drop);
                });
            },
        );
    }

    group.finish();
}

fn bench_rng(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pcg32");

    group.bench_function("gen_range_usize", |b| {
        let mut rng = Pcg32::seed_from_u64(3);
        b.iter(|| rng.gen_range_usize(black_box(0..90)));
    });

    group.bench_function("shuffle 90", |b| {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut balls: Vec<i32> = (1..=90).collect();
        b.iter(|| rng.shuffle(black_box(&mut balls)));
    });

    group.finish();
}

criterion_group!(benches, bench_reset, bench_draw_to_exhaustion, bench_rng);
criterion_main!(benches);
