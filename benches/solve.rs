//! Benchmarks for the edge-matching solver.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use edgematch::engine::compose::{compose, Axis};
use edgematch::engine::grid::BoardType;
use edgematch::engine::shape::TileShape;
use edgematch::engine::solver::{solve_board, SolveCtl, SolveOptions};
use edgematch::engine::store::{DenseBuckets, SparseBuckets, TileStore};
use edgematch::pieces::generate_rotations;
use edgematch::validate::sample_puzzle;

fn rotation_store() -> TileStore<u32, DenseBuckets> {
    let mut store = TileStore::new(TileShape::new(3, 1, 1));
    generate_rotations(&sample_puzzle(), &mut store);
    store
}

/// Full 4x4 solve over plain 1x1 rotations.
fn bench_solve_1x1(c: &mut Criterion) {
    let store = rotation_store();

    c.bench_function("solve_4x4_1x1", |b| {
        b.iter(|| {
            solve_board(
                black_box(&store),
                4,
                4,
                BoardType::Normal,
                SolveOptions::default(),
                &SolveCtl::new(),
            )
        })
    });
}

/// Solve after composing up to 2x2 super-tiles.
fn bench_solve_2x2(c: &mut Criterion) {
    let store = rotation_store();
    let mut tiles_1x2: TileStore<u32, SparseBuckets> = TileStore::new(store.shape().stacked());
    compose(Axis::Vertical, &store, &mut tiles_1x2, false);
    let mut tiles_2x2: TileStore<u32, SparseBuckets> = TileStore::new(tiles_1x2.shape().paired());
    compose(Axis::Horizontal, &tiles_1x2, &mut tiles_2x2, false);

    c.bench_function("solve_4x4_2x2", |b| {
        b.iter(|| {
            solve_board(
                black_box(&tiles_2x2),
                2,
                2,
                BoardType::Normal,
                SolveOptions::default(),
                &SolveCtl::new(),
            )
        })
    });
}

/// Cost of materializing the 1x2 store from the rotations.
fn bench_compose_1x2(c: &mut Criterion) {
    let store = rotation_store();

    c.bench_function("compose_1x2", |b| {
        b.iter(|| {
            let mut out: TileStore<u32, SparseBuckets> = TileStore::new(store.shape().stacked());
            compose(Axis::Vertical, black_box(&store), &mut out, false);
            out.len()
        })
    });
}

criterion_group!(benches, bench_solve_1x1, bench_solve_2x2, bench_compose_1x2);
criterion_main!(benches);
