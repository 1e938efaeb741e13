//! Runtime validation suite, behind `--validate`.
//!
//! Exercises the packing layers bottom-up and finishes with a known
//! 16-piece puzzle whose rotation counts and solution count are fixed:
//! 58 1x1 rotations, 316 per 1x2/2x1, 3472 2x2, and 640 solutions on the
//! 4x4 board regardless of super-tile size, backend or threading.

use std::io::Write;

use crate::engine::compose::{compose, Axis};
use crate::engine::grid::{BoardType, Grid, FIRST_CELL};
use crate::engine::mask::{Mask256, Mask512, PieceMask};
use crate::engine::shape::TileShape;
use crate::engine::solver::{solve_board, SolveCtl, SolveOptions};
use crate::engine::store::{Buckets, DenseBuckets, MappedBuckets, SparseBuckets, TileStore};
use crate::engine::tile::Tile;
use crate::pieces::{generate_rotations, Piece};

macro_rules! check {
    ($cond:expr) => {
        if !$cond {
            return false;
        }
    };
}

/// Run the whole suite, reporting a single success/failure line.
pub fn run() -> bool {
    print!("running validation suite... ");
    std::io::stdout().flush().ok();
    let ok = test_masks() && test_shapes() && test_tiles() && test_placement() && test_boards();
    if ok {
        println!("success");
    } else {
        println!("FAIL!");
    }
    ok
}

/// The 16-piece 4x4 fixture used by the suite, tests and benchmarks.
pub fn sample_puzzle() -> Vec<Piece> {
    vec![
        Piece::new(0, 0, 1, 2),
        Piece::new(1, 0, 2, 3),
        Piece::new(2, 0, 1, 3),
        Piece::new(1, 0, 0, 1),
        Piece::new(0, 2, 3, 2),
        Piece::new(3, 3, 4, 4),
        Piece::new(4, 3, 3, 3),
        Piece::new(3, 1, 0, 1),
        Piece::new(0, 2, 4, 2),
        Piece::new(4, 4, 3, 4),
        Piece::new(3, 3, 4, 4),
        Piece::new(4, 1, 0, 2),
        Piece::new(0, 2, 1, 0),
        Piece::new(1, 4, 1, 0),
        Piece::new(1, 4, 2, 0),
        Piece::new(2, 2, 0, 0),
    ]
}

fn exercise_mask<M: PieceMask>() -> bool {
    let mut a = M::default();
    let mut b = M::default();
    a.set(0);
    a.set(M::CAPACITY - 1);
    b.set(M::CAPACITY / 2);

    check!(!a.intersects(b));
    check!(a.union(b).intersects(b));
    check!(a.union(b).minus(b) == a);
    check!(a.minus(a) == M::default());

    let mut count = 0;
    a.for_each_set(|_| count += 1);
    check!(count == 2);
    true
}

fn test_masks() -> bool {
    exercise_mask::<u32>()
        && exercise_mask::<u64>()
        && exercise_mask::<u128>()
        && exercise_mask::<Mask256>()
        && exercise_mask::<Mask512>()
}

fn test_shapes() -> bool {
    for edge_bits in [3, 4, 5] {
        for (cols, rows) in [(1, 1), (1, 2), (2, 1), (2, 2), (2, 4), (4, 4), (4, 8), (8, 4)] {
            let shape = TileShape::new(edge_bits, cols, rows);
            check!(shape.left_mask() & shape.top_mask() == 0);
            check!(shape.right_flag() & shape.bottom_flag() == 0);
            check!(shape.key_count() == ((shape.left_mask() | shape.top_mask()) + 1) << 2);

            let left = shape.left_mask() & 0x5555_5555_5555_5555;
            let top = 0x2A & (shape.top_mask() >> shape.left_bits());
            let word = shape.pack(left, top);
            check!(shape.left_of(word) == left);
            check!(shape.top_of(word) == top);
        }
    }
    true
}

fn test_tiles() -> bool {
    for edge_bits in [3, 4, 5] {
        let shape = TileShape::new(edge_bits, 1, 1);
        let tile = Tile::<u32>::from_edges(shape, 1, 2, 3, 4, 0b1);
        check!(tile.left(shape) == 1);
        check!(tile.top(shape) == 2);
        check!(tile.right(shape) == 3);
        check!(tile.bottom(shape) == 4);
        check!(tile.self_key(shape) == shape.pack(1, 2) | shape.right_flag() | shape.bottom_flag());

        let corner = Tile::<u32>::from_edges(shape, 0, 0, 3, 4, 0b1);
        check!(corner.self_key(shape) == shape.right_flag() | shape.bottom_flag());
    }
    true
}

fn test_placement() -> bool {
    let shape = TileShape::new(5, 1, 1);
    let mut grid = Grid::new(2, 2, shape);
    let tile = Tile::<u32>::from_edges(shape, 1, 2, 3, 4, 0b1);

    let next = grid.place(FIRST_CELL, crate::engine::tile::TileId(0), tile.exits);
    check!(next == grid.cell(FIRST_CELL).next);

    let right = grid.cell(FIRST_CELL).right;
    let bottom = grid.cell(FIRST_CELL).bottom;
    check!(shape.left_of(grid.key(right)) == 3);
    check!(shape.top_of(grid.key(right)) == 0);
    check!(shape.left_of(grid.key(bottom)) == 0);
    check!(shape.top_of(grid.key(bottom)) == 4);
    true
}

fn count<M: PieceMask, B: Buckets>(store: &TileStore<M, B>, w: u32, h: u32, threaded: bool) -> u64 {
    let opts = SolveOptions { threaded, ..Default::default() };
    solve_board(store, w, h, BoardType::Normal, opts, &SolveCtl::new())
}

/// Build the fixture's composition chain on one backend and check every
/// count along the way.
fn fixture_matrix<B: Buckets>(pieces: &[Piece], edge_bits: u32) -> bool {
    let shape = TileShape::new(edge_bits, 1, 1);

    let mut tiles_1x1: TileStore<u32, B> = TileStore::new(shape);
    generate_rotations(pieces, &mut tiles_1x1);
    check!(tiles_1x1.len() == 58);
    check!(count(&tiles_1x1, 4, 4, false) == 640);
    check!(count(&tiles_1x1, 4, 4, true) == 640);

    let mut tiles_1x2: TileStore<u32, B> = TileStore::new(shape.stacked());
    compose(Axis::Vertical, &tiles_1x1, &mut tiles_1x2, false);
    check!(tiles_1x2.len() == 316);
    check!(count(&tiles_1x2, 4, 2, false) == 640);

    let mut tiles_2x1: TileStore<u32, B> = TileStore::new(shape.paired());
    compose(Axis::Horizontal, &tiles_1x1, &mut tiles_2x1, true);
    check!(tiles_2x1.len() == 316);
    check!(count(&tiles_2x1, 2, 4, true) == 640);

    let mut tiles_2x2: TileStore<u32, B> = TileStore::new(shape.stacked().paired());
    compose(Axis::Horizontal, &tiles_1x2, &mut tiles_2x2, false);
    check!(tiles_2x2.len() == 3472);
    check!(count(&tiles_2x2, 2, 2, false) == 640);

    // the other composition order lands on the same 2x2 tile set
    let mut other_2x2: TileStore<u32, B> = TileStore::new(shape.stacked().paired());
    compose(Axis::Vertical, &tiles_2x1, &mut other_2x2, false);
    check!(other_2x2.len() == 3472);
    check!(count(&other_2x2, 2, 2, true) == 640);

    true
}

fn test_boards() -> bool {
    let pieces = sample_puzzle();

    // dense preallocates and sparse grows to the whole key space; keep both
    // to the classes where 2x2 keys stay small, the map covers the rest
    check!(fixture_matrix::<DenseBuckets>(&pieces, 3));
    for edge_bits in [3, 4] {
        check!(fixture_matrix::<SparseBuckets>(&pieces, edge_bits));
    }
    for edge_bits in [3, 4, 5] {
        check!(fixture_matrix::<MappedBuckets>(&pieces, edge_bits));
    }
    true
}

#[cfg(test)]
mod tests {
    #[test]
    fn suite_passes() {
        assert!(super::run());
    }
}
