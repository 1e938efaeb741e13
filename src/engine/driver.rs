//! Driver: capacity selection, the composition ladder, the final solve.
//!
//! Given the loaded pieces the driver picks the narrowest edge class and
//! occupancy-mask width that fit, builds the 1x1 rotation store, chains
//! pre-composition up to the user's cap and the board's divisibility, then
//! solves the board (both orientations when it is not square) over the
//! largest store built. Progress goes to stdout, one line per stage.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::error::SolveError;
use crate::pieces::{color_count, generate_rotations, Piece};

use super::compose::{compose, Axis};
use super::grid::BoardType;
use super::mask::{Mask256, Mask512, PieceMask};
use super::shape::TileShape;
use super::solver::{solve_board, SolveCtl, SolveOptions};
use super::store::{Buckets, DenseBuckets, MappedBuckets, SparseBuckets, TileStore};

/// Options the command line hands to the driver.
#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    pub print: bool,
    pub quit: bool,
    pub randomize: bool,
    pub threaded: bool,
    pub board_type: BoardType,
    /// Largest super-tile size to pre-compose, in covered cells.
    pub cell_cap: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            print: false,
            quit: false,
            randomize: false,
            threaded: false,
            board_type: BoardType::Normal,
            cell_cap: 1,
        }
    }
}

/// Occupancy-mask capacity for a piece count, `None` past the widest mask.
pub fn mask_capacity(pieces: usize) -> Option<usize> {
    match pieces {
        0..=32 => Some(32),
        33..=64 => Some(64),
        65..=128 => Some(128),
        129..=256 => Some(256),
        257..=512 => Some(512),
        _ => None,
    }
}

/// Per-cell edge field width for a color count, `None` past the widest
/// class. The top color of each class is reserved as the wildcard, so a
/// class must be strictly wider than the colors in play.
pub fn edge_bits_for(colors: u64) -> Option<u32> {
    match colors {
        0..=7 => Some(3),
        8..=15 => Some(4),
        16..=31 => Some(5),
        _ => None,
    }
}

/// Select capacities and solve. Returns the total solution count.
pub fn run(board_width: u32, board_height: u32, pieces: &[Piece], opts: &RunOptions) -> Result<u64, SolveError> {
    match mask_capacity(pieces.len()).ok_or(SolveError::TooManyPieces)? {
        32 => run_with_mask::<u32>(board_width, board_height, pieces, opts),
        64 => run_with_mask::<u64>(board_width, board_height, pieces, opts),
        128 => run_with_mask::<u128>(board_width, board_height, pieces, opts),
        256 => run_with_mask::<Mask256>(board_width, board_height, pieces, opts),
        _ => run_with_mask::<Mask512>(board_width, board_height, pieces, opts),
    }
}

fn run_with_mask<M: PieceMask>(
    board_width: u32,
    board_height: u32,
    pieces: &[Piece],
    opts: &RunOptions,
) -> Result<u64, SolveError> {
    let edge_bits = edge_bits_for(color_count(pieces)).ok_or(SolveError::TooManyEdges)?;

    let len_max = board_width.max(board_height);
    let len_min = board_width.min(board_height);
    let square = len_max == len_min;

    // each rung needs the previous one, a board divisible by the new tile
    // size, and headroom under the user's cap
    let cap = opts.cell_cap;
    let need_2 = len_max >= 4 && len_max % 2 == 0 && cap >= 2;
    let need_4 = need_2 && len_min >= 4 && len_min % 2 == 0 && cap >= 4;
    let need_8 = need_4 && len_max >= 8 && len_max % 4 == 0 && cap >= 8;
    let need_16 = need_8 && len_min >= 8 && len_min % 4 == 0 && cap >= 16;
    let need_32 = need_16 && len_max >= 16 && len_max % 8 == 0 && cap >= 32;

    let threaded = opts.threaded;
    let shape_1x1 = TileShape::new(edge_bits, 1, 1);

    let mut tiles_1x1: TileStore<M, DenseBuckets> = TileStore::new(shape_1x1);
    generate_rotations(pieces, &mut tiles_1x1);
    println!("1x1: {} rotations", tiles_1x1.len());

    let mut tiles_1x2: TileStore<M, SparseBuckets> = TileStore::new(shape_1x1.stacked());
    let mut tiles_2x1: TileStore<M, SparseBuckets> = TileStore::new(shape_1x1.paired());
    let mut tiles_2x2: TileStore<M, SparseBuckets> = TileStore::new(shape_1x1.stacked().paired());
    let shape_2x2 = tiles_2x2.shape();
    let mut tiles_2x4: TileStore<M, MappedBuckets> = TileStore::new(shape_2x2.stacked());
    let mut tiles_4x2: TileStore<M, MappedBuckets> = TileStore::new(shape_2x2.paired());
    let shape_4x4 = shape_2x2.stacked().paired();
    let mut tiles_4x4: TileStore<M, MappedBuckets> = TileStore::new(shape_4x4);
    let mut tiles_4x8: TileStore<M, MappedBuckets> = TileStore::new(shape_4x4.stacked());
    let mut tiles_8x4: TileStore<M, MappedBuckets> = TileStore::new(shape_4x4.paired());

    if need_2 {
        compose(Axis::Vertical, &tiles_1x1, &mut tiles_1x2, threaded);
        println!("1x2: {} rotations", tiles_1x2.len());
    }
    if need_2 && !need_4 && !square {
        compose(Axis::Horizontal, &tiles_1x1, &mut tiles_2x1, threaded);
        println!("2x1: {} rotations", tiles_2x1.len());
    }
    if need_4 {
        compose(Axis::Horizontal, &tiles_1x2, &mut tiles_2x2, threaded);
        println!("2x2: {} rotations", tiles_2x2.len());
    }
    if need_8 {
        compose(Axis::Vertical, &tiles_2x2, &mut tiles_2x4, threaded);
        println!("2x4: {} rotations", tiles_2x4.len());
    }
    if need_8 && !need_16 && !square {
        compose(Axis::Horizontal, &tiles_2x2, &mut tiles_4x2, threaded);
        println!("4x2: {} rotations", tiles_4x2.len());
    }
    if need_16 {
        compose(Axis::Horizontal, &tiles_2x4, &mut tiles_4x4, threaded);
        println!("4x4: {} rotations", tiles_4x4.len());
    }
    if need_32 {
        compose(Axis::Vertical, &tiles_4x4, &mut tiles_4x8, threaded);
        println!("4x8: {} rotations", tiles_4x8.len());
    }
    if need_32 && !square {
        compose(Axis::Horizontal, &tiles_4x4, &mut tiles_8x4, threaded);
        println!("8x4: {} rotations", tiles_8x4.len());
    }

    if opts.randomize {
        println!("randomizing...");
        let mut rng = entropy_rng();
        if !tiles_4x8.is_empty() {
            tiles_4x8.randomize(&mut rng);
            tiles_8x4.randomize(&mut rng);
        } else if !tiles_4x4.is_empty() {
            tiles_4x4.randomize(&mut rng);
        } else if !tiles_2x4.is_empty() {
            tiles_2x4.randomize(&mut rng);
            tiles_4x2.randomize(&mut rng);
        } else if !tiles_2x2.is_empty() {
            tiles_2x2.randomize(&mut rng);
        } else if !tiles_1x2.is_empty() {
            tiles_1x2.randomize(&mut rng);
            tiles_2x1.randomize(&mut rng);
        } else {
            tiles_1x1.randomize(&mut rng);
        }
    }

    println!("solving...");
    let started = Instant::now();

    let solve = SolveOptions { print: opts.print, quit: opts.quit, threaded };
    let ctl = SolveCtl::new();
    let board = opts.board_type;

    let solutions = if !tiles_4x8.is_empty() {
        solve_final(&tiles_4x8, Some(&tiles_8x4), len_min, len_max, board, solve, &ctl)
    } else if !tiles_4x4.is_empty() {
        solve_final(&tiles_4x4, None, len_min, len_max, board, solve, &ctl)
    } else if !tiles_2x4.is_empty() {
        solve_final(&tiles_2x4, Some(&tiles_4x2), len_min, len_max, board, solve, &ctl)
    } else if !tiles_2x2.is_empty() {
        solve_final(&tiles_2x2, None, len_min, len_max, board, solve, &ctl)
    } else if !tiles_1x2.is_empty() {
        solve_final(&tiles_1x2, Some(&tiles_2x1), len_min, len_max, board, solve, &ctl)
    } else {
        solve_final(&tiles_1x1, None, len_min, len_max, board, solve, &ctl)
    };

    println!("found {} solutions in {} ms", solutions, started.elapsed().as_millis());
    Ok(solutions)
}

/// Solve the (min, max) orientation and, for non-square boards, the
/// transposed orientation as well. Fixing the first corner piece's rotation
/// splits the solution classes between the two orientations, so both counts
/// belong to the same puzzle.
fn solve_final<M: PieceMask, B: Buckets>(
    store: &TileStore<M, B>,
    transposed: Option<&TileStore<M, B>>,
    len_min: u32,
    len_max: u32,
    board_type: BoardType,
    opts: SolveOptions,
    ctl: &SolveCtl,
) -> u64 {
    let shape = store.shape();
    let mut total = solve_board(
        store,
        len_min / shape.cols,
        len_max / shape.rows,
        board_type,
        opts,
        ctl,
    );

    if len_min != len_max {
        let flipped = transposed.unwrap_or(store);
        let fshape = flipped.shape();
        total += solve_board(
            flipped,
            len_max / fshape.cols,
            len_min / fshape.rows,
            board_type,
            opts,
            ctl,
        );
    }

    total
}

/// Entropy-seeded generator for bucket randomization. A stretch of early
/// output is discarded so bucket order does not correlate with the raw seed
/// material.
fn entropy_rng() -> StdRng {
    let mut rng = StdRng::from_entropy();
    for _ in 0..750_000 {
        rng.next_u64();
    }
    rng
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_capacity_promotes_at_each_boundary() {
        assert_eq!(mask_capacity(1), Some(32));
        assert_eq!(mask_capacity(32), Some(32));
        assert_eq!(mask_capacity(33), Some(64));
        assert_eq!(mask_capacity(64), Some(64));
        assert_eq!(mask_capacity(65), Some(128));
        assert_eq!(mask_capacity(128), Some(128));
        assert_eq!(mask_capacity(129), Some(256));
        assert_eq!(mask_capacity(256), Some(256));
        assert_eq!(mask_capacity(257), Some(512));
        assert_eq!(mask_capacity(512), Some(512));
        assert_eq!(mask_capacity(513), None);
    }

    #[test]
    fn edge_class_reserves_the_wildcard_color() {
        // highest color 6 fits the 8-color class; 7 would collide with the
        // 3-bit wildcard and promotes
        assert_eq!(edge_bits_for(7), Some(3));
        assert_eq!(edge_bits_for(8), Some(4));
        assert_eq!(edge_bits_for(16), Some(5));
        assert_eq!(edge_bits_for(31), Some(5));
        assert_eq!(edge_bits_for(32), None);
    }
}
