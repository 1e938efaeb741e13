//! Input pieces: file loading and initial rotation generation.
//!
//! The pieces file is plain text, one piece per line, four whitespace
//! separated edge colors `<left> <top> <right> <bottom>`. Lines starting
//! with `/` are comments; lines shorter than seven characters are noise and
//! skipped, as is any line yielding fewer than four integers.
//!
//! From each piece the four rotations are generated, canonically sorted,
//! and thinned to avoid counting whole-board symmetries twice: the first
//! corner piece keeps only its top-left rotation and thereby pins the
//! board's orientation; later corners keep the other three; fully symmetric
//! pieces keep one rotation, two-fold symmetric pieces keep two.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::engine::mask::PieceMask;
use crate::engine::store::{Buckets, TileStore};
use crate::engine::tile::Tile;

/// One input piece, colors as loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    pub left: u64,
    pub top: u64,
    pub right: u64,
    pub bottom: u64,
}

impl Piece {
    pub const fn new(left: u64, top: u64, right: u64, bottom: u64) -> Self {
        Self { left, top, right, bottom }
    }
}

/// Load pieces from a file. Piece indices follow file order.
pub fn load_pieces(path: &Path) -> io::Result<Vec<Piece>> {
    let file = File::open(path)?;
    let mut pieces = Vec::new();

    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.len() < 7 || line.starts_with('/') {
            continue;
        }

        let mut edges = [0u64; 4];
        let mut count = 0;
        for token in line.split_whitespace() {
            match token.parse::<u64>() {
                Ok(value) => {
                    if count < 4 {
                        edges[count] = value;
                    }
                    count += 1;
                }
                Err(_) => break,
            }
        }

        if count >= 4 {
            pieces.push(Piece::new(edges[0], edges[1], edges[2], edges[3]));
        }
    }

    Ok(pieces)
}

/// Number of edge colors in play: one past the highest color used.
pub fn color_count(pieces: &[Piece]) -> u64 {
    let mut highest = 0;
    for p in pieces {
        highest = highest.max(p.left).max(p.top).max(p.right).max(p.bottom);
    }
    highest + 1
}

/// Generate the thinned 1x1 rotation set into `store`.
pub fn generate_rotations<M: PieceMask, B: Buckets>(pieces: &[Piece], store: &mut TileStore<M, B>) {
    let shape = store.shape();
    debug_assert_eq!((shape.cols, shape.rows), (1, 1));

    let mut corners = 0u32;
    for (num, piece) in pieces.iter().enumerate() {
        let edges = [piece.left, piece.top, piece.right, piece.bottom];
        let mut owner = M::default();
        owner.set(num);

        // the quarter-turn cycle walks the edge tuple one step per rotation
        let mut rotations: Vec<Tile<M>> = (0..4)
            .map(|k| {
                Tile::from_edges(
                    shape,
                    edges[k],
                    edges[(k + 3) % 4],
                    edges[(k + 2) % 4],
                    edges[(k + 1) % 4],
                    owner,
                )
            })
            .collect();
        rotations.sort_by_key(|t| (t.entries, t.exits));

        let first = rotations[0];
        if first.left(shape) == 0 && first.top(shape) == 0 {
            // corner piece: the very first one pins the board orientation
            if corners == 0 {
                store.insert(first);
            } else {
                store.insert_all(rotations[1..4].iter().copied());
            }
            corners += 1;
        } else if first.left(shape) == first.right(shape) && first.top(shape) == first.bottom(shape) {
            if first.left(shape) == first.top(shape) {
                store.insert(first);
            } else {
                store.insert_all(rotations[0..2].iter().copied());
            }
        } else {
            store.insert_all(rotations);
        }
    }
}
