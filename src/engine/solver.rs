//! The backtracking placement search.
//!
//! `Solver` walks the grid in traversal order: look the current cell's key
//! up in the store, try every candidate whose pieces are still free, forward
//! its exit patterns, recurse. Completions are delivered to a `Sink`, which
//! is what lets the final solve (count, print, maybe stop) and the
//! pre-composition boards (fuse two tiles into one) share the recursion.
//!
//! Threaded solving fans out over the candidates of the first cell: each
//! task owns a deep copy of the grid and a local solution counter, summed
//! when the pool drains. The only cross-task state is the stop flag and the
//! print lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use rayon::prelude::*;

use super::grid::{BoardType, Grid, FIRST_CELL, SENTINEL};
use super::mask::PieceMask;
use super::store::{Buckets, TileStore};
use super::tile::Tile;

/// Whole solutions print as one block under this lock.
static PRINT_LOCK: Mutex<()> = Mutex::new(());

/// Shared controls for one solve, across boards and worker tasks.
#[derive(Default)]
pub struct SolveCtl {
    stop: AtomicBool,
}

impl SolveCtl {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// Receives every filled board the search reaches.
pub trait Sink<M: PieceMask> {
    fn complete(&mut self, grid: &Grid, ctl: &SolveCtl);
}

/// The recursion, generic over its completion sink.
pub struct Solver<'a, M, B, S> {
    pub grid: Grid,
    pub store: &'a TileStore<M, B>,
    pub sink: S,
}

impl<'a, M: PieceMask, B: Buckets, S: Sink<M>> Solver<'a, M, B, S> {
    pub fn new(grid: Grid, store: &'a TileStore<M, B>, sink: S) -> Self {
        Self { grid, store, sink }
    }

    /// Search the whole grid from the first cell.
    pub fn run(&mut self, ctl: &SolveCtl) {
        self.descend(FIRST_CELL, M::default(), ctl);
    }

    /// Search from `idx` with `used` marking the pieces already placed.
    pub fn descend(&mut self, idx: u32, used: M, ctl: &SolveCtl) {
        if ctl.stopped() {
            return;
        }

        let bucket = self.store.lookup(self.grid.key(idx));
        for &id in bucket {
            let tile = self.store.tile(id);
            if used.intersects(tile.pieces) {
                continue;
            }

            let next = self.grid.place(idx, id, tile.exits);
            if next != SENTINEL {
                self.descend(next, used.union(tile.pieces), ctl);
                if ctl.stopped() {
                    return;
                }
            } else {
                self.sink.complete(&self.grid, ctl);
                if ctl.stopped() {
                    return;
                }
            }
        }
    }
}

/// Sink for the final solve: counts, optionally prints, optionally stops.
pub struct CountSink<'a, M, B> {
    store: &'a TileStore<M, B>,
    pub solutions: u64,
    print: bool,
    quit: bool,
}

impl<'a, M: PieceMask, B: Buckets> CountSink<'a, M, B> {
    pub fn new(store: &'a TileStore<M, B>, print: bool, quit: bool) -> Self {
        Self { store, solutions: 0, print, quit }
    }
}

impl<M: PieceMask, B: Buckets> Sink<M> for CountSink<'_, M, B> {
    fn complete(&mut self, grid: &Grid, ctl: &SolveCtl) {
        if self.print {
            let _guard = PRINT_LOCK.lock().unwrap();
            // re-check under the lock so quit-on-first prints exactly once
            if ctl.stopped() {
                return;
            }
            for idx in grid.traversal() {
                print_tile_line(self.store.tile(grid.tile_at(idx)));
            }
            println!();
        }
        self.solutions += 1;
        if self.quit {
            ctl.request_stop();
        }
    }
}

/// One line per placed tile: the 1-based numbers of its pieces.
fn print_tile_line<M: PieceMask>(tile: &Tile<M>) {
    let mut line = String::from("[ ");
    tile.pieces.for_each_set(|bit| {
        line.push_str(&(bit + 1).to_string());
        line.push(' ');
    });
    line.push(']');
    println!("{line}");
}

/// Options for a final board solve.
#[derive(Clone, Copy, Debug, Default)]
pub struct SolveOptions {
    pub print: bool,
    pub quit: bool,
    pub threaded: bool,
}

/// Solve one board and return its solution count.
pub fn solve_board<M: PieceMask, B: Buckets>(
    store: &TileStore<M, B>,
    width: u32,
    height: u32,
    board_type: BoardType,
    opts: SolveOptions,
    ctl: &SolveCtl,
) -> u64 {
    let mut grid = Grid::new(width, height, store.shape());
    grid.set_border(board_type);

    if !opts.threaded {
        let mut solver = Solver::new(grid, store, CountSink::new(store, opts.print, opts.quit));
        solver.run(ctl);
        return solver.sink.solutions;
    }

    // fan out per candidate at the first cell; every task gets its own grid
    let candidates: Vec<_> = store.lookup(grid.key(FIRST_CELL)).to_vec();
    candidates
        .into_par_iter()
        .map(|id| {
            if ctl.stopped() {
                return 0;
            }
            let tile = *store.tile(id);
            let mut solver =
                Solver::new(grid.clone(), store, CountSink::new(store, opts.print, opts.quit));
            let next = solver.grid.place(FIRST_CELL, id, tile.exits);
            if next != SENTINEL {
                solver.descend(next, tile.pieces, ctl);
            } else {
                solver.sink.complete(&solver.grid, ctl);
            }
            solver.sink.solutions
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::super::shape::TileShape;
    use super::super::store::DenseBuckets;
    use super::*;
    use crate::pieces::{generate_rotations, Piece};

    fn four_corner_store() -> TileStore<u32, DenseBuckets> {
        // four identical corner pieces; the first fixes the orientation
        let pieces = vec![Piece::new(0, 0, 1, 1); 4];
        let mut store = TileStore::new(TileShape::new(3, 1, 1));
        generate_rotations(&pieces, &mut store);
        store
    }

    #[test]
    fn four_identical_corners_fill_a_2x2_board() {
        let store = four_corner_store();
        // one rotation for the first corner, three for each of the rest
        assert_eq!(store.len(), 10);

        let ctl = SolveCtl::new();
        let opts = SolveOptions::default();
        // fixed top-left piece, then 3 * 2 * 1 ways to rotate the others in
        assert_eq!(solve_board(&store, 2, 2, BoardType::Normal, opts, &ctl), 6);
    }

    #[test]
    fn threaded_and_serial_counts_agree() {
        let store = four_corner_store();
        let ctl = SolveCtl::new();
        let threaded = SolveOptions { threaded: true, ..Default::default() };
        assert_eq!(solve_board(&store, 2, 2, BoardType::Normal, threaded, &ctl), 6);
    }

    #[test]
    fn all_zero_pieces_cannot_fill_an_interior() {
        // interior sides demand a non-border edge, which all-zero tiles
        // never have
        let pieces = vec![Piece::new(0, 0, 0, 0); 4];
        let mut store: TileStore<u32, DenseBuckets> = TileStore::new(TileShape::new(3, 1, 1));
        generate_rotations(&pieces, &mut store);

        let ctl = SolveCtl::new();
        let opts = SolveOptions::default();
        assert_eq!(solve_board(&store, 2, 2, BoardType::Normal, opts, &ctl), 0);
    }

    #[test]
    fn quit_on_first_stops_after_one_solution() {
        let store = four_corner_store();
        let ctl = SolveCtl::new();
        let opts = SolveOptions { quit: true, ..Default::default() };
        assert_eq!(solve_board(&store, 2, 2, BoardType::Normal, opts, &ctl), 1);
        assert!(ctl.stopped());
    }
}
