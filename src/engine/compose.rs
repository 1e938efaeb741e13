//! Pre-composition boards: fusing tiles into larger super-tiles.
//!
//! A vertical board is a 1x2 grid, a horizontal board a 2x1 grid. Running
//! the solver over one of them with an input store enumerates every valid
//! adjacent pair; each filled board fuses into a single super-tile whose
//! outer edge patterns concatenate the pair's outer edges (first cell in the
//! low bits), whose inner matched edge disappears, and whose occupancy is
//! the union of the pair's. Solving all nine partial-border contexts
//! materializes every corner/edge/middle role the super-tile can later play.
//!
//! Evaluating one super-tile placement later costs the same as one small
//! placement but covers twice the cells, which is the whole point; the
//! price is store growth, which the driver caps.

use rayon::prelude::*;

use super::grid::{BoardType, Grid, FIRST_CELL};
use super::mask::PieceMask;
use super::shape::TileShape;
use super::solver::{Sink, SolveCtl, Solver};
use super::store::{Buckets, TileStore};
use super::tile::Tile;

/// Direction a pair of tiles is joined in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// 1x2 board: second cell below the first.
    Vertical,
    /// 2x1 board: second cell right of the first.
    Horizontal,
}

impl Axis {
    const fn board_dims(self) -> (u32, u32) {
        match self {
            Axis::Vertical => (1, 2),
            Axis::Horizontal => (2, 1),
        }
    }

    pub const fn output_shape(self, input: TileShape) -> TileShape {
        match self {
            Axis::Vertical => input.stacked(),
            Axis::Horizontal => input.paired(),
        }
    }
}

/// Fuse a valid adjacent pair into one super-tile. `first` is the top
/// (vertical) or left (horizontal) tile and lands in the low pattern bits.
pub fn fuse<M: PieceMask>(axis: Axis, input: TileShape, first: &Tile<M>, second: &Tile<M>) -> Tile<M> {
    let output = axis.output_shape(input);
    let pieces = first.pieces.union(second.pieces);
    match axis {
        Axis::Vertical => Tile::from_edges(
            output,
            (second.left(input) << input.left_bits()) | first.left(input),
            first.top(input),
            (second.right(input) << input.left_bits()) | first.right(input),
            second.bottom(input),
            pieces,
        ),
        Axis::Horizontal => Tile::from_edges(
            output,
            first.left(input),
            (second.top(input) << input.top_bits()) | first.top(input),
            second.right(input),
            (second.bottom(input) << input.top_bits()) | first.bottom(input),
            pieces,
        ),
    }
}

/// Collects fused pairs while the solver fills the two-cell board.
struct FuseSink<'a, M, B> {
    input: &'a TileStore<M, B>,
    axis: Axis,
    fused: Vec<Tile<M>>,
}

impl<M: PieceMask, B: Buckets> Sink<M> for FuseSink<'_, M, B> {
    fn complete(&mut self, grid: &Grid, _ctl: &SolveCtl) {
        let first = self.input.tile(grid.tile_at(FIRST_CELL));
        let second = self.input.tile(grid.tile_at(FIRST_CELL + 1));
        self.fused.push(fuse(self.axis, self.input.shape(), first, second));
    }
}

/// Run the pre-composition board over every border context, inserting all
/// fused super-tiles into `output`. Threaded runs fan out one context per
/// task; results are inserted in context order either way, so the output
/// store's contents do not depend on threading.
pub fn compose<M, BI, BO>(
    axis: Axis,
    input: &TileStore<M, BI>,
    output: &mut TileStore<M, BO>,
    threaded: bool,
) where
    M: PieceMask,
    BI: Buckets,
    BO: Buckets,
{
    debug_assert_eq!(output.shape(), axis.output_shape(input.shape()));
    let (width, height) = axis.board_dims();
    let ctl = SolveCtl::new();

    let run_context = |ty: BoardType| {
        let mut grid = Grid::new(width, height, input.shape());
        grid.set_border(ty);
        let sink = FuseSink { input, axis, fused: Vec::new() };
        let mut solver = Solver::new(grid, input, sink);
        solver.run(&ctl);
        solver.sink.fused
    };

    let batches: Vec<Vec<Tile<M>>> = if threaded {
        BoardType::EDGE_CONTEXTS.into_par_iter().map(run_context).collect()
    } else {
        BoardType::EDGE_CONTEXTS.into_iter().map(run_context).collect()
    };

    for batch in batches {
        output.insert_all(batch);
    }
}

#[cfg(test)]
mod tests {
    use super::super::store::{DenseBuckets, SparseBuckets};
    use super::*;

    #[test]
    fn vertical_fusion_concatenates_with_the_top_tile_low() {
        let input = TileShape::new(3, 1, 1);
        let top = Tile::<u32>::from_edges(input, 1, 2, 3, 5, 0b01);
        let bottom = Tile::<u32>::from_edges(input, 4, 5, 6, 2, 0b10);

        let out = fuse(Axis::Vertical, input, &top, &bottom);
        let shape = input.stacked();
        assert_eq!(out.left(shape), (4 << 3) | 1);
        assert_eq!(out.top(shape), 2);
        assert_eq!(out.right(shape), (6 << 3) | 3);
        assert_eq!(out.bottom(shape), 2);
        assert_eq!(out.pieces, 0b11);
    }

    #[test]
    fn horizontal_fusion_concatenates_with_the_left_tile_low() {
        let input = TileShape::new(3, 1, 1);
        let left = Tile::<u32>::from_edges(input, 1, 2, 3, 5, 0b01);
        let right = Tile::<u32>::from_edges(input, 3, 4, 6, 1, 0b10);

        let out = fuse(Axis::Horizontal, input, &left, &right);
        let shape = input.paired();
        assert_eq!(out.left(shape), 1);
        assert_eq!(out.top(shape), (4 << 3) | 2);
        assert_eq!(out.right(shape), 6);
        assert_eq!(out.bottom(shape), (1 << 3) | 5);
        assert_eq!(out.pieces, 0b11);
    }

    #[test]
    fn threading_does_not_change_the_composed_store() {
        use crate::pieces::{generate_rotations, Piece};

        let pieces = [
            Piece::new(0, 0, 1, 2),
            Piece::new(1, 0, 2, 3),
            Piece::new(2, 0, 1, 3),
            Piece::new(1, 0, 0, 1),
        ];
        let mut input: TileStore<u32, DenseBuckets> = TileStore::new(TileShape::new(3, 1, 1));
        generate_rotations(&pieces, &mut input);

        let mut serial: TileStore<u32, SparseBuckets> = TileStore::new(input.shape().stacked());
        let mut parallel: TileStore<u32, SparseBuckets> = TileStore::new(input.shape().stacked());
        compose(Axis::Vertical, &input, &mut serial, false);
        compose(Axis::Vertical, &input, &mut parallel, true);

        assert_eq!(serial.len(), parallel.len());
        for id in 0..serial.len() as u32 {
            let id = super::super::tile::TileId(id);
            assert_eq!(serial.tile(id).entries, parallel.tile(id).entries);
            assert_eq!(serial.tile(id).exits, parallel.tile(id).exits);
        }
    }
}
