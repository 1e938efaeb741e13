//! The placement grid.
//!
//! Cells live in one arena, column-major, with slot 0 reserved as a shared
//! sentinel: off-board neighbour links and the end of the traversal order
//! both point at it. Neighbour updates write into the sentinel harmlessly
//! and the traversal check compares the link value only, so the hot loop has
//! no bounds branches. All links are arena indices, which makes the per-task
//! deep copy of a grid an ordinary `clone()`.

use super::shape::TileShape;
use super::tile::TileId;

/// Arena slot of the sentinel cell.
pub const SENTINEL: u32 = 0;
const _: [(); 1] = [(); (SENTINEL == 0) as usize];

/// Arena slot of the first cell in traversal order.
pub const FIRST_CELL: u32 = 1;

/// Which board sides are physical borders.
///
/// The numbering used on the command line maps the nine partial contexts to
/// the numeric keypad (1 = bottom-left corner .. 9 = top-right corner, 5 =
/// no borders); `Normal` closes all four sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardType {
    Normal,
    TopLeftCorner,
    TopEdge,
    TopRightCorner,
    LeftEdge,
    Middle,
    RightEdge,
    BottomLeftCorner,
    BottomEdge,
    BottomRightCorner,
}

impl BoardType {
    /// The nine partial-border contexts a super-tile can be used in.
    pub const EDGE_CONTEXTS: [BoardType; 9] = [
        BoardType::TopLeftCorner,
        BoardType::TopEdge,
        BoardType::TopRightCorner,
        BoardType::LeftEdge,
        BoardType::Middle,
        BoardType::RightEdge,
        BoardType::BottomLeftCorner,
        BoardType::BottomEdge,
        BoardType::BottomRightCorner,
    ];

    /// (left, top, right, bottom) border sides of this board type.
    pub const fn borders(self) -> (bool, bool, bool, bool) {
        match self {
            BoardType::Normal => (true, true, true, true),
            BoardType::TopLeftCorner => (true, true, false, false),
            BoardType::TopEdge => (false, true, false, false),
            BoardType::TopRightCorner => (false, true, true, false),
            BoardType::LeftEdge => (true, false, false, false),
            BoardType::Middle => (false, false, false, false),
            BoardType::RightEdge => (false, false, true, false),
            BoardType::BottomLeftCorner => (true, false, false, true),
            BoardType::BottomEdge => (false, false, false, true),
            BoardType::BottomRightCorner => (false, false, true, true),
        }
    }
}

/// One placement cell.
#[derive(Clone, Copy, Debug)]
pub struct Cell {
    /// Current lookup key; left/top fields evolve as neighbours are placed.
    pub key: u64,
    /// Tile placed here, or `TileId::NONE`.
    pub tile: TileId,
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    /// Previous cell in column-major traversal order.
    pub prev: u32,
    /// Next cell in column-major traversal order; `SENTINEL` past the end.
    pub next: u32,
}

const EMPTY_CELL: Cell = Cell {
    key: 0,
    tile: TileId::NONE,
    left: SENTINEL,
    top: SENTINEL,
    right: SENTINEL,
    bottom: SENTINEL,
    prev: SENTINEL,
    next: SENTINEL,
};

/// Column-major placement grid over one tile shape.
#[derive(Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    shape: TileShape,
    // key-field masks cached for the placement hot path
    left_mask: u64,
    top_mask: u64,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: u32, height: u32, shape: TileShape) -> Self {
        let count = (width * height) as usize;
        let mut grid = Self {
            width,
            height,
            shape,
            left_mask: shape.left_mask(),
            top_mask: shape.top_mask(),
            cells: vec![EMPTY_CELL; count + 1],
        };

        for x in 0..width {
            for y in 0..height {
                let idx = grid.index(x, y) as usize;
                let cell = &mut grid.cells[idx];
                cell.left = if x > 0 { grid_index(height, x - 1, y) } else { SENTINEL };
                cell.top = if y > 0 { grid_index(height, x, y - 1) } else { SENTINEL };
                cell.right = if x + 1 < width { grid_index(height, x + 1, y) } else { SENTINEL };
                cell.bottom = if y + 1 < height { grid_index(height, x, y + 1) } else { SENTINEL };
            }
        }

        // storage order doubles as column-major traversal order
        for i in FIRST_CELL..=count as u32 {
            grid.cells[i as usize].prev = if i > FIRST_CELL { i - 1 } else { SENTINEL };
            grid.cells[i as usize].next = if i < count as u32 { i + 1 } else { SENTINEL };
        }

        grid.set_border(BoardType::Normal);
        grid
    }

    #[inline(always)]
    fn index(&self, x: u32, y: u32) -> u32 {
        grid_index(self.height, x, y)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn shape(&self) -> TileShape {
        self.shape
    }

    pub fn cell_count(&self) -> u32 {
        self.width * self.height
    }

    #[inline(always)]
    pub fn cell(&self, idx: u32) -> &Cell {
        &self.cells[idx as usize]
    }

    #[inline(always)]
    pub fn key(&self, idx: u32) -> u64 {
        self.cells[idx as usize].key
    }

    #[inline(always)]
    pub fn tile_at(&self, idx: u32) -> TileId {
        self.cells[idx as usize].tile
    }

    /// Cell indices in traversal order.
    pub fn traversal(&self) -> impl Iterator<Item = u32> {
        FIRST_CELL..=self.cell_count()
    }

    /// Seed every cell's key for the given border policy. Border sides get
    /// pattern 0, open sides the wildcard pattern; the right/bottom flags
    /// never change afterwards, left/top fields evolve as tiles are placed.
    pub fn set_border(&mut self, ty: BoardType) {
        let (left, top, right, bottom) = ty.borders();
        let shape = self.shape;

        for x in 0..self.width {
            for y in 0..self.height {
                let mut key = 0;
                if !(x == 0 && left) {
                    key |= shape.left_mask();
                }
                if !(y == 0 && top) {
                    key |= shape.top_mask();
                }
                if !(x == self.width - 1 && right) {
                    key |= shape.right_flag();
                }
                if !(y == self.height - 1 && bottom) {
                    key |= shape.bottom_flag();
                }
                let idx = self.index(x, y) as usize;
                self.cells[idx].key = key;
                self.cells[idx].tile = TileId::NONE;
            }
        }
    }

    /// Place a tile: record it and forward its right/bottom patterns into
    /// the neighbouring cells' keys. Returns the next cell in traversal
    /// order (`SENTINEL` when the board is now full). Nothing is undone on
    /// backtrack; the next placement at this cell overwrites the same
    /// fields, and a stale neighbour key is never read before then.
    #[inline(always)]
    pub fn place(&mut self, idx: u32, id: TileId, exits: u64) -> u32 {
        let (right, bottom, next) = {
            let cell = &mut self.cells[idx as usize];
            cell.tile = id;
            (cell.right as usize, cell.bottom as usize, cell.next)
        };

        let rkey = &mut self.cells[right].key;
        *rkey = (*rkey & !self.left_mask) | (exits & self.left_mask);
        let bkey = &mut self.cells[bottom].key;
        *bkey = (*bkey & !self.top_mask) | (exits & self.top_mask);

        next
    }
}

#[inline(always)]
fn grid_index(height: u32, x: u32, y: u32) -> u32 {
    FIRST_CELL + x * height + y
}
