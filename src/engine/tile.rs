//! Packed super-tile rotations.
//!
//! A tile stores its four edge patterns as two words in the shared key
//! layout: `exits` holds (right, bottom), `entries` holds (left, top). The
//! right/bottom pair sits in the same bit positions as the left/top pair of
//! a lookup key, so placing a tile forwards its exits straight into the
//! neighbouring cells' keys with one mask each. Tiles live in their store's
//! arena and are addressed by index.

use super::mask::PieceMask;
use super::shape::TileShape;

/// Identifier of a tile within its store's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileId(pub u32);

impl TileId {
    /// Marker for an empty placement.
    pub const NONE: TileId = TileId(u32::MAX);

    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One rotation of a super-tile.
#[derive(Clone, Copy, Debug)]
pub struct Tile<M> {
    /// Right and bottom edge patterns, packed as (right, bottom).
    pub exits: u64,
    /// Left and top edge patterns, packed as (left, top).
    pub entries: u64,
    /// Which input pieces make up this tile.
    pub pieces: M,
    /// Tie-breaker for randomized bucket order.
    pub random: u64,
}

impl<M: PieceMask> Tile<M> {
    pub fn from_edges(shape: TileShape, left: u64, top: u64, right: u64, bottom: u64, pieces: M) -> Self {
        debug_assert!(left <= shape.left_mask() && right <= shape.left_mask());
        debug_assert!(top >> shape.top_bits() == 0 && bottom >> shape.top_bits() == 0);
        Self {
            exits: shape.pack(right, bottom),
            entries: shape.pack(left, top),
            pieces,
            random: 0,
        }
    }

    #[inline(always)]
    pub fn left(&self, shape: TileShape) -> u64 {
        shape.left_of(self.entries)
    }

    #[inline(always)]
    pub fn top(&self, shape: TileShape) -> u64 {
        shape.top_of(self.entries)
    }

    #[inline(always)]
    pub fn right(&self, shape: TileShape) -> u64 {
        shape.left_of(self.exits)
    }

    #[inline(always)]
    pub fn bottom(&self, shape: TileShape) -> u64 {
        shape.top_of(self.exits)
    }

    /// The key this tile is found under when both of a cell's constraints
    /// are literal: its own left/top patterns plus the non-border flags for
    /// its right and bottom edges.
    pub fn self_key(&self, shape: TileShape) -> u64 {
        let mut key = self.entries;
        if self.right(shape) != 0 {
            key |= shape.right_flag();
        }
        if self.bottom(shape) != 0 {
            key |= shape.bottom_flag();
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_round_trip_through_packed_words() {
        let shape = TileShape::new(4, 2, 2);
        let tile = Tile::<u32>::from_edges(shape, 0xA7, 0x3C, 0x51, 0xE2, 0b1);
        assert_eq!(tile.left(shape), 0xA7);
        assert_eq!(tile.top(shape), 0x3C);
        assert_eq!(tile.right(shape), 0x51);
        assert_eq!(tile.bottom(shape), 0xE2);
    }

    #[test]
    fn self_key_flags_follow_border_edges() {
        let shape = TileShape::new(3, 1, 1);

        let interior = Tile::<u32>::from_edges(shape, 1, 2, 3, 4, 0b1);
        assert_eq!(
            interior.self_key(shape),
            shape.pack(1, 2) | shape.right_flag() | shape.bottom_flag()
        );

        let corner = Tile::<u32>::from_edges(shape, 1, 2, 0, 0, 0b1);
        assert_eq!(corner.self_key(shape), shape.pack(1, 2));
    }
}
