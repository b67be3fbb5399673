/// Horizontal flip flag, bit 31 of a gid.
pub const FLIP_H: u32 = 0x8000_0000;
/// Vertical flip flag, bit 30.
pub const FLIP_V: u32 = 0x4000_0000;
/// Diagonal flip flag, bit 29.
pub const FLIP_D: u32 = 0x2000_0000;
/// Tile id bits left once the flip flags are removed.
pub const GID_MASK: u32 = 0x1FFF_FFFF;

/// A tile reference as found in layer data. Zero means "no tile".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId(pub u32);

impl TileId {
    /// Gid with the flip flags masked off.
    #[inline] pub fn clean(self) -> u32 { self.0 & GID_MASK }
    /// True for the empty cell, flipped or not.
    #[inline] pub fn is_empty(self) -> bool { self.clean() == 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_strips_flip_flags() {
        assert_eq!(TileId(5 | FLIP_H | FLIP_D).clean(), 5);
        assert_eq!(TileId(GID_MASK | FLIP_V).clean(), GID_MASK);
    }

    #[test]
    fn flipped_zero_is_still_empty() {
        assert!(TileId(0).is_empty());
        assert!(TileId(FLIP_V).is_empty());
        assert!(!TileId(1).is_empty());
    }
}
