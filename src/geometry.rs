use crate::ir_map::{MapObject, ObjectGroup, Offset, Tileset};

/// Pixel rectangle of a tile image inside its tileset texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRect {
    /// Left edge in the texture.
    pub x: u32,
    /// Top edge in the texture.
    pub y: u32,
    /// Tile width.
    pub w: u32,
    /// Tile height.
    pub h: u32,
}

/// Destination of the tile at `index` in a row-major array `width` tiles wide.
///
/// `origin` is the chunk origin in tiles (zero for dense layer data). The
/// result includes the layer offset and the tileset's tile offset.
pub fn tile_position(
    index: usize,
    width: u32,
    origin: Offset,
    layer_offset: Offset,
    tileset: &Tileset,
) -> (i32, i32) {
    debug_assert!(width > 0);
    let width = width as usize;
    let col = index % width;
    let row = (index - col) / width;

    let x = (col as i32 + origin.x) * tileset.tile_w as i32 + layer_offset.x + tileset.offset.x;
    let y = (row as i32 + origin.y) * tileset.tile_h as i32 + layer_offset.y + tileset.offset.y;
    (x, y)
}

/// Source rectangle of `gid` (flip flags already removed) inside `tileset`.
///
/// `None` when the rectangle does not fit in `u32` pixel coordinates, which
/// only a corrupt gid or tileset can produce.
pub fn source_rect(gid: u32, tileset: &Tileset) -> Option<SourceRect> {
    debug_assert!(tileset.columns > 0);
    let local = gid.checked_sub(tileset.first_gid)?;
    let col = local % tileset.columns;
    let row = local / tileset.columns;

    let stride_x = tileset.spacing.checked_add(tileset.tile_w)?;
    let stride_y = tileset.spacing.checked_add(tileset.tile_h)?;
    Some(SourceRect {
        x: col.checked_mul(stride_x)?.checked_add(tileset.margin)?,
        y: row.checked_mul(stride_y)?.checked_add(tileset.margin)?,
        w: tileset.tile_w,
        h: tileset.tile_h,
    })
}

/// Object position shifted by its group's offset. Missing coordinates count as 0.
pub fn object_position(object: &MapObject, group: &ObjectGroup) -> (f32, f32) {
    (
        object.x.unwrap_or(0.0) + group.offset.x as f32,
        object.y.unwrap_or(0.0) + group.offset.y as f32,
    )
}

/// Object size. Missing dimensions count as 1.
pub fn object_size(object: &MapObject) -> (f32, f32) {
    (object.width.unwrap_or(1.0), object.height.unwrap_or(1.0))
}
