use crate::error::GenerateError;
use crate::ir_map::Tileset;

/// Finds the tileset that owns `gid`: the one with the greatest `first_gid`
/// that is still `<= gid`. Returns its index in `tilesets`, which doubles as
/// the tileset's identity for the rest of a run.
///
/// `tilesets` must be sorted by `first_gid`. `gid` must already have its flip
/// flags removed.
pub fn resolve(gid: u32, tilesets: &[Tileset]) -> Result<usize, GenerateError> {
    let owned = tilesets.partition_point(|t| t.first_gid <= gid);
    if owned == 0 {
        return Err(GenerateError::UnknownTileset { gid });
    }
    Ok(owned - 1)
}
