use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while decoding a map file into the IR.
#[derive(Debug, Error)]
pub enum MapError {
    /// Reading a map or tileset file failed
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// A map or tileset file is not valid JSON for its schema
    #[error("JSON parse error in {}: {source}", .path.display())]
    Json {
        /// File being parsed.
        path: PathBuf,
        /// Parser error with line and column.
        #[source]
        source: serde_json::Error,
    },
    /// Map or tileset is not a JSON file
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    /// Structurally invalid map data
    #[error("Invalid map: {0}")]
    InvalidMap(String),
    /// A color property that is not `#RRGGBB` or `#AARRGGBB`
    #[error("Invalid color '{value}' for property '{name}'")]
    InvalidColor {
        /// Property name.
        name: String,
        /// Text as found in the file.
        value: String,
    },
}

/// Errors raised while translating a loaded map into script text.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// No tileset owns this gid
    #[error("No tileset owns gid {gid}")]
    UnknownTileset {
        /// Gid with flip flags removed.
        gid: u32,
    },
    /// Tileset without an image grid (zero columns)
    #[error("Tileset '{tileset}' has no columns")]
    EmptyTilesetGrid {
        /// Tileset name.
        tileset: String,
    },
    /// Dense tile data on a map that is zero tiles wide
    #[error("Map width is zero but layer '{layer}' carries dense tile data")]
    ZeroWidth {
        /// Layer name.
        layer: String,
    },
    /// Tiles in a chunk that is zero tiles wide
    #[error("Layer '{layer}' has tiles in a zero-width chunk at ({x}, {y})")]
    ZeroChunkWidth {
        /// Layer name.
        layer: String,
        /// Chunk origin column.
        x: i32,
        /// Chunk origin row.
        y: i32,
    },
    /// Source rectangle of a tile does not fit in `u32` pixel coordinates
    #[error("Gid {gid} lies outside the pixel range of tileset '{tileset}'")]
    SourceOutOfRange {
        /// Gid with flip flags removed.
        gid: u32,
        /// Tileset name.
        tileset: String,
    },
    /// Output file could not be created or written
    #[error("I/O error writing {}: {source}", .path.display())]
    Io {
        /// Output file.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// Writing to a caller-supplied writer failed
    #[error("Write error: {0}")]
    Write(#[from] io::Error),
}
