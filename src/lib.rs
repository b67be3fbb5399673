#![warn(missing_docs)]

//! Translates Tiled JSON maps into TaffyScript source that rebuilds the map at
//! load time through the runtime's `Screen` API.

/// Output naming and script header settings.
pub mod config;
/// Script text writer and texture-binding cache.
pub mod emitter;
mod error;
/// Tile and object placement math.
pub mod geometry;
/// Walks a map and drives the emitter.
pub mod generator;
/// Tile references and their flip flags.
pub mod gid;
/// Format-agnostic map tree.
pub mod ir_map;
/// Map file readers.
pub mod loader {
    /// Tiled JSON (`.json`, `.tmj`) reader.
    pub mod json_loader;
}
/// Property values as script expressions.
pub mod property;
/// Gid to tileset resolution.
pub mod tileset;

pub use config::ScriptOptions;
pub use error::{GenerateError, MapError};
pub use generator::Generator;
pub use ir_map::{
    Chunk, Color, Group, Layer, LayerData, Map, MapObject, ObjectGroup, Offset, Properties,
    Property, PropertyValue, Tileset,
};
pub use loader::json_loader::{load_map, parse_map_str};
