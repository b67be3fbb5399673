// src/loader/json_loader.rs
use crate::error::MapError;
use crate::ir_map::*;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Deserialize)]
struct JsonMap {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    infinite: bool,
    #[serde(default)]
    layers: Vec<JsonLayer>,
    #[serde(default)]
    tilesets: Vec<JsonTilesetRef>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(rename = "type")]
    kind: Option<String>, // "tilelayer" if missing
    #[serde(default)]
    name: String,
    #[serde(default)]
    data: Option<JsonTileData>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    compression: Option<String>,
    #[serde(default)]
    chunks: Vec<JsonChunk>,
    #[serde(default)]
    offsetx: f32,
    #[serde(default)]
    offsety: f32,
    #[serde(default)]
    objects: Vec<JsonObject>,
    #[serde(default)]
    layers: Vec<JsonLayer>, // children of a "group"
}

/// Tile layer data: a plain array, or a base64 string when `encoding` says so.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonTileData {
    Array(Vec<u32>),
    Encoded(String),
}

#[derive(Deserialize)]
struct JsonChunk {
    #[serde(default)]
    x: i32,
    #[serde(default)]
    y: i32,
    width: u32,
    data: JsonTileData,
}

#[derive(Deserialize)]
struct JsonTilesetRef {
    firstgid: u32,
    #[serde(default)]
    source: Option<String>,
    #[serde(flatten)]
    inline: JsonTileset,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct JsonTileset {
    name: String,
    tilewidth: u32,
    tileheight: u32,
    columns: u32,
    spacing: u32,
    margin: u32,
    tileoffset: JsonTileOffset,
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct JsonTileOffset {
    x: i32,
    y: i32,
}

#[derive(Deserialize)]
struct JsonProperty {
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    value: JsonValue,
}

#[derive(Deserialize)]
struct JsonObject {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    class: String,
    x: Option<f32>,
    y: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

/// Parses `#AARRGGBB` or `#RRGGBB`. Tiled writes an empty string for an unset
/// color, which maps to transparent black.
fn parse_color(name: &str, text: &str) -> Result<Color, MapError> {
    let invalid = || MapError::InvalidColor {
        name: name.to_owned(),
        value: text.to_owned(),
    };

    if text.is_empty() {
        return Ok(Color::default());
    }
    let hex = text.strip_prefix('#').unwrap_or(text);
    if !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());

    match hex.len() {
        8 => Ok(Color {
            alpha: channel(0)?,
            red: channel(2)?,
            green: channel(4)?,
            blue: channel(6)?,
        }),
        6 => Ok(Color {
            alpha: 255,
            red: channel(0)?,
            green: channel(2)?,
            blue: channel(4)?,
        }),
        _ => Err(invalid()),
    }
}

fn json_property_to_ir(prop: JsonProperty) -> Result<(String, PropertyValue), MapError> {
    let JsonProperty { name, kind, value } = prop;

    let parsed = match kind.as_deref() {
        Some("bool") => value.as_bool().map(PropertyValue::Bool),
        Some("int") => value.as_i64().map(PropertyValue::Int),
        Some("float") => value.as_f64().map(PropertyValue::Float),
        Some("string") => value.as_str().map(|s| PropertyValue::String(s.to_owned())),
        Some("file") => value.as_str().map(|s| PropertyValue::File(s.to_owned())),
        Some("object") => value.as_u64().map(PropertyValue::Object),
        Some("color") => match value.as_str() {
            Some(s) => Some(PropertyValue::Color(parse_color(&name, s)?)),
            None => None,
        },
        Some(_) => None,
        None => {
            if let Some(v) = value.as_bool() {
                Some(PropertyValue::Bool(v))
            } else if let Some(v) = value.as_i64() {
                Some(PropertyValue::Int(v))
            } else if let Some(v) = value.as_f64() {
                Some(PropertyValue::Float(v))
            } else {
                value.as_str().map(|s| PropertyValue::String(s.to_owned()))
            }
        }
    };

    // Unknown kinds and mismatched values keep their raw JSON.
    let value = parsed.unwrap_or(PropertyValue::Other(value));
    Ok((name, value))
}

fn properties_from_json(props: Vec<JsonProperty>) -> Result<Properties, MapError> {
    props
        .into_iter()
        .map(json_property_to_ir)
        .collect::<Result<Properties, _>>()
}

fn object_to_ir(obj: JsonObject) -> Result<MapObject, MapError> {
    let class_name = if !obj.class.is_empty() {
        obj.class
    } else {
        obj.kind
    };

    Ok(MapObject {
        id: obj.id,
        name: obj.name,
        class_name,
        x: obj.x,
        y: obj.y,
        width: obj.width,
        height: obj.height,
        properties: properties_from_json(obj.properties)?,
    })
}

fn decode_tile_data(
    layer: &str,
    data: JsonTileData,
    encoding: Option<&str>,
    compression: Option<&str>,
) -> Result<Vec<u32>, MapError> {
    match data {
        JsonTileData::Array(gids) => Ok(gids),
        JsonTileData::Encoded(text) => {
            if encoding != Some("base64") {
                return Err(MapError::InvalidMap(format!(
                    "Layer '{layer}' has string data but encoding {encoding:?}"
                )));
            }
            if let Some(c) = compression.filter(|c| !c.is_empty()) {
                return Err(MapError::InvalidMap(format!(
                    "Layer '{layer}' uses unsupported compression '{c}'"
                )));
            }
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(text.trim())
                .map_err(|e| MapError::InvalidMap(format!("Layer '{layer}': {e}")))?;
            if bytes.len() % 4 != 0 {
                return Err(MapError::InvalidMap(format!(
                    "Layer '{layer}' data is not a whole number of gids"
                )));
            }
            Ok(bytes
                .chunks_exact(4)
                .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect())
        }
    }
}

fn tile_layer_to_ir(l: JsonLayer) -> Result<Layer, MapError> {
    let encoding = l.encoding.as_deref();
    let compression = l.compression.as_deref();

    let tiles = match l.data {
        Some(data) => decode_tile_data(&l.name, data, encoding, compression)?,
        None => Vec::new(),
    };
    let chunks = l
        .chunks
        .into_iter()
        .map(|c| -> Result<Chunk, MapError> {
            Ok(Chunk {
                x: c.x,
                y: c.y,
                width: c.width,
                tiles: decode_tile_data(&l.name, c.data, encoding, compression)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Layer {
        offset: Offset::new(l.offsetx.round() as i32, l.offsety.round() as i32),
        data: LayerData { tiles, chunks },
        name: l.name,
    })
}

/// Layers, object groups and groups of one container, each in source order.
type Contents = (Vec<Layer>, Vec<ObjectGroup>, Vec<Group>);

fn layers_to_ir(layers: Vec<JsonLayer>) -> Result<Contents, MapError> {
    let mut tile_layers = Vec::new();
    let mut object_groups = Vec::new();
    let mut groups = Vec::new();

    for l in layers {
        let kind = l.kind.clone().unwrap_or_else(|| "tilelayer".to_owned());
        match kind.as_str() {
            "tilelayer" => tile_layers.push(tile_layer_to_ir(l)?),
            "objectgroup" => object_groups.push(ObjectGroup {
                name: l.name,
                offset: Offset::new(l.offsetx.round() as i32, l.offsety.round() as i32),
                objects: l
                    .objects
                    .into_iter()
                    .map(object_to_ir)
                    .collect::<Result<Vec<_>, _>>()?,
            }),
            "group" => {
                let (layers, object_groups, children) = layers_to_ir(l.layers)?;
                groups.push(Group {
                    name: l.name,
                    layers,
                    object_groups,
                    groups: children,
                });
            }
            other => warn!(layer = %l.name, kind = other, "skipping unsupported layer"),
        }
    }

    Ok((tile_layers, object_groups, groups))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, MapError> {
    let txt = std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&txt).map_err(|source| MapError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn is_json_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json") | Some("tmj") | Some("tsj")
    )
}

fn tileset_to_ir(ts: JsonTilesetRef, map_dir: &Path) -> Result<Tileset, MapError> {
    let def = match ts.source {
        Some(source) => {
            let ts_path = map_dir.join(&source);
            if !is_json_file(&ts_path) {
                return Err(MapError::UnsupportedFormat(source));
            }
            read_json::<JsonTileset>(&ts_path)?
        }
        None => ts.inline,
    };

    Ok(Tileset {
        first_gid: ts.firstgid,
        name: def.name,
        tile_w: def.tilewidth,
        tile_h: def.tileheight,
        spacing: def.spacing,
        margin: def.margin,
        columns: def.columns,
        offset: Offset::new(def.tileoffset.x, def.tileoffset.y),
        properties: properties_from_json(def.properties)?,
    })
}

fn map_to_ir(j: JsonMap, map_dir: &Path) -> Result<Map, MapError> {
    let mut tilesets = j
        .tilesets
        .into_iter()
        .map(|ts| tileset_to_ir(ts, map_dir))
        .collect::<Result<Vec<_>, _>>()?;

    // Resolution relies on ascending first_gid
    tilesets.sort_by_key(|t| t.first_gid);

    let (layers, object_groups, groups) = layers_to_ir(j.layers)?;
    debug!(
        tilesets = tilesets.len(),
        layers = layers.len(),
        object_groups = object_groups.len(),
        groups = groups.len(),
        infinite = j.infinite,
        "decoded map"
    );

    Ok(Map {
        width: j.width,
        tilesets,
        layers,
        object_groups,
        groups,
        properties: properties_from_json(j.properties)?,
    })
}

/// Parses map JSON held in memory. External tilesets are resolved relative to
/// the directory of `map_path`, which is also used in error messages.
pub fn parse_map_str(json: &str, map_path: &Path) -> Result<Map, MapError> {
    let j: JsonMap = serde_json::from_str(json).map_err(|source| MapError::Json {
        path: map_path.to_path_buf(),
        source,
    })?;
    map_to_ir(j, &map_dir(map_path))
}

/// Loads a Tiled JSON map (`.json` or `.tmj`) from disk.
pub fn load_map(path: impl AsRef<Path>) -> Result<Map, MapError> {
    let p = path.as_ref();
    if !is_json_file(p) {
        return Err(MapError::UnsupportedFormat(p.display().to_string()));
    }

    let j: JsonMap = read_json(p)?;
    map_to_ir(j, &map_dir(p))
}

fn map_dir(map_path: &Path) -> PathBuf {
    map_path
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"))
}
