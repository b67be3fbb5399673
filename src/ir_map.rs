// src/ir_map.rs

/// Canonical, format-agnostic map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map {
    /// Width in tiles, used to place dense layer data.
    pub width: u32,
    /// Must be sorted by `first_gid`.
    pub tilesets: Vec<Tileset>,
    /// Top-level tile layers in draw order.
    pub layers: Vec<Layer>,
    /// Top-level object groups in source order.
    pub object_groups: Vec<ObjectGroup>,
    /// Top-level groups in source order.
    pub groups: Vec<Group>,
    /// Map properties; `namespace` selects the script namespace.
    pub properties: Properties,
}

impl Map {
    /// The `namespace` string property, if the map declares one.
    pub fn namespace(&self) -> Option<&str> {
        self.properties.get_string("namespace")
    }
}

/// Whole-pixel offset pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Offset {
    /// Horizontal offset in pixels.
    pub x: i32,
    /// Vertical offset in pixels.
    pub y: i32,
}

impl Offset {
    /// Offset of `x`, `y` pixels.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One image atlas with a regular grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tileset {
    /// First gid owned by this tileset.
    pub first_gid: u32,
    /// Tileset name, the default texture file.
    pub name: String,
    /// Tile width in pixels.
    pub tile_w: u32,
    /// Tile height in pixels.
    pub tile_h: u32,
    /// Pixels between tiles in the image, 0 if not used.
    pub spacing: u32,
    /// Pixels around the tile grid in the image, 0 if not used.
    pub margin: u32,
    /// Tiles per image row.
    pub columns: u32,
    /// Applied to every placed tile.
    pub offset: Offset,
    /// Tileset properties; `fname` overrides the texture file.
    pub properties: Properties,
}

impl Tileset {
    /// File handed to the runtime's texture loader: the `fname` property if
    /// present, otherwise the tileset name.
    pub fn texture_name(&self) -> &str {
        self.properties.get_string("fname").unwrap_or(&self.name)
    }
}

/// Tile layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    /// Layer name, used in logs only.
    pub name: String,
    /// World offset for this layer.
    pub offset: Offset,
    /// Tile references.
    pub data: LayerData,
}

/// Tile references of a layer. Either list may be empty; both are walked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerData {
    /// Raw gids, row-major over the map width.
    pub tiles: Vec<u32>,
    /// Chunks of an infinite layer.
    pub chunks: Vec<Chunk>,
}

/// Rectangular piece of an infinite layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    /// Origin column in tiles.
    pub x: i32,
    /// Origin row in tiles.
    pub y: i32,
    /// Width in tiles.
    pub width: u32,
    /// Raw gids, row-major over `width`.
    pub tiles: Vec<u32>,
}

/// Nested container of layers, object groups and further groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    /// Group name, used in logs only.
    pub name: String,
    /// Tile layers in draw order.
    pub layers: Vec<Layer>,
    /// Object groups in source order.
    pub object_groups: Vec<ObjectGroup>,
    /// Child groups in source order.
    pub groups: Vec<Group>,
}

/// Object layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectGroup {
    /// Group name, used in logs only.
    pub name: String,
    /// Added to every object position.
    pub offset: Offset,
    /// Objects in source order.
    pub objects: Vec<MapObject>,
}

/// Placed object, instantiated by class name at load time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapObject {
    /// Tiled object id.
    pub id: u32,
    /// Object name, used in logs only.
    pub name: String,
    /// Constructor name in the emitted script.
    pub class_name: String,
    /// Left edge in pixels, 0 when absent.
    pub x: Option<f32>,
    /// Top edge in pixels, 0 when absent.
    pub y: Option<f32>,
    /// Width in pixels, 1 when absent.
    pub width: Option<f32>,
    /// Height in pixels, 1 when absent.
    pub height: Option<f32>,
    /// Assigned on the instance after construction.
    pub properties: Properties,
}

/// RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
    /// Alpha channel, 255 is opaque.
    pub alpha: u8,
}

/// Typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// `bool`
    Bool(bool),
    /// `int`
    Int(i64),
    /// `float`
    Float(f64),
    /// `string`
    String(String),
    /// `file`, a path relative to the map
    File(String),
    /// `object`, the id of another object
    Object(u64),
    /// `color`
    Color(Color),
    /// Any kind without a dedicated variant (class values, future kinds).
    Other(serde_json::Value),
}

/// Named property value.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name, the field assigned in the script.
    pub name: String,
    /// Typed value.
    pub value: PropertyValue,
}

/// Ordered property bag. Order is the order properties appear in the source
/// file, and is the order assignments are emitted in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(Vec<Property>);

impl Properties {
    /// Empty bag.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a property, replacing an earlier one with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        let name = name.into();
        match self.0.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.value = value,
            None => self.0.push(Property { name, value }),
        }
    }

    /// Value of the property called `name`.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    /// String value of `name`; other kinds give `None`.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(PropertyValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Bool value of `name`; other kinds give `None`.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(PropertyValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Int value of `name`; other kinds give `None`.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(PropertyValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Color value of `name`; other kinds give `None`.
    pub fn get_color(&self, name: &str) -> Option<Color> {
        match self.get(name) {
            Some(PropertyValue::Color(c)) => Some(*c),
            _ => None,
        }
    }

    /// Properties in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.0.iter()
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the bag holds no properties.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, PropertyValue)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        let mut out = Properties::new();
        for (name, value) in iter {
            out.insert(name, value);
        }
        out
    }
}
