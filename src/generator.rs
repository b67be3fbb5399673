use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::ScriptOptions;
use crate::emitter::Emitter;
use crate::error::GenerateError;
use crate::geometry::{object_position, object_size, source_rect, tile_position};
use crate::gid::TileId;
use crate::ir_map::{Group, Layer, Map, ObjectGroup, Offset};
use crate::tileset::resolve;

/// Translates maps into loader scripts. Holds only configuration; every call
/// builds fresh per-run state, so one generator can be reused across runs.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: ScriptOptions,
}

impl Generator {
    /// Generator with the default [`ScriptOptions`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator with custom options.
    pub fn with_options(options: ScriptOptions) -> Self {
        Self { options }
    }

    /// Options used for every run.
    pub fn options(&self) -> &ScriptOptions {
        &self.options
    }

    /// Writes the script for `map` to `save_location`, creating or truncating
    /// the file. The function name is derived from the file stem.
    ///
    /// On error the file may be left partially written.
    pub fn generate(&self, map: &Map, save_location: &Path) -> Result<(), GenerateError> {
        let io_err = |source| GenerateError::Io {
            path: save_location.to_path_buf(),
            source,
        };

        let file = File::create(save_location).map_err(io_err)?;
        let script_name = self.options.script_name(save_location);
        match self.translate(map, &script_name, BufWriter::new(file)) {
            Ok((_, statements)) => {
                info!(
                    path = %save_location.display(),
                    script = %script_name,
                    statements,
                    "generated script"
                );
                Ok(())
            }
            Err(GenerateError::Write(source)) => Err(io_err(source)),
            Err(other) => Err(other),
        }
    }

    /// Writes the script for `map` into `out` as function `script_name`, and
    /// returns the flushed writer.
    pub fn generate_to_writer<W: Write>(
        &self,
        map: &Map,
        script_name: &str,
        out: W,
    ) -> Result<W, GenerateError> {
        self.translate(map, script_name, out).map(|(out, _)| out)
    }

    /// Runs one translation, returning the flushed writer and the number of
    /// statements written.
    fn translate<W: Write>(
        &self,
        map: &Map,
        script_name: &str,
        out: W,
    ) -> Result<(W, usize), GenerateError> {
        let mut run = Translation::new(map, &self.options, out);
        run.emit(script_name)?;
        let statements = run.emitter.statements();
        debug!(
            statements,
            textures = run.emitter.textures(),
            "translation finished"
        );
        Ok((run.emitter.finish()?, statements))
    }

    /// In-memory variant of [`Generator::generate_to_writer`].
    pub fn generate_to_string(&self, map: &Map, script_name: &str) -> Result<String, GenerateError> {
        let bytes = self.generate_to_writer(map, script_name, Vec::new())?;
        // Everything written comes from `&str`.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Draw order handed to `add_tile`. Shared by every tile of a layer and
/// advanced once per finished layer, wherever the layer sits in the group tree.
#[derive(Debug, Clone, Copy)]
struct Depth(i32);

impl Depth {
    fn current(self) -> i32 {
        self.0
    }

    fn advance(&mut self) {
        self.0 += 1;
    }
}

/// State of a single run: the emitter with its texture cache, and the depth
/// counter.
struct Translation<'m, W: Write> {
    map: &'m Map,
    options: &'m ScriptOptions,
    emitter: Emitter<W>,
    depth: Depth,
}

impl<'m, W: Write> Translation<'m, W> {
    fn new(map: &'m Map, options: &'m ScriptOptions, out: W) -> Self {
        Self {
            map,
            options,
            emitter: Emitter::new(out, options.indent_width),
            depth: Depth(options.initial_depth),
        }
    }

    fn emit(&mut self, script_name: &str) -> Result<(), GenerateError> {
        let map = self.map;
        let namespace = map.namespace();

        if let Some(module) = &self.options.runtime_module {
            self.emitter.line(&format!("using {module};"))?;
            self.emitter.blank()?;
        }
        if let Some(ns) = namespace {
            self.emitter.open_block(&format!("namespace {ns}"))?;
        }

        self.emitter.open_block(&format!("script {script_name}()"))?;
        self.emitter.declare_locals()?;
        self.walk(&map.layers, &map.object_groups, &map.groups)?;
        self.emitter.return_screen()?;
        self.emitter.close_block()?;

        if namespace.is_some() {
            self.emitter.close_block()?;
        }
        Ok(())
    }

    /// Layers first, then object groups, then child groups, recursively.
    fn walk(
        &mut self,
        layers: &[Layer],
        object_groups: &[ObjectGroup],
        groups: &[Group],
    ) -> Result<(), GenerateError> {
        for layer in layers {
            self.layer(layer)?;
            self.depth.advance();
        }

        for group in object_groups {
            self.object_group(group)?;
        }

        for group in groups {
            debug!(group = %group.name, layers = group.layers.len(), "entering group");
            self.walk(&group.layers, &group.object_groups, &group.groups)?;
        }
        Ok(())
    }

    fn layer(&mut self, layer: &Layer) -> Result<(), GenerateError> {
        debug!(
            layer = %layer.name,
            depth = self.depth.current(),
            chunks = layer.data.chunks.len(),
            "emitting layer"
        );

        for chunk in &layer.data.chunks {
            let origin = Offset::new(chunk.x, chunk.y);
            if chunk.width == 0 && has_tiles(&chunk.tiles) {
                return Err(GenerateError::ZeroChunkWidth {
                    layer: layer.name.clone(),
                    x: chunk.x,
                    y: chunk.y,
                });
            }
            self.tiles(&chunk.tiles, chunk.width, origin, layer.offset)?;
        }

        if self.map.width == 0 && has_tiles(&layer.data.tiles) {
            return Err(GenerateError::ZeroWidth {
                layer: layer.name.clone(),
            });
        }
        self.tiles(&layer.data.tiles, self.map.width, Offset::default(), layer.offset)
    }

    /// Places every non-empty gid of a row-major array `width` tiles wide.
    /// Callers reject a zero width before any tile needs placing.
    fn tiles(
        &mut self,
        tiles: &[u32],
        width: u32,
        origin: Offset,
        layer_offset: Offset,
    ) -> Result<(), GenerateError> {
        let map = self.map;
        let tilesets = &map.tilesets;

        for (index, &raw) in tiles.iter().enumerate() {
            let id = TileId(raw);
            if id.is_empty() {
                continue;
            }

            let gid = id.clean();
            let set = resolve(gid, tilesets)?;
            let tileset = &tilesets[set];
            if tileset.columns == 0 {
                return Err(GenerateError::EmptyTilesetGrid {
                    tileset: tileset.name.clone(),
                });
            }

            let dest = tile_position(index, width, origin, layer_offset, tileset);
            let src = source_rect(gid, tileset).ok_or_else(|| GenerateError::SourceOutOfRange {
                gid,
                tileset: tileset.name.clone(),
            })?;
            let binding = self.emitter.texture_binding(set, tileset)?;
            self.emitter
                .add_tile(&binding, src, dest, self.depth.current())?;
        }
        Ok(())
    }

    fn object_group(&mut self, group: &ObjectGroup) -> Result<(), GenerateError> {
        debug!(group = %group.name, objects = group.objects.len(), "emitting object group");

        for object in &group.objects {
            if object.class_name.is_empty() {
                warn!(id = object.id, name = %object.name, "object has no type name");
            }
            self.emitter.add_object(
                &object.class_name,
                object_position(object, group),
                object_size(object),
                &object.properties,
            )?;
        }
        Ok(())
    }
}

fn has_tiles(tiles: &[u32]) -> bool {
    tiles.iter().any(|&raw| !TileId(raw).is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir_map::{Chunk, LayerData, MapObject, PropertyValue, Tileset};

    fn tileset(first_gid: u32, name: &str) -> Tileset {
        Tileset {
            first_gid,
            name: name.into(),
            tile_w: 16,
            tile_h: 16,
            columns: 4,
            ..Default::default()
        }
    }

    fn dense(tiles: Vec<u32>) -> Layer {
        Layer {
            name: "l".into(),
            data: LayerData {
                tiles,
                chunks: Vec::new(),
            },
            ..Default::default()
        }
    }

    fn body(map: &Map) -> Vec<String> {
        let opts = ScriptOptions {
            runtime_module: None,
            ..Default::default()
        };
        let text = Generator::with_options(opts)
            .generate_to_string(map, "tiled_load_t")
            .unwrap();
        text.lines()
            .map(str::trim)
            .filter(|l| l.starts_with("screen.") || l.starts_with("inst") || l.starts_with("var set"))
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn depth_advances_once_per_layer() {
        let map = Map {
            width: 1,
            tilesets: vec![tileset(1, "a")],
            layers: vec![dense(vec![1]), dense(vec![0]), dense(vec![2])],
            ..Default::default()
        };
        assert_eq!(
            body(&map),
            vec![
                "var set0 = load_texture(\"a\");",
                "screen.add_tile(set0, 0, 0, 16, 16, 0, 0, -100);",
                "screen.add_tile(set0, 16, 0, 16, 16, 0, 0, -98);",
            ]
        );
    }

    #[test]
    fn chunks_are_emitted_before_dense_data() {
        let mut layer = dense(vec![1]);
        layer.data.chunks.push(Chunk {
            x: -2,
            y: 1,
            width: 2,
            tiles: vec![0, 2],
        });
        let map = Map {
            width: 1,
            tilesets: vec![tileset(1, "a")],
            layers: vec![layer],
            ..Default::default()
        };
        assert_eq!(
            body(&map),
            vec![
                "var set0 = load_texture(\"a\");",
                "screen.add_tile(set0, 16, 0, 16, 16, -16, 16, -100);",
                "screen.add_tile(set0, 0, 0, 16, 16, 0, 0, -100);",
            ]
        );
    }

    #[test]
    fn group_contents_follow_top_level_object_groups() {
        let inner = Group {
            name: "inner".into(),
            layers: vec![dense(vec![1])],
            ..Default::default()
        };
        let outer = Group {
            name: "outer".into(),
            layers: vec![dense(vec![2])],
            groups: vec![inner],
            ..Default::default()
        };
        let objects = ObjectGroup {
            objects: vec![MapObject {
                class_name: "Spawn".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let map = Map {
            width: 1,
            tilesets: vec![tileset(1, "a")],
            layers: vec![dense(vec![3])],
            object_groups: vec![objects],
            groups: vec![outer],
            ..Default::default()
        };
        assert_eq!(
            body(&map),
            vec![
                "var set0 = load_texture(\"a\");",
                "screen.add_tile(set0, 32, 0, 16, 16, 0, 0, -100);",
                "screen.add(new Spawn(0, 0, 1, 1));",
                "screen.add_tile(set0, 16, 0, 16, 16, 0, 0, -99);",
                "screen.add_tile(set0, 0, 0, 16, 16, 0, 0, -98);",
            ]
        );
    }

    #[test]
    fn flipped_gids_resolve_by_their_clean_value() {
        let map = Map {
            width: 1,
            tilesets: vec![tileset(1, "a"), tileset(5, "b")],
            layers: vec![dense(vec![6 | crate::gid::FLIP_H])],
            ..Default::default()
        };
        assert_eq!(
            body(&map),
            vec![
                "var set0 = load_texture(\"b\");",
                "screen.add_tile(set0, 16, 0, 16, 16, 0, 0, -100);",
            ]
        );
    }

    #[test]
    fn unknown_gid_aborts_the_run() {
        let map = Map {
            width: 1,
            tilesets: vec![tileset(10, "a")],
            layers: vec![dense(vec![3])],
            ..Default::default()
        };
        let err = Generator::new().generate_to_string(&map, "x").unwrap_err();
        assert!(matches!(err, GenerateError::UnknownTileset { gid: 3 }));
    }

    #[test]
    fn zero_columns_is_reported() {
        let mut ts = tileset(1, "collection");
        ts.columns = 0;
        let map = Map {
            width: 1,
            tilesets: vec![ts],
            layers: vec![dense(vec![1])],
            ..Default::default()
        };
        let err = Generator::new().generate_to_string(&map, "x").unwrap_err();
        assert!(matches!(err, GenerateError::EmptyTilesetGrid { tileset } if tileset == "collection"));
    }

    #[test]
    fn zero_width_only_matters_with_tiles_present() {
        let mut map = Map {
            width: 0,
            tilesets: vec![tileset(1, "a")],
            layers: vec![dense(vec![0, 0])],
            ..Default::default()
        };
        assert!(Generator::new().generate_to_string(&map, "x").is_ok());

        map.layers = vec![dense(vec![0, 1])];
        let err = Generator::new().generate_to_string(&map, "x").unwrap_err();
        assert!(matches!(&err, GenerateError::ZeroWidth { layer } if layer == "l"));
        assert_eq!(
            err.to_string(),
            "Map width is zero but layer 'l' carries dense tile data"
        );
    }

    #[test]
    fn zero_width_chunk_is_named_as_a_chunk() {
        let mut layer = dense(Vec::new());
        layer.data.chunks.push(Chunk {
            x: 16,
            y: -16,
            width: 0,
            tiles: vec![1],
        });
        let map = Map {
            width: 10,
            tilesets: vec![tileset(1, "a")],
            layers: vec![layer],
            ..Default::default()
        };
        let err = Generator::new().generate_to_string(&map, "x").unwrap_err();
        assert!(matches!(err, GenerateError::ZeroChunkWidth { x: 16, y: -16, .. }));
        assert_eq!(
            err.to_string(),
            "Layer 'l' has tiles in a zero-width chunk at (16, -16)"
        );
    }

    #[test]
    fn oversized_source_rect_is_an_error() {
        let mut ts = tileset(1, "huge");
        ts.tile_w = 64;
        ts.tile_h = 64;
        ts.columns = 1;
        let map = Map {
            width: 1,
            tilesets: vec![ts],
            layers: vec![dense(vec![0x1000_0000])],
            ..Default::default()
        };
        let err = Generator::new().generate_to_string(&map, "x").unwrap_err();
        assert!(matches!(
            err,
            GenerateError::SourceOutOfRange { gid: 0x1000_0000, ref tileset } if tileset == "huge"
        ));
    }

    #[test]
    fn object_groups_inside_a_group_sit_between_its_layers_and_children() {
        let spawn = |class: &str| MapObject {
            class_name: class.into(),
            ..Default::default()
        };
        let child = Group {
            name: "child".into(),
            layers: vec![dense(vec![3])],
            object_groups: vec![ObjectGroup {
                objects: vec![spawn("Deep")],
                ..Default::default()
            }],
            ..Default::default()
        };
        let group = Group {
            name: "room".into(),
            layers: vec![dense(vec![1]), dense(vec![2])],
            object_groups: vec![
                ObjectGroup {
                    objects: vec![spawn("Door")],
                    ..Default::default()
                },
                ObjectGroup {
                    objects: vec![spawn("Key")],
                    ..Default::default()
                },
            ],
            groups: vec![child],
        };
        let map = Map {
            width: 1,
            tilesets: vec![tileset(1, "a")],
            groups: vec![group],
            ..Default::default()
        };
        assert_eq!(
            body(&map),
            vec![
                "var set0 = load_texture(\"a\");",
                "screen.add_tile(set0, 0, 0, 16, 16, 0, 0, -100);",
                "screen.add_tile(set0, 16, 0, 16, 16, 0, 0, -99);",
                "screen.add(new Door(0, 0, 1, 1));",
                "screen.add(new Key(0, 0, 1, 1));",
                "screen.add_tile(set0, 32, 0, 16, 16, 0, 0, -98);",
                "screen.add(new Deep(0, 0, 1, 1));",
            ]
        );
    }

    #[test]
    fn translate_counts_every_statement() {
        let mut object = MapObject {
            class_name: "Chest".into(),
            ..Default::default()
        };
        object.properties.insert("gold", PropertyValue::Int(5));
        let map = Map {
            width: 2,
            tilesets: vec![tileset(1, "a")],
            layers: vec![dense(vec![1, 2])],
            object_groups: vec![ObjectGroup {
                objects: vec![object],
                ..Default::default()
            }],
            ..Default::default()
        };
        let (out, statements) = Generator::new()
            .translate(&map, "x", Vec::new())
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(statements, text.lines().filter(|l| l.ends_with(';') && !l.starts_with("using")).count());
        // locals, texture, two tiles, three object lines, return
        assert_eq!(statements, 9);
    }

    #[test]
    fn each_run_starts_with_fresh_bindings_and_depth() {
        let map = Map {
            width: 1,
            tilesets: vec![tileset(1, "a")],
            layers: vec![dense(vec![1])],
            ..Default::default()
        };
        let generator = Generator::new();
        let first = generator.generate_to_string(&map, "x").unwrap();
        let second = generator.generate_to_string(&map, "x").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn color_properties_use_make_color() {
        let mut object = MapObject {
            class_name: "Lamp".into(),
            x: Some(4.0),
            ..Default::default()
        };
        object.properties.insert(
            "tint",
            PropertyValue::Color(crate::ir_map::Color {
                red: 1,
                green: 2,
                blue: 3,
                alpha: 255,
            }),
        );
        let map = Map {
            object_groups: vec![ObjectGroup {
                offset: Offset::new(10, 0),
                objects: vec![object],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(
            body(&map),
            vec![
                "inst = new Lamp(14, 0, 1, 1);",
                "inst.tint = make_color(1, 2, 3, 255);",
                "screen.add(inst);",
            ]
        );
    }
}
