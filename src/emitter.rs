use std::collections::HashMap;
use std::io::{self, Write};

use crate::geometry::SourceRect;
use crate::ir_map::{Properties, Tileset};
use crate::property;

/// Script-side name of the working variable used while setting properties.
pub const INST_VAR: &str = "inst";
/// Script-side name of the aggregate returned by the loader function.
pub const SCREEN_VAR: &str = "screen";

/// Indentation-aware writer for one generated script.
///
/// Owns the per-run texture cache: each tileset gets exactly one
/// `var setN = load_texture(..)` statement, written right before its first use.
pub struct Emitter<W: Write> {
    out: W,
    level: usize,
    indent_width: usize,
    bindings: HashMap<usize, String>, // tileset index -> variable name
    next_set: usize,
    statements: usize,
}

impl<W: Write> Emitter<W> {
    /// Emitter at nesting level 0 with an empty texture cache.
    pub fn new(out: W, indent_width: usize) -> Self {
        Self {
            out,
            level: 0,
            indent_width,
            bindings: HashMap::new(),
            next_set: 0,
            statements: 0,
        }
    }

    /// Writes one line at the current indentation. Whitespace-only lines are
    /// written as a bare newline.
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        if text.trim().is_empty() {
            return self.blank();
        }
        let width = self.level * self.indent_width;
        writeln!(self.out, "{:width$}{text}", "")
    }

    /// Writes an empty line.
    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    /// Writes a statement line and counts it.
    fn statement(&mut self, text: &str) -> io::Result<()> {
        self.statements += 1;
        self.line(text)
    }

    /// One level deeper.
    pub fn indent(&mut self) {
        self.level += 1;
    }

    /// One level shallower, stopping at 0.
    pub fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Opens `header {` and indents.
    pub fn open_block(&mut self, header: &str) -> io::Result<()> {
        self.line(&format!("{header} {{"))?;
        self.indent();
        Ok(())
    }

    /// Dedents and closes the innermost block.
    pub fn close_block(&mut self) -> io::Result<()> {
        self.dedent();
        self.line("}")
    }

    /// Variable holding the texture of the tileset at `index`. The first
    /// request for a tileset writes its `load_texture` statement.
    pub fn texture_binding(&mut self, index: usize, tileset: &Tileset) -> io::Result<String> {
        if let Some(name) = self.bindings.get(&index) {
            return Ok(name.clone());
        }

        let name = format!("set{}", self.next_set);
        self.next_set += 1;
        let file = escape_string(tileset.texture_name());
        self.statement(&format!("var {name} = load_texture(\"{file}\");"))?;
        self.bindings.insert(index, name.clone());
        Ok(name)
    }

    /// `var inst;` and `var screen = new Screen();`
    pub fn declare_locals(&mut self) -> io::Result<()> {
        self.statement(&format!("var {INST_VAR};"))?;
        self.statement(&format!("var {SCREEN_VAR} = new Screen();"))
    }

    /// `return screen;`
    pub fn return_screen(&mut self) -> io::Result<()> {
        self.statement(&format!("return {SCREEN_VAR};"))
    }

    /// `screen.add_tile(..)` for one tile: texture, source rectangle,
    /// destination and depth.
    pub fn add_tile(
        &mut self,
        binding: &str,
        src: SourceRect,
        (x, y): (i32, i32),
        depth: i32,
    ) -> io::Result<()> {
        self.statement(&format!(
            "{SCREEN_VAR}.add_tile({binding}, {}, {}, {}, {}, {x}, {y}, {depth});",
            src.x, src.y, src.w, src.h
        ))
    }

    /// Constructs an object and adds it to the screen. Objects without
    /// properties take a single statement; otherwise the instance goes through
    /// the working variable so each property can be assigned.
    pub fn add_object(
        &mut self,
        class_name: &str,
        (x, y): (f32, f32),
        (w, h): (f32, f32),
        properties: &Properties,
    ) -> io::Result<()> {
        let ctor = format!("new {class_name}({x}, {y}, {w}, {h})");
        if properties.is_empty() {
            return self.statement(&format!("{SCREEN_VAR}.add({ctor});"));
        }

        self.statement(&format!("{INST_VAR} = {ctor};"))?;
        for prop in properties.iter() {
            let value = property::serialize(&prop.value);
            self.statement(&format!("{INST_VAR}.{} = {value};", prop.name))?;
        }
        self.statement(&format!("{SCREEN_VAR}.add({INST_VAR});"))
    }

    /// Number of statements written so far (structural lines excluded).
    pub fn statements(&self) -> usize {
        self.statements
    }

    /// Number of distinct textures loaded so far.
    pub fn textures(&self) -> usize {
        self.next_set
    }

    /// Flushes and hands back the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
