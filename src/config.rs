use std::path::{Path, PathBuf};

/// Module named in the `using` header.
pub const DEFAULT_RUNTIME_MODULE: &str = "TaffyScript.MonoGame";
/// Prepended to the output file stem to name the loader function.
pub const DEFAULT_FUNCTION_PREFIX: &str = "tiled_load_";
/// Extension of generated script files.
pub const DEFAULT_EXTENSION: &str = "tfs";
/// Starting depth, below anything the runtime draws on its own.
pub const DEFAULT_INITIAL_DEPTH: i32 = -100;

/// Knobs for the emitted script. The defaults target the TaffyScript MonoGame
/// runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOptions {
    /// Module imported with a leading `using` line. `None` omits the header.
    pub runtime_module: Option<String>,
    /// Prefix of the loader function name.
    pub function_prefix: String,
    /// Extension of the output file, without the dot.
    pub extension: String,
    /// Depth of the first tile layer.
    pub initial_depth: i32,
    /// Spaces per nesting level.
    pub indent_width: usize,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            runtime_module: Some(DEFAULT_RUNTIME_MODULE.to_owned()),
            function_prefix: DEFAULT_FUNCTION_PREFIX.to_owned(),
            extension: DEFAULT_EXTENSION.to_owned(),
            initial_depth: DEFAULT_INITIAL_DEPTH,
            indent_width: 4,
        }
    }
}

impl ScriptOptions {
    /// Name of the loader function for an output file, e.g. `tiled_load_level1`
    /// for `out/level1.tfs`.
    pub fn script_name(&self, output: &Path) -> String {
        let stem = output
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        format!("{}{}", self.function_prefix, stem)
    }

    /// Where the script for `map_path` goes: `out_dir` (or the map's own
    /// directory) joined with the map's stem and the script extension.
    pub fn output_path(&self, map_path: &Path, out_dir: Option<&Path>) -> PathBuf {
        let dir = out_dir
            .map(Path::to_path_buf)
            .or_else(|| map_path.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        let mut file_name = map_path.file_stem().unwrap_or_default().to_os_string();
        file_name.push(".");
        file_name.push(&self.extension);
        dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_name_uses_output_stem() {
        let opts = ScriptOptions::default();
        assert_eq!(opts.script_name(Path::new("out/level1.tfs")), "tiled_load_level1");
    }

    #[test]
    fn output_path_defaults_to_map_directory() {
        let opts = ScriptOptions::default();
        let out = opts.output_path(Path::new("maps/level1.tmj"), None);
        assert_eq!(out, PathBuf::from("maps/level1.tfs"));
    }

    #[test]
    fn output_path_honours_out_dir_and_extension() {
        let opts = ScriptOptions {
            extension: "script".into(),
            ..Default::default()
        };
        let out = opts.output_path(Path::new("maps/level1.json"), Some(Path::new("gen")));
        assert_eq!(out, PathBuf::from("gen/level1.script"));
    }

    #[test]
    fn bare_file_name_lands_in_current_directory() {
        let opts = ScriptOptions::default();
        assert_eq!(
            opts.output_path(Path::new("level1.json"), None),
            PathBuf::from("level1.tfs")
        );
    }
}
