use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tiled_script_gen::config::{DEFAULT_EXTENSION, DEFAULT_FUNCTION_PREFIX, DEFAULT_RUNTIME_MODULE};
use tiled_script_gen::{load_map, Generator, ScriptOptions};

#[derive(Parser, Debug)]
#[command(name = "tiled-script-gen")]
#[command(about = "Generate a TaffyScript loader script from a Tiled JSON map")]
#[command(version)]
struct Args {
    /// Tiled map file (.json or .tmj)
    map: PathBuf,

    /// Output directory (defaults to the map's directory)
    out_dir: Option<PathBuf>,

    /// Runtime module imported at the top of the script
    #[arg(long = "using", env = "TILED_SCRIPT_USING", default_value = DEFAULT_RUNTIME_MODULE)]
    runtime_module: String,

    /// Omit the `using` header
    #[arg(long)]
    no_using: bool,

    /// Prefix of the generated loader function
    #[arg(long, env = "TILED_SCRIPT_PREFIX", default_value = DEFAULT_FUNCTION_PREFIX)]
    prefix: String,

    /// Extension of the generated script file
    #[arg(long, env = "TILED_SCRIPT_EXTENSION", default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> ScriptOptions {
        ScriptOptions {
            runtime_module: (!self.no_using).then(|| self.runtime_module.clone()),
            function_prefix: self.prefix.clone(),
            extension: self.extension.trim_start_matches('.').to_owned(),
            ..Default::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if let Ok(filter) = EnvFilter::try_from_default_env() {
        filter
    } else if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = args.options();
    let save_location = options.output_path(&args.map, args.out_dir.as_deref());
    debug!(?options, output = %save_location.display(), "resolved output");

    let map = load_map(&args.map)
        .with_context(|| format!("Loading map {}", args.map.display()))?;
    Generator::with_options(options)
        .generate(&map, &save_location)
        .with_context(|| format!("Generating {}", save_location.display()))?;

    println!("Output: {}", save_location.display());
    Ok(())
}
