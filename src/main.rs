use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use multicmd::utils::{derive_level, init_logging};
use multicmd::{Config, Dispatch, Engine};

mod demo;

/// multicmd - demo host for the multicmd command framework
///
/// Everything after the global flags is handed to the command engine:
///   multicmd [-v|-vv] [-q] [--config PATH] <command> [command options...]
///
/// Global flags / env:
///   -v / -vv          Increase verbosity
///   -q / --quiet      Errors only
///   -c / --config     JSON or YAML config file
///   MULTICMD_CONFIG   Environment fallback if --config not provided
///
/// Examples:
///   multicmd help
///   multicmd echo -n 2 --upper hello world
///   multicmd count -f Cargo.toml --json
///   multicmd count /?
#[derive(Parser, Debug)]
#[command(
    name = "multicmd",
    version,
    author,
    about = "multicmd - multi-command console demo",
    disable_help_flag = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long)]
    quiet: bool,

    /// Config file (JSON, or YAML for .yaml/.yml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Command name followed by its options
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    args: Vec<String>,
}

/// CLI flag > MULTICMD_CONFIG env.
fn config_path(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| {
        std::env::var("MULTICMD_CONFIG")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
    })
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            debug!("loading config from {}", path.display());
            Config::load(&path)
                .with_context(|| format!("Failed to load config: '{}'", path.display()))?
        }
        None => Config::default(),
    };
    if config.app_name.is_none() {
        config.app_name = Some("multicmd".to_string());
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = derive_level(cli.verbose, cli.quiet);
    if let Err(e) = init_logging(level) {
        eprintln!("logging disabled: {e}");
    }

    let config = load_config(config_path(cli.config))?;
    let mut engine = Engine::new(config)
        .on_run(|name| debug!("starting `{name}`"))
        .on_end_run(|name| debug!("finished `{name}`"));
    for descriptor in demo::descriptors()? {
        engine.register(descriptor);
    }

    if engine.run(&cli.args)? == Dispatch::Rejected {
        std::process::exit(2);
    }
    Ok(())
}
