//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Build-time image compression with a reuse cache
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: squash.toml)
    #[arg(short = 'C', long, default_value = "squash.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compress the assets of a finished build
    #[command(visible_alias = "r")]
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Remove the cache snapshot file
    #[command(visible_alias = "c")]
    Clean,
}

/// Arguments of the `run` command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Emitted asset names, relative to the output directory.
    /// Use `-` to read names from stdin (one per line).
    #[arg(value_name = "ASSET")]
    pub assets: Vec<String>,

    /// Build output directory (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub out: Option<PathBuf>,

    /// Static assets directory mirrored into the output directory
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub static_dir: Option<PathBuf>,

    /// Extra directory to process: `DIR` (in place) or `FROM=TO` (remapped)
    #[arg(short, long = "include", value_name = "DIR[=TO]")]
    pub include: Vec<String>,

    /// Force an encoder for matching file names: `PATTERN=ENCODER`
    #[arg(short, long = "route", value_name = "PATTERN=ENCODER")]
    pub route: Vec<String>,

    /// Skip file names matching this regex
    #[arg(short = 'x', long)]
    pub exclude: Option<String>,

    /// Maximum concurrent encode jobs (0 = available cores)
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Cache level: none, session or persistent
    #[arg(long, value_name = "LEVEL")]
    pub cache: Option<String>,

    /// Cache snapshot file
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub cache_path: Option<PathBuf>,

    /// Treat every file under the output directory as emitted
    #[arg(long)]
    pub scan_output: bool,

    /// Only print errors
    #[arg(short, long)]
    pub silent: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}
