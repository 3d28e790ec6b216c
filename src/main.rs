//! Squash - build-time image compression with a content-addressed reuse cache.

mod asset;
mod cache;
mod cli;
mod codec;
mod config;
mod encoder;
mod logger;
mod pipeline;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SquashConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let mut config = SquashConfig::load(&cli)?;

    match &cli.command {
        Commands::Run { args } => {
            config.apply_run_args(args)?;
            logger::set_silent(config.silent);
            logger::set_verbose(config.verbose);
            config.validate()?;
            cli::run::run_bundle(config, &args.assets)
        }
        Commands::Clean => cli::clean::remove_snapshot(&config),
    }
}
