//! Tessera - an incremental asset pipeline for static HTML sites.

mod asset;
mod cli;
mod compiler;
mod config;
mod core;
mod logger;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::PipelineConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = match PipelineConfig::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            log!("error"; "{:#}", err);
            std::process::exit(1);
        }
    };

    let args = cli.command.args();
    let mode = cli.command.default_mode();
    match &cli.command {
        Commands::Build { .. } => cli::build::build(config, args, mode),
        Commands::Watch { .. } => cli::watch::watch(config, args, mode),
    }
}
