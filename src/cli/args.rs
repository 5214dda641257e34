//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::BuildMode;

/// Incremental asset pipeline: HTML includes, SCSS, tag injection
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (searched upward from the current directory)
    #[arg(short = 'C', long, global = true, default_value = "tessera.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run one full pass (production by default)
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        args: PassArgs,
    },

    /// Run a full pass, then rebuild on every change to a tracked file
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        args: PassArgs,
    },
}

impl Commands {
    pub fn args(&self) -> &PassArgs {
        match self {
            Self::Build { args } | Self::Watch { args } => args,
        }
    }

    /// Mode used when `--mode` is not given.
    pub fn default_mode(&self) -> BuildMode {
        match self {
            Self::Build { .. } => BuildMode::Production,
            Self::Watch { .. } => BuildMode::Development,
        }
    }
}

/// Arguments shared by `build` and `watch`.
#[derive(clap::Args, Debug, Clone)]
pub struct PassArgs {
    /// Output directory (relative to project root); `output_path` in the
    /// config file takes precedence
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Build mode
    #[arg(short, long, value_enum)]
    pub mode: Option<BuildMode>,

    /// Clean style output directories before the first full pass
    #[arg(short, long)]
    pub clean: bool,

    /// Chunk manifest written by the bundler (overrides `chunk_manifest`)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub manifest: Option<PathBuf>,
}
