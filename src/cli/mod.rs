//! Command-line interface module.

mod args;
pub mod build;
pub mod common;
pub mod watch;

pub use args::{Cli, Commands, PassArgs};
