//! Errors raised while compiling a single page or style sheet.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("cannot read `{}`", .0.display())]
    Read(PathBuf, #[source] std::io::Error),

    #[error("cannot resolve include `{target}` from `{}`", includer.display())]
    Resolution { target: String, includer: PathBuf },

    #[error("include cycle: {}", format_chain(.0))]
    Cycle(Vec<PathBuf>),

    #[error("unknown property `{name}` in `{}`", file.display())]
    UnknownProperty { name: String, file: PathBuf },

    #[error("invalid include properties in `{}`: {reason}", file.display())]
    IncludeProperties { file: PathBuf, reason: String },

    #[error("failed to compile style `{}`:\n{message}", path.display())]
    Style { path: PathBuf, message: String },

    #[error("failed to post-process CSS of `{}`: {message}", path.display())]
    PostProcess { path: PathBuf, message: String },
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| format!("`{}`", p.display()))
        .collect::<Vec<_>>()
        .join(" -> ")
}
