//! Output file writing.
//!
//! Write failures are logged and swallowed: one unwritable file must not
//! stop the rest of the pass.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::utils::path::output_path;
use crate::{debug, log};

/// Write `content` to `name` under `output_root`, creating parent dirs.
///
/// Returns the destination path when the write succeeded.
pub fn write_output(output_root: &Path, name: &str, content: &[u8]) -> Option<PathBuf> {
    let dest = output_path(output_root, name);
    match try_write(&dest, content) {
        Ok(()) => {
            debug!("write"; "{}", dest.display());
            Some(dest)
        }
        Err(err) => {
            log!("error"; "{:#}", err);
            None
        }
    }
}

fn try_write(dest: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = dest.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory `{}`", parent.display()))?;
    }
    fs::write(dest, content).with_context(|| format!("failed to write `{}`", dest.display()))
}
