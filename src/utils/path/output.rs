//! Output-relative names.
//!
//! Config filenames such as `/css//[hash].css` or `css\app.css` are written
//! by hand, so every separator run is collapsed before the name is joined to
//! the output root or turned into an href.

use std::path::{Path, PathBuf};

/// Collapse every run of `/` and `\` into a single `/` and drop leading and
/// trailing separators.
///
/// # Example
/// ```ignore
/// assert_eq!(normalize_separators("//css\\\\app.css"), "css/app.css");
/// ```
pub fn normalize_separators(name: &str) -> String {
    name.split(['/', '\\'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Absolute destination of an output-relative name.
pub fn output_path(root: &Path, name: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for part in name.split(['/', '\\']).filter(|part| !part.is_empty()) {
        path.push(part);
    }
    path
}

/// Root-relative URL of an output-relative name (`css/a.css` → `/css/a.css`).
pub fn url_path(name: &str) -> String {
    format!("/{}", normalize_separators(name))
}
