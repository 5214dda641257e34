//! Path and URL utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `resolve_path`)
//! - [`output`]: Output-relative names (`normalize_separators`, `output_path`, `url_path`)

pub mod fs;
pub mod output;

pub use fs::{normalize_path, resolve_path};
pub use output::{output_path, url_path};
