//! Asset processing: copied folders and production minification.

mod minify;
mod process;

pub use minify::{minify_css, minify_html};
pub use process::copy_entry;
