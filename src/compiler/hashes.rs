//! Style source → hashed output filename.
//!
//! When a style's filename pattern carries a hash placeholder, the concrete
//! name is only known after compiling. Pages look it up here so their
//! `<link>` tags point at the file that was actually written, including
//! when the style was compiled in an earlier pass.

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct StyleHashIndex {
    names: FxHashMap<PathBuf, String>,
}

impl StyleHashIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the concrete filename last written for `import`.
    pub fn record(&mut self, import: &Path, filename: String) {
        self.names.insert(import.to_path_buf(), filename);
    }

    /// Concrete filename last written for `import`, if it was hashed.
    pub fn get(&self, import: &Path) -> Option<&str> {
        self.names.get(import).map(String::as_str)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_overwrites_previous_name() {
        let mut index = StyleHashIndex::new();
        let import = Path::new("/project/src/app.scss");

        index.record(import, "css/aaaaaaaaaaaa.css".into());
        index.record(import, "css/bbbbbbbbbbbb.css".into());

        assert_eq!(index.get(import), Some("css/bbbbbbbbbbbb.css"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_unknown_import() {
        let index = StyleHashIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.get(Path::new("/project/src/lib.scss")), None);
    }
}
