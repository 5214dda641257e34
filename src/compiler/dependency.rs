//! Dependency tracking for incremental builds.
//!
//! Maps every main source (page import or style import) to the files its last
//! successful compile read, and keeps the reverse mapping in sync so a
//! changed file can be traced back to the mains it feeds.

use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};

use crate::utils::path::normalize_path;

type PathSet = FxHashSet<PathBuf>;

/// Bidirectional dependency index.
///
/// # Invariants
/// - Forward and reverse mappings are always consistent
/// - Paths are normalized for reliable matching
/// - A main's own path is part of its dependencies, so editing the main
///   itself finds it through [`DependencyIndex::used_by`]
#[derive(Debug, Default)]
pub struct DependencyIndex {
    /// Forward: main source → files read by its last compile, in read order
    forward: FxHashMap<PathBuf, Vec<PathBuf>>,
    /// Reverse: file → mains that read it
    reverse: FxHashMap<PathBuf, PathSet>,
}

impl DependencyIndex {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the files a main source read during its last compile.
    ///
    /// Replaces any existing entry, so dependencies dropped from the source
    /// stop triggering rebuilds.
    pub fn record(&mut self, main: &Path, files: &[PathBuf]) {
        let main = normalize_path(main);

        self.remove_main(&main);

        let mut seen = PathSet::default();
        let files: Vec<PathBuf> = files
            .iter()
            .map(|p| normalize_path(p))
            .filter(|p| seen.insert(p.clone()))
            .collect();

        for file in &files {
            self.reverse
                .entry(file.clone())
                .or_default()
                .insert(main.clone());
        }

        self.forward.insert(main, files);
    }

    /// Mains whose last compile read `file`, sorted for stable dispatch order.
    pub fn used_by(&self, file: &Path) -> Vec<PathBuf> {
        let file = normalize_path(file);
        let mut mains: Vec<PathBuf> = self
            .reverse
            .get(&file)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        mains.sort();
        mains
    }

    /// Files recorded for a main source.
    #[cfg(test)]
    pub fn uses(&self, main: &Path) -> Option<&[PathBuf]> {
        self.forward.get(main).map(Vec::as_slice)
    }

    /// Every tracked file across all mains: deduplicated and sorted.
    ///
    /// This is the list handed back to the host after each pass.
    pub fn all_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.reverse.keys().cloned().collect();
        files.sort();
        files
    }

    /// Number of recorded mains.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Remove a main and clean up its reverse mappings.
    fn remove_main(&mut self, main: &Path) {
        let Some(old_files) = self.forward.remove(main) else {
            return;
        };

        for file in old_files {
            if let Some(mains) = self.reverse.get_mut(&file) {
                mains.remove(main);
                if mains.is_empty() {
                    self.reverse.remove(&file);
                }
            }
        }
    }
}
