use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

/// Directories watched for tracked files.
///
/// Only the parent directories of files the pipeline reported are watched,
/// non-recursively, so output writes and unrelated trees never wake the
/// loop. The set is synced after every pass since dependencies change.
pub(super) struct WatchDirs {
    attached: FxHashSet<PathBuf>,
}

impl WatchDirs {
    pub(super) fn new() -> Self {
        Self {
            attached: FxHashSet::default(),
        }
    }

    /// Attach every parent directory of `files` not watched yet.
    pub(super) fn sync(&mut self, watcher: &mut RecommendedWatcher, files: &[PathBuf]) {
        // Drop stale handles for directories that no longer exist.
        self.attached.retain(|dir| dir.exists());

        for dir in parent_dirs(files) {
            if self.attached.contains(&dir) || !dir.exists() {
                continue;
            }
            match watcher.watch(&dir, RecursiveMode::NonRecursive) {
                Ok(()) => {
                    crate::debug!("watch"; "watching {}", dir.display());
                    self.attached.insert(dir);
                }
                Err(err) => crate::log!("watch"; "cannot watch {}: {}", dir.display(), err),
            }
        }
    }

    pub(super) fn len(&self) -> usize {
        self.attached.len()
    }
}

fn parent_dirs(files: &[PathBuf]) -> FxHashSet<PathBuf> {
    files
        .iter()
        .filter_map(|file| file.parent())
        .map(Path::to_path_buf)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_dirs_dedup() {
        let dirs = parent_dirs(&[
            PathBuf::from("/site/src/a.html"),
            PathBuf::from("/site/src/b.html"),
            PathBuf::from("/site/scss/_vars.scss"),
        ]);
        assert_eq!(dirs.len(), 2);
        assert!(dirs.contains(Path::new("/site/src")));
        assert!(dirs.contains(Path::new("/site/scss")));
    }
}
