//! Asset copying with side effects (directory mirroring, JSON compaction).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use serde_json::Value;

use crate::config::CopyEntry;
use crate::core::BuildMode;
use crate::utils::path::output_path;

const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Mirror a copy entry's source directory into the output root.
///
/// Each directory level is read once and its entries are processed on the
/// rayon pool. In production, `.json` files are re-serialized compactly with
/// key order preserved; everything else is copied byte for byte.
///
/// Returns the number of files written.
pub fn copy_entry(entry: &CopyEntry, output_root: &Path, mode: BuildMode) -> Result<usize> {
    if !entry.src.is_dir() {
        bail!("copy source `{}` is not a directory", entry.src.display());
    }

    let dest = output_path(output_root, &entry.dest);
    let copied = AtomicUsize::new(0);
    copy_level(&entry.src, &dest, mode, &copied)?;
    Ok(copied.into_inner())
}

fn copy_level(src: &Path, dest: &Path, mode: BuildMode, copied: &AtomicUsize) -> Result<()> {
    if !dest.exists() {
        fs::create_dir_all(dest)
            .with_context(|| format!("failed to create directory `{}`", dest.display()))?;
    }

    let entries: Vec<PathBuf> = fs::read_dir(src)
        .with_context(|| format!("failed to read directory `{}`", src.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()
        .with_context(|| format!("failed to read directory `{}`", src.display()))?;

    entries.par_iter().try_for_each(|path| {
        let Some(name) = path.file_name() else {
            return Ok(());
        };
        let target = dest.join(name);

        if path.is_dir() {
            return copy_level(path, &target, mode, copied);
        }
        if name.to_str().is_some_and(|n| IGNORED_FILES.contains(&n)) {
            return Ok(());
        }

        copy_file(path, &target, mode)?;
        copied.fetch_add(1, Ordering::Relaxed);
        Ok(())
    })
}

fn copy_file(src: &Path, dest: &Path, mode: BuildMode) -> Result<()> {
    let is_json = src.extension().is_some_and(|ext| ext == "json");

    if mode.is_production() && is_json {
        let content = fs::read_to_string(src)
            .with_context(|| format!("failed to read `{}`", src.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in `{}`", src.display()))?;
        let compact = serde_json::to_string(&value)?;
        fs::write(dest, compact).with_context(|| format!("failed to write `{}`", dest.display()))
    } else {
        fs::copy(src, dest)
            .map(|_| ())
            .with_context(|| format!("failed to copy `{}`", src.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PRETTY_JSON: &str = "{\n  \"zeta\": 1,\n  \"alpha\": [1, 2],\n  \"mid\": { \"b\": true, \"a\": null }\n}\n";

    fn fixture() -> (TempDir, CopyEntry) {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src/static");
        fs::create_dir_all(src.join("img/icons")).unwrap();
        fs::write(src.join("robots.txt"), "User-agent: *\n").unwrap();
        fs::write(src.join("data.json"), PRETTY_JSON).unwrap();
        fs::write(src.join("img/logo.svg"), "<svg/>").unwrap();
        fs::write(src.join("img/icons/a.png"), [0u8, 1, 2, 255]).unwrap();
        fs::write(src.join("img/.DS_Store"), "junk").unwrap();

        let entry = CopyEntry {
            src,
            dest: "/assets".into(),
        };
        (dir, entry)
    }

    #[test]
    fn test_copy_mirrors_tree() {
        let (dir, entry) = fixture();
        let out = dir.path().join("dist");

        let copied = copy_entry(&entry, &out, BuildMode::Development).unwrap();

        assert_eq!(copied, 4);
        let dest = out.join("assets");
        assert_eq!(fs::read_to_string(dest.join("robots.txt")).unwrap(), "User-agent: *\n");
        assert_eq!(fs::read_to_string(dest.join("img/logo.svg")).unwrap(), "<svg/>");
        assert_eq!(fs::read(dest.join("img/icons/a.png")).unwrap(), [0u8, 1, 2, 255]);
        assert!(!dest.join("img/.DS_Store").exists());
        // Development keeps JSON verbatim.
        assert_eq!(fs::read_to_string(dest.join("data.json")).unwrap(), PRETTY_JSON);
    }

    #[test]
    fn test_production_compacts_json() {
        let (dir, entry) = fixture();
        let out = dir.path().join("dist");

        copy_entry(&entry, &out, BuildMode::Production).unwrap();

        assert_eq!(
            fs::read_to_string(out.join("assets/data.json")).unwrap(),
            r#"{"zeta":1,"alpha":[1,2],"mid":{"b":true,"a":null}}"#
        );
        assert_eq!(
            fs::read_to_string(out.join("assets/robots.txt")).unwrap(),
            "User-agent: *\n"
        );
    }

    #[test]
    fn test_invalid_json_in_production_fails() {
        let (dir, entry) = fixture();
        fs::write(entry.src.join("broken.json"), "{ nope").unwrap();

        let err = copy_entry(&entry, &dir.path().join("dist"), BuildMode::Production).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }

    #[test]
    fn test_missing_source() {
        let dir = TempDir::new().unwrap();
        let entry = CopyEntry {
            src: dir.path().join("nope"),
            dest: "x".into(),
        };
        assert!(copy_entry(&entry, dir.path(), BuildMode::Development).is_err());
    }
}
