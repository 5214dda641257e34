//! The "compilation finished" signal the host hands to the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rustc_hash::FxHashMap;
use serde_json::Value;

use super::BuildMode;

/// One finished bundler pass, as seen by the pipeline.
#[derive(Debug, Clone)]
pub struct Compilation {
    /// Output directory chosen by the host (config `output_path` wins).
    pub output_dir: PathBuf,
    pub mode: BuildMode,
    /// Files modified since the previous pass. `None` or empty means the
    /// host has no change information and a full pass is required.
    pub modified_files: Option<Vec<PathBuf>>,
    /// Declared chunk name → emitted files.
    pub chunks: ChunkMap,
    /// Whether the host cleans its outputs before writing.
    pub clean: bool,
}

impl Compilation {
    pub fn new(output_dir: impl Into<PathBuf>, mode: BuildMode) -> Self {
        Self {
            output_dir: output_dir.into(),
            mode,
            modified_files: None,
            chunks: ChunkMap::default(),
            clean: false,
        }
    }

    pub fn with_modified(mut self, files: Vec<PathBuf>) -> Self {
        self.modified_files = Some(files);
        self
    }

    pub fn with_chunks(mut self, chunks: ChunkMap) -> Self {
        self.chunks = chunks;
        self
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }
}

// =============================================================================
// ChunkMap
// =============================================================================

/// Chunk name → files the bundler emitted for it, in emission order.
#[derive(Debug, Clone, Default)]
pub struct ChunkMap {
    chunks: FxHashMap<String, Vec<String>>,
}

impl ChunkMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, files: Vec<String>) {
        self.chunks.insert(name.into(), files);
    }

    /// Files emitted for `name`, if the chunk exists.
    pub fn files(&self, name: &str) -> Option<&[String]> {
        self.chunks.get(name).map(Vec::as_slice)
    }

    /// First emitted file of `name`; the only one that gets a tag.
    pub fn first_file(&self, name: &str) -> Option<&str> {
        self.files(name)?.first().map(String::as_str)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Overlay `other` on top of `self`; `other` wins on name clashes.
    pub fn merge(&mut self, other: ChunkMap) {
        self.chunks.extend(other.chunks);
    }

    /// Load a chunk manifest written by the bundler.
    ///
    /// Accepted shapes:
    /// - `{ "index": "js/index.js", "lib": ["js/lib.js", "js/lib.js.map"] }`
    /// - a stats file carrying the same object under `assetsByChunkName`
    pub fn from_manifest(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read chunk manifest `{}`", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("invalid chunk manifest `{}`", path.display()))?;
        Self::from_json(&value)
            .with_context(|| format!("invalid chunk manifest `{}`", path.display()))
    }

    /// Build from an already parsed manifest value.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = match value.get("assetsByChunkName") {
            Some(Value::Object(inner)) => inner,
            _ => match value {
                Value::Object(object) => object,
                _ => bail!("expected a JSON object of chunk names"),
            },
        };

        let mut chunks = Self::new();
        for (name, files) in object {
            chunks.insert(name.clone(), chunk_files(name, files)?);
        }
        Ok(chunks)
    }
}

fn chunk_files(name: &str, value: &Value) -> Result<Vec<String>> {
    match value {
        Value::String(file) => Ok(vec![file.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(file) => Ok(file.clone()),
                other => bail!("chunk `{name}` lists a non-string file: {other}"),
            })
            .collect(),
        other => bail!("chunk `{name}` must map to a file or a list of files, got {other}"),
    }
}
