//! Pipeline configuration management for `tessera.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── entry.rs       # [entry.*] tables, decoded into Entry
//! ├── minify.rs      # [html_minify]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # config file lookup
//! └── mod.rs         # PipelineConfig (this file)
//! ```
//!
//! # Keys
//!
//! | Key                       | Purpose                                      |
//! |---------------------------|----------------------------------------------|
//! | `[entry.<name>]`          | Pages, style sheets, scripts, copied folders |
//! | `output_path`             | Overrides the host output directory          |
//! | `[html_minify]`           | Production HTML minifier options             |
//! | `html_include_prefix`     | Namespace of include directives              |
//! | `[html_include_properties]` | Global include properties                  |
//! | `chunk_manifest`          | Bundler chunk manifest (JSON)                |
//! | `[chunks]`                | Inline chunk → file(s) map                   |
//! | `clean`                   | Clean style output dirs on full passes       |

pub mod entry;
mod minify;
pub mod types;
mod util;

pub use entry::{
    AttrValue, BundleEntry, CopyEntry, Entry, Inject, PageTarget, ScriptRef, StyleRef,
};
pub use minify::HtmlMinifyOptions;
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};
pub use util::find_config_file;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use serde_json::Value;

use crate::core::ChunkMap;
use crate::log;
use crate::utils::path::{normalize_path, resolve_path};
use entry::{EntryTable, decode_entries};

/// Default namespace of include directives: `tessera.include("…")`.
pub const DEFAULT_INCLUDE_PREFIX: &str = "tessera";

// ============================================================================
// raw configuration (serde)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    entry: EntryTable,

    #[serde(alias = "outputPath")]
    output_path: Option<PathBuf>,

    #[serde(alias = "htmlMinifyOptions")]
    html_minify: HtmlMinifyOptions,

    #[serde(alias = "htmlIncludePrefixName")]
    html_include_prefix: Option<String>,

    #[serde(alias = "htmlIncludeProperties")]
    html_include_properties: FxHashMap<String, String>,

    #[serde(alias = "chunkManifest")]
    chunk_manifest: Option<PathBuf>,

    chunks: serde_json::Map<String, Value>,

    clean: bool,
}

// ============================================================================
// root configuration
// ============================================================================

/// Validated configuration with every path resolved against the project root.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Absolute path to the config file (empty when parsed from a string).
    pub config_path: PathBuf,
    /// Project root: parent of the config file.
    pub root: PathBuf,
    /// Entries in declaration order.
    pub entries: Vec<Entry>,
    pub output_path: Option<PathBuf>,
    pub html_minify: HtmlMinifyOptions,
    pub include_prefix: String,
    pub include_properties: FxHashMap<String, String>,
    pub chunk_manifest: Option<PathBuf>,
    /// Inline chunks; merged over the manifest by the host.
    pub chunks: ChunkMap,
    pub clean: bool,
}

impl PipelineConfig {
    /// Locate `config_name` (searching upward from cwd) and load it.
    pub fn load(config_name: &Path) -> Result<Self> {
        let path = find_config_file(config_name)
            .ok_or_else(|| ConfigError::NotFound(config_name.to_path_buf()))?;
        Self::from_path(&path)
    }

    /// Load configuration from a file path, warning about unknown fields.
    pub fn from_path(path: &Path) -> Result<Self> {
        let path = normalize_path(path);
        let content =
            fs::read_to_string(&path).map_err(|err| ConfigError::Io(path.clone(), err))?;

        let (raw, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, &path);
        }

        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut config = Self::from_raw(raw, &root)?;
        config.config_path = path;
        Ok(config)
    }

    /// Parse configuration from a TOML string, resolving paths against `root`.
    #[cfg(test)]
    pub fn from_str(content: &str, root: &Path) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Self::from_raw(raw, &normalize_path(root))
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(RawConfig, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let raw = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((raw, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} are ignored:", display_path);
        for field in fields {
            log!("warning"; "- {}", field);
        }
    }

    fn from_raw(raw: RawConfig, root: &Path) -> Result<Self> {
        let mut diag = ConfigDiagnostics::new();

        let entries = decode_entries(raw.entry, root, &mut diag);

        let include_prefix = match raw.html_include_prefix {
            None => DEFAULT_INCLUDE_PREFIX.to_string(),
            Some(prefix) if is_valid_prefix(&prefix) => prefix,
            Some(prefix) => {
                diag.error_with_hint(
                    FieldPath::new("html_include_prefix"),
                    format!("`{prefix}` is not a usable directive prefix"),
                    "use letters, digits, `_` or `-`",
                );
                DEFAULT_INCLUDE_PREFIX.to_string()
            }
        };

        let chunks = match ChunkMap::from_json(&Value::Object(raw.chunks)) {
            Ok(chunks) => chunks,
            Err(err) => {
                diag.error(FieldPath::new("chunks"), format!("{err:#}"));
                ChunkMap::new()
            }
        };

        diag.into_result().map_err(ConfigError::Diagnostics)?;

        Ok(Self {
            config_path: PathBuf::new(),
            root: root.to_path_buf(),
            entries,
            output_path: raw.output_path.map(|p| resolve_path(&p, root)),
            html_minify: raw.html_minify,
            include_prefix,
            include_properties: raw.html_include_properties,
            chunk_manifest: raw.chunk_manifest.map(|p| resolve_path(&p, root)),
            chunks,
            clean: raw.clean,
        })
    }

    /// The shared-injection source, if the config declares one.
    pub fn shared_injection(&self) -> Option<&BundleEntry> {
        self.entries
            .iter()
            .find(|entry| entry.is_shared_injection())
            .and_then(Entry::as_bundle)
    }

    /// Page and style sources declared by bundle entries, in declaration
    /// order, without duplicates.
    pub fn imports(&self) -> Vec<PathBuf> {
        let mut seen = FxHashSet::default();
        self.entries
            .iter()
            .filter_map(Entry::as_bundle)
            .flat_map(|bundle| {
                bundle
                    .styles
                    .iter()
                    .map(|style| &style.import)
                    .chain(bundle.page.as_ref().map(|page| &page.import))
            })
            .filter(|import| seen.insert(*import))
            .cloned()
            .collect()
    }

    /// Chunk map for a pass: the manifest (if any) with inline chunks on top.
    pub fn load_chunks(&self, manifest: Option<&Path>) -> Result<ChunkMap> {
        let mut chunks = match manifest.or(self.chunk_manifest.as_deref()) {
            Some(path) => ChunkMap::from_manifest(path)?,
            None => ChunkMap::new(),
        };
        chunks.merge(self.chunks.clone());
        Ok(chunks)
    }

    /// Get path relative to the project root, for display.
    pub fn root_relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Output directory, preferring the configured `output_path`.
    pub fn output_dir(&self, host_default: &Path) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| resolve_path(host_default, &self.root))
    }
}

fn is_valid_prefix(prefix: &str) -> bool {
    !prefix.is_empty()
        && prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
