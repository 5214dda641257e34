//! `[entry.*]` tables.
//!
//! Entries are decoded in two steps: serde reads every table into a
//! permissive [`RawEntry`], then [`decode_entries`] turns each one into a
//! tagged [`EntryKind`] and reports every malformed shape through
//! [`ConfigDiagnostics`] instead of skipping it.
//!
//! ```toml
//! [entry.global]                      # shared styles/scripts for every page
//! styles = [{ import = "src/scss/global.scss", filename = "css/[contenthash].css" }]
//! scripts = [{ name = "lib", inject = "head" }]
//!
//! [entry.index]                       # page entry
//! import = "src/html/index.html"
//! filename = "index.html"
//! scripts = [{ name = "index", attributes = { id = "app", defer = true } }]
//!
//! [entry.images]                      # copy entry
//! src_path = "src/images"
//! dest_path = "/images"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

use super::types::{ConfigDiagnostics, FieldPath};
use crate::utils::path::resolve_path;

/// Entry key whose styles and scripts are injected into every page.
pub const GLOBAL_ENTRY: &str = "global";

// ============================================================================
// Decoded entries
// ============================================================================

/// One named build target.
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
}

#[derive(Debug, Clone)]
pub enum EntryKind {
    /// Page and/or style sheets plus script chunks.
    Bundle(BundleEntry),
    /// Folder mirrored into the output directory.
    Copy(CopyEntry),
}

impl Entry {
    pub fn as_bundle(&self) -> Option<&BundleEntry> {
        match &self.kind {
            EntryKind::Bundle(bundle) => Some(bundle),
            EntryKind::Copy(_) => None,
        }
    }

    pub fn as_copy(&self) -> Option<&CopyEntry> {
        match &self.kind {
            EntryKind::Copy(copy) => Some(copy),
            EntryKind::Bundle(_) => None,
        }
    }

    /// Whether this is the shared-injection source: a `global` bundle
    /// without a page of its own.
    pub fn is_shared_injection(&self) -> bool {
        self.name == GLOBAL_ENTRY && self.as_bundle().is_some_and(|b| b.page.is_none())
    }
}

#[derive(Debug, Clone, Default)]
pub struct BundleEntry {
    pub page: Option<PageTarget>,
    pub styles: Vec<StyleRef>,
    pub scripts: Vec<ScriptRef>,
}

/// HTML root document and the output-relative file it is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTarget {
    pub import: PathBuf,
    pub filename: String,
}

/// Style entry point and its output filename pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRef {
    pub import: PathBuf,
    /// May contain a hash placeholder, see [`crate::compiler::style`].
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRef {
    pub name: String,
    pub inject: Inject,
    /// Rendered onto the `<script>` tag in declaration order.
    pub attributes: Vec<(String, AttrValue)>,
}

/// Where a script tag lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Inject {
    Head,
    #[default]
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Flag(bool),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyEntry {
    pub src: PathBuf,
    /// Output-relative destination directory.
    pub dest: String,
}

// ============================================================================
// Raw entries (serde)
// ============================================================================

/// Any entry table, before its kind is known.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawEntry {
    import: Option<PathBuf>,
    filename: Option<String>,
    styles: Option<Vec<RawStyle>>,
    #[serde(alias = "jschunks")]
    scripts: Option<Vec<RawScript>>,
    #[serde(alias = "srcPath")]
    src_path: Option<PathBuf>,
    #[serde(alias = "destPath")]
    dest_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStyle {
    import: Option<PathBuf>,
    filename: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawScript {
    name: Option<String>,
    inject: Option<String>,
    attributes: serde_json::Map<String, Value>,
}

/// The `[entry]` table in declaration order.
#[derive(Debug, Default)]
pub struct EntryTable(pub Vec<(String, RawEntry)>);

impl<'de> Deserialize<'de> for EntryTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryTableVisitor;

        impl<'de> Visitor<'de> for EntryTableVisitor {
            type Value = EntryTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of named entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<EntryTable, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, entry)) = map.next_entry::<String, RawEntry>()? {
                    entries.push((name, entry));
                }
                Ok(EntryTable(entries))
            }
        }

        deserializer.deserialize_map(EntryTableVisitor)
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode every raw entry, resolving source paths against `root`.
///
/// Problems are pushed to `diag`; the returned list only holds entries that
/// decoded cleanly.
pub fn decode_entries(
    table: EntryTable,
    root: &Path,
    diag: &mut ConfigDiagnostics,
) -> Vec<Entry> {
    let field = FieldPath::new("entry");
    if table.0.is_empty() {
        diag.error_with_hint(
            field,
            "no entries configured",
            "add at least one `[entry.<name>]` table",
        );
        return Vec::new();
    }

    table
        .0
        .into_iter()
        .filter_map(|(name, raw)| {
            let field = field.child(&name);
            let kind = decode_entry(raw, &field, root, diag)?;
            Some(Entry { name, kind })
        })
        .collect()
}

fn decode_entry(
    raw: RawEntry,
    field: &FieldPath,
    root: &Path,
    diag: &mut ConfigDiagnostics,
) -> Option<EntryKind> {
    let is_copy = raw.src_path.is_some() || raw.dest_path.is_some();
    let is_bundle = raw.import.is_some()
        || raw.filename.is_some()
        || raw.styles.is_some()
        || raw.scripts.is_some();

    match (is_copy, is_bundle) {
        (true, true) => {
            diag.error_with_hint(
                field.clone(),
                "mixes copy fields (`src_path`, `dest_path`) with page fields",
                "split it into a copy entry and a page entry",
            );
            None
        }
        (true, false) => decode_copy(raw, field, root, diag).map(EntryKind::Copy),
        (false, true) => decode_bundle(raw, field, root, diag).map(EntryKind::Bundle),
        (false, false) => {
            diag.error_with_hint(
                field.clone(),
                "empty entry",
                "set `import`/`filename`, `styles`, `scripts`, or `src_path`/`dest_path`",
            );
            None
        }
    }
}

fn decode_copy(
    raw: RawEntry,
    field: &FieldPath,
    root: &Path,
    diag: &mut ConfigDiagnostics,
) -> Option<CopyEntry> {
    match (raw.src_path, raw.dest_path) {
        (Some(src), Some(dest)) => Some(CopyEntry {
            src: resolve_path(&src, root),
            dest,
        }),
        (Some(_), None) => {
            diag.error(field.child("dest_path"), "copy entry needs a destination directory");
            None
        }
        (None, _) => {
            diag.error(field.child("src_path"), "copy entry needs a source directory");
            None
        }
    }
}

fn decode_bundle(
    raw: RawEntry,
    field: &FieldPath,
    root: &Path,
    diag: &mut ConfigDiagnostics,
) -> Option<BundleEntry> {
    let before = diag.len();

    let page = match (raw.import, raw.filename) {
        (Some(import), Some(filename)) if !filename.trim().is_empty() => Some(PageTarget {
            import: resolve_path(&import, root),
            filename,
        }),
        (Some(_), _) => {
            diag.error(field.child("filename"), "page entry needs an output filename");
            None
        }
        (None, Some(_)) => {
            diag.error(field.child("import"), "page entry needs an HTML source to import");
            None
        }
        (None, None) => None,
    };

    let styles_field = field.child("styles");
    let styles = raw
        .styles
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(i, style)| decode_style(style, &styles_field.index(i), root, diag))
        .collect();

    let scripts_field = field.child("scripts");
    let scripts = raw
        .scripts
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(i, script)| decode_script(script, &scripts_field.index(i), diag))
        .collect();

    (diag.len() == before).then_some(BundleEntry {
        page,
        styles,
        scripts,
    })
}

fn decode_style(
    raw: RawStyle,
    field: &FieldPath,
    root: &Path,
    diag: &mut ConfigDiagnostics,
) -> Option<StyleRef> {
    let import = raw.import.filter(|p| !p.as_os_str().is_empty());
    let filename = raw.filename.filter(|f| !f.trim().is_empty());

    match (import, filename) {
        (Some(import), Some(filename)) => Some(StyleRef {
            import: resolve_path(&import, root),
            filename,
        }),
        (import, filename) => {
            if import.is_none() {
                diag.error(field.child("import"), "style needs a source file to import");
            }
            if filename.is_none() {
                diag.error_with_hint(
                    field.child("filename"),
                    "style needs an output filename",
                    "e.g. `filename = \"css/[contenthash].css\"`",
                );
            }
            None
        }
    }
}

fn decode_script(
    raw: RawScript,
    field: &FieldPath,
    diag: &mut ConfigDiagnostics,
) -> Option<ScriptRef> {
    let before = diag.len();

    let name = raw.name.filter(|n| !n.trim().is_empty());
    if name.is_none() {
        diag.error(field.child("name"), "script needs the name of a bundler chunk");
    }

    let inject = match raw.inject.as_deref() {
        None | Some("body") => Inject::Body,
        Some("head") => Inject::Head,
        Some(other) => {
            diag.error_with_hint(
                field.child("inject"),
                format!("unknown injection point `{other}`"),
                "use `head` or `body`",
            );
            Inject::Body
        }
    };

    let attr_field = field.child("attributes");
    let mut attributes = Vec::with_capacity(raw.attributes.len());
    for (key, value) in raw.attributes {
        match value {
            Value::Bool(flag) => attributes.push((key, AttrValue::Flag(flag))),
            Value::String(text) => attributes.push((key, AttrValue::Text(text))),
            other => diag.error(
                attr_field.child(&key),
                format!("attribute must be a string or a boolean, got `{other}`"),
            ),
        }
    }

    let name = name?;
    (diag.len() == before).then_some(ScriptRef {
        name,
        inject,
        attributes,
    })
}
