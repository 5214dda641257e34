//! Template includes.
//!
//! Expands nested include directives in an HTML document into one flat text,
//! recording every file read along the way. With the default prefix:
//!
//! ```html
//! <body>
//!   tessera.include("partials/nav.html")
//!   tessera.include("/src/html/card.html", {"title": "Hello"})
//!   <footer>tessera.prop("copyright")</footer>
//! </body>
//! ```
//!
//! - A path starting with `/` (or `\`) resolves against the project root,
//!   any other path against the including file's directory.
//! - The optional JSON object overrides properties for that include and
//!   everything it includes in turn.
//! - Properties are substituted in a file before its includes are expanded,
//!   so included text is never substituted twice.

use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use super::CompileError;
use crate::utils::path::normalize_path;

/// Include properties: name → value.
pub type Properties = FxHashMap<String, String>;

/// Flattened document plus every file read to produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleResult {
    pub source: String,
    /// Root document first, then includes in first-read order, no duplicates.
    pub files: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct IncludeBundler {
    root: PathBuf,
    properties: Properties,
    include_re: Regex,
    prop_re: Regex,
}

/// Bookkeeping for one `bundle` call.
#[derive(Default)]
struct Walk {
    files: Vec<PathBuf>,
    seen: FxHashSet<PathBuf>,
    stack: Vec<PathBuf>,
}

impl IncludeBundler {
    /// Build a bundler for directives named `prefix.include` / `prefix.prop`.
    pub fn new(prefix: &str, root: &Path, properties: Properties) -> Result<Self, regex::Error> {
        let prefix = regex::escape(prefix);
        let ws = "[ \t\r\n]*";
        let include_re = Regex::new(&format!(
            r#"{prefix}\.include\({ws}"([^"]*)"{ws}(?:,{ws}(\{{[^}}]*\}}){ws})?\)"#
        ))?;
        let prop_re = Regex::new(&format!(r#"{prefix}\.prop\({ws}"([^"]*)"{ws}\)"#))?;

        Ok(Self {
            root: root.to_path_buf(),
            properties,
            include_re,
            prop_re,
        })
    }

    /// Expand `document` and everything it includes.
    pub fn bundle(&self, document: &Path) -> Result<BundleResult, CompileError> {
        let document = normalize_path(document);
        let mut walk = Walk::default();
        let source = self.expand(&document, &self.properties, &mut walk)?;

        Ok(BundleResult {
            source,
            files: walk.files,
        })
    }

    fn expand(
        &self,
        file: &Path,
        props: &Properties,
        walk: &mut Walk,
    ) -> Result<String, CompileError> {
        if walk.stack.iter().any(|p| p == file) {
            let mut chain = walk.stack.clone();
            chain.push(file.to_path_buf());
            return Err(CompileError::Cycle(chain));
        }

        let text =
            fs::read_to_string(file).map_err(|err| CompileError::Read(file.to_path_buf(), err))?;
        if walk.seen.insert(file.to_path_buf()) {
            walk.files.push(file.to_path_buf());
        }

        let text = self.substitute_props(&text, props, file)?;

        walk.stack.push(file.to_path_buf());
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in self.include_re.captures_iter(&text) {
            let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);

            let props = match caps.get(2) {
                Some(local) => Cow::Owned(merge_props(props, local.as_str(), file)?),
                None => Cow::Borrowed(props),
            };
            let target_path = self.resolve(target.as_str(), file)?;
            out.push_str(&self.expand(&target_path, &props, walk)?);

            last = whole.end();
        }
        out.push_str(&text[last..]);
        walk.stack.pop();

        Ok(out)
    }

    fn substitute_props(
        &self,
        text: &str,
        props: &Properties,
        file: &Path,
    ) -> Result<String, CompileError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in self.prop_re.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = props
                .get(name.as_str())
                .ok_or_else(|| CompileError::UnknownProperty {
                    name: name.as_str().to_string(),
                    file: file.to_path_buf(),
                })?;
            out.push_str(&text[last..whole.start()]);
            out.push_str(value);
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }

    fn resolve(&self, target: &str, includer: &Path) -> Result<PathBuf, CompileError> {
        let path = if target.starts_with(['/', '\\']) {
            self.root.join(target.trim_start_matches(['/', '\\']))
        } else {
            includer
                .parent()
                .map_or_else(|| PathBuf::from(target), |dir| dir.join(target))
        };

        if !path.is_file() {
            return Err(CompileError::Resolution {
                target: target.to_string(),
                includer: includer.to_path_buf(),
            });
        }
        Ok(normalize_path(&path))
    }
}

fn merge_props(base: &Properties, local: &str, file: &Path) -> Result<Properties, CompileError> {
    let local: Properties =
        serde_json::from_str(local).map_err(|err| CompileError::IncludeProperties {
            file: file.to_path_buf(),
            reason: err.to_string(),
        })?;

    let mut merged = base.clone();
    merged.extend(local);
    Ok(merged)
}
