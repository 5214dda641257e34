//! Style sheet compilation.
//!
//! SCSS goes through grass with a filesystem wrapper that records every file
//! the preprocessor reads. Production output is then vendor-prefixed and
//! minified, and a content hash is substituted into the filename when the
//! pattern asks for one.
//!
//! Compiling is pure: nothing is written and no index is touched here. The
//! orchestrator commits a [`CompiledStyle`] only after it was produced
//! successfully.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use super::CompileError;
use crate::asset::minify_css;
use crate::config::StyleRef;
use crate::core::BuildMode;
use crate::utils::hash::fingerprint;
use crate::utils::path::normalize_path;

/// Placeholders replaced by the content hash in a style filename.
pub const HASH_PLACEHOLDERS: [&str; 2] = ["[contenthash]", "[hash]"];

/// Output of one successful style compile.
#[derive(Debug, Clone)]
pub struct CompiledStyle {
    pub css: String,
    /// Root style first, then every partial the preprocessor read.
    pub files: Vec<PathBuf>,
    /// Concrete output filename, relative to the output root.
    pub filename: String,
    /// Whether `filename` came from a hash pattern.
    pub hashed: bool,
}

pub fn has_hash_placeholder(pattern: &str) -> bool {
    HASH_PLACEHOLDERS.iter().any(|p| pattern.contains(p))
}

/// Replace every placeholder occurrence in `pattern` with `hash`.
pub fn substitute_hash(pattern: &str, hash: &str) -> String {
    HASH_PLACEHOLDERS
        .iter()
        .fold(pattern.to_string(), |name, placeholder| {
            name.replace(placeholder, hash)
        })
}

/// Compile one style entry point.
pub fn compile(style: &StyleRef, mode: BuildMode) -> Result<CompiledStyle, CompileError> {
    let recorder = RecordingFs::default();
    let output_style = if mode.is_production() {
        grass::OutputStyle::Compressed
    } else {
        grass::OutputStyle::Expanded
    };
    let options = grass::Options::default()
        .style(output_style)
        .fs(&recorder)
        .quiet(true);

    let css = grass::from_path(&style.import, &options).map_err(|err| CompileError::Style {
        path: style.import.clone(),
        message: err.to_string(),
    })?;

    let css = if mode.is_production() {
        minify_css(&css).map_err(|message| CompileError::PostProcess {
            path: style.import.clone(),
            message,
        })?
    } else {
        css
    };

    let hashed = has_hash_placeholder(&style.filename);
    let filename = if hashed {
        substitute_hash(&style.filename, &fingerprint(&css))
    } else {
        style.filename.clone()
    };

    Ok(CompiledStyle {
        files: recorder.into_files(&style.import),
        css,
        filename,
        hashed,
    })
}

/// `grass::Fs` over the real filesystem that remembers successful reads.
#[derive(Debug, Default)]
struct RecordingFs {
    reads: RefCell<Vec<PathBuf>>,
}

impl RecordingFs {
    /// Recorded reads with the root style first, normalized and deduplicated.
    fn into_files(self, root: &Path) -> Vec<PathBuf> {
        let mut seen = FxHashSet::default();
        std::iter::once(root.to_path_buf())
            .chain(self.reads.into_inner())
            .map(|p| normalize_path(&p))
            .filter(|p| seen.insert(p.clone()))
            .collect()
    }
}

impl grass::Fs for RecordingFs {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let bytes = fs::read(path)?;
        self.reads.borrow_mut().push(path.to_path_buf());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path.canonicalize().unwrap()
    }

    fn style(import: PathBuf, filename: &str) -> StyleRef {
        StyleRef {
            import,
            filename: filename.to_string(),
        }
    }

    #[test]
    fn test_placeholders() {
        assert!(has_hash_placeholder("css/[contenthash].css"));
        assert!(has_hash_placeholder("[hash].css"));
        assert!(!has_hash_placeholder("css/app.css"));
        assert_eq!(
            substitute_hash("[hash]/[contenthash]-[hash].css", "abc"),
            "abc/abc-abc.css"
        );
    }

    #[test]
    fn test_compile_collects_partials() {
        let dir = TempDir::new().unwrap();
        let main = write(
            dir.path(),
            "scss/app.scss",
            "@import 'partials/colors';\n.a { color: $primary; }\n",
        );
        let partial = write(dir.path(), "scss/partials/_colors.scss", "$primary: red;\n");

        let compiled = compile(&style(main.clone(), "css/app.css"), BuildMode::Development).unwrap();

        assert!(compiled.css.contains("color: red"), "{}", compiled.css);
        assert_eq!(compiled.files, vec![main, partial]);
        assert_eq!(compiled.filename, "css/app.css");
        assert!(!compiled.hashed);
    }

    #[test]
    fn test_hashed_filename_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let a = write(dir.path(), "a.scss", ".a { color: blue; }");
        let b = write(dir.path(), "b.scss", ".a { color: blue; }");
        let c = write(dir.path(), "c.scss", ".a { color: green; }");

        let pattern = "css/[contenthash].css";
        let first = compile(&style(a, pattern), BuildMode::Production).unwrap();
        let second = compile(&style(b, pattern), BuildMode::Production).unwrap();
        let third = compile(&style(c, pattern), BuildMode::Production).unwrap();

        assert!(first.hashed);
        assert_eq!(first.filename, second.filename);
        assert_ne!(first.filename, third.filename);
        assert_eq!(first.filename, format!("css/{}.css", fingerprint(&first.css)));
        assert_eq!(first.filename.len(), "css/.css".len() + 12);
    }

    #[test]
    fn test_production_prefixes_and_minifies() {
        let dir = TempDir::new().unwrap();
        let main = write(
            dir.path(),
            "app.scss",
            ".box {\n  .inner { user-select: none; }\n}\n",
        );

        let compiled = compile(&style(main, "app.css"), BuildMode::Production).unwrap();
        assert!(compiled.css.contains(".box .inner{"), "{}", compiled.css);
        assert!(compiled.css.contains("-webkit-user-select:none"));
        assert!(!compiled.css.contains('\n'));
    }

    #[test]
    fn test_syntax_error() {
        let dir = TempDir::new().unwrap();
        let main = write(dir.path(), "broken.scss", ".a { color: $undefined; }");

        let err = compile(&style(main, "broken.css"), BuildMode::Development).unwrap_err();
        assert!(matches!(err, CompileError::Style { .. }));
    }
}
