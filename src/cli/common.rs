//! The host side shared by `build` and `watch`.
//!
//! Plays the role of the module bundler: it decides the output directory,
//! mode and chunk map, and hands the pipeline one completion signal per pass.

use std::path::{Path, PathBuf};

use super::PassArgs;
use crate::config::PipelineConfig;
use crate::core::{BuildMode, Compilation};
use crate::log;

/// Output directory used when neither `-o` nor `output_path` is set.
pub const DEFAULT_OUTPUT: &str = "dist";

/// Settings fixed for the lifetime of a command.
#[derive(Debug, Clone)]
pub struct Host {
    pub output_dir: PathBuf,
    pub mode: BuildMode,
    /// Whether full passes clean style output directories.
    pub clean: bool,
    manifest: Option<PathBuf>,
}

impl Host {
    pub fn new(config: &PipelineConfig, args: &PassArgs, default_mode: BuildMode) -> Self {
        let cli_output = args.output.as_deref().unwrap_or(Path::new(DEFAULT_OUTPUT));
        Self {
            output_dir: config.output_dir(cli_output),
            mode: args.mode.unwrap_or(default_mode),
            clean: args.clean || config.clean,
            manifest: args.manifest.clone(),
        }
    }

    /// Signal for a full pass.
    pub fn full(&self, config: &PipelineConfig) -> Compilation {
        self.base(config).with_clean(self.clean)
    }

    /// Signal for an incremental pass triggered by `changed`.
    pub fn incremental(&self, config: &PipelineConfig, changed: &Path) -> Compilation {
        self.base(config).with_modified(vec![changed.to_path_buf()])
    }

    /// Chunks are re-read for every pass since the bundler rewrites them.
    ///
    /// An unreadable manifest only costs the script tags: the pass still
    /// runs with the inline `chunks`.
    fn base(&self, config: &PipelineConfig) -> Compilation {
        let chunks = config
            .load_chunks(self.manifest.as_deref())
            .unwrap_or_else(|err| {
                log!("error"; "{:#}, using inline chunks only", err);
                config.chunks.clone()
            });
        Compilation::new(&self.output_dir, self.mode).with_chunks(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(output: Option<&str>, mode: Option<BuildMode>, clean: bool) -> PassArgs {
        PassArgs {
            output: output.map(PathBuf::from),
            mode,
            clean,
            manifest: None,
        }
    }

    const ENTRY: &str = "[entry.index]\nimport = \"a.html\"\nfilename = \"a.html\"\n";

    #[test]
    fn test_host_defaults() {
        let config = PipelineConfig::from_str(ENTRY, Path::new("/site")).unwrap();
        let host = Host::new(&config, &args(None, None, false), BuildMode::Production);

        assert_eq!(host.output_dir, PathBuf::from("/site/dist"));
        assert_eq!(host.mode, BuildMode::Production);
        assert!(!host.clean);
    }

    #[test]
    fn test_config_output_path_wins() {
        let config =
            PipelineConfig::from_str(&format!("output_path = \"www\"\n{ENTRY}"), Path::new("/site"))
                .unwrap();
        let host = Host::new(
            &config,
            &args(Some("public"), Some(BuildMode::Development), true),
            BuildMode::Production,
        );

        assert_eq!(host.output_dir, PathBuf::from("/site/www"));
        assert_eq!(host.mode, BuildMode::Development);
        assert!(host.clean);
    }

    #[test]
    fn test_signals() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("chunks.json"), r#"{"index": "js/index.js"}"#).unwrap();
        let config = PipelineConfig::from_str(
            &format!("chunk_manifest = \"chunks.json\"\n{ENTRY}"),
            dir.path(),
        )
        .unwrap();
        let host = Host::new(&config, &args(None, None, true), BuildMode::Development);

        let full = host.full(&config);
        assert!(full.clean);
        assert!(full.modified_files.is_none());
        assert_eq!(full.chunks.first_file("index"), Some("js/index.js"));

        let changed = PathBuf::from("/site/a.html");
        let incremental = host.incremental(&config, &changed);
        assert!(!incremental.clean);
        assert_eq!(incremental.modified_files, Some(vec![changed]));
    }

    #[test]
    fn test_missing_manifest_falls_back_to_inline_chunks() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::from_str(
            &format!(
                "chunk_manifest = \"dist/chunks.json\"\n[chunks]\nvendor = \"js/vendor.js\"\n{ENTRY}"
            ),
            dir.path(),
        )
        .unwrap();
        let host = Host::new(&config, &args(None, None, false), BuildMode::Production);

        let full = host.full(&config);
        assert_eq!(full.chunks.first_file("vendor"), Some("js/vendor.js"));
        assert!(full.chunks.first_file("index").is_none());

        fs::write(dir.path().join("chunks.json"), "not json").unwrap();
        let host = Host {
            manifest: Some(dir.path().join("chunks.json")),
            ..host
        };
        let incremental = host.incremental(&config, Path::new("/site/a.html"));
        assert_eq!(incremental.chunks.len(), 1);
    }
}
