//! `tessera watch`: full pass, then incremental passes on change.
//!
//! ```text
//! notify → Debouncer (timing, dedup) → Session (tracked-file filter) → passes
//! ```
//!
//! Files the pipeline reported as dependencies trigger passes, and so does
//! every declared page and style source, so a file that broke the first
//! build is still watched. While the last full pass failed, any relevant
//! change retries a full pass instead of an incremental one.

mod debouncer;
mod dirs;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use anyhow::{Context, Result};
use rustc_hash::FxHashSet;

use super::PassArgs;
use super::common::Host;
use crate::compiler::Orchestrator;
use crate::config::PipelineConfig;
use crate::core::{BuildMode, is_shutdown, set_watching};
use crate::logger::{status_error, status_success};
use crate::{debug, log};
use debouncer::Debouncer;
use dirs::WatchDirs;

/// Longest wait between shutdown checks.
const POLL_MS: u64 = 200;

pub fn watch(config: PipelineConfig, args: &PassArgs, default_mode: BuildMode) -> Result<()> {
    let mut session = Session::new(config, args, default_mode)?;

    log!(
        "watch";
        "{} build into {}",
        session.host.mode.as_str(),
        session.config.root_relative(&session.host.output_dir).display()
    );
    session.full_pass();

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let _ = tx.send(res);
    })
    .context("failed to create file watcher")?;

    let mut dirs = WatchDirs::new();
    dirs.sync(&mut watcher, &session.watched_files());

    set_watching();
    log!(
        "watch";
        "watching {} files in {} directories",
        session.tracked.len(),
        dirs.len()
    );

    let mut debouncer = Debouncer::new();
    while !is_shutdown() {
        match rx.recv_timeout(debouncer.sleep_duration(Duration::from_millis(POLL_MS))) {
            Ok(Ok(event)) => debouncer.add_event(&event),
            Ok(Err(err)) => log!("watch"; "watcher error: {}", err),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(changes) = debouncer.take_if_ready()
            && session.on_changes(changes)
        {
            dirs.sync(&mut watcher, &session.watched_files());
        }
    }

    Ok(())
}

/// Pipeline state for the lifetime of one `watch` command.
struct Session {
    host: Host,
    config: Arc<PipelineConfig>,
    orchestrator: Orchestrator,
    /// Files whose change triggers a pass.
    tracked: FxHashSet<PathBuf>,
    /// Whether the last full pass succeeded.
    healthy: bool,
}

impl Session {
    fn new(config: PipelineConfig, args: &PassArgs, default_mode: BuildMode) -> Result<Self> {
        let host = Host::new(&config, args, default_mode);
        let config = Arc::new(config);
        let orchestrator = Orchestrator::new(Arc::clone(&config))?;
        let tracked = config.imports().into_iter().collect();

        Ok(Self {
            host,
            config,
            orchestrator,
            tracked,
            healthy: false,
        })
    }

    /// Run a full pass. Cleaning stays on until one succeeds.
    fn full_pass(&mut self) {
        let report = self.orchestrator.on_compilation_done(&self.host.full(&self.config));
        self.track(report.tracked);

        match report.outcome {
            Ok(summary) => {
                self.healthy = true;
                self.host.clean = false;
                status_success(&format!(
                    "built {} styles, {} pages",
                    summary.styles, summary.pages
                ));
            }
            Err(err) => {
                self.healthy = false;
                status_error("build failed", &format!("{err:#}"));
            }
        }
    }

    /// Handle one debounced batch. Returns whether any pass ran.
    fn on_changes(&mut self, changes: Vec<PathBuf>) -> bool {
        let relevant: Vec<PathBuf> = changes
            .into_iter()
            .filter(|path| self.tracked.contains(path))
            .collect();
        if relevant.is_empty() {
            return false;
        }

        if !self.healthy {
            debug!("watch"; "last full pass failed, retrying it");
            self.full_pass();
            return true;
        }

        for changed in &relevant {
            self.rebuild(changed);
        }
        true
    }

    fn rebuild(&mut self, changed: &Path) {
        let rel = self.config.root_relative(changed).display().to_string();
        let done = self.host.incremental(&self.config, changed);
        let report = self.orchestrator.on_compilation_done(&done);
        self.track(report.tracked);

        match report.outcome {
            Ok(summary) if summary.is_empty() => debug!("watch"; "nothing to rebuild for {}", rel),
            Ok(summary) => status_success(&format!(
                "{}: rebuilt {} styles, {} pages",
                rel, summary.styles, summary.pages
            )),
            Err(err) => status_error(&format!("{rel}: rebuild failed"), &format!("{err:#}")),
        }
    }

    /// Replace the tracked set with the pipeline's list plus declared sources.
    fn track(&mut self, files: Vec<PathBuf>) {
        self.tracked = files.into_iter().chain(self.config.imports()).collect();
    }

    fn watched_files(&self) -> Vec<PathBuf> {
        self.tracked.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    use crate::utils::path::normalize_path;

    struct Project {
        _temp: TempDir,
        root: PathBuf,
    }

    impl Project {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let root = normalize_path(temp.path());
            Self { _temp: temp, root }
        }

        fn write(&self, rel: &str, content: &str) -> PathBuf {
            let path = self.root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
            path
        }

        fn session(&self, config: &str) -> Session {
            let path = self.write("tessera.toml", config);
            let config = PipelineConfig::from_path(&path).unwrap();
            let args = PassArgs {
                output: None,
                mode: None,
                clean: false,
                manifest: None,
            };
            Session::new(config, &args, BuildMode::Development).unwrap()
        }
    }

    const CONFIG: &str = r#"
        [entry.global]
        styles = [{ import = "src/a.scss", filename = "css/a.css" }]

        [entry.index]
        import = "src/index.html"
        filename = "index.html"
    "#;

    #[test]
    fn test_broken_first_build_recovers_on_fix() {
        let project = Project::new();
        let style = project.write("src/a.scss", ".a { color: $missing; }");
        let page = project.write("src/index.html", "<html><head></head><body></body></html>");
        let mut session = project.session(CONFIG);

        session.full_pass();
        assert!(!session.healthy);
        assert!(session.tracked.contains(&style));
        assert!(session.tracked.contains(&page));
        assert!(!project.root.join("dist/index.html").exists());

        project.write("src/a.scss", ".a { color: red; }");
        assert!(session.on_changes(vec![style]));

        assert!(session.healthy);
        assert!(project.root.join("dist/css/a.css").exists());
        let html = fs::read_to_string(project.root.join("dist/index.html")).unwrap();
        assert!(html.contains("href=\"/css/a.css\""));
    }

    #[test]
    fn test_untracked_changes_are_ignored() {
        let project = Project::new();
        project.write("src/a.scss", ".a { color: red; }");
        project.write("src/index.html", "<html><head></head><body></body></html>");
        let mut session = project.session(CONFIG);
        session.full_pass();
        assert!(session.healthy);

        let other = project.write("src/notes.txt", "x");
        assert!(!session.on_changes(vec![other]));
    }

    #[test]
    fn test_tracked_change_runs_incremental_pass() {
        let project = Project::new();
        project.write("src/a.scss", ".a { color: red; }");
        let page = project.write("src/index.html", "<html><head></head><body>1</body></html>");
        let mut session = project.session(CONFIG);
        session.full_pass();
        fs::remove_file(project.root.join("dist/css/a.css")).unwrap();

        project.write("src/index.html", "<html><head></head><body>2</body></html>");
        assert!(session.on_changes(vec![page]));

        let html = fs::read_to_string(project.root.join("dist/index.html")).unwrap();
        assert!(html.contains("<body>2</body>"));
        assert!(!project.root.join("dist/css/a.css").exists());
    }
}
