//! Incremental build orchestration.
//!
//! One pass per "compilation finished" signal from the host:
//!
//! ```text
//! no changed files ─► Full        copies → every style → every page
//! changed file f   ─► Incremental DependencyIndex::used_by(f) → owning declarations
//! ```
//!
//! Styles run before pages in a full pass so every page sees the hashed
//! filenames of this pass. An incremental pass never cleans and never
//! revisits copy entries. Any error aborts the rest of the pass; files
//! written so far stay and both indexes keep their last good state.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use rustc_hash::FxHashSet;

use super::inject::{Injection, inject};
use super::style::{self, CompiledStyle};
use super::{DependencyIndex, IncludeBundler, StyleHashIndex, write_output};
use crate::asset::{copy_entry, minify_html};
use crate::config::{BundleEntry, Entry, PageTarget, PipelineConfig, StyleRef};
use crate::core::Compilation;
use crate::utils::path::output_path;
use crate::{debug, log};


/// Which kind of pass a signal triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassKind {
    Full,
    /// Triggered by the first changed file the host reported.
    Incremental(PathBuf),
}

impl PassKind {
    pub fn select(done: &Compilation) -> Self {
        match done.modified_files.as_deref().and_then(<[PathBuf]>::first) {
            Some(changed) => Self::Incremental(changed.clone()),
            None => Self::Full,
        }
    }
}

/// What a pass did, for status reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub styles: usize,
    pub pages: usize,
    pub copied: usize,
}

/// What the host gets back after a completion signal.
#[derive(Debug)]
pub struct PassReport {
    pub outcome: Result<PassSummary>,
    /// Every file in the dependency index after the pass, failed or not.
    pub tracked: Vec<PathBuf>,
}

impl PassSummary {
    pub fn is_empty(&self) -> bool {
        self.styles == 0 && self.pages == 0 && self.copied == 0
    }
}

/// Owns the dependency and hash indexes across passes.
pub struct Orchestrator {
    config: Arc<PipelineConfig>,
    bundler: IncludeBundler,
    deps: DependencyIndex,
    hashes: StyleHashIndex,
}

impl Orchestrator {
    pub fn new(config: Arc<PipelineConfig>) -> Result<Self> {
        let bundler = IncludeBundler::new(
            &config.include_prefix,
            &config.root,
            config.include_properties.clone(),
        )
        .with_context(|| format!("invalid include prefix `{}`", config.include_prefix))?;

        Ok(Self {
            config,
            bundler,
            deps: DependencyIndex::new(),
            hashes: StyleHashIndex::new(),
        })
    }

    #[cfg(test)]
    pub fn deps(&self) -> &DependencyIndex {
        &self.deps
    }

    #[cfg(test)]
    pub fn hashes(&self) -> &StyleHashIndex {
        &self.hashes
    }

    /// Handle one completion signal.
    ///
    /// A failed pass never escapes as an error: it is reported in the
    /// outcome, and the tracked list is returned either way so the host can
    /// keep watching everything recorded so far.
    pub fn on_compilation_done(&mut self, done: &Compilation) -> PassReport {
        let outcome = self.run_pass(done);
        PassReport {
            outcome,
            tracked: self.tracked_files(),
        }
    }

    /// Run one pass, reporting the first error that aborted it.
    fn run_pass(&mut self, done: &Compilation) -> Result<PassSummary> {
        match PassKind::select(done) {
            PassKind::Full => self.full_pass(done),
            PassKind::Incremental(changed) => self.incremental_pass(&changed, done),
        }
    }

    /// Every file tracked by the dependency index.
    fn tracked_files(&self) -> Vec<PathBuf> {
        self.deps.all_files()
    }

    // ------------------------------------------------------------------------
    // Passes
    // ------------------------------------------------------------------------

    fn full_pass(&mut self, done: &Compilation) -> Result<PassSummary> {
        let config = Arc::clone(&self.config);
        let mut summary = PassSummary::default();

        for entry in &config.entries {
            if let Some(copy) = entry.as_copy() {
                match copy_entry(copy, &done.output_dir, done.mode) {
                    Ok(count) => {
                        log!("copy"; "{} ({} files)", entry.name, count);
                        summary.copied += count;
                    }
                    Err(err) => log!("error"; "copy entry `{}`: {:#}", entry.name, err),
                }
            }
        }

        let mut cleaned = FxHashSet::default();
        for entry in &config.entries {
            let Some(bundle) = entry.as_bundle() else {
                continue;
            };
            for style in &bundle.styles {
                if done.clean {
                    clean_style_dir(style, &done.output_dir, &mut cleaned);
                }
                self.build_style(entry, style, done)?;
                summary.styles += 1;
            }
        }

        let shared = config.shared_injection();
        for entry in &config.entries {
            if let Some(bundle) = entry.as_bundle()
                && let Some(page) = &bundle.page
            {
                self.build_page(entry, bundle, page, shared, done)?;
                summary.pages += 1;
            }
        }

        Ok(summary)
    }

    fn incremental_pass(&mut self, changed: &Path, done: &Compilation) -> Result<PassSummary> {
        let config = Arc::clone(&self.config);
        let shared = config.shared_injection();
        let mut summary = PassSummary::default();

        let mains = self.deps.used_by(changed);
        if mains.is_empty() {
            debug!("build"; "`{}` is not a tracked dependency", changed.display());
        }

        for main in &mains {
            self.rebuild_main(main, &config, shared, done, &mut summary)?;
        }

        Ok(summary)
    }

    /// Re-run the first declaration whose import is `main`.
    fn rebuild_main(
        &mut self,
        main: &Path,
        config: &PipelineConfig,
        shared: Option<&BundleEntry>,
        done: &Compilation,
        summary: &mut PassSummary,
    ) -> Result<()> {
        for entry in &config.entries {
            let Some(bundle) = entry.as_bundle() else {
                continue;
            };

            if let Some(style) = bundle.styles.iter().find(|s| s.import == main) {
                self.build_style(entry, style, done)?;
                summary.styles += 1;
                return Ok(());
            }

            if let Some(page) = &bundle.page
                && page.import == main
            {
                self.build_page(entry, bundle, page, shared, done)?;
                summary.pages += 1;
                return Ok(());
            }
        }

        debug!("build"; "no entry declares `{}` anymore", main.display());
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Artifacts
    // ------------------------------------------------------------------------

    fn build_style(&mut self, entry: &Entry, style: &StyleRef, done: &Compilation) -> Result<()> {
        let compiled = style::compile(style, done.mode).with_context(|| {
            format!(
                "entry `{}`: style `{}`",
                entry.name,
                self.config.root_relative(&style.import).display()
            )
        })?;
        self.commit_style(style, &compiled);

        write_output(&done.output_dir, &compiled.filename, compiled.css.as_bytes());
        log!("style"; "{}", compiled.filename);
        Ok(())
    }

    /// Record a successful compile in both indexes.
    fn commit_style(&mut self, style: &StyleRef, compiled: &CompiledStyle) {
        if compiled.hashed {
            self.hashes.record(&style.import, compiled.filename.clone());
        }
        self.deps.record(&style.import, &compiled.files);
    }

    fn build_page(
        &mut self,
        entry: &Entry,
        bundle: &BundleEntry,
        page: &PageTarget,
        shared: Option<&BundleEntry>,
        done: &Compilation,
    ) -> Result<()> {
        let bundled = self.bundler.bundle(&page.import).with_context(|| {
            format!(
                "entry `{}`: page `{}`",
                entry.name,
                self.config.root_relative(&page.import).display()
            )
        })?;

        let mut html = if done.mode.is_production() {
            minify_html(&bundled.source, &self.config.html_minify)
        } else {
            bundled.source
        };

        let mut injection = Injection::default();
        if let Some(shared) = shared {
            injection.extend(&shared.styles, &shared.scripts);
        }
        injection.extend(&bundle.styles, &bundle.scripts);
        inject(&mut html, &injection, &self.hashes, &done.chunks);

        write_output(&done.output_dir, &page.filename, html.as_bytes());
        self.deps.record(&page.import, &bundled.files);

        log!("page"; "{}", page.filename);
        Ok(())
    }
}

/// Remove the directory a style is written to, once per pass per directory.
///
/// The output root itself is never removed.
fn clean_style_dir(style: &StyleRef, output_root: &Path, cleaned: &mut FxHashSet<PathBuf>) {
    let dest = output_path(output_root, &style.filename);
    let Some(dir) = dest.parent() else {
        return;
    };
    if dir == output_root || !cleaned.insert(dir.to_path_buf()) || !dir.exists() {
        return;
    }

    match fs::remove_dir_all(dir) {
        Ok(()) => debug!("clean"; "{}", dir.display()),
        Err(err) => log!("error"; "failed to clean `{}`: {}", dir.display(), err),
    }
}
