//! `tessera build`: one full pass.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use super::PassArgs;
use super::common::Host;
use crate::compiler::Orchestrator;
use crate::config::PipelineConfig;
use crate::core::BuildMode;
use crate::{debug, log};

/// Run a full pass. Pass errors are logged, not returned.
pub fn build(config: PipelineConfig, args: &PassArgs, default_mode: BuildMode) -> Result<()> {
    let host = Host::new(&config, args, default_mode);
    let config = Arc::new(config);
    let mut orchestrator = Orchestrator::new(Arc::clone(&config))?;

    log!(
        "build";
        "{} build into {}",
        host.mode.as_str(),
        config.root_relative(&host.output_dir).display()
    );

    let started = Instant::now();
    let report = orchestrator.on_compilation_done(&host.full(&config));
    match report.outcome {
        Ok(summary) => log!(
            "build";
            "done in {:.2?}: {} styles, {} pages, {} files copied",
            started.elapsed(),
            summary.styles,
            summary.pages,
            summary.copied
        ),
        Err(err) => log!("error"; "{:#}", err),
    }

    debug!("build"; "{} tracked files", report.tracked.len());
    Ok(())
}
