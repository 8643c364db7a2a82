//! `dimg verify` – re-read an image and compare it with a saved report.

use anyhow::{Context, Result};
use dimg_core::config::DimgConfig;
use dimg_core::integrity::Conclusion;
use dimg_core::pipeline::reverify;
use std::path::Path;

use super::progress::spawn_progress_printer;
use super::{build_options, cancel_on_ctrl_c};
use crate::cli::report::{print_summary, ImageReport};

/// Verify pass only; the algorithms come from the report's copy digests.
pub async fn run_verify(cfg: &DimgConfig, report_path: &Path) -> Result<bool> {
    let report = ImageReport::load(report_path)?;
    println!(
        "Case {} ({}), imaged {} -> {}",
        report.case.case_id,
        report.case.examiner,
        report.source.display(),
        report.destination.display()
    );

    let mut options = build_options(cfg, Some(report.chunk_size), &[], false, false)?;
    let (progress_tx, progress_handle) = spawn_progress_printer();
    options.progress = Some(progress_tx);
    let ctrl_c = cancel_on_ctrl_c(options.abort.clone());

    let destination = report.destination.clone();
    let copy_digests = report.outcome.copy_digests().clone();
    let source_size = report.outcome.sizes().source_size;
    let result = tokio::task::spawn_blocking(move || {
        reverify(&destination, &copy_digests, source_size, &options)
    })
    .await
    .context("verify task panicked");
    ctrl_c.abort();
    let _ = progress_handle.await;
    let outcome = result??;

    print_summary(&report.source, &report.destination, &outcome);
    Ok(outcome.conclusion() != Conclusion::Failed)
}
