//! `dimg image` – acquire an image, verify it and report.

use anyhow::{Context, Result};
use dimg_core::config::DimgConfig;
use dimg_core::digest::DigestAlgorithm;
use dimg_core::integrity::Conclusion;
use dimg_core::pipeline::run_image_and_verify;
use std::path::PathBuf;

use super::progress::spawn_progress_printer;
use super::{build_options, cancel_on_ctrl_c};
use crate::cli::report::{print_summary, CaseInfo, ImageReport};
use crate::cli::CaseArgs;

/// Arguments of `dimg image`, as parsed.
#[derive(Debug)]
pub struct ImageRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub chunk_size: Option<usize>,
    pub algorithms: Vec<DigestAlgorithm>,
    pub no_read_ahead: bool,
    pub no_sync: bool,
    pub report: Option<PathBuf>,
    pub case: CaseArgs,
}

/// Returns whether the image verified (by size and hash, or by hash only).
pub async fn run_image(cfg: &DimgConfig, req: ImageRequest) -> Result<bool> {
    let mut options = build_options(
        cfg,
        req.chunk_size,
        &req.algorithms,
        req.no_read_ahead,
        req.no_sync,
    )?;
    let chunk_size = options.chunk_size;
    let (progress_tx, progress_handle) = spawn_progress_printer();
    options.progress = Some(progress_tx);
    let ctrl_c = cancel_on_ctrl_c(options.abort.clone());

    let source = req.source.clone();
    let destination = req.destination.clone();
    let result =
        tokio::task::spawn_blocking(move || run_image_and_verify(&source, &destination, &options))
            .await
            .context("imaging task panicked");
    ctrl_c.abort();
    let _ = progress_handle.await;
    let outcome = result??;

    print_summary(&req.source, &req.destination, &outcome);

    let verified = outcome.conclusion() != Conclusion::Failed;
    if let Some(report_path) = &req.report {
        let report = ImageReport::new(
            CaseInfo::from(req.case),
            &req.source,
            &req.destination,
            chunk_size,
            outcome,
        );
        report.save(report_path)?;
        println!("Report written to {}", report_path.display());
    }
    Ok(verified)
}
