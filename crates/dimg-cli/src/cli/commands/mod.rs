//! CLI command handlers, one file per command.

mod checksum;
mod completions;
mod image;
mod progress;
mod verify;

pub use checksum::run_checksum;
pub use completions::run_completions;
pub use image::{run_image, ImageRequest};
pub use verify::run_verify;

use anyhow::Result;
use dimg_core::config::DimgConfig;
use dimg_core::control::AbortToken;
use dimg_core::digest::{AlgorithmSet, DigestAlgorithm};
use dimg_core::pipeline::ImageOptions;
use tokio::task::JoinHandle;

/// Config values with command-line overrides applied.
///
/// Empty `algorithms` keeps the configured set; the flags can only turn
/// read-ahead and sync off.
pub(crate) fn build_options(
    cfg: &DimgConfig,
    chunk_size: Option<usize>,
    algorithms: &[DigestAlgorithm],
    no_read_ahead: bool,
    no_sync: bool,
) -> Result<ImageOptions> {
    let mut options = cfg.to_options()?;
    if let Some(size) = chunk_size {
        options.chunk_size = size;
    }
    if !algorithms.is_empty() {
        options.algorithms = AlgorithmSet::new(algorithms.iter().copied())?;
    }
    options.read_ahead &= !no_read_ahead;
    options.sync_destination &= !no_sync;
    options.validate()?;
    Ok(options)
}

/// Request cancellation on the first Ctrl-C. Abort the returned handle once
/// the guarded work is over.
pub(crate) fn cancel_on_ctrl_c(abort: AbortToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!();
            eprintln!("Interrupt received, stopping at the next chunk boundary...");
            tracing::warn!("cancellation requested from terminal");
            abort.request();
        }
    })
}
