//! Verify pass: re-read the destination and recompute its digests.
//!
//! Always opens a fresh handle with a fresh accumulator; nothing from the copy
//! pass is reused, so a digesting bug in the copy path cannot mask itself.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::digest::{AlgorithmSet, DigestAccumulator, DigestMap};
use crate::error::ImageError;
use crate::stream::{self, ChunkReader};

use super::progress::ProgressEmitter;
use super::pump::pump;
use super::{ImageOptions, Phase};

/// Result of a completed verify pass.
#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub digests: DigestMap,
    pub bytes_verified: u64,
    pub chunks: u64,
    pub elapsed: Duration,
}

/// Stream `path` through a new accumulator configured with
/// `options.algorithms`.
///
/// The caller must have closed any writer on `path` first.
pub fn verify_destination(path: &Path, options: &ImageOptions) -> Result<VerifyReport, ImageError> {
    options.validate()?;
    let started = Instant::now();
    tracing::info!(path = %path.display(), "starting verify phase");

    let reader = ChunkReader::open(path)?;
    let mut acc = DigestAccumulator::new(&options.algorithms);
    let progress = ProgressEmitter::new(
        options.progress.as_ref(),
        Phase::Verify,
        stream::known_size(path),
    );

    let mut chunks_done = 0u64;
    let chunks = pump(
        reader,
        options.chunk_size,
        options.read_ahead,
        &options.abort,
        Phase::Verify,
        |chunk| {
            acc.update(chunk);
            chunks_done += 1;
            progress.emit(acc.bytes_seen(), chunks_done);
            Ok(())
        },
    )?;

    let bytes_verified = acc.bytes_seen();
    let report = VerifyReport {
        digests: acc.finalize(),
        bytes_verified,
        chunks,
        elapsed: started.elapsed(),
    };
    tracing::info!(
        bytes = report.bytes_verified,
        chunks = report.chunks,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "verify phase completed"
    );
    Ok(report)
}

/// Digest a single file with `algorithms` (no copy, no comparison).
pub fn digest_path(
    path: &Path,
    algorithms: &AlgorithmSet,
    chunk_size: usize,
) -> Result<DigestMap, ImageError> {
    let options = ImageOptions {
        chunk_size,
        algorithms: algorithms.clone(),
        ..ImageOptions::default()
    };
    Ok(verify_destination(path, &options)?.digests)
}
