//! Copy and verify pipelines and the end-to-end imaging entry points.
//!
//! Both passes run sequentially: the destination writer is flushed, synced and
//! dropped before the verify pass opens the destination for reading, so the
//! two never overlap on the same path.

mod copy;
mod progress;
mod pump;
mod verify;

pub use copy::{CopyPipeline, CopyReport, CopyState};
pub use progress::{Phase, ProgressSender, ProgressStats};
pub use verify::{digest_path, verify_destination, VerifyReport};

use std::path::Path;

use crate::control::AbortToken;
use crate::digest::{AlgorithmSet, DigestMap};
use crate::error::ImageError;
use crate::integrity::{self, ImagingMetrics, IntegrityOutcome, SizeRecord};
use crate::stream::{self, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};

/// Tunables for one imaging or verification run.
#[derive(Debug, Clone)]
pub struct ImageOptions {
    /// Bytes per chunk, in `1..=MAX_CHUNK_SIZE`.
    pub chunk_size: usize,
    pub algorithms: AlgorithmSet,
    /// Overlap the next read with the current write/digest.
    pub read_ahead: bool,
    /// fsync the destination before closing it.
    pub sync_destination: bool,
    pub abort: AbortToken,
    pub progress: Option<ProgressSender>,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            algorithms: AlgorithmSet::default(),
            read_ahead: true,
            sync_destination: true,
            abort: AbortToken::new(),
            progress: None,
        }
    }
}

impl ImageOptions {
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.chunk_size == 0 {
            return Err(ImageError::InvalidOptions(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(ImageError::InvalidOptions(format!(
                "chunk size {} exceeds the maximum of {} bytes",
                self.chunk_size, MAX_CHUNK_SIZE
            )));
        }
        Ok(())
    }
}

/// Image `source` into `destination`, re-read the destination, and compare.
///
/// Fails only on I/O faults, cancellation or bad options; digest and size
/// mismatches come back inside the outcome.
pub fn run_image_and_verify(
    source: &Path,
    destination: &Path,
    options: &ImageOptions,
) -> Result<IntegrityOutcome, ImageError> {
    options.validate()?;
    let copy = CopyPipeline::new(options).run(source, destination)?;
    let verify = verify_destination(destination, options)?;

    let metrics = ImagingMetrics {
        bytes_copied: copy.bytes_copied,
        copy_chunks: copy.chunks,
        copy_elapsed_secs: copy.elapsed.as_secs_f64(),
        bytes_verified: verify.bytes_verified,
        verify_chunks: verify.chunks,
        verify_elapsed_secs: verify.elapsed.as_secs_f64(),
    };
    let sizes = SizeRecord {
        source_size: copy.source_size,
        destination_size: copy.destination_size,
    };
    let outcome = integrity::compare(sizes, copy.digests, verify.digests)?.with_metrics(metrics);
    tracing::info!(
        size_match = ?outcome.size_match(),
        conclusion = ?outcome.conclusion(),
        "integrity determined"
    );
    Ok(outcome)
}

/// Re-run only the verify pass against previously recorded copy digests.
///
/// The algorithm set is taken from `copy_digests` so both sides always match;
/// `options.algorithms` is ignored. The destination size is queried afresh.
pub fn reverify(
    destination: &Path,
    copy_digests: &DigestMap,
    source_size: Option<u64>,
    options: &ImageOptions,
) -> Result<IntegrityOutcome, ImageError> {
    let options = ImageOptions {
        algorithms: AlgorithmSet::new(copy_digests.keys().copied())?,
        ..options.clone()
    };
    let verify = verify_destination(destination, &options)?;
    let sizes = SizeRecord {
        source_size,
        destination_size: stream::known_size(destination),
    };
    let metrics = ImagingMetrics {
        bytes_verified: verify.bytes_verified,
        verify_chunks: verify.chunks,
        verify_elapsed_secs: verify.elapsed.as_secs_f64(),
        ..ImagingMetrics::default()
    };
    let outcome =
        integrity::compare(sizes, copy_digests.clone(), verify.digests)?.with_metrics(metrics);
    tracing::info!(conclusion = ?outcome.conclusion(), "re-verification finished");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn with_chunk(chunk_size: usize) -> ImageOptions {
        ImageOptions {
            chunk_size,
            ..ImageOptions::default()
        }
    }

    #[test]
    fn validate_accepts_bounds() {
        assert!(with_chunk(1).validate().is_ok());
        assert!(with_chunk(DEFAULT_CHUNK_SIZE).validate().is_ok());
        assert!(with_chunk(MAX_CHUNK_SIZE).validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_and_oversized_chunks() {
        assert_eq!(
            with_chunk(0).validate().unwrap_err().kind(),
            ErrorKind::InvalidOptions
        );
        assert_eq!(
            with_chunk(MAX_CHUNK_SIZE + 1).validate().unwrap_err().kind(),
            ErrorKind::InvalidOptions
        );
        assert_eq!(
            with_chunk(usize::MAX / 2).validate().unwrap_err().kind(),
            ErrorKind::InvalidOptions
        );
    }

    #[test]
    fn oversized_chunk_is_rejected_before_any_io() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("image.dd");
        std::fs::write(&src, b"data").unwrap();

        let err = run_image_and_verify(&src, &dst, &with_chunk(usize::MAX / 2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOptions);
        assert!(!dst.exists());
    }
}
