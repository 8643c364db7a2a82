//! Cancellation for running imaging operations.
//!
//! A front end (e.g. the CLI's Ctrl-C handler) holds a clone of the token and
//! requests abort; the pipelines check it at chunk boundaries, stop before
//! the next chunk and release both stream handles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ImageError;
use crate::pipeline::Phase;

/// Shared abort flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct AbortToken(Arc<AtomicBool>);

impl AbortToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request abort. Takes effect at the next chunk boundary.
    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` if abort was requested.
    pub(crate) fn check(&self, phase: Phase) -> Result<(), ImageError> {
        if self.is_requested() {
            tracing::info!("{} phase cancelled at chunk boundary", phase);
            return Err(ImageError::Cancelled { phase });
        }
        Ok(())
    }
}
