//! Error taxonomy for imaging and verification.
//!
//! Digest or size mismatches are never errors; they are reported as data in
//! [`crate::integrity::IntegrityOutcome`]. Only faults that stop a phase from
//! producing a trustworthy result end up here.

use std::io;
use std::path::{Path, PathBuf};

use crate::digest::DigestAlgorithm;
use crate::pipeline::Phase;

/// Coarse classification of an [`ImageError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SourceNotFound,
    PermissionDenied,
    Io,
    AlgorithmSetMismatch,
    SizeUnavailable,
    Cancelled,
    InvalidOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Source path missing at open time. Raised before anything is written.
    #[error("source not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    /// Raw device or destination requires elevated privileges.
    #[error("permission denied: {}", .path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Read or write fault. A partially written destination is left in place.
    #[error("{op} {}", .path.display())]
    Io {
        path: PathBuf,
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// Copy and verify digest maps were produced with different algorithm sets.
    #[error("algorithm sets differ (copy only: {copy_only:?}, verify only: {verify_only:?})")]
    AlgorithmSetMismatch {
        copy_only: Vec<DigestAlgorithm>,
        verify_only: Vec<DigestAlgorithm>,
    },

    /// Size query not supported (e.g. pipes, character devices). Callers
    /// downgrade this to an unknown size instead of failing.
    #[error("size unavailable for {}: {reason}", .path.display())]
    SizeUnavailable { path: PathBuf, reason: String },

    /// Abort requested; observed at a chunk boundary.
    #[error("{phase} phase cancelled")]
    Cancelled { phase: Phase },

    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

impl ImageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImageError::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            ImageError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            ImageError::Io { .. } => ErrorKind::Io,
            ImageError::AlgorithmSetMismatch { .. } => ErrorKind::AlgorithmSetMismatch,
            ImageError::SizeUnavailable { .. } => ErrorKind::SizeUnavailable,
            ImageError::Cancelled { .. } => ErrorKind::Cancelled,
            ImageError::InvalidOptions(_) => ErrorKind::InvalidOptions,
        }
    }

    /// Only `SizeUnavailable` lets an operation continue.
    pub fn is_fatal(&self) -> bool {
        self.kind() != ErrorKind::SizeUnavailable
    }

    /// Wrap an I/O fault on `path`, splitting out permission failures.
    pub(crate) fn io(path: &Path, op: &'static str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            ImageError::PermissionDenied {
                path: path.to_path_buf(),
                source,
            }
        } else {
            ImageError::Io {
                path: path.to_path_buf(),
                op,
                source,
            }
        }
    }

    /// Like [`ImageError::io`] but a missing file becomes `SourceNotFound`.
    pub(crate) fn open_for_read(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            ImageError::SourceNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ImageError::io(path, "open", source)
        }
    }
}
