//! Integrity determination from sizes and copy/verify digests.
//!
//! [`compare`] is pure: no I/O, no clock. Mismatches are data in the returned
//! [`IntegrityOutcome`]; only an inconsistent algorithm configuration is an
//! error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::digest::{DigestAlgorithm, DigestMap};
use crate::error::ImageError;

/// Tri-state size comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SizeMatch {
    Match,
    Mismatch,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DigestMatch {
    Match,
    Mismatch,
}

/// Overall verdict handed to the report writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    /// Sizes match and every digest matches.
    Verified,
    /// Every digest matches but a size was unknown.
    VerifiedByHashOnly,
    /// A digest or a known size disagrees.
    Failed,
}

/// Source and destination sizes; `None` is UNKNOWN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SizeRecord {
    pub source_size: Option<u64>,
    pub destination_size: Option<u64>,
}

impl SizeRecord {
    pub fn size_match(&self) -> SizeMatch {
        match (self.source_size, self.destination_size) {
            (Some(s), Some(d)) if s == d => SizeMatch::Match,
            (Some(_), Some(_)) => SizeMatch::Mismatch,
            _ => SizeMatch::Unknown,
        }
    }
}

/// Byte counts and timings of both passes, for throughput display.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImagingMetrics {
    pub bytes_copied: u64,
    pub copy_chunks: u64,
    pub copy_elapsed_secs: f64,
    pub bytes_verified: u64,
    pub verify_chunks: u64,
    pub verify_elapsed_secs: f64,
}

/// Immutable result of an imaging + verification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityOutcome {
    sizes: SizeRecord,
    copy_digests: DigestMap,
    verify_digests: DigestMap,
    size_match: SizeMatch,
    digest_match: BTreeMap<DigestAlgorithm, DigestMatch>,
    conclusion: Conclusion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metrics: Option<ImagingMetrics>,
}

impl IntegrityOutcome {
    pub fn sizes(&self) -> SizeRecord {
        self.sizes
    }

    pub fn copy_digests(&self) -> &DigestMap {
        &self.copy_digests
    }

    pub fn verify_digests(&self) -> &DigestMap {
        &self.verify_digests
    }

    pub fn size_match(&self) -> SizeMatch {
        self.size_match
    }

    pub fn digest_match(&self) -> &BTreeMap<DigestAlgorithm, DigestMatch> {
        &self.digest_match
    }

    pub fn all_digests_match(&self) -> bool {
        self.digest_match.values().all(|m| *m == DigestMatch::Match)
    }

    pub fn conclusion(&self) -> Conclusion {
        self.conclusion
    }

    pub fn metrics(&self) -> Option<&ImagingMetrics> {
        self.metrics.as_ref()
    }

    /// Attach pass metrics. Consumes the outcome so it stays immutable once
    /// handed out.
    pub fn with_metrics(mut self, metrics: ImagingMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// One-line conclusion for reports.
    pub fn describe(&self) -> &'static str {
        match self.conclusion {
            Conclusion::Verified => {
                "Image creation SUCCESSFUL. Integrity verified by size and hash match."
            }
            Conclusion::VerifiedByHashOnly => {
                "Image hashes match, but size comparison was not fully available."
            }
            Conclusion::Failed if !self.all_digests_match() => {
                "WARNING: Hash mismatch detected. Image may be corrupted or modified."
            }
            Conclusion::Failed => {
                "WARNING: Source and image sizes DO NOT MATCH although hashes agree."
            }
        }
    }
}

/// Combine sizes and both digest maps into an [`IntegrityOutcome`].
///
/// An algorithm present in only one map is `AlgorithmSetMismatch`, never a
/// silent mismatch.
pub fn compare(
    sizes: SizeRecord,
    copy_digests: DigestMap,
    verify_digests: DigestMap,
) -> Result<IntegrityOutcome, ImageError> {
    let copy_only: Vec<DigestAlgorithm> = copy_digests
        .keys()
        .filter(|alg| !verify_digests.contains_key(alg))
        .copied()
        .collect();
    let verify_only: Vec<DigestAlgorithm> = verify_digests
        .keys()
        .filter(|alg| !copy_digests.contains_key(alg))
        .copied()
        .collect();
    if !copy_only.is_empty() || !verify_only.is_empty() {
        return Err(ImageError::AlgorithmSetMismatch {
            copy_only,
            verify_only,
        });
    }
    if copy_digests.is_empty() {
        return Err(ImageError::InvalidOptions(
            "no digests to compare".to_string(),
        ));
    }

    let digest_match: BTreeMap<DigestAlgorithm, DigestMatch> = copy_digests
        .iter()
        .map(|(alg, copy_hex)| {
            let m = if verify_digests[alg].as_bytes() == copy_hex.as_bytes() {
                DigestMatch::Match
            } else {
                DigestMatch::Mismatch
            };
            (*alg, m)
        })
        .collect();

    let size_match = sizes.size_match();
    let all_match = digest_match.values().all(|m| *m == DigestMatch::Match);
    let conclusion = match (all_match, size_match) {
        (true, SizeMatch::Match) => Conclusion::Verified,
        (true, SizeMatch::Unknown) => Conclusion::VerifiedByHashOnly,
        _ => Conclusion::Failed,
    };

    Ok(IntegrityOutcome {
        sizes,
        copy_digests,
        verify_digests,
        size_match,
        digest_match,
        conclusion,
        metrics: None,
    })
}
