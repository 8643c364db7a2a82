//! Digest algorithm identifiers and ordered algorithm sets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ImageError;

/// Supported digest algorithms.
/// - MD5/SHA1: legacy pair most imaging reports still carry
/// - SHA256/SHA512: current forensic standards
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    Md5,
    #[serde(alias = "sha-1")]
    Sha1,
    #[serde(alias = "sha-256")]
    Sha256,
    #[serde(alias = "sha-512")]
    Sha512,
}

impl DigestAlgorithm {
    pub const ALL: [DigestAlgorithm; 4] = [
        DigestAlgorithm::Md5,
        DigestAlgorithm::Sha1,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha512,
    ];

    /// Canonical display name.
    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Sha1 => "SHA1",
            DigestAlgorithm::Sha256 => "SHA256",
            DigestAlgorithm::Sha512 => "SHA512",
        }
    }

    /// Length of the finalized digest in hex characters.
    pub fn hex_len(self) -> usize {
        match self {
            DigestAlgorithm::Md5 => 32,
            DigestAlgorithm::Sha1 => 40,
            DigestAlgorithm::Sha256 => 64,
            DigestAlgorithm::Sha512 => 128,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = ImageError;

    /// Case-insensitive; accepts `sha1` and `sha-1` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(DigestAlgorithm::Md5),
            "sha1" | "sha-1" => Ok(DigestAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            "sha512" | "sha-512" => Ok(DigestAlgorithm::Sha512),
            other => Err(ImageError::InvalidOptions(format!(
                "unsupported digest algorithm '{}' (supported: md5, sha1, sha256, sha512)",
                other
            ))),
        }
    }
}

/// Non-empty set of algorithms in registration order.
///
/// Registration order is the order states are fed in; duplicates are dropped
/// so no algorithm ever sees a chunk twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmSet(Vec<DigestAlgorithm>);

impl AlgorithmSet {
    pub fn new<I>(algorithms: I) -> Result<Self, ImageError>
    where
        I: IntoIterator<Item = DigestAlgorithm>,
    {
        let mut ordered: Vec<DigestAlgorithm> = Vec::new();
        for alg in algorithms {
            if !ordered.contains(&alg) {
                ordered.push(alg);
            }
        }
        if ordered.is_empty() {
            return Err(ImageError::InvalidOptions(
                "at least one digest algorithm is required".to_string(),
            ));
        }
        Ok(AlgorithmSet(ordered))
    }

    pub fn iter(&self) -> impl Iterator<Item = DigestAlgorithm> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, alg: DigestAlgorithm) -> bool {
        self.0.contains(&alg)
    }

    pub fn as_slice(&self) -> &[DigestAlgorithm] {
        &self.0
    }
}

impl Default for AlgorithmSet {
    fn default() -> Self {
        AlgorithmSet(vec![DigestAlgorithm::Md5, DigestAlgorithm::Sha1])
    }
}
