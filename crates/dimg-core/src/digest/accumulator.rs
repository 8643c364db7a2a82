//! Incremental multi-algorithm digest state.

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::collections::BTreeMap;

use super::{AlgorithmSet, DigestAlgorithm};

/// Finalized digests keyed by algorithm, lowercase hex.
pub type DigestMap = BTreeMap<DigestAlgorithm, String>;

enum DigestState {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha512(Sha512),
}

impl DigestState {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Md5 => DigestState::Md5(Md5::new()),
            DigestAlgorithm::Sha1 => DigestState::Sha1(Sha1::new()),
            DigestAlgorithm::Sha256 => DigestState::Sha256(Sha256::new()),
            DigestAlgorithm::Sha512 => DigestState::Sha512(Sha512::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            DigestState::Md5(h) => h.update(data),
            DigestState::Sha1(h) => h.update(data),
            DigestState::Sha256(h) => h.update(data),
            DigestState::Sha512(h) => h.update(data),
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            DigestState::Md5(h) => hex::encode(h.finalize()),
            DigestState::Sha1(h) => hex::encode(h.finalize()),
            DigestState::Sha256(h) => hex::encode(h.finalize()),
            DigestState::Sha512(h) => hex::encode(h.finalize()),
        }
    }
}

/// One independent incremental state per configured algorithm.
///
/// Every chunk goes to every state, in registration order, exactly once, so
/// the states can never disagree on the byte sequence they have seen.
/// `finalize` consumes the accumulator: nothing can be fed after it, and it
/// cannot be called twice.
pub struct DigestAccumulator {
    states: Vec<(DigestAlgorithm, DigestState)>,
    bytes: u64,
}

impl DigestAccumulator {
    pub fn new(algorithms: &AlgorithmSet) -> Self {
        Self {
            states: algorithms
                .iter()
                .map(|alg| (alg, DigestState::new(alg)))
                .collect(),
            bytes: 0,
        }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        for (_, state) in self.states.iter_mut() {
            state.update(chunk);
        }
        self.bytes += chunk.len() as u64;
    }

    /// Total bytes fed so far.
    pub fn bytes_seen(&self) -> u64 {
        self.bytes
    }

    pub fn algorithms(&self) -> impl Iterator<Item = DigestAlgorithm> + '_ {
        self.states.iter().map(|(alg, _)| *alg)
    }

    /// Call only at true end of stream; the digest is fixed to whatever has
    /// been fed.
    pub fn finalize(self) -> DigestMap {
        self.states
            .into_iter()
            .map(|(alg, state)| (alg, state.finalize_hex()))
            .collect()
    }
}
