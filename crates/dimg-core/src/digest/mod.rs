//! Digest accumulation shared by every stream-processing path.
//!
//! The copy pass, the verify pass and the standalone `checksum` command all
//! hash through [`DigestAccumulator`]; there is no second hashing code path.

mod accumulator;
mod algorithm;

pub use accumulator::{DigestAccumulator, DigestMap};
pub use algorithm::{AlgorithmSet, DigestAlgorithm};
