//! Fixed-capacity reusable chunk buffer.

/// Default chunk size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Largest accepted chunk size: 1 GiB. Read-ahead allocates two of these.
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024 * 1024;

/// Fixed-capacity byte buffer reused across read/write cycles.
///
/// Allocated once per pipeline; never shared between the copy and verify
/// passes.
#[derive(Debug)]
pub struct ChunkBuffer {
    data: Vec<u8>,
    filled: usize,
}

impl ChunkBuffer {
    /// `capacity` must be non-zero (validated by `ImageOptions`).
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity],
            filled: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes filled by the last read.
    pub fn filled(&self) -> &[u8] {
        &self.data[..self.filled]
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub(crate) fn storage_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub(crate) fn set_filled(&mut self, n: usize) {
        debug_assert!(n <= self.data.len());
        self.filled = n;
    }
}
