//! Sequential append-only chunk writer for the destination image.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::advise;
use crate::error::ImageError;

/// Write cursor over the destination. Only appends; the offset only grows.
pub struct ChunkWriter<W = File> {
    inner: W,
    path: PathBuf,
    offset: u64,
}

impl ChunkWriter<File> {
    /// Create the destination at `path`, truncating an existing file.
    pub fn create(path: &Path) -> Result<Self, ImageError> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| ImageError::io(path, "create", e))?;
        tracing::debug!(path = %path.display(), "created destination");
        Ok(Self::from_writer(file, path))
    }

    /// Flush, optionally fsync, then close. Returns total bytes written.
    ///
    /// After a sync the destination's cached pages are dropped so a following
    /// verify pass reads back from the medium.
    pub fn finish(mut self, sync: bool) -> Result<u64, ImageError> {
        self.inner
            .flush()
            .map_err(|e| ImageError::io(&self.path, "flush", e))?;
        if sync {
            self.inner
                .sync_all()
                .map_err(|e| ImageError::io(&self.path, "sync", e))?;
            advise::drop_cached(&self.inner);
        }
        tracing::debug!(path = %self.path.display(), bytes = self.offset, sync, "closed destination");
        Ok(self.offset)
    }
}

impl<W: Write> ChunkWriter<W> {
    /// Wrap an already-open sink. `path` is used for error reporting only.
    pub fn from_writer(inner: W, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
            offset: 0,
        }
    }

    /// Write all of `data`, retrying partial writes. A zero-length write from
    /// the sink is a fault.
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<(), ImageError> {
        let mut written = 0;
        while written < data.len() {
            match self.inner.write(&data[written..]) {
                Ok(0) => {
                    return Err(ImageError::io(
                        &self.path,
                        "write",
                        io::Error::new(io::ErrorKind::WriteZero, "sink accepted no bytes"),
                    ));
                }
                Ok(n) => {
                    written += n;
                    self.offset += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ImageError::io(&self.path, "write", e)),
            }
        }
        Ok(())
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
