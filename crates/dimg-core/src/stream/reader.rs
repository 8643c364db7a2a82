//! Sequential chunk reader over a source file or device.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use super::advise;
use super::ChunkBuffer;
use crate::error::ImageError;

/// Read cursor: no seeking, no mmap, no runtime buffering.
///
/// The offset only moves forward. Dropping the reader closes the handle.
pub struct ChunkReader<R = File> {
    inner: R,
    path: PathBuf,
    offset: u64,
    eof: bool,
}

impl ChunkReader<File> {
    /// Open `path` read-only. A missing path is `SourceNotFound`.
    pub fn open(path: &Path) -> Result<Self, ImageError> {
        let file = File::open(path).map_err(|e| ImageError::open_for_read(path, e))?;
        advise::sequential(&file);
        tracing::debug!(path = %path.display(), "opened for reading");
        Ok(Self::from_reader(file, path))
    }
}

impl<R: Read> ChunkReader<R> {
    /// Wrap an already-open stream. `path` is used for error reporting only.
    pub fn from_reader(inner: R, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
            offset: 0,
            eof: false,
        }
    }

    /// Fill `buf` from the stream and return the number of bytes read.
    ///
    /// Keeps reading until the buffer is full or the stream ends, so every
    /// chunk but the last is exactly `buf.capacity()` bytes. Returns 0 once
    /// end of stream has been reached.
    pub fn read_chunk(&mut self, buf: &mut ChunkBuffer) -> Result<usize, ImageError> {
        if self.eof {
            buf.set_filled(0);
            return Ok(0);
        }
        let storage = buf.storage_mut();
        let mut filled = 0;
        while filled < storage.len() {
            match self.inner.read(&mut storage[filled..]) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    buf.set_filled(0);
                    return Err(ImageError::io(&self.path, "read", e));
                }
            }
        }
        buf.set_filled(filled);
        self.offset += filled as u64;
        Ok(filled)
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn is_eof(&self) -> bool {
        self.eof
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Hands out at most `step` bytes per read call.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(out.len()).min(self.data.len());
            out[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device disconnected"))
        }
    }

    #[test]
    fn chunks_are_full_until_last() {
        let data: Vec<u8> = (0u8..=255).cycle().take(10).collect();
        let mut reader = ChunkReader::from_reader(Cursor::new(data.clone()), "mem");
        let mut buf = ChunkBuffer::new(4);
        let mut seen = Vec::new();
        let mut sizes = Vec::new();
        loop {
            let n = reader.read_chunk(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            sizes.push(n);
            seen.extend_from_slice(buf.filled());
        }
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(seen, data);
        assert_eq!(reader.offset(), 10);
        assert!(reader.is_eof());
        assert_eq!(reader.read_chunk(&mut buf).unwrap(), 0);
    }

    #[test]
    fn short_reads_are_coalesced() {
        let data = [7u8; 9];
        let mut reader = ChunkReader::from_reader(Trickle { data: &data, step: 2 }, "trickle");
        let mut buf = ChunkBuffer::new(8);
        assert_eq!(reader.read_chunk(&mut buf).unwrap(), 8);
        assert_eq!(reader.read_chunk(&mut buf).unwrap(), 1);
        assert_eq!(reader.read_chunk(&mut buf).unwrap(), 0);
    }

    #[test]
    fn read_fault_is_io_error() {
        let mut reader = ChunkReader::from_reader(Failing, "/dev/sdz");
        let mut buf = ChunkBuffer::new(8);
        let err = reader.read_chunk(&mut buf).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
        assert!(buf.is_empty());
    }

    #[test]
    fn open_missing_is_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = ChunkReader::open(&dir.path().join("missing.dd")).err().unwrap();
        assert_eq!(err.kind(), crate::error::ErrorKind::SourceNotFound);
    }
}
