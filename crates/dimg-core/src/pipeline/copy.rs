//! Copy pass: source → destination, digesting exactly the bytes written.

use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::digest::{DigestAccumulator, DigestMap};
use crate::error::ImageError;
use crate::stream::{self, ChunkReader, ChunkWriter};

use super::progress::ProgressEmitter;
use super::pump::pump;
use super::{ImageOptions, Phase};

/// Copy pass lifecycle. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyState {
    Init,
    Copying,
    Done,
    Failed,
}

/// Result of a completed copy pass.
#[derive(Debug, Clone)]
pub struct CopyReport {
    pub digests: DigestMap,
    pub bytes_copied: u64,
    pub chunks: u64,
    /// Queried once before the first read; `None` if unsupported.
    pub source_size: Option<u64>,
    /// Queried after the destination was closed; `None` if unsupported.
    pub destination_size: Option<u64>,
    pub elapsed: Duration,
}

/// Reads the source once, writes each chunk verbatim to the destination and
/// feeds the same chunk to the digest accumulator, in the same pass.
///
/// Digesting what was written (not a second read of the source) matters for
/// devices whose content can change between reads.
pub struct CopyPipeline<'a> {
    options: &'a ImageOptions,
    state: CopyState,
}

impl<'a> CopyPipeline<'a> {
    pub fn new(options: &'a ImageOptions) -> Self {
        Self {
            options,
            state: CopyState::Init,
        }
    }

    pub fn state(&self) -> CopyState {
        self.state
    }

    /// Image the file or device at `source` into `destination`.
    ///
    /// The source is opened before the destination is created, so a missing
    /// source never leaves an empty image behind. A destination that is the
    /// source itself (same path or a link to it) is refused before anything
    /// is truncated.
    pub fn run(&mut self, source: &Path, destination: &Path) -> Result<CopyReport, ImageError> {
        self.options.validate()?;
        if stream::is_same_file(source, destination) {
            self.transition(CopyState::Copying);
            self.transition(CopyState::Failed);
            return Err(ImageError::InvalidOptions(format!(
                "destination {} is the source",
                destination.display()
            )));
        }
        let source_size = stream::known_size(source);
        if let Some(size) = source_size {
            tracing::info!(path = %source.display(), size, "source size detected");
        }
        let reader = match ChunkReader::open(source) {
            Ok(r) => r,
            Err(e) => {
                self.transition(CopyState::Copying);
                self.transition(CopyState::Failed);
                return Err(e);
            }
        };
        self.copy_stream(reader, source_size, destination)
    }

    /// Image an already-open stream. `source_size` is whatever the caller
    /// could determine; `None` means unknown.
    pub fn copy_stream<R: Read + Send>(
        &mut self,
        reader: ChunkReader<R>,
        source_size: Option<u64>,
        destination: &Path,
    ) -> Result<CopyReport, ImageError> {
        self.options.validate()?;
        self.transition(CopyState::Copying);
        tracing::info!(
            from = %reader.path().display(),
            to = %destination.display(),
            chunk_size = self.options.chunk_size,
            "starting copy phase"
        );
        match self.copy_inner(reader, source_size, destination) {
            Ok(report) => {
                self.transition(CopyState::Done);
                tracing::info!(
                    bytes = report.bytes_copied,
                    chunks = report.chunks,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "copy phase completed"
                );
                Ok(report)
            }
            Err(e) => {
                self.transition(CopyState::Failed);
                tracing::warn!(
                    "copy phase failed, partial destination left in place at {}: {}",
                    destination.display(),
                    e
                );
                Err(e)
            }
        }
    }

    fn copy_inner<R: Read + Send>(
        &self,
        reader: ChunkReader<R>,
        source_size: Option<u64>,
        destination: &Path,
    ) -> Result<CopyReport, ImageError> {
        let opts = self.options;
        let started = Instant::now();
        let mut writer = ChunkWriter::create(destination)?;
        let mut acc = DigestAccumulator::new(&opts.algorithms);
        let progress = ProgressEmitter::new(opts.progress.as_ref(), Phase::Copy, source_size);

        let mut chunks_done = 0u64;
        let chunks = pump(
            reader,
            opts.chunk_size,
            opts.read_ahead,
            &opts.abort,
            Phase::Copy,
            |chunk| {
                writer.write_chunk(chunk)?;
                acc.update(chunk);
                chunks_done += 1;
                progress.emit(writer.offset(), chunks_done);
                Ok(())
            },
        )?;

        let digests = acc.finalize();
        let bytes_copied = writer.finish(opts.sync_destination)?;
        let destination_size = stream::known_size(destination);
        Ok(CopyReport {
            digests,
            bytes_copied,
            chunks,
            source_size,
            destination_size,
            elapsed: started.elapsed(),
        })
    }

    fn transition(&mut self, next: CopyState) {
        tracing::debug!(from = ?self.state, to = ?next, "copy state");
        self.state = next;
    }
}
