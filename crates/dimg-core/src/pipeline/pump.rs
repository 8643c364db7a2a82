//! Drives chunks from a reader into a per-chunk sink, in strict order.
//!
//! Two modes share one contract: the sink sees every chunk exactly once, in
//! stream order, and abort is checked between chunks. Read-ahead overlaps the
//! read of chunk N+1 with the sink's work on chunk N through a capacity-1
//! channel and two recycled buffers; it never holds more than one chunk
//! ahead.

use std::io::Read;
use std::sync::mpsc;
use std::thread;

use crate::control::AbortToken;
use crate::error::ImageError;
use crate::stream::{ChunkBuffer, ChunkReader};

use super::Phase;

/// Buffers in flight with read-ahead: one being consumed, one being filled.
const READ_AHEAD_BUFFERS: usize = 2;

/// Pump `reader` to end of stream through `sink`. Returns the chunk count.
///
/// Takes the reader by value: the source handle is closed when this returns,
/// whatever the outcome.
pub(crate) fn pump<R, F>(
    reader: ChunkReader<R>,
    chunk_size: usize,
    read_ahead: bool,
    abort: &AbortToken,
    phase: Phase,
    sink: F,
) -> Result<u64, ImageError>
where
    R: Read + Send,
    F: FnMut(&[u8]) -> Result<(), ImageError>,
{
    if read_ahead {
        pump_read_ahead(reader, chunk_size, abort, phase, sink)
    } else {
        pump_sequential(reader, chunk_size, abort, phase, sink)
    }
}

fn pump_sequential<R, F>(
    mut reader: ChunkReader<R>,
    chunk_size: usize,
    abort: &AbortToken,
    phase: Phase,
    mut sink: F,
) -> Result<u64, ImageError>
where
    R: Read,
    F: FnMut(&[u8]) -> Result<(), ImageError>,
{
    let mut buf = ChunkBuffer::new(chunk_size);
    let mut chunks = 0u64;
    loop {
        abort.check(phase)?;
        if reader.read_chunk(&mut buf)? == 0 {
            return Ok(chunks);
        }
        sink(buf.filled())?;
        chunks += 1;
        tracing::trace!(%phase, chunk = chunks, offset = reader.offset(), "chunk done");
    }
}

fn pump_read_ahead<R, F>(
    reader: ChunkReader<R>,
    chunk_size: usize,
    abort: &AbortToken,
    phase: Phase,
    mut sink: F,
) -> Result<u64, ImageError>
where
    R: Read + Send,
    F: FnMut(&[u8]) -> Result<(), ImageError>,
{
    let (full_tx, full_rx) = mpsc::sync_channel::<Result<ChunkBuffer, ImageError>>(1);
    let (empty_tx, empty_rx) = mpsc::channel::<ChunkBuffer>();
    for _ in 0..READ_AHEAD_BUFFERS {
        // Receiver is alive until the reader thread starts; cannot fail.
        let _ = empty_tx.send(ChunkBuffer::new(chunk_size));
    }

    thread::scope(move |s| {
        s.spawn(move || {
            let mut reader = reader;
            // Ends when the consumer hangs up either channel, at end of
            // stream, or on the first read fault. Dropping `full_tx` is the
            // end-of-stream signal.
            while let Ok(mut buf) = empty_rx.recv() {
                match reader.read_chunk(&mut buf) {
                    Ok(0) => break,
                    Ok(_) => {
                        if full_tx.send(Ok(buf)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = full_tx.send(Err(e));
                        break;
                    }
                }
            }
        });

        let mut chunks = 0u64;
        let result = loop {
            if let Err(e) = abort.check(phase) {
                break Err(e);
            }
            match full_rx.recv() {
                Err(_) => break Ok(chunks),
                Ok(Err(e)) => break Err(e),
                Ok(Ok(buf)) => {
                    if let Err(e) = sink(buf.filled()) {
                        break Err(e);
                    }
                    chunks += 1;
                    tracing::trace!(%phase, chunk = chunks, "chunk done (read-ahead)");
                    let _ = empty_tx.send(buf);
                }
            }
        };
        // Unblock the reader whichever side it is waiting on; the scope joins it.
        drop(empty_tx);
        drop(full_rx);
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    fn source(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn collect(data: &[u8], chunk: usize, read_ahead: bool) -> (Vec<u8>, Vec<usize>, u64) {
        let reader = ChunkReader::from_reader(Cursor::new(data.to_vec()), "mem");
        let mut out = Vec::new();
        let mut sizes = Vec::new();
        let n = pump(reader, chunk, read_ahead, &AbortToken::new(), Phase::Copy, |c| {
            out.extend_from_slice(c);
            sizes.push(c.len());
            Ok(())
        })
        .unwrap();
        (out, sizes, n)
    }

    #[test]
    fn both_modes_deliver_identical_ordered_chunks() {
        let data = source(10_000);
        for chunk in [1usize, 7, 4096, 10_000, 65_536] {
            let seq = collect(&data, chunk, false);
            let ahead = collect(&data, chunk, true);
            assert_eq!(seq.0, data, "chunk={chunk}");
            assert_eq!(seq, ahead, "chunk={chunk}");
            assert_eq!(seq.2 as usize, data.len().div_ceil(chunk));
        }
    }

    #[test]
    fn empty_stream_has_no_chunks() {
        for read_ahead in [false, true] {
            let (out, _, n) = collect(&[], 16, read_ahead);
            assert!(out.is_empty());
            assert_eq!(n, 0);
        }
    }

    #[test]
    fn abort_before_start_is_cancelled() {
        for read_ahead in [false, true] {
            let abort = AbortToken::new();
            abort.request();
            let reader = ChunkReader::from_reader(Cursor::new(source(100)), "mem");
            let mut calls = 0;
            let err = pump(reader, 10, read_ahead, &abort, Phase::Verify, |_| {
                calls += 1;
                Ok(())
            })
            .unwrap_err();
            assert!(matches!(err, ImageError::Cancelled { phase: Phase::Verify }));
            assert_eq!(calls, 0);
        }
    }

    #[test]
    fn abort_mid_stream_stops_at_chunk_boundary() {
        for read_ahead in [false, true] {
            let abort = AbortToken::new();
            let reader = ChunkReader::from_reader(Cursor::new(source(1000)), "mem");
            let mut calls = 0;
            let err = pump(reader, 10, read_ahead, &abort, Phase::Copy, |_| {
                calls += 1;
                if calls == 3 {
                    abort.request();
                }
                Ok(())
            })
            .unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Cancelled);
            assert_eq!(calls, 3);
        }
    }

    #[test]
    fn sink_error_stops_pump() {
        for read_ahead in [false, true] {
            let reader = ChunkReader::from_reader(Cursor::new(source(1000)), "mem");
            let mut calls = 0;
            let err = pump(reader, 10, read_ahead, &AbortToken::new(), Phase::Copy, |_| {
                calls += 1;
                Err(ImageError::io(
                    std::path::Path::new("/dst"),
                    "write",
                    io::Error::new(io::ErrorKind::Other, "ENOSPC"),
                ))
            })
            .unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Io);
            assert_eq!(calls, 1);
        }
    }

    struct FailAfter {
        good: usize,
    }

    impl Read for FailAfter {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            if self.good == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "EIO"));
            }
            let n = self.good.min(out.len());
            out[..n].fill(0x5A);
            self.good -= n;
            Ok(n)
        }
    }

    #[test]
    fn read_fault_propagates_after_good_chunks() {
        for read_ahead in [false, true] {
            let reader = ChunkReader::from_reader(FailAfter { good: 20 }, "/dev/sdz");
            let mut seen = 0;
            let err = pump(reader, 10, read_ahead, &AbortToken::new(), Phase::Copy, |c| {
                seen += c.len();
                Ok(())
            })
            .unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Io);
            assert_eq!(seen, 20);
        }
    }
}
