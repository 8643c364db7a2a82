//! Progress reporting for the copy and verify passes (bytes done, rate, ETA).
//!
//! Progress is streamed to the caller as values after each chunk instead of
//! being kept in shared counters. Consumers can compute
//! rate = bytes_done / elapsed_secs and ETA = (total_bytes - bytes_done) / rate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Which pass an event or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Copy,
    Verify,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Copy => f.write_str("copy"),
            Phase::Verify => f.write_str("verify"),
        }
    }
}

/// Snapshot of one pass's progress (CLI-friendly).
#[derive(Debug, Clone)]
pub struct ProgressStats {
    pub phase: Phase,
    /// Bytes processed so far.
    pub bytes_done: u64,
    /// Total bytes, if the stream size is known.
    pub total_bytes: Option<u64>,
    /// Chunks processed so far.
    pub chunks_done: u64,
    /// Seconds since the pass started.
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Throughput in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }

    /// Estimated seconds remaining (None if total unknown or rate is 0).
    pub fn eta_secs(&self) -> Option<f64> {
        let total = self.total_bytes?;
        let remaining = total.saturating_sub(self.bytes_done);
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.bytes_per_sec();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }

    /// Fraction complete in [0.0, 1.0], if the total is known.
    pub fn fraction(&self) -> Option<f64> {
        let total = self.total_bytes?;
        if total == 0 {
            return Some(1.0);
        }
        Some((self.bytes_done as f64 / total as f64).min(1.0))
    }
}

/// Channel the pipelines publish [`ProgressStats`] on.
pub type ProgressSender = tokio::sync::mpsc::Sender<ProgressStats>;

/// Per-pass helper: stamps elapsed time and never blocks on a slow consumer.
pub(crate) struct ProgressEmitter<'a> {
    tx: Option<&'a ProgressSender>,
    phase: Phase,
    total_bytes: Option<u64>,
    started: Instant,
}

impl<'a> ProgressEmitter<'a> {
    pub(crate) fn new(tx: Option<&'a ProgressSender>, phase: Phase, total_bytes: Option<u64>) -> Self {
        Self {
            tx,
            phase,
            total_bytes,
            started: Instant::now(),
        }
    }

    pub(crate) fn emit(&self, bytes_done: u64, chunks_done: u64) {
        if let Some(tx) = self.tx {
            // A full channel only means the display lags; drop the snapshot.
            let _ = tx.try_send(ProgressStats {
                phase: self.phase,
                bytes_done,
                total_bytes: self.total_bytes,
                chunks_done,
                elapsed_secs: self.started.elapsed().as_secs_f64(),
            });
        }
    }
}
