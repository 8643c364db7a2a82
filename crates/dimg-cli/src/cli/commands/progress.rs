//! Progress line on stderr, fed by the pipeline's progress channel.

use dimg_core::pipeline::{Phase, ProgressSender, ProgressStats};
use std::io::Write;
use std::time::Instant;
use tokio::task::JoinHandle;

const PROGRESS_INTERVAL_MS: u64 = 500;
const MIB: f64 = 1_048_576.0;

/// Spawn the printer task. It finishes once every sender clone is dropped,
/// i.e. when the pipeline that owns the options returns.
pub(crate) fn spawn_progress_printer() -> (ProgressSender, JoinHandle<()>) {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<ProgressStats>(16);
    let handle = tokio::spawn(async move {
        let mut last_print: Option<Instant> = None;
        let mut current: Option<Phase> = None;
        while let Some(stats) = rx.recv().await {
            if current.is_some_and(|p| p != stats.phase) {
                eprintln!();
                last_print = None;
            }
            current = Some(stats.phase);

            let finished = stats.total_bytes.is_some_and(|t| stats.bytes_done >= t);
            let due = last_print
                .map(|t| t.elapsed().as_millis() as u64 >= PROGRESS_INTERVAL_MS)
                .unwrap_or(true);
            if due || finished {
                eprint!("\r{}", format_line(&stats));
                let _ = std::io::stderr().flush();
                last_print = Some(Instant::now());
            }
        }
        if current.is_some() {
            eprintln!();
        }
    });
    (tx, handle)
}

fn format_line(stats: &ProgressStats) -> String {
    let done_mib = stats.bytes_done as f64 / MIB;
    let rate_mib = stats.bytes_per_sec() / MIB;
    let label = match stats.phase {
        Phase::Copy => "Copying  ",
        Phase::Verify => "Verifying",
    };
    match (stats.total_bytes, stats.fraction()) {
        (Some(total), Some(fraction)) => {
            let eta = stats
                .eta_secs()
                .map(|s| format!("{:.0}s", s))
                .unwrap_or_else(|| "?".to_string());
            format!(
                "  {} {:.1} / {:.1} MiB ({:.1}%)  {:.2} MiB/s  ETA {}  ",
                label,
                done_mib,
                total as f64 / MIB,
                fraction * 100.0,
                rate_mib,
                eta
            )
        }
        _ => format!(
            "  {} {:.1} MiB  {:.2} MiB/s  ({} chunks)  ",
            label, done_mib, rate_mib, stats.chunks_done
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total: Option<u64>) -> ProgressStats {
        ProgressStats {
            phase: Phase::Copy,
            bytes_done: 1_048_576,
            total_bytes: total,
            chunks_done: 1,
            elapsed_secs: 1.0,
        }
    }

    #[test]
    fn line_with_known_total_shows_percent_and_eta() {
        let line = format_line(&stats(Some(2 * 1_048_576)));
        assert!(line.contains("1.0 / 2.0 MiB (50.0%)"), "{line}");
        assert!(line.contains("1.00 MiB/s"), "{line}");
        assert!(line.contains("ETA 1s"), "{line}");
    }

    #[test]
    fn line_with_unknown_total_shows_chunks() {
        let line = format_line(&stats(None));
        assert!(line.contains("1.0 MiB"), "{line}");
        assert!(line.contains("(1 chunks)"), "{line}");
        assert!(!line.contains('%'), "{line}");
    }
}
