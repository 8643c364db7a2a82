//! JSON acquisition report and the terminal summary.

use anyhow::{Context, Result};
use dimg_core::integrity::{DigestMatch, IntegrityOutcome, SizeMatch};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::CaseArgs;

const NOT_AVAILABLE: &str = "N/A";

/// Case metadata; missing values are recorded as "N/A".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseInfo {
    pub case_id: String,
    pub examiner: String,
    pub description: String,
}

impl From<CaseArgs> for CaseInfo {
    fn from(args: CaseArgs) -> Self {
        let or_na = |v: Option<String>| {
            v.filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };
        Self {
            case_id: or_na(args.case_id),
            examiner: or_na(args.examiner),
            description: or_na(args.description),
        }
    }
}

/// Everything needed to re-verify an image later and to document the
/// acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReport {
    /// Unix seconds.
    pub created_at: u64,
    pub tool_version: String,
    pub case: CaseInfo,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub chunk_size: usize,
    pub outcome: IntegrityOutcome,
    pub conclusion: String,
}

impl ImageReport {
    pub fn new(
        case: CaseInfo,
        source: &Path,
        destination: &Path,
        chunk_size: usize,
        outcome: IntegrityOutcome,
    ) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            created_at,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            case,
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            chunk_size,
            conclusion: outcome.describe().to_string(),
            outcome,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("write report {}", path.display()))?;
        tracing::info!("report written to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data =
            fs::read_to_string(path).with_context(|| format!("read report {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("parse report {}", path.display()))
    }
}

/// Bytes in 1024 steps with two decimals; `None` is "UNKNOWN".
pub fn human_readable_size(size: Option<u64>) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    let Some(bytes) = size else {
        return "UNKNOWN".to_string();
    };
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

fn size_label(m: SizeMatch) -> &'static str {
    match m {
        SizeMatch::Match => "MATCH",
        SizeMatch::Mismatch => "MISMATCH",
        SizeMatch::Unknown => "UNKNOWN",
    }
}

pub fn print_summary(source: &Path, destination: &Path, outcome: &IntegrityOutcome) {
    let sizes = outcome.sizes();
    println!();
    println!("{:<14} {}", "Source:", source.display());
    println!("{:<14} {}", "Image:", destination.display());
    println!(
        "{:<14} {}",
        "Source size:",
        human_readable_size(sizes.source_size)
    );
    println!(
        "{:<14} {}",
        "Image size:",
        human_readable_size(sizes.destination_size)
    );
    println!("{:<14} {}", "Size check:", size_label(outcome.size_match()));
    if let Some(m) = outcome.metrics() {
        if m.copy_elapsed_secs > 0.0 {
            println!(
                "{:<14} {} in {:.1}s ({} chunks)",
                "Copied:",
                human_readable_size(Some(m.bytes_copied)),
                m.copy_elapsed_secs,
                m.copy_chunks
            );
        }
        println!(
            "{:<14} {} in {:.1}s ({} chunks)",
            "Verified:",
            human_readable_size(Some(m.bytes_verified)),
            m.verify_elapsed_secs,
            m.verify_chunks
        );
    }
    println!();
    println!("{:<8} {:<9} {}", "ALG", "RESULT", "DIGEST (copy / verify)");
    for (alg, m) in outcome.digest_match() {
        let result = match m {
            DigestMatch::Match => "MATCH",
            DigestMatch::Mismatch => "MISMATCH",
        };
        let copy = &outcome.copy_digests()[alg];
        println!("{:<8} {:<9} {}", alg.name(), result, copy);
        if *m == DigestMatch::Mismatch {
            println!("{:<8} {:<9} {}", "", "", outcome.verify_digests()[alg]);
        }
    }
    println!();
    println!("{}", outcome.describe());
}
