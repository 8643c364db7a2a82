//! `dimg checksum` – digest a file with the configured (or given) algorithms.

use anyhow::{Context, Result};
use dimg_core::config::DimgConfig;
use dimg_core::digest::{AlgorithmSet, DigestAlgorithm, DigestMap};
use dimg_core::pipeline::digest_path;
use std::path::PathBuf;

use super::build_options;

/// Print `<ALG>  <hex>  <path>` once per algorithm, in the order requested.
pub async fn run_checksum(
    cfg: &DimgConfig,
    path: PathBuf,
    algorithms: &[DigestAlgorithm],
) -> Result<()> {
    let options = build_options(cfg, None, algorithms, false, false)?;
    let display = path.display().to_string();
    let set = options.algorithms.clone();
    let digests = tokio::task::spawn_blocking(move || {
        digest_path(&path, &options.algorithms, options.chunk_size)
    })
    .await
    .context("checksum task panicked")??;

    for line in checksum_lines(&set, &digests, &display) {
        println!("{}", line);
    }
    Ok(())
}

fn checksum_lines(set: &AlgorithmSet, digests: &DigestMap, path: &str) -> Vec<String> {
    set.iter()
        .filter_map(|alg| {
            digests
                .get(&alg)
                .map(|hex| format!("{:<6}  {}  {}", alg.name(), hex, path))
        })
        .collect()
}
