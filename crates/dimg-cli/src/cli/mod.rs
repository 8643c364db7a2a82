//! CLI for the DIMG forensic imaging tool.

mod commands;
mod report;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use dimg_core::config;
use dimg_core::digest::DigestAlgorithm;
use std::path::PathBuf;

use commands::{run_checksum, run_completions, run_image, run_verify, ImageRequest};

/// Top-level CLI for the DIMG forensic imaging tool.
#[derive(Debug, Parser)]
#[command(name = "dimg")]
#[command(about = "DIMG: forensic disk imaging with copy-time and verify-time digests", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Case metadata recorded in the JSON report.
#[derive(Debug, Clone, Default, Args)]
pub struct CaseArgs {
    /// Case number or identifier.
    #[arg(long, value_name = "ID")]
    pub case_id: Option<String>,
    /// Name of the examiner performing the acquisition.
    #[arg(long, value_name = "NAME")]
    pub examiner: Option<String>,
    /// Free-text description of the evidence item.
    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Image a device or file, then re-read the image and verify it.
    Image {
        /// Source device or file (e.g. /dev/sdb).
        source: PathBuf,
        /// Image file to create (truncated if it exists).
        destination: PathBuf,
        /// Bytes per read/write chunk (overrides config).
        #[arg(long, value_name = "BYTES")]
        chunk_size: Option<usize>,
        /// Digest algorithm: md5, sha1, sha256, sha512. Repeat for several (overrides config).
        #[arg(long = "algo", value_name = "ALG")]
        algorithms: Vec<DigestAlgorithm>,
        /// Read and write strictly in turn, without a reader thread.
        #[arg(long)]
        no_read_ahead: bool,
        /// Skip fsync of the image before verification.
        #[arg(long)]
        no_sync: bool,
        /// Write a JSON report to this path.
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
        #[command(flatten)]
        case: CaseArgs,
    },

    /// Re-verify an image against the copy digests recorded in a JSON report.
    Verify {
        /// Report written by `dimg image --report`.
        report: PathBuf,
    },

    /// Print digests of a file.
    Checksum {
        /// Path to the file or device.
        path: PathBuf,
        /// Digest algorithm; repeat for several (default: config algorithms).
        #[arg(long = "algo", value_name = "ALG")]
        algorithms: Vec<DigestAlgorithm>,
    },

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl CliCommand {
    /// Parse arguments and run the command.
    /// `Ok(false)` means the run finished but the image did not verify.
    pub async fn run_from_args() -> Result<bool> {
        let cli = Cli::parse();
        if let CliCommand::Completions { shell } = cli.command {
            run_completions(shell);
            return Ok(true);
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Image {
                source,
                destination,
                chunk_size,
                algorithms,
                no_read_ahead,
                no_sync,
                report,
                case,
            } => {
                let request = ImageRequest {
                    source,
                    destination,
                    chunk_size,
                    algorithms,
                    no_read_ahead,
                    no_sync,
                    report,
                    case,
                };
                run_image(&cfg, request).await
            }
            CliCommand::Verify { report } => run_verify(&cfg, &report).await,
            CliCommand::Checksum { path, algorithms } => {
                run_checksum(&cfg, path, &algorithms).await?;
                Ok(true)
            }
            CliCommand::Completions { .. } => Ok(true),
        }
    }
}

#[cfg(test)]
mod tests;
