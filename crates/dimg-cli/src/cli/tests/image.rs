//! Tests for `dimg image` argument parsing.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use dimg_core::digest::DigestAlgorithm;
use std::path::PathBuf;

#[test]
fn cli_parse_image_defaults() {
    match parse(&["dimg", "image", "/dev/sdb", "sdb.dd"]) {
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
            assert_eq!(source, PathBuf::from("/dev/sdb"));
            assert_eq!(destination, PathBuf::from("sdb.dd"));
            assert!(chunk_size.is_none());
            assert!(algorithms.is_empty());
            assert!(!no_read_ahead);
            assert!(!no_sync);
            assert!(report.is_none());
            assert!(case.case_id.is_none());
            assert!(case.examiner.is_none());
            assert!(case.description.is_none());
        }
        _ => panic!("expected Image"),
    }
}

#[test]
fn cli_parse_image_all_flags() {
    match parse(&[
        "dimg",
        "image",
        "/dev/sdc",
        "/evidence/sdc.dd",
        "--chunk-size",
        "65536",
        "--algo",
        "sha256",
        "--algo",
        "SHA-1",
        "--no-read-ahead",
        "--no-sync",
        "--report",
        "/evidence/sdc.json",
        "--case-id",
        "2024-017",
        "--examiner",
        "J. Doe",
        "--description",
        "USB stick, blue",
    ]) {
        CliCommand::Image {
            chunk_size,
            algorithms,
            no_read_ahead,
            no_sync,
            report,
            case,
            ..
        } => {
            assert_eq!(chunk_size, Some(65536));
            assert_eq!(
                algorithms,
                vec![DigestAlgorithm::Sha256, DigestAlgorithm::Sha1]
            );
            assert!(no_read_ahead);
            assert!(no_sync);
            assert_eq!(report, Some(PathBuf::from("/evidence/sdc.json")));
            assert_eq!(case.case_id.as_deref(), Some("2024-017"));
            assert_eq!(case.examiner.as_deref(), Some("J. Doe"));
            assert_eq!(case.description.as_deref(), Some("USB stick, blue"));
        }
        _ => panic!("expected Image with flags"),
    }
}

#[test]
fn cli_parse_image_rejects_unknown_algorithm() {
    let res = Cli::try_parse_from(["dimg", "image", "a", "b", "--algo", "crc32"]);
    assert!(res.is_err());
}

#[test]
fn cli_parse_image_requires_destination() {
    assert!(Cli::try_parse_from(["dimg", "image", "/dev/sdb"]).is_err());
}

#[test]
fn cli_parse_image_rejects_non_numeric_chunk_size() {
    let res = Cli::try_parse_from(["dimg", "image", "a", "b", "--chunk-size", "1M"]);
    assert!(res.is_err());
}
