//! Forensic imaging engine: copy a source stream bit-for-bit while digesting
//! it, re-read the produced image in an independent pass, and compare.
//!
//! Entry points are [`pipeline::run_image_and_verify`] and
//! [`pipeline::reverify`]; both return an [`integrity::IntegrityOutcome`] and
//! leave rendering to the caller.

pub mod config;
pub mod control;
pub mod digest;
pub mod error;
pub mod integrity;
pub mod logging;
pub mod pipeline;
pub mod stream;

pub use error::{ErrorKind, ImageError};
