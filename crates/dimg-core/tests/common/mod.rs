//! Shared helpers for imaging integration tests.

#![allow(dead_code)]

use std::fs::{self, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use dimg_core::digest::AlgorithmSet;
use dimg_core::pipeline::ImageOptions;

/// 3 MiB of 0xAB: exactly three default-sized chunks.
pub const THREE_MIB: usize = 3 * 1024 * 1024;
pub const THREE_MIB_AB_MD5: &str = "d874b7b163de561d76bc323163478f12";
pub const THREE_MIB_AB_SHA1: &str = "d5e213df180bfa5d4c1cea4f731455634ac87247";

/// `(i % 251) as u8` for i in 0..len: no repeating period aligned to any
/// power-of-two chunk size.
pub fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

pub fn write_source(dir: &Path, name: &str, body: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

/// XOR one byte at `offset` in place.
pub fn flip_byte(path: &Path, offset: u64) {
    let mut f = OpenOptions::new().read(true).write(true).open(path).unwrap();
    let mut byte = [0u8; 1];
    f.seek(SeekFrom::Start(offset)).unwrap();
    f.read_exact(&mut byte).unwrap();
    f.seek(SeekFrom::Start(offset)).unwrap();
    f.write_all(&[byte[0] ^ 0xFF]).unwrap();
}

/// Shorten the file by `by` bytes.
pub fn truncate_by(path: &Path, by: u64) {
    let len = fs::metadata(path).unwrap().len();
    let f = OpenOptions::new().write(true).open(path).unwrap();
    f.set_len(len - by).unwrap();
}

pub fn options(chunk_size: usize, read_ahead: bool) -> ImageOptions {
    ImageOptions {
        chunk_size,
        read_ahead,
        sync_destination: false,
        ..ImageOptions::default()
    }
}

pub fn options_with(chunk_size: usize, algorithms: AlgorithmSet) -> ImageOptions {
    ImageOptions {
        algorithms,
        ..options(chunk_size, true)
    }
}

/// Serves `data` until `good` bytes have been read, then fails every read.
pub struct FaultAfter {
    data: Vec<u8>,
    pos: usize,
    good: usize,
}

impl FaultAfter {
    pub fn new(data: Vec<u8>, good: usize) -> Self {
        Self { data, pos: 0, good }
    }
}

impl Read for FaultAfter {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.good {
            return Err(io::Error::new(io::ErrorKind::Other, "medium error"));
        }
        let end = self.good.min(self.data.len()).min(self.pos + out.len());
        let n = end - self.pos;
        out[..n].copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(n)
    }
}
