//! Best-effort size queries for sources and destinations.

use std::fs;
use std::path::Path;

use crate::error::ImageError;

/// Size of `path` in bytes.
///
/// Regular files report their length. On Unix, block devices are measured by
/// seeking a separate handle to the end (the streaming cursor is never
/// seeked). Anything else, such as pipes or character devices, is
/// `SizeUnavailable`.
pub fn probe_size(path: &Path) -> Result<u64, ImageError> {
    let meta = fs::metadata(path).map_err(|e| ImageError::SizeUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if meta.is_file() {
        return Ok(meta.len());
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        if meta.file_type().is_block_device() {
            return block_device_size(path);
        }
    }
    Err(ImageError::SizeUnavailable {
        path: path.to_path_buf(),
        reason: "not a regular file or block device".to_string(),
    })
}

/// [`probe_size`] with `SizeUnavailable` downgraded to `None`.
pub fn known_size(path: &Path) -> Option<u64> {
    match probe_size(path) {
        Ok(size) => Some(size),
        Err(e) => {
            tracing::warn!("{}; size will be reported as UNKNOWN", e);
            None
        }
    }
}

#[cfg(unix)]
fn block_device_size(path: &Path) -> Result<u64, ImageError> {
    use std::io::{Seek, SeekFrom};

    let unavailable = |e: std::io::Error| ImageError::SizeUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    let mut probe = fs::File::open(path).map_err(unavailable)?;
    probe.seek(SeekFrom::End(0)).map_err(unavailable)
}
