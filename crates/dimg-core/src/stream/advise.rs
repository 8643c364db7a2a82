//! Page-cache hints (Linux only; no-ops elsewhere).
//!
//! Failures are logged at debug and otherwise ignored.

use std::fs::File;

#[cfg(target_os = "linux")]
fn fadvise(file: &File, advice: libc::c_int, what: &str) {
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    let r = unsafe { libc::posix_fadvise(fd, 0, 0, advice) };
    if r != 0 {
        tracing::debug!(errno = r, "posix_fadvise({}) failed", what);
    }
}

/// Tell the kernel the file will be read front to back.
#[cfg(target_os = "linux")]
pub(crate) fn sequential(file: &File) {
    fadvise(file, libc::POSIX_FADV_SEQUENTIAL, "SEQUENTIAL");
}

/// Drop clean cached pages so the next read goes to the medium.
#[cfg(target_os = "linux")]
pub(crate) fn drop_cached(file: &File) {
    fadvise(file, libc::POSIX_FADV_DONTNEED, "DONTNEED");
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn sequential(_file: &File) {}

#[cfg(not(target_os = "linux"))]
pub(crate) fn drop_cached(_file: &File) {}
