//! Source/destination identity check.

use std::fs;
use std::path::Path;

/// Whether `a` and `b` name the same file, through the same path, a hard link
/// or a symlink. A path that does not exist is never the same file.
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        match (fs::metadata(a), fs::metadata(b)) {
            (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
            _ => false,
        }
    }
    #[cfg(not(unix))]
    {
        match (fs::canonicalize(a), fs::canonicalize(b)) {
            (Ok(ca), Ok(cb)) => ca == cb,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_path_is_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evidence.bin");
        fs::write(&path, b"x").unwrap();
        assert!(is_same_file(&path, &path));
        assert!(is_same_file(&path, &dir.path().join(".").join("evidence.bin")));
    }

    #[test]
    fn distinct_or_missing_files_differ() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        fs::write(&a, b"x").unwrap();
        fs::write(&b, b"x").unwrap();
        assert!(!is_same_file(&a, &b));
        assert!(!is_same_file(&a, &dir.path().join("missing.dd")));
    }

    #[cfg(unix)]
    #[test]
    fn links_resolve_to_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("evidence.bin");
        fs::write(&target, b"x").unwrap();
        let hard = dir.path().join("hard.dd");
        let soft = dir.path().join("soft.dd");
        fs::hard_link(&target, &hard).unwrap();
        std::os::unix::fs::symlink(&target, &soft).unwrap();
        assert!(is_same_file(&target, &hard));
        assert!(is_same_file(&target, &soft));
    }
}
