//! Read-ahead hints for the next shard.
//!
//! Best effort only: failures are logged at trace level and otherwise ignored.

use std::path::Path;

/// Ask the kernel to start pulling `path` into the page cache.
#[cfg(target_os = "linux")]
pub fn advise_sequential(path: &Path) {
    use std::os::fd::AsRawFd;

    let Ok(file) = std::fs::File::open(path) else {
        tracing::trace!("prefetch: cannot open {}", path.display());
        return;
    };
    let len = match file.metadata() {
        Ok(m) if m.len() > 0 => m.len(),
        _ => return,
    };
    let fd = file.as_raw_fd();
    let off_len = libc::off_t::try_from(len).unwrap_or(libc::off_t::MAX);

    // SAFETY: `fd` is a valid descriptor owned by `file`, which outlives these calls.
    let rc = unsafe {
        libc::posix_fadvise(fd, 0, off_len, libc::POSIX_FADV_SEQUENTIAL);
        libc::posix_fadvise(fd, 0, off_len, libc::POSIX_FADV_WILLNEED)
    };
    if rc != 0 {
        tracing::trace!("prefetch: posix_fadvise({}) returned {rc}", path.display());
    }
    let count = usize::try_from(len).unwrap_or(usize::MAX);
    // SAFETY: as above.
    if unsafe { libc::readahead(fd, 0, count) } < 0 {
        tracing::trace!("prefetch: readahead({}) failed", path.display());
    }
}

#[cfg(not(target_os = "linux"))]
pub fn advise_sequential(path: &Path) {
    tracing::trace!("prefetch: unsupported platform, ignoring {}", path.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_and_empty_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        advise_sequential(&dir.path().join("nope.parquet"));

        let empty = dir.path().join("empty.parquet");
        std::fs::File::create(&empty).unwrap();
        advise_sequential(&empty);

        let full = dir.path().join("full.parquet");
        std::fs::File::create(&full)
            .unwrap()
            .write_all(&[0u8; 4096])
            .unwrap();
        advise_sequential(&full);
        assert_eq!(std::fs::read(&full).unwrap().len(), 4096);
    }
}
