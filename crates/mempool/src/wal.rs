//! Append-only log of admitted transactions.
//!
//! A best-effort durability hint: every transaction that passed admission is
//! appended as `bytes || 0x0A` before it becomes reapable. Nothing in the
//! pool reads the log back; there is no rotation, no checksum, and no replay.
//! Its purpose is post-mortem forensics and optional external replay by
//! tooling that knows the tx framing from context.

use emberbft_metrics::mempool as metrics;
use parking_lot::Mutex;
use std::fs::{DirBuilder, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// The mempool write-ahead log. Appends are serialized by an internal mutex
/// and flushed before returning.
pub struct Wal {
    path: PathBuf,
    file: Mutex<File>,
}

impl Wal {
    /// Open (creating if needed) `<dir>/wal` for appending. The directory is
    /// created with mode 0700.
    pub fn open(dir: &Path) -> io::Result<Self> {
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        // recursive create succeeds if the directory already exists
        builder.create(dir)?;

        let path = dir.join("wal");
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        info!(path = %path.display(), "opened mempool wal");

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Append one record: the tx bytes followed by a newline.
    pub fn append(&self, tx: &[u8]) -> io::Result<()> {
        let mut file = self.file.lock();
        file.write_all(tx)?;
        file.write_all(b"\n")?;
        file.flush()?;
        metrics::MEMPOOL_WAL_BYTES_WRITTEN.inc_by((tx.len() + 1) as f64);
        Ok(())
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_dir_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("mempool-wal");

        let wal = Wal::open(&dir).unwrap();
        assert!(wal.path().exists());
        assert_eq!(wal.path(), dir.join("wal"));

        // Reopening the same directory appends to the same file.
        drop(wal);
        Wal::open(&dir).unwrap();
    }

    #[test]
    fn test_append_writes_newline_framed_records() {
        let tmp = tempfile::tempdir().unwrap();
        let wal = Wal::open(tmp.path()).unwrap();

        wal.append(b"\x01\x02").unwrap();
        wal.append(b"\x03").unwrap();

        let contents = std::fs::read(wal.path()).unwrap();
        assert_eq!(contents, b"\x01\x02\n\x03\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_dir_mode_is_0700() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("wal-dir");
        Wal::open(&dir).unwrap();

        let mode = std::fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
