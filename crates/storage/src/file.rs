//! Gated file handle
//!
//! [`TraceFile`] exclusively owns the descriptor of one trace set file and
//! only exposes positioned transfers that run under an internal mutex.
//! Two threads reading the same trace set queue for the gate one record
//! at a time; different trace sets never contend.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracedb_core::{Error, Result};

/// A trace set file behind a mutual-exclusion gate.
#[derive(Debug)]
pub struct TraceFile {
    path: PathBuf,
    gate: Mutex<File>,
}

impl TraceFile {
    /// Open an existing file read-only.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::from_open(path, e))?;
        Ok(Self::from_file(path, file))
    }

    /// Create (or truncate) a file for writing and reading back.
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| Error::from_open(path, e))?;
        Ok(Self::from_file(path, file))
    }

    fn from_file(path: &Path, file: File) -> Self {
        Self {
            path: path.to_path_buf(),
            gate: Mutex::new(file),
        }
    }

    /// Path this file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current file length.
    pub fn len(&self) -> Result<u64> {
        Ok(self.gate.lock().metadata()?.len())
    }

    /// Check if the file is empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Read exactly `buf.len()` bytes at `offset`.
    ///
    /// A short read surfaces as an I/O error of kind `UnexpectedEof`.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let mut file = self.gate.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        Ok(())
    }

    /// Write all of `bytes` at `offset`.
    pub fn write_at(&self, offset: u64, bytes: &[u8]) -> Result<()> {
        let mut file = self.gate.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(bytes)?;
        Ok(())
    }

    /// Run `f` with exclusive access to the descriptor, positioned at
    /// `offset`. Used for multi-part transfers such as header parsing.
    pub fn with_reader<T>(
        &self,
        offset: u64,
        f: impl FnOnce(&mut io::BufReader<&mut File>) -> Result<T>,
    ) -> Result<T> {
        let mut file = self.gate.lock();
        file.seek(SeekFrom::Start(offset))?;
        let mut reader = io::BufReader::new(&mut *file);
        f(&mut reader)
    }

    /// Flush file contents to disk.
    pub fn sync(&self) -> Result<()> {
        self.gate.lock().sync_all()?;
        Ok(())
    }
}
