//! File-backed trace sets
//!
//! A [`TraceSet`] owns a [`TraceFile`], the parsed header and metadata, and
//! the [`TraceCache`] that sits in front of the file.
//!
//! ## Lifecycle
//!
//! ```text
//! create() ──append_trace()*──> finalize() ──> readable ──> close()
//! open()  ─────────────────────────────────> readable ──> close()
//! ```
//!
//! A writer persists a pending trace count at create time and the real
//! count only in `finalize()`. A file whose writer died midway therefore
//! still carries the pending marker and `open()` refuses it.

use crate::cache::{CacheStats, TraceCache};
use crate::codec;
use crate::file::TraceFile;
use crate::format::metadata::{encoded_len, read_entry, write_entry};
use crate::format::{TraceSetHeader, HEADER_SIZE, TRACE_COUNT_OFFSET};
use std::path::Path;
use tracedb_core::{
    Error, Metadata, Result, TraceHandle, TraceLayout, TraceRecord, TraceSetOptions, TraceSource,
};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Read,
    Write { written: usize, finalized: bool },
}

/// A trace set stored in a single file.
#[derive(Debug)]
pub struct TraceSet {
    file: TraceFile,
    header: TraceSetHeader,
    metadata: Metadata,
    cache: TraceCache,
    options: TraceSetOptions,
    mode: Mode,
}

impl TraceSet {
    /// Open an existing, finalized trace set for reading.
    ///
    /// Fails with a format error on bad magic, inconsistent layout fields,
    /// truncated headers or records, and with [`Error::Pending`] when the
    /// writer never finalized the file.
    pub fn open(path: impl AsRef<Path>, options: TraceSetOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = TraceFile::open(path)?;

        let (header, metadata, metadata_bytes) = file.with_reader(0, |r| {
            let header = TraceSetHeader::read_from(r)?;
            let mut entries = Vec::new();
            let mut bytes = 0usize;
            for _ in 0..header.metadata_count {
                let entry = read_entry(r)?;
                bytes += encoded_len(&entry);
                entries.push(entry);
            }
            Ok((header, Metadata::from(entries), bytes))
        })?;

        let count = header.trace_count.ok_or_else(|| Error::Pending {
            path: path.to_path_buf(),
        })?;
        let metadata_end = (HEADER_SIZE + metadata_bytes) as u64;
        if header.trace_start < metadata_end {
            return Err(Error::Format(format!(
                "trace start {} overlaps metadata ending at {}",
                header.trace_start, metadata_end
            )));
        }
        let actual = file.len()?;
        if header.trace_start > actual {
            return Err(Error::Format(format!(
                "trace start {} beyond end of file ({} bytes)",
                header.trace_start, actual
            )));
        }
        let needed = header.record_offset(count)?;
        if actual < needed {
            return Err(Error::Format(format!(
                "file truncated: {} traces need {} bytes, file has {}",
                count, needed, actual
            )));
        }

        lifecycle!(
            options.verbose,
            path = %path.display(),
            traces = count,
            samples = header.layout.sample_count,
            "opened trace set"
        );

        let cache = TraceCache::new(options.cache_capacity);
        Ok(Self {
            file,
            header,
            metadata,
            cache,
            options,
            mode: Mode::Read,
        })
    }

    /// Create a new trace set file and position it for appended records.
    ///
    /// The header and metadata are written immediately; the trace count
    /// stays pending until [`TraceSet::finalize`].
    pub fn create(
        path: impl AsRef<Path>,
        layout: TraceLayout,
        metadata: Metadata,
        options: TraceSetOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        layout
            .validate()
            .map_err(|e| Error::Validation(e.to_string()))?;

        let metadata_bytes: usize = metadata.iter().map(encoded_len).sum();
        let trace_start = (HEADER_SIZE + metadata_bytes) as u64;
        let header = TraceSetHeader::pending(layout, trace_start, metadata.len());

        let mut prefix = Vec::with_capacity(trace_start as usize);
        header.write_to(&mut prefix)?;
        for entry in &metadata {
            write_entry(&mut prefix, entry)?;
        }

        let file = TraceFile::create(path)?;
        file.write_at(0, &prefix)?;

        lifecycle!(
            options.verbose,
            path = %path.display(),
            record_length = header.trace_length,
            "created trace set"
        );

        let cache = TraceCache::new(options.cache_capacity);
        Ok(Self {
            file,
            header,
            metadata,
            cache,
            options,
            mode: Mode::Write {
                written: 0,
                finalized: false,
            },
        })
    }

    /// Read the raw bytes of record `index`.
    pub fn read_trace(&self, index: usize) -> Result<Vec<u8>> {
        let len = self.readable_count()?;
        if index >= len {
            return Err(Error::OutOfBounds { index, len });
        }
        let mut buf = vec![0u8; self.header.trace_length];
        self.file
            .read_at(self.header.record_offset(index)?, &mut buf)?;
        Ok(buf)
    }

    /// Encode and append one record.
    ///
    /// Validation happens before any byte is written. The persisted trace
    /// count is not touched; see [`TraceSet::finalize`].
    pub fn append_trace(&mut self, record: &TraceRecord) -> Result<usize> {
        let written = match self.mode {
            Mode::Write {
                written,
                finalized: false,
            } => written,
            Mode::Write { .. } => {
                return Err(Error::InvalidState(
                    "cannot append to a finalized trace set".into(),
                ))
            }
            Mode::Read => {
                return Err(Error::InvalidState(
                    "cannot append to a trace set opened for reading".into(),
                ))
            }
        };
        let bytes = codec::encode(record, &self.header.layout)?;
        self.file
            .write_at(self.header.record_offset(written)?, &bytes)?;
        self.mode = Mode::Write {
            written: written + 1,
            finalized: false,
        };
        Ok(written)
    }

    /// Persist the trace count and flush. The set becomes readable.
    pub fn finalize(&mut self) -> Result<()> {
        let written = match self.mode {
            Mode::Write {
                written,
                finalized: false,
            } => written,
            _ => {
                return Err(Error::InvalidState(
                    "finalize requires an unfinalized writer".into(),
                ))
            }
        };
        let mut header = self.header.clone();
        header.trace_count = Some(written);
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        header.write_to(&mut buf)?;
        let start = TRACE_COUNT_OFFSET as usize;
        self.file.write_at(TRACE_COUNT_OFFSET, &buf[start..start + 4])?;
        self.file.sync()?;

        self.header = header;
        self.mode = Mode::Write {
            written,
            finalized: true,
        };
        lifecycle!(
            self.options.verbose,
            path = %self.file.path().display(),
            traces = written,
            "finalized trace set"
        );
        Ok(())
    }

    /// Release the cache and the file handle.
    ///
    /// Handles still held elsewhere keep their traces alive but are no
    /// longer tracked. Closing an unfinalized writer leaves a pending file.
    pub fn close(self) -> Result<()> {
        let outstanding = self.cache.free_all();
        if let Mode::Write { written, finalized } = self.mode {
            if !finalized {
                warn!(
                    path = %self.file.path().display(),
                    written,
                    "closing trace set that was never finalized"
                );
            }
            self.file.sync()?;
        }
        lifecycle!(
            self.options.verbose,
            path = %self.file.path().display(),
            outstanding,
            "closed trace set"
        );
        Ok(())
    }

    /// Sequential scan over every trace, through the cache.
    ///
    /// On an unfinalized writer the scan yields a single
    /// [`Error::InvalidState`].
    pub fn iter(&self) -> impl Iterator<Item = Result<TraceHandle>> + '_ {
        let (count, refused) = match self.readable_count() {
            Ok(count) => (count, None),
            Err(e) => (0, Some(Err(e))),
        };
        refused
            .into_iter()
            .chain((0..count).map(move |i| self.trace(i)))
    }

    /// Records appended so far (writers) or the persisted count (readers).
    pub fn traces_written(&self) -> usize {
        match self.mode {
            Mode::Write { written, .. } => written,
            Mode::Read => self.header.trace_count.unwrap_or(0),
        }
    }

    /// Whether the persisted trace count is final.
    pub fn is_finalized(&self) -> bool {
        !matches!(
            self.mode,
            Mode::Write {
                finalized: false,
                ..
            }
        )
    }

    /// Whether this handle was created for writing.
    pub fn is_writer(&self) -> bool {
        matches!(self.mode, Mode::Write { .. })
    }

    /// Parsed fixed header.
    pub fn header(&self) -> &TraceSetHeader {
        &self.header
    }

    /// File path.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// The cache in front of this set.
    pub fn cache(&self) -> &TraceCache {
        &self.cache
    }

    /// Cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn readable_count(&self) -> Result<usize> {
        match self.mode {
            Mode::Read => Ok(self.header.trace_count.unwrap_or(0)),
            Mode::Write {
                written,
                finalized: true,
            } => Ok(written),
            Mode::Write { .. } => Err(Error::InvalidState(
                "trace set must be finalized before reading".into(),
            )),
        }
    }
}

impl TraceSource for TraceSet {
    fn layout(&self) -> &TraceLayout {
        &self.header.layout
    }

    fn num_traces(&self) -> usize {
        self.readable_count().unwrap_or(0)
    }

    fn readable_traces(&self) -> Result<usize> {
        self.readable_count()
    }

    fn trace(&self, index: usize) -> Result<TraceHandle> {
        let len = self.readable_count()?;
        if index >= len {
            return Err(Error::OutOfBounds { index, len });
        }
        self.cache.get_or_load(index, || {
            let raw = self.read_trace(index)?;
            codec::decode(&raw, &self.header.layout, index)
        })
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}
