//! Global trace set header
//!
//! ```text
//! offset  size  field
//! 0       8     magic "TRCSET\0\0"
//! 8       2     format version
//! 10      1     sample type code
//! 11      1     reserved (0)
//! 12      4     trace count (u32::MAX while pending)
//! 16      4     sample count
//! 20      4     title size
//! 24      4     data size
//! 28      32    input/output/key/samples spans, (u32 offset, u32 len) each
//! 60      4     yscale (f32)
//! 64      8     trace start
//! 72      4     trace length
//! 76      4     metadata entry count
//! ```
//!
//! All integers are little-endian.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use tracedb_core::{Error, FieldSpan, Result, SampleType, TraceLayout};

/// Magic bytes at offset 0.
pub const TRACESET_MAGIC: [u8; 8] = *b"TRCSET\0\0";

/// Current format version.
pub const TRACESET_FORMAT_VERSION: u16 = 1;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 80;

/// Byte offset of the trace count field, rewritten on finalize.
pub const TRACE_COUNT_OFFSET: u64 = 12;

/// Trace count value of a file whose writer never finalized.
pub const PENDING_TRACE_COUNT: u32 = u32::MAX;

/// Parsed fixed header.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSetHeader {
    /// Record layout
    pub layout: TraceLayout,
    /// Persisted trace count; `None` while pending
    pub trace_count: Option<usize>,
    /// File offset of record 0
    pub trace_start: u64,
    /// Bytes per record
    pub trace_length: usize,
    /// Number of metadata entries following the header
    pub metadata_count: usize,
}

impl TraceSetHeader {
    /// Header for a new file; the trace count stays pending until finalize.
    pub fn pending(layout: TraceLayout, trace_start: u64, metadata_count: usize) -> Self {
        let trace_length = layout.record_length();
        Self {
            layout,
            trace_count: None,
            trace_start,
            trace_length,
            metadata_count,
        }
    }

    /// Serialize the fixed header.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        let layout = &self.layout;
        w.write_all(&TRACESET_MAGIC)?;
        w.write_u16::<LittleEndian>(TRACESET_FORMAT_VERSION)?;
        w.write_u8(layout.sample_type.code())?;
        w.write_u8(0)?;
        let count = match self.trace_count {
            Some(n) => to_u32("trace count", n)?,
            None => PENDING_TRACE_COUNT,
        };
        if self.trace_count.is_some() && count == PENDING_TRACE_COUNT {
            return Err(Error::Validation("trace count collides with pending marker".into()));
        }
        w.write_u32::<LittleEndian>(count)?;
        w.write_u32::<LittleEndian>(to_u32("sample count", layout.sample_count)?)?;
        w.write_u32::<LittleEndian>(to_u32("title size", layout.title_size)?)?;
        w.write_u32::<LittleEndian>(to_u32("data size", layout.data_size)?)?;
        for span in [layout.input, layout.output, layout.key, layout.samples_span()] {
            w.write_u32::<LittleEndian>(to_u32("field offset", span.offset)?)?;
            w.write_u32::<LittleEndian>(to_u32("field length", span.len)?)?;
        }
        w.write_f32::<LittleEndian>(layout.yscale)?;
        w.write_u64::<LittleEndian>(self.trace_start)?;
        w.write_u32::<LittleEndian>(to_u32("trace length", self.trace_length)?)?;
        w.write_u32::<LittleEndian>(to_u32("metadata count", self.metadata_count)?)?;
        Ok(())
    }

    /// Parse and validate the fixed header.
    ///
    /// A pending trace count is reported as `trace_count == None`; the
    /// caller decides whether that is acceptable.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let mut magic = [0u8; 8];
        r.read_exact(&mut magic).map_err(truncated)?;
        if magic != TRACESET_MAGIC {
            return Err(Error::Format(format!("bad magic {:02x?}", magic)));
        }
        let version = r.read_u16::<LittleEndian>().map_err(truncated)?;
        if version != TRACESET_FORMAT_VERSION {
            return Err(Error::Format(format!("unsupported format version {}", version)));
        }
        let code = r.read_u8().map_err(truncated)?;
        let sample_type = SampleType::from_code(code)
            .ok_or_else(|| Error::Format(format!("unknown sample type code {:#04x}", code)))?;
        let _reserved = r.read_u8().map_err(truncated)?;

        let count = r.read_u32::<LittleEndian>().map_err(truncated)?;
        let sample_count = read_usize(r)?;
        let title_size = read_usize(r)?;
        let data_size = read_usize(r)?;
        let mut spans = [FieldSpan::default(); 4];
        for span in spans.iter_mut() {
            let offset = read_usize(r)?;
            let len = read_usize(r)?;
            *span = FieldSpan::new(offset, len);
        }
        let yscale = r.read_f32::<LittleEndian>().map_err(truncated)?;
        let trace_start = r.read_u64::<LittleEndian>().map_err(truncated)?;
        let trace_length = read_usize(r)?;
        let metadata_count = read_usize(r)?;

        let layout = TraceLayout {
            sample_count,
            sample_type,
            yscale,
            title_size,
            data_size,
            input: spans[0],
            output: spans[1],
            key: spans[2],
        };
        layout.validate()?;

        if spans[3] != layout.samples_span() {
            return Err(Error::Format(format!(
                "sample region {:?} inconsistent with {} x {:?} after {} header bytes",
                spans[3],
                sample_count,
                sample_type,
                title_size + data_size
            )));
        }
        if trace_length != layout.record_length() {
            return Err(Error::Format(format!(
                "trace length {} does not match layout ({} bytes)",
                trace_length,
                layout.record_length()
            )));
        }
        if trace_start < HEADER_SIZE as u64 {
            return Err(Error::Format(format!(
                "trace start {} inside the fixed header",
                trace_start
            )));
        }

        Ok(Self {
            layout,
            trace_count: (count != PENDING_TRACE_COUNT).then_some(count as usize),
            trace_start,
            trace_length,
            metadata_count,
        })
    }

    /// File offset of record `index`.
    ///
    /// Fails with a format error when the offset does not fit in a `u64`,
    /// which only a corrupted `trace_start` can cause.
    pub fn record_offset(&self, index: usize) -> Result<u64> {
        (index as u64)
            .checked_mul(self.trace_length as u64)
            .and_then(|len| len.checked_add(self.trace_start))
            .ok_or_else(|| {
                Error::Format(format!(
                    "record {} offset overflows (trace start {}, trace length {})",
                    index, self.trace_start, self.trace_length
                ))
            })
    }
}

fn read_usize<R: Read>(r: &mut R) -> Result<usize> {
    Ok(r.read_u32::<LittleEndian>().map_err(truncated)? as usize)
}

pub(crate) fn to_u32(field: &str, value: usize) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| Error::Validation(format!("{} {} does not fit in 32 bits", field, value)))
}

/// Map an early EOF to a format error; keep other I/O errors as-is.
pub(crate) fn truncated(err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::Format("file truncated".into())
    } else {
        Error::Io(err)
    }
}
