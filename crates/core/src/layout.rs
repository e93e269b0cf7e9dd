//! Trace set layout parameters
//!
//! A [`TraceLayout`] fixes the shape every record in a trace set shares:
//! the optional title field, the associated-data blob and its
//! input/output/key sub-fields, and the sample region. It is parsed from
//! the global header on open and written to it on create.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// On-disk sample encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleType {
    /// No sample region
    None,
    /// Signed 8-bit integer
    Int8,
    /// Signed 16-bit integer
    Int16,
    /// Signed 32-bit integer
    Int32,
    /// IEEE-754 32-bit float
    Float32,
}

impl SampleType {
    /// Size of one encoded sample in bytes.
    pub fn size(self) -> usize {
        match self {
            SampleType::None => 0,
            SampleType::Int8 => 1,
            SampleType::Int16 => 2,
            SampleType::Int32 | SampleType::Float32 => 4,
        }
    }

    /// Type code stored in the header.
    pub fn code(self) -> u8 {
        match self {
            SampleType::None => 0x00,
            SampleType::Int8 => 0x01,
            SampleType::Int16 => 0x02,
            SampleType::Int32 => 0x04,
            SampleType::Float32 => 0x14,
        }
    }

    /// Parse a header type code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(SampleType::None),
            0x01 => Some(SampleType::Int8),
            0x02 => Some(SampleType::Int16),
            0x04 => Some(SampleType::Int32),
            0x14 => Some(SampleType::Float32),
            _ => None,
        }
    }

    /// Integer encodings are scaled by `yscale` on decode.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            SampleType::Int8 | SampleType::Int16 | SampleType::Int32
        )
    }
}

/// An `(offset, len)` byte range inside a containing region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSpan {
    /// Offset from the start of the containing region
    pub offset: usize,
    /// Length in bytes
    pub len: usize,
}

impl FieldSpan {
    /// Create a span.
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Zero-length span.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slice `bytes` by this span, if it fits.
    pub fn slice<'a>(&self, bytes: &'a [u8]) -> Option<&'a [u8]> {
        bytes.get(self.offset..self.end())
    }
}

/// Layout shared by all records of one trace set.
///
/// Records are laid out as `[title][data blob][samples]`. The input,
/// output and key spans index into the data blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceLayout {
    /// Samples per trace
    pub sample_count: usize,
    /// On-disk sample encoding
    pub sample_type: SampleType,
    /// Multiplier applied when decoding integer samples
    pub yscale: f32,
    /// Size of the NUL-padded title field (0 = no title)
    pub title_size: usize,
    /// Size of the associated-data blob (0 = no data)
    pub data_size: usize,
    /// Input (plaintext) bytes within the data blob
    pub input: FieldSpan,
    /// Output (ciphertext) bytes within the data blob
    pub output: FieldSpan,
    /// Key bytes within the data blob
    pub key: FieldSpan,
}

impl TraceLayout {
    /// Float samples, no title, no data.
    pub fn new(sample_count: usize, sample_type: SampleType) -> Self {
        Self {
            sample_count,
            sample_type,
            yscale: 1.0,
            title_size: 0,
            data_size: 0,
            input: FieldSpan::default(),
            output: FieldSpan::default(),
            key: FieldSpan::default(),
        }
    }

    /// Set the decode scale factor.
    pub fn with_yscale(mut self, yscale: f32) -> Self {
        self.yscale = yscale;
        self
    }

    /// Reserve a title field of `size` bytes.
    pub fn with_title(mut self, size: usize) -> Self {
        self.title_size = size;
        self
    }

    /// Lay out a data blob as consecutive input, output and key fields.
    pub fn with_data(mut self, input_len: usize, output_len: usize, key_len: usize) -> Self {
        self.input = FieldSpan::new(0, input_len);
        self.output = FieldSpan::new(input_len, output_len);
        self.key = FieldSpan::new(input_len + output_len, key_len);
        self.data_size = input_len + output_len + key_len;
        self
    }

    /// Byte length of the encoded sample region.
    pub fn sample_bytes(&self) -> usize {
        self.sample_count * self.sample_type.size()
    }

    /// Sample region relative to the start of a record.
    pub fn samples_span(&self) -> FieldSpan {
        FieldSpan::new(self.title_size + self.data_size, self.sample_bytes())
    }

    /// Byte length of one full record.
    pub fn record_length(&self) -> usize {
        self.title_size + self.data_size + self.sample_bytes()
    }

    /// Whether decoding yields samples at all.
    pub fn decodes_samples(&self) -> bool {
        self.sample_type != SampleType::None && self.yscale != 0.0
    }

    /// Check that the sub-field spans fit their containers.
    pub fn validate(&self) -> Result<()> {
        for (name, span) in [
            ("input", self.input),
            ("output", self.output),
            ("key", self.key),
        ] {
            if span.end() > self.data_size {
                return Err(Error::Format(format!(
                    "{} field {}..{} exceeds data blob of {} bytes",
                    name,
                    span.offset,
                    span.end(),
                    self.data_size
                )));
            }
        }
        if !self.yscale.is_finite() {
            return Err(Error::Format(format!("non-finite yscale {}", self.yscale)));
        }
        Ok(())
    }
}
