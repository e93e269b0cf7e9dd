//! Trace values
//!
//! A [`Trace`] is immutable once decoded so it can be shared between the
//! cache and any number of readers without per-trace locking. Writers
//! build a [`TraceRecord`] instead.

use crate::layout::{FieldSpan, TraceLayout};

/// Associated-data blob with the owner's input/output/key spans.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceData {
    bytes: Vec<u8>,
    input: FieldSpan,
    output: FieldSpan,
    key: FieldSpan,
}

impl TraceData {
    /// Wrap a blob, taking the sub-field spans from `layout`.
    pub fn new(bytes: Vec<u8>, layout: &TraceLayout) -> Self {
        Self {
            bytes,
            input: layout.input,
            output: layout.output,
            key: layout.key,
        }
    }

    /// The whole blob.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Input (plaintext) view.
    pub fn input(&self) -> Option<&[u8]> {
        non_empty(self.input).and_then(|s| s.slice(&self.bytes))
    }

    /// Output (ciphertext) view.
    pub fn output(&self) -> Option<&[u8]> {
        non_empty(self.output).and_then(|s| s.slice(&self.bytes))
    }

    /// Key view.
    pub fn key(&self) -> Option<&[u8]> {
        non_empty(self.key).and_then(|s| s.slice(&self.bytes))
    }
}

fn non_empty(span: FieldSpan) -> Option<FieldSpan> {
    (!span.is_empty()).then_some(span)
}

/// One decoded trace of a trace set.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    index: usize,
    title: Option<String>,
    data: Option<TraceData>,
    samples: Option<Vec<f32>>,
}

impl Trace {
    /// Assemble a decoded trace.
    pub fn new(
        index: usize,
        title: Option<String>,
        data: Option<TraceData>,
        samples: Option<Vec<f32>>,
    ) -> Self {
        Self {
            index,
            title,
            data,
            samples,
        }
    }

    /// Index within the owning trace set.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Title, if the layout has a title field.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Associated data, if the layout has a data blob.
    pub fn data(&self) -> Option<&TraceData> {
        self.data.as_ref()
    }

    /// Input bytes.
    pub fn input(&self) -> Option<&[u8]> {
        self.data.as_ref().and_then(TraceData::input)
    }

    /// Output bytes.
    pub fn output(&self) -> Option<&[u8]> {
        self.data.as_ref().and_then(TraceData::output)
    }

    /// Key bytes.
    pub fn key(&self) -> Option<&[u8]> {
        self.data.as_ref().and_then(TraceData::key)
    }

    /// Decoded samples, always as float.
    pub fn samples(&self) -> Option<&[f32]> {
        self.samples.as_deref()
    }

    /// Whether sample decoding produced anything.
    pub fn has_samples(&self) -> bool {
        self.samples.is_some()
    }

    /// Copy this trace's content into a record for writing elsewhere.
    pub fn to_record(&self) -> TraceRecord {
        TraceRecord {
            title: self.title.clone(),
            data: self.data.as_ref().map(|d| d.as_bytes().to_vec()),
            samples: self.samples.clone().unwrap_or_default(),
        }
    }
}

/// Content handed to a writer: title, data blob and samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceRecord {
    /// Title text (NUL-padded on disk)
    pub title: Option<String>,
    /// Raw data blob; must be exactly `data_size` bytes when present
    pub data: Option<Vec<u8>>,
    /// Samples; must have exactly `sample_count` entries
    pub samples: Vec<f32>,
}

impl TraceRecord {
    /// Samples only.
    pub fn from_samples(samples: Vec<f32>) -> Self {
        Self {
            samples,
            ..Default::default()
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the data blob.
    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = Some(data.into());
        self
    }
}
