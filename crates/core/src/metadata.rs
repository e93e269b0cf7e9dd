//! Typed metadata header entries
//!
//! A trace set carries an ordered list of `(name, value)` pairs after its
//! fixed header. Order is preserved exactly as read from the file.

use serde::{Deserialize, Serialize};

/// A typed metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetadataValue {
    /// Signed integer
    Int(i64),
    /// Double-precision float
    Float(f64),
    /// Boolean flag
    Bool(bool),
    /// UTF-8 string
    Str(String),
    /// Raw bytes
    Bytes(Vec<u8>),
}

impl MetadataValue {
    /// Get as string, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get as integer, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            MetadataValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as float, if this is a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            MetadataValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Int(v)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Float(v)
    }
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Bool(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::Str(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::Str(v)
    }
}

impl From<Vec<u8>> for MetadataValue {
    fn from(v: Vec<u8>) -> Self {
        MetadataValue::Bytes(v)
    }
}

/// One named metadata entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Entry name
    pub name: String,
    /// Entry value
    pub value: MetadataValue,
}

impl MetadataEntry {
    /// Create an entry.
    pub fn new(name: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered metadata entries. Duplicate names are allowed; lookups return
/// the first match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    entries: Vec<MetadataEntry>,
}

impl Metadata {
    /// Empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<MetadataValue>) {
        self.entries.push(MetadataEntry::new(name, value));
    }

    /// Builder-style append.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.push(name, value);
        self
    }

    /// First value stored under `name`.
    pub fn find(&self, name: &str) -> Option<&MetadataValue> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.value)
    }

    /// Entries in file order.
    pub fn entries(&self) -> &[MetadataEntry] {
        &self.entries
    }

    /// Iterate entries in file order.
    pub fn iter(&self) -> std::slice::Iter<'_, MetadataEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<MetadataEntry>> for Metadata {
    fn from(entries: Vec<MetadataEntry>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a Metadata {
    type Item = &'a MetadataEntry;
    type IntoIter = std::slice::Iter<'a, MetadataEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
