//! Metadata entry encoding
//!
//! Each entry is `u16 name_len | name | u8 tag | value`, with values:
//!
//! | tag | type  | payload                 |
//! |-----|-------|-------------------------|
//! | 1   | Int   | i64                     |
//! | 2   | Float | f64                     |
//! | 3   | Bool  | u8 (0 or 1)             |
//! | 4   | Str   | u32 len + UTF-8 bytes   |
//! | 5   | Bytes | u32 len + raw bytes     |

use super::header::{to_u32, truncated};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};
use tracedb_core::{Error, MetadataEntry, MetadataValue, Result};

const TAG_INT: u8 = 1;
const TAG_FLOAT: u8 = 2;
const TAG_BOOL: u8 = 3;
const TAG_STR: u8 = 4;
const TAG_BYTES: u8 = 5;

/// Encoded size of one entry in bytes.
pub fn encoded_len(entry: &MetadataEntry) -> usize {
    let value = match &entry.value {
        MetadataValue::Int(_) | MetadataValue::Float(_) => 8,
        MetadataValue::Bool(_) => 1,
        MetadataValue::Str(s) => 4 + s.len(),
        MetadataValue::Bytes(b) => 4 + b.len(),
    };
    2 + entry.name.len() + 1 + value
}

/// Write one entry.
pub fn write_entry<W: Write>(w: &mut W, entry: &MetadataEntry) -> Result<()> {
    let name_len = u16::try_from(entry.name.len()).map_err(|_| {
        Error::Validation(format!("metadata name of {} bytes too long", entry.name.len()))
    })?;
    w.write_u16::<LittleEndian>(name_len)?;
    w.write_all(entry.name.as_bytes())?;
    match &entry.value {
        MetadataValue::Int(v) => {
            w.write_u8(TAG_INT)?;
            w.write_i64::<LittleEndian>(*v)?;
        }
        MetadataValue::Float(v) => {
            w.write_u8(TAG_FLOAT)?;
            w.write_f64::<LittleEndian>(*v)?;
        }
        MetadataValue::Bool(v) => {
            w.write_u8(TAG_BOOL)?;
            w.write_u8(u8::from(*v))?;
        }
        MetadataValue::Str(s) => {
            w.write_u8(TAG_STR)?;
            w.write_u32::<LittleEndian>(to_u32("metadata string", s.len())?)?;
            w.write_all(s.as_bytes())?;
        }
        MetadataValue::Bytes(b) => {
            w.write_u8(TAG_BYTES)?;
            w.write_u32::<LittleEndian>(to_u32("metadata bytes", b.len())?)?;
            w.write_all(b)?;
        }
    }
    Ok(())
}

/// Read one entry.
pub fn read_entry<R: Read>(r: &mut R) -> Result<MetadataEntry> {
    let name_len = r.read_u16::<LittleEndian>().map_err(truncated)? as usize;
    let name = read_string(r, name_len)?;
    let tag = r.read_u8().map_err(truncated)?;
    let value = match tag {
        TAG_INT => MetadataValue::Int(r.read_i64::<LittleEndian>().map_err(truncated)?),
        TAG_FLOAT => MetadataValue::Float(r.read_f64::<LittleEndian>().map_err(truncated)?),
        TAG_BOOL => match r.read_u8().map_err(truncated)? {
            0 => MetadataValue::Bool(false),
            1 => MetadataValue::Bool(true),
            other => {
                return Err(Error::Format(format!(
                    "metadata {:?}: invalid bool byte {}",
                    name, other
                )))
            }
        },
        TAG_STR => {
            let len = r.read_u32::<LittleEndian>().map_err(truncated)? as usize;
            MetadataValue::Str(read_string(r, len)?)
        }
        TAG_BYTES => {
            let len = r.read_u32::<LittleEndian>().map_err(truncated)? as usize;
            MetadataValue::Bytes(read_bytes(r, len)?)
        }
        other => {
            return Err(Error::Format(format!(
                "metadata {:?}: unknown value tag {}",
                name, other
            )))
        }
    };
    Ok(MetadataEntry { name, value })
}

fn read_bytes<R: Read>(r: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let read = r.take(len as u64).read_to_end(&mut buf)?;
    if read != len {
        return Err(Error::Format("file truncated inside metadata".into()));
    }
    Ok(buf)
}

fn read_string<R: Read>(r: &mut R, len: usize) -> Result<String> {
    String::from_utf8(read_bytes(r, len)?)
        .map_err(|e| Error::Format(format!("metadata text is not UTF-8: {}", e)))
}
