//! Trace record codec
//!
//! A record is `[title][data blob][samples]`, sized by the trace set's
//! layout. Integer samples are widened to float and multiplied by
//! `yscale` on decode; float samples pass through unchanged. Encoding is
//! the inverse and rejects anything that does not fit the layout before a
//! single byte is produced.

use byteorder::{ByteOrder, LittleEndian};
use tracedb_core::{Error, Result, SampleType, Trace, TraceData, TraceLayout, TraceRecord};

/// Decode one raw record into a [`Trace`].
pub fn decode(raw: &[u8], layout: &TraceLayout, index: usize) -> Result<Trace> {
    if raw.len() != layout.record_length() {
        return Err(Error::Validation(format!(
            "record {} has {} bytes, layout expects {}",
            index,
            raw.len(),
            layout.record_length()
        )));
    }
    let (title_bytes, rest) = raw.split_at(layout.title_size);
    let (data_bytes, sample_bytes) = rest.split_at(layout.data_size);

    let title = (layout.title_size > 0).then(|| decode_title(title_bytes));
    let data = (layout.data_size > 0).then(|| TraceData::new(data_bytes.to_vec(), layout));
    let samples = layout
        .decodes_samples()
        .then(|| decode_samples(sample_bytes, layout.sample_type, layout.yscale));

    Ok(Trace::new(index, title, data, samples))
}

/// Encode a record for appending to a trace set with `layout`.
pub fn encode(record: &TraceRecord, layout: &TraceLayout) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(layout.record_length());

    let title = record.title.as_deref().unwrap_or("");
    if title.len() > layout.title_size {
        return Err(Error::Validation(format!(
            "title of {} bytes exceeds title field of {}",
            title.len(),
            layout.title_size
        )));
    }
    out.extend_from_slice(title.as_bytes());
    out.resize(layout.title_size, 0);

    match (&record.data, layout.data_size) {
        (None, 0) => {}
        (Some(data), size) if data.len() == size => out.extend_from_slice(data),
        (data, size) => {
            return Err(Error::Validation(format!(
                "data blob of {} bytes, layout expects {}",
                data.as_ref().map_or(0, Vec::len),
                size
            )))
        }
    }

    encode_samples(&record.samples, layout, &mut out)?;
    debug_assert_eq!(out.len(), layout.record_length());
    Ok(out)
}

fn decode_title(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn decode_samples(bytes: &[u8], sample_type: SampleType, yscale: f32) -> Vec<f32> {
    match sample_type {
        SampleType::None => Vec::new(),
        SampleType::Int8 => bytes.iter().map(|&b| (b as i8) as f32 * yscale).collect(),
        SampleType::Int16 => bytes
            .chunks_exact(2)
            .map(|c| LittleEndian::read_i16(c) as f32 * yscale)
            .collect(),
        SampleType::Int32 => bytes
            .chunks_exact(4)
            .map(|c| LittleEndian::read_i32(c) as f32 * yscale)
            .collect(),
        SampleType::Float32 => bytes.chunks_exact(4).map(LittleEndian::read_f32).collect(),
    }
}

fn encode_samples(samples: &[f32], layout: &TraceLayout, out: &mut Vec<u8>) -> Result<()> {
    let sample_type = layout.sample_type;
    if sample_type == SampleType::None {
        if !samples.is_empty() {
            return Err(Error::Validation(
                "layout has no sample region but samples were given".into(),
            ));
        }
        return Ok(());
    }
    if samples.len() != layout.sample_count {
        return Err(Error::Validation(format!(
            "{} samples, layout expects {}",
            samples.len(),
            layout.sample_count
        )));
    }
    if sample_type == SampleType::Float32 {
        let mut buf = [0u8; 4];
        for &s in samples {
            LittleEndian::write_f32(&mut buf, s);
            out.extend_from_slice(&buf);
        }
        return Ok(());
    }

    if layout.yscale == 0.0 {
        return Err(Error::Validation(
            "cannot encode integer samples with yscale 0".into(),
        ));
    }
    let (min, max) = match sample_type {
        SampleType::Int8 => (i8::MIN as f64, i8::MAX as f64),
        SampleType::Int16 => (i16::MIN as f64, i16::MAX as f64),
        _ => (i32::MIN as f64, i32::MAX as f64),
    };
    for (i, &s) in samples.iter().enumerate() {
        let raw = (s as f64 / layout.yscale as f64).round();
        if !raw.is_finite() || raw < min || raw > max {
            return Err(Error::Validation(format!(
                "sample {} ({}) out of range for {:?} at yscale {}",
                i, s, sample_type, layout.yscale
            )));
        }
        match sample_type {
            SampleType::Int8 => out.push(raw as i8 as u8),
            SampleType::Int16 => out.extend_from_slice(&(raw as i16).to_le_bytes()),
            _ => out.extend_from_slice(&(raw as i32).to_le_bytes()),
        }
    }
    Ok(())
}
