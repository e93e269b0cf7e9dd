//! Sliding pattern extraction
//!
//! For every trace independently, correlate the reference pattern of
//! length `L = upper - lower` against each window `samples[o..o + L]`.
//! A trace of `n` samples yields a derived trace of `n - L + 1` Pearson
//! coefficients, one per offset, carrying the source trace's title and
//! data through unchanged.

use crate::accumulator::AccumulatorBank;
use crate::transform::{Criterion, Transform};
use serde_json::json;
use tracedb_core::{
    Error, Result, SampleType, Trace, TraceLayout, TraceRecord, TraceSource,
};

use super::reference_pattern;

/// Per-trace sliding correlation with a reference pattern.
#[derive(Debug, Clone)]
pub struct ExtractPattern {
    reference: usize,
    lower: usize,
    upper: usize,
    pattern: Option<Vec<f32>>,
}

/// State for one trace.
#[derive(Debug)]
pub struct ExtractBlock {
    bank: AccumulatorBank,
    title: Option<String>,
    data: Option<Vec<u8>>,
}

impl ExtractBlock {
    /// Accumulators, one per window offset.
    pub fn bank(&self) -> &AccumulatorBank {
        &self.bank
    }
}

impl ExtractPattern {
    /// Pattern taken from samples `lower..upper` of trace `reference`.
    pub fn new(reference: usize, lower: usize, upper: usize) -> Self {
        Self {
            reference,
            lower,
            upper,
            pattern: None,
        }
    }

    fn pattern(&self) -> Result<&[f32]> {
        self.pattern
            .as_deref()
            .ok_or_else(|| Error::transform("accumulate", "init has not run"))
    }
}

impl Transform for ExtractPattern {
    type Block = ExtractBlock;

    fn name(&self) -> &'static str {
        "extract_pattern"
    }

    fn criterion(&self) -> Criterion {
        Criterion::Singular
    }

    fn config(&self) -> serde_json::Value {
        json!({
            "reference": self.reference,
            "lower": self.lower,
            "upper": self.upper,
        })
    }

    fn init(&mut self, source: &dyn TraceSource) -> Result<TraceLayout> {
        let (_, pattern) =
            reference_pattern(source, self.reference, Some(self.lower..self.upper))?;
        let src = source.layout();
        let offsets = src
            .sample_count
            .checked_sub(pattern.len())
            .ok_or_else(|| Error::transform("init", "pattern longer than source traces"))?
            + 1;
        self.pattern = Some(pattern);

        Ok(TraceLayout {
            sample_count: offsets,
            sample_type: SampleType::Float32,
            yscale: 1.0,
            ..src.clone()
        })
    }

    fn initialize_block(&self, first: &Trace) -> Result<ExtractBlock> {
        let n = first.samples().map_or(0, <[f32]>::len);
        let len = self.pattern()?.len();
        if n < len {
            return Err(Error::Validation(format!(
                "trace {} has {} samples, pattern needs {}",
                first.index(),
                n,
                len
            )));
        }
        Ok(ExtractBlock {
            bank: AccumulatorBank::new(n - len + 1),
            title: first.title().map(str::to_string),
            data: first.data().map(|d| d.as_bytes().to_vec()),
        })
    }

    fn accumulate(&self, trace: &Trace, block: &mut ExtractBlock) -> Result<()> {
        let pattern = self.pattern()?;
        let samples = trace.samples().unwrap_or(&[]);
        for o in 0..block.bank.len() {
            for (i, &p) in pattern.iter().enumerate() {
                block.bank.accumulate_pair(o, p as f64, samples[o + i] as f64);
            }
        }
        Ok(())
    }

    fn finalize(&self, block: ExtractBlock) -> Result<Vec<TraceRecord>> {
        Ok(vec![TraceRecord {
            title: block.title,
            data: block.data,
            samples: block.bank.pearson(),
        }])
    }

    fn exit(&mut self) {
        self.pattern = None;
    }
}
