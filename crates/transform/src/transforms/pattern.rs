//! Pattern correlation over a whole trace set
//!
//! Each trace's matched-filter response to a reference pattern (the dot
//! product of the pattern with the trace's window) is paired with the
//! trace's sample at every position, and those pairs are accumulated
//! across the entire source. The single derived trace holds, per sample
//! position, the Pearson coefficient between that sample and the pattern
//! response. Positions that move with the pattern score close to ±1.

use crate::accumulator::AccumulatorBank;
use crate::transform::{Criterion, Transform};
use serde_json::json;
use std::ops::Range;
use tracedb_core::{
    Error, Result, SampleType, Trace, TraceLayout, TraceRecord, TraceSource,
};

use super::reference_pattern;

/// Correlate every sample position against a reference pattern response.
#[derive(Debug, Clone)]
pub struct PatternCorrelation {
    reference: usize,
    window: Option<Range<usize>>,
    // Resolved in init, released in exit.
    pattern: Option<(usize, Vec<f32>)>,
}

impl PatternCorrelation {
    /// Use the full samples of trace `reference` as the pattern.
    pub fn new(reference: usize) -> Self {
        Self {
            reference,
            window: None,
            pattern: None,
        }
    }

    /// Restrict the pattern to samples `lower..upper` of the reference.
    pub fn with_window(mut self, lower: usize, upper: usize) -> Self {
        self.window = Some(lower..upper);
        self
    }

    /// Whether a reference pattern is currently held.
    pub fn has_pattern(&self) -> bool {
        self.pattern.is_some()
    }

    fn response(&self, samples: &[f32]) -> Result<f64> {
        let (lower, pattern) = self
            .pattern
            .as_ref()
            .ok_or_else(|| Error::transform("accumulate", "init has not run"))?;
        let window = samples
            .get(*lower..*lower + pattern.len())
            .ok_or_else(|| Error::Validation("trace shorter than pattern window".into()))?;
        Ok(pattern
            .iter()
            .zip(window)
            .map(|(&p, &s)| p as f64 * s as f64)
            .sum())
    }
}

impl Transform for PatternCorrelation {
    type Block = AccumulatorBank;

    fn name(&self) -> &'static str {
        "pattern_correlation"
    }

    fn criterion(&self) -> Criterion {
        Criterion::ExhaustList
    }

    fn config(&self) -> serde_json::Value {
        json!({
            "reference": self.reference,
            "lower": self.window.as_ref().map(|w| w.start),
            "upper": self.window.as_ref().map(|w| w.end),
        })
    }

    fn init(&mut self, source: &dyn TraceSource) -> Result<TraceLayout> {
        let (lower, pattern) = reference_pattern(source, self.reference, self.window.clone())?;
        self.pattern = Some((lower, pattern));
        Ok(TraceLayout::new(source.num_samples(), SampleType::Float32))
    }

    fn initialize_block(&self, first: &Trace) -> Result<AccumulatorBank> {
        Ok(AccumulatorBank::new(first.samples().map_or(0, <[f32]>::len)))
    }

    fn accumulate(&self, trace: &Trace, block: &mut AccumulatorBank) -> Result<()> {
        let samples = trace.samples().unwrap_or(&[]);
        if samples.len() != block.len() {
            return Err(Error::Validation(format!(
                "trace {} has {} samples, block expects {}",
                trace.index(),
                samples.len(),
                block.len()
            )));
        }
        let h = self.response(samples)?;
        for (j, &s) in samples.iter().enumerate() {
            block.accumulate_pair(j, s as f64, h);
        }
        Ok(())
    }

    fn finalize(&self, block: AccumulatorBank) -> Result<Vec<TraceRecord>> {
        Ok(vec![TraceRecord::from_samples(block.pearson())])
    }

    fn exit(&mut self) {
        self.pattern = None;
    }
}
