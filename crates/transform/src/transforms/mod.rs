//! Shipped transforms
//!
//! - `PatternCorrelation`: per-position correlation against a reference
//!   pattern response, over the whole set
//! - `ExtractPattern`: per-trace sliding correlation with the pattern
//! - `Average`: per-position mean, optionally one per input group

mod average;
mod extract;
mod pattern;

pub use average::{Average, AverageBlock};
pub use extract::{ExtractBlock, ExtractPattern};
pub use pattern::PatternCorrelation;

use std::ops::Range;
use tracedb_core::{Error, Result, TraceSource};

/// Copy `window` of the reference trace's samples out of `source`.
///
/// Returns the window start and the pattern. The reference handle is
/// released before returning.
pub(crate) fn reference_pattern(
    source: &dyn TraceSource,
    reference: usize,
    window: Option<Range<usize>>,
) -> Result<(usize, Vec<f32>)> {
    let trace = source.trace(reference)?;
    let samples = trace.samples().ok_or_else(|| {
        Error::transform(
            "init",
            format!("reference trace {} has no samples", reference),
        )
    })?;
    let window = window.unwrap_or(0..samples.len());
    if window.start >= window.end || window.end > samples.len() {
        return Err(Error::transform(
            "init",
            format!(
                "pattern window {}..{} invalid for {} samples",
                window.start,
                window.end,
                samples.len()
            ),
        ));
    }
    Ok((window.start, samples[window.clone()].to_vec()))
}
