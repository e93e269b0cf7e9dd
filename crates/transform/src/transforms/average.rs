//! Per-position mean trace
//!
//! Without grouping the whole source collapses into one mean trace. With
//! grouping by input, consecutive traces sharing the same input bytes form
//! a block and each block yields its own mean, tagged with that input.

use crate::accumulator::AccumulatorBank;
use crate::transform::{Criterion, Transform};
use serde_json::json;
use tracedb_core::{
    Error, Result, SampleType, Trace, TraceLayout, TraceRecord, TraceSource,
};

/// Mean of every sample position.
#[derive(Debug, Clone, Default)]
pub struct Average {
    group_by_input: bool,
}

/// Running means plus the group key.
#[derive(Debug)]
pub struct AverageBlock {
    bank: AccumulatorBank,
    input: Option<Vec<u8>>,
}

impl Average {
    /// One mean over the whole source.
    pub fn new() -> Self {
        Self::default()
    }

    /// One mean per run of consecutive traces with equal input bytes.
    pub fn grouped_by_input() -> Self {
        Self {
            group_by_input: true,
        }
    }
}

impl Transform for Average {
    type Block = AverageBlock;

    fn name(&self) -> &'static str {
        "average"
    }

    fn criterion(&self) -> Criterion {
        Criterion::ExhaustList
    }

    fn config(&self) -> serde_json::Value {
        json!({ "group_by_input": self.group_by_input })
    }

    fn init(&mut self, source: &dyn TraceSource) -> Result<TraceLayout> {
        let layout = TraceLayout::new(source.num_samples(), SampleType::Float32);
        if !self.group_by_input {
            return Ok(layout);
        }
        let input = source.layout().input;
        if input.is_empty() {
            return Err(Error::transform(
                "init",
                "grouping by input needs a source with an input field",
            ));
        }
        Ok(layout.with_data(input.len, 0, 0))
    }

    fn matches(&self, trace: &Trace, block: &AverageBlock) -> bool {
        !self.group_by_input || trace.input() == block.input.as_deref()
    }

    fn initialize_block(&self, first: &Trace) -> Result<AverageBlock> {
        Ok(AverageBlock {
            bank: AccumulatorBank::new(first.samples().map_or(0, <[f32]>::len)),
            input: if self.group_by_input {
                first.input().map(<[u8]>::to_vec)
            } else {
                None
            },
        })
    }

    fn accumulate(&self, trace: &Trace, block: &mut AverageBlock) -> Result<()> {
        let samples = trace.samples().unwrap_or(&[]);
        if samples.len() != block.bank.len() {
            return Err(Error::Validation(format!(
                "trace {} has {} samples, block expects {}",
                trace.index(),
                samples.len(),
                block.bank.len()
            )));
        }
        for (j, &s) in samples.iter().enumerate() {
            block.bank.accumulate_pair(j, s as f64, 0.0);
        }
        Ok(())
    }

    fn finalize(&self, block: AverageBlock) -> Result<Vec<TraceRecord>> {
        Ok(vec![TraceRecord {
            title: None,
            data: block.input,
            samples: block.bank.mean_x(),
        }])
    }
}
