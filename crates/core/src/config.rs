//! Configuration for trace sets and pipeline runs
//!
//! Verbosity is carried on these structs and handed to the components that
//! log, rather than kept in process-wide state.

/// Options for opening or creating a file-backed trace set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceSetOptions {
    /// Cache size above which `store` triggers a free pass over
    /// unreferenced entries
    pub cache_capacity: usize,
    /// Log open/finalize/close at info level instead of debug
    pub verbose: bool,
}

impl Default for TraceSetOptions {
    fn default() -> Self {
        TraceSetOptions {
            cache_capacity: 256,
            verbose: false,
        }
    }
}

impl TraceSetOptions {
    /// Keep nothing cached beyond what callers currently hold.
    pub fn uncached() -> Self {
        TraceSetOptions {
            cache_capacity: 0,
            ..Default::default()
        }
    }

    /// Set the cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Enable info-level lifecycle logging.
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

/// Options for a transform pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Log progress at info level instead of debug
    pub verbose: bool,
    /// Emit a progress message every this many source traces (0 = never)
    pub progress_interval: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            verbose: false,
            progress_interval: 10_000,
        }
    }
}

impl PipelineOptions {
    /// Verbose progress every `interval` traces.
    pub fn verbose(interval: usize) -> Self {
        PipelineOptions {
            verbose: true,
            progress_interval: interval,
        }
    }
}
