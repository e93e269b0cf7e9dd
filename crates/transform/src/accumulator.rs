//! Streaming statistics
//!
//! [`PairAccumulator`] keeps the six running sums needed for a Pearson
//! coefficient and consumes one `(x, y)` pair at a time. Nothing else is
//! retained, so memory per accumulator is fixed no matter how many pairs
//! it sees. [`AccumulatorBank`] holds one accumulator per sample offset.

/// Running sums over a stream of `(x, y)` pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PairAccumulator {
    count: u64,
    sum_x: f64,
    sum_y: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
}

impl PairAccumulator {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one pair.
    #[inline]
    pub fn accumulate_pair(&mut self, x: f64, y: f64) {
        self.count += 1;
        self.sum_x += x;
        self.sum_y += y;
        self.sum_xx += x * x;
        self.sum_yy += y * y;
        self.sum_xy += x * y;
    }

    /// Pairs seen so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean of the x stream (0 when empty).
    pub fn mean_x(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum_x / self.count as f64
        }
    }

    /// Mean of the y stream (0 when empty).
    pub fn mean_y(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum_y / self.count as f64
        }
    }

    /// Population variance of the x stream.
    pub fn variance_x(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let n = self.count as f64;
        (n * self.sum_xx - self.sum_x * self.sum_x).max(0.0) / (n * n)
    }

    /// Pearson correlation coefficient of the pairs seen so far.
    ///
    /// `(n·Σxy − Σx·Σy) / sqrt((n·Σx² − (Σx)²)·(n·Σy² − (Σy)²))`, with 0
    /// when either variance term is zero so outputs stay finite.
    pub fn pearson(&self) -> f64 {
        let n = self.count as f64;
        let var_x = n * self.sum_xx - self.sum_x * self.sum_x;
        let var_y = n * self.sum_yy - self.sum_y * self.sum_y;
        if var_x <= 0.0 || var_y <= 0.0 {
            return 0.0;
        }
        let r = (n * self.sum_xy - self.sum_x * self.sum_y) / (var_x * var_y).sqrt();
        r.clamp(-1.0, 1.0)
    }
}

/// One [`PairAccumulator`] per sample offset.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatorBank {
    slots: Vec<PairAccumulator>,
}

impl AccumulatorBank {
    /// Bank of `k` empty accumulators.
    pub fn new(k: usize) -> Self {
        Self {
            slots: vec![PairAccumulator::new(); k],
        }
    }

    /// Feed a pair into slot `offset`.
    #[inline]
    pub fn accumulate_pair(&mut self, offset: usize, x: f64, y: f64) {
        self.slots[offset].accumulate_pair(x, y);
    }

    /// Number of slots. Fixed for the bank's lifetime.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the bank has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot at `offset`.
    pub fn get(&self, offset: usize) -> Option<&PairAccumulator> {
        self.slots.get(offset)
    }

    /// Pearson coefficient of every slot, as samples.
    pub fn pearson(&self) -> Vec<f32> {
        self.slots.iter().map(|a| a.pearson() as f32).collect()
    }

    /// Mean of the x stream of every slot, as samples.
    pub fn mean_x(&self) -> Vec<f32> {
        self.slots.iter().map(|a| a.mean_x() as f32).collect()
    }
}
