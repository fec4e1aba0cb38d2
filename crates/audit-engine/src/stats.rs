//! Group Size Statistics

use serde::{Deserialize, Serialize};

/// Binning configuration for the records-per-group histogram
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HistogramConfig {
    /// Number of bins
    pub bins: usize,
    /// Inclusive lower edge
    pub lo: u64,
    /// Exclusive upper edge
    pub hi: u64,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            bins: 100,
            lo: 0,
            hi: 200,
        }
    }
}

/// Fixed-bin counting histogram with under/overflow buckets
#[derive(Debug, Clone, Serialize)]
pub struct Histogram {
    lo: u64,
    width: u64,
    bins: Vec<u64>,
    underflow: u64,
    overflow: u64,
    entries: u64,
}

impl Histogram {
    pub fn new(config: HistogramConfig) -> Self {
        let bins = config.bins.max(1);
        let span = config.hi.saturating_sub(config.lo).max(1);
        // integer bin width, rounded up so the configured range is covered
        let width = span.div_ceil(bins as u64).max(1);
        Self {
            lo: config.lo,
            width,
            bins: vec![0; bins],
            underflow: 0,
            overflow: 0,
            entries: 0,
        }
    }

    /// Count one value
    pub fn record(&mut self, value: u64) {
        self.entries += 1;
        if value < self.lo {
            self.underflow += 1;
            return;
        }
        let index = ((value - self.lo) / self.width) as usize;
        match self.bins.get_mut(index) {
            Some(count) => *count += 1,
            None => self.overflow += 1,
        }
    }

    /// Total values counted, including under/overflow
    pub fn entries(&self) -> u64 {
        self.entries
    }

    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    /// Non-empty bins as `(lo, hi, count)` with `hi` exclusive
    pub fn nonzero_bins(&self) -> impl Iterator<Item = (u64, u64, u64)> + '_ {
        self.bins.iter().enumerate().filter_map(move |(i, &count)| {
            (count > 0).then(|| {
                let lo = self.lo + i as u64 * self.width;
                (lo, lo + self.width, count)
            })
        })
    }
}
