//! Power smoothing algorithms.
//!
//! Rolling averages shrink at the start of a series instead of padding with
//! zeros: the average at sample `i` uses samples `[max(0, i - window + 1)..=i]`.

use std::collections::VecDeque;

/// Window length in samples used for Normalized Power.
pub const NP_WINDOW_SECS: usize = 30;

/// Rolling average calculator for power smoothing.
///
/// Window sums are differences of one running total, so every window of the
/// same samples rounds the same way as a prefix-sum scan over the series.
#[derive(Debug, Clone)]
pub struct RollingAverage {
    /// Running totals at the window boundaries; the front is the total
    /// before the oldest sample still in the window
    totals: VecDeque<f64>,
    /// Window size in samples
    window_size: usize,
    /// Sum of every value added since the last reset
    total: f64,
}

impl RollingAverage {
    /// Create a new rolling average with the given window size (minimum 1).
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        let mut totals = VecDeque::with_capacity(window_size + 1);
        totals.push_back(0.0);
        Self {
            totals,
            window_size,
            total: 0.0,
        }
    }

    /// Create a 30-second rolling average (for Normalized Power calculation).
    pub fn thirty_second() -> Self {
        Self::new(NP_WINDOW_SECS)
    }

    /// Add a new value and return the current average.
    pub fn add(&mut self, value: f64) -> f64 {
        self.total += value;
        self.totals.push_back(self.total);

        if self.totals.len() > self.window_size + 1 {
            self.totals.pop_front();
        }

        self.window_sum() / self.len() as f64
    }

    /// Get the current average without adding a value.
    pub fn average(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.window_sum() / self.len() as f64)
        }
    }

    fn window_sum(&self) -> f64 {
        self.total - self.totals.front().copied().unwrap_or(0.0)
    }

    /// Check if the window is full.
    pub fn is_full(&self) -> bool {
        self.len() >= self.window_size
    }

    /// Reset the rolling average.
    pub fn reset(&mut self) {
        self.totals.clear();
        self.totals.push_back(0.0);
        self.total = 0.0;
    }

    /// Get the number of samples in the window.
    pub fn len(&self) -> usize {
        self.totals.len() - 1
    }

    /// Check if the window is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Streaming Normalized Power.
///
/// NP = 4th root of the mean of (30-sample rolling average)^4. Every sample
/// contributes, including the first 29 whose window is still filling.
#[derive(Debug, Clone)]
pub struct NormalizedPowerAccumulator {
    /// 30-second rolling average
    rolling_avg: RollingAverage,
    /// Sum of 4th powers
    sum_fourth_power: f64,
    /// Count of samples
    count: usize,
}

impl NormalizedPowerAccumulator {
    /// Create a new Normalized Power accumulator.
    pub fn new() -> Self {
        Self {
            rolling_avg: RollingAverage::thirty_second(),
            sum_fourth_power: 0.0,
            count: 0,
        }
    }

    /// Add a power sample.
    pub fn add(&mut self, watts: f64) {
        let avg = self.rolling_avg.add(watts);
        self.sum_fourth_power += avg.powi(4);
        self.count += 1;
    }

    /// Current Normalized Power, 0 when nothing has been added.
    pub fn normalized_power(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }

        (self.sum_fourth_power / self.count as f64).powf(0.25)
    }

    /// Reset the accumulator.
    pub fn reset(&mut self) {
        self.rolling_avg.reset();
        self.sum_fourth_power = 0.0;
        self.count = 0;
    }
}

impl Default for NormalizedPowerAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
