//! Check-in rhythm estimator.
//!
//! Tracks an exponentially weighted mean and standard deviation of the
//! gaps between kicks, in a single pass with no sample history. See
//! Tony Finch, "Incremental calculation of weighted mean and variance".

use std::time::Duration;

/// Weight given to the newest sample.
pub const MEAN_ALPHA: f64 = 0.15;

/// Running EWMA of inter-kick gaps.
///
/// `mean` and `std_dev` are whole nanoseconds (fractional increments are
/// truncated toward zero); `variance` keeps full precision.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntervalStats {
    mean: Duration,
    std_dev: Duration,
    variance: f64,
}

impl IntervalStats {
    /// Resume from a persisted mean/stddev pair. Variance is `std_dev²`.
    pub fn resume(mean: Duration, std_dev: Duration) -> Self {
        let sd = std_dev.as_nanos() as f64;
        Self {
            mean,
            std_dev,
            variance: sd * sd,
        }
    }

    /// Fold one measured gap into the estimate.
    pub fn record(&mut self, measured: Duration) {
        let mean_ns = self.mean.as_nanos() as i128;
        let diff = (measured.as_nanos() as i128 - mean_ns) as f64;
        let incr = MEAN_ALPHA * diff;

        let new_mean = (mean_ns + incr as i128).max(0);
        self.mean = Duration::from_nanos(new_mean.min(u64::MAX as i128) as u64);
        self.variance = (1.0 - MEAN_ALPHA) * (self.variance + diff * incr);
        self.std_dev = Duration::from_nanos(self.variance.sqrt() as u64);
    }

    pub fn mean(&self) -> Duration {
        self.mean
    }

    pub fn std_dev(&self) -> Duration {
        self.std_dev
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }
}
