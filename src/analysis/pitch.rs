//! Pitch estimation by Average Magnitude Difference Function (AMDF).

use crate::defaults;

/// Result of a pitch search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchEstimate {
    /// Lag (in samples) that produced `value`.
    pub lag: usize,
    /// The pitch measure stored in the encoded frame.
    pub value: f32,
}

/// AMDF pitch estimator over a bounded lag range.
///
/// The lag range `[sample_rate / max_hz, sample_rate / min_hz)` covers
/// plausible human pitch. The reported value is the *largest* mean difference
/// found across the range, not the smallest one textbook AMDF would use to
/// mark the best-matching lag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchEstimator {
    min_lag: usize,
    max_lag: usize,
}

impl Default for PitchEstimator {
    fn default() -> Self {
        Self::new(defaults::SAMPLE_RATE)
    }
}

impl PitchEstimator {
    /// Estimator for 50-300 Hz voices at `sample_rate`.
    pub fn new(sample_rate: u32) -> Self {
        Self::with_range(sample_rate, defaults::MIN_PITCH_HZ, defaults::MAX_PITCH_HZ)
    }

    /// Estimator for voices between `min_hz` and `max_hz`.
    pub fn with_range(sample_rate: u32, min_hz: u32, max_hz: u32) -> Self {
        let min_lag = (sample_rate / max_hz.max(1)).max(1) as usize;
        let max_lag = (sample_rate / min_hz.max(1)) as usize;
        Self {
            min_lag,
            max_lag: max_lag.max(min_lag),
        }
    }

    /// Smallest lag searched (inclusive).
    pub fn min_lag(&self) -> usize {
        self.min_lag
    }

    /// Largest lag bound (exclusive).
    pub fn max_lag(&self) -> usize {
        self.max_lag
    }

    /// Runs the AMDF search on one voiced frame.
    ///
    /// Lags that do not fit inside the frame are skipped. If none fit, the
    /// estimate is a zero value at `min_lag`.
    pub fn estimate(&self, frame: &[f32]) -> PitchEstimate {
        let upper = self.max_lag.min(frame.len());
        let mut best = PitchEstimate {
            lag: self.min_lag,
            value: 0.0,
        };

        for lag in self.min_lag..upper {
            let d = mean_difference(frame, lag);
            if lag == self.min_lag || d > best.value {
                best = PitchEstimate { lag, value: d };
            }
        }

        best
    }
}

/// Mean absolute difference between `frame` and itself delayed by `lag`.
///
/// The divisor is `len - lag + 1`, which stays at least 2 for any lag inside
/// the frame.
fn mean_difference(frame: &[f32], lag: usize) -> f32 {
    let sum: f32 = frame[lag..]
        .iter()
        .zip(frame)
        .map(|(current, delayed)| (current - delayed).abs())
        .sum();
    sum / (frame.len() - lag + 1) as f32
}
