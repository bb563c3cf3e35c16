//! Voiced/unvoiced frame classification.
//!
//! Uses the zero-crossing rate of a frame as a cheap estimate of its dominant
//! frequency. Periodic speech (vowels) crosses zero a few times per pitch
//! period; noise-like sounds (fricatives, silence hiss) cross far more often.

use crate::defaults;
use serde::{Deserialize, Serialize};

/// Voicing decision for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Voicing {
    /// Periodic, pitched sound.
    Voiced,
    /// Noise-like sound, or no zero crossings at all.
    Unvoiced,
}

impl Voicing {
    pub fn is_voiced(self) -> bool {
        self == Voicing::Voiced
    }
}

/// Zero-crossing voicing classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClassifier {
    /// Frequency ceiling, as a fraction of the sample rate.
    threshold: f32,
}

impl Default for FrameClassifier {
    fn default() -> Self {
        Self::new(defaults::F_THRESHOLD)
    }
}

impl FrameClassifier {
    /// Creates a classifier with an explicit threshold (fraction of the
    /// sample rate).
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Creates a classifier whose ceiling keeps the same frequency in Hz as
    /// `base_threshold` does at the 22.05 kHz reference rate.
    pub fn for_sample_rate(base_threshold: f32, sample_rate: u32) -> Self {
        let scale = defaults::F_THRESHOLD_REFERENCE_RATE as f32 / sample_rate.max(1) as f32;
        Self::new(base_threshold * scale)
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Classifies one frame.
    ///
    /// The threshold is a ceiling: a frame is voiced when it has at least one
    /// zero crossing and its crossing frequency is at or below the threshold.
    /// Fast-crossing frames such as hiss are unvoiced.
    pub fn classify(&self, frame: &[f32]) -> Voicing {
        match self.crossing_frequency(frame) {
            Some(f) if f <= self.threshold => Voicing::Voiced,
            _ => Voicing::Unvoiced,
        }
    }

    /// Frequency estimate `f = 1 / (2p)` with period `p = 2N / c`.
    ///
    /// Returns `None` when the frame has no zero crossings.
    pub fn crossing_frequency(&self, frame: &[f32]) -> Option<f32> {
        let crossings = zero_crossings(frame);
        if crossings == 0 {
            return None;
        }
        let period = 2.0 * frame.len() as f32 / crossings as f32;
        Some(1.0 / (2.0 * period))
    }
}

/// Counts sign changes between consecutive samples.
///
/// A pair whose product is zero (either sample exactly zero) is not a
/// crossing.
pub fn zero_crossings(frame: &[f32]) -> usize {
    frame.windows(2).filter(|pair| pair[0] * pair[1] < 0.0).count()
}
