//! Per-frame speech analysis: voicing decision and pitch search.

pub mod pitch;
pub mod voicing;

pub use pitch::{PitchEstimate, PitchEstimator};
pub use voicing::{FrameClassifier, Voicing, zero_crossings};
