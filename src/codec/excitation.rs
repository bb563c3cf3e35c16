//! Excitation signals that drive LPC synthesis.

use rand::Rng;

/// Unit impulses every `period` samples, starting at sample 0.
///
/// A period of 0 is treated as 1.
pub fn pulse_train(len: usize, period: usize) -> Vec<f32> {
    let period = period.max(1);
    (0..len)
        .map(|n| if n % period == 0 { 1.0 } else { 0.0 })
        .collect()
}

/// Uniform white noise in `[-1, 1]`.
pub fn white_noise<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<f32> {
    (0..len).map(|_| rng.gen_range(-1.0f32..=1.0)).collect()
}

/// Pulse period in samples for a stored pitch value.
pub fn pulse_period(pitch: f32) -> usize {
    if pitch.is_finite() && pitch >= 1.0 {
        pitch.round() as usize
    } else {
        1
    }
}
