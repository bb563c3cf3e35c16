//! Default configuration constants for voxlpc.
//!
//! Shared by the config layer, the analysis components and the CLI so the
//! same numbers are never spelled twice.

/// Default source sample rate in Hz.
///
/// The voicing threshold below is tuned for this rate.
pub const SAMPLE_RATE: u32 = 22050;

/// Samples per analysis frame.
pub const WINDOW_SIZE: usize = 256;

/// Linear-prediction model order (coefficients per frame).
pub const N_COEFFS: usize = 64;

/// Voicing ceiling on the crossing measure `f` (a ~617 Hz tone at 22.05 kHz).
pub const F_THRESHOLD: f32 = 0.014;

/// Sample rate `F_THRESHOLD` was tuned for.
pub const F_THRESHOLD_REFERENCE_RATE: u32 = 22050;

/// Lowest plausible voice pitch in Hz; bounds the longest AMDF lag.
pub const MIN_PITCH_HZ: u32 = 50;

/// Highest plausible voice pitch in Hz; bounds the shortest AMDF lag.
pub const MAX_PITCH_HZ: u32 = 300;

/// Ring buffer capacity in frames.
pub const RING_CAPACITY: usize = 32;

/// How long the analysis thread waits for a frame before checking for stop.
pub const READ_TIMEOUT_MS: u64 = 1000;

/// Seed for the white-noise excitation of unvoiced frames.
pub const NOISE_SEED: u64 = 0x5eed;

/// Bandwidth-expansion factor applied to each successive LPC coefficient.
pub const LAG_DAMPING: f64 = 0.99;

/// Bounded channel size between streaming threads, in frames.
pub const CHANNEL_CAPACITY: usize = 256;
