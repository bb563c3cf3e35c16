//! Frame-by-frame LPC encode and decode.
//!
//! ```text
//! samples ─▶ frames ─▶ classify ─┬─ voiced ──▶ AMDF pitch ─┬─▶ LPC analysis ─▶ EncodedFrame
//!                                └─ unvoiced ─▶ pitch = 0 ─┘
//!
//! EncodedFrame ─▶ pulse train (voiced) / white noise (unvoiced) ─▶ LPC synthesis ─▶ samples
//! ```

use crate::analysis::{FrameClassifier, PitchEstimator, Voicing};
use crate::codec::excitation::{pulse_period, pulse_train, white_noise};
use crate::codec::types::{EncodedFrame, EncodedSignal};
use crate::defaults;
use crate::error::{Result, VoxlpcError};
use crate::lpc::LpcCodec;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Parameters of the frame codec.
#[derive(Debug, Clone, PartialEq)]
pub struct CodecConfig {
    /// Sample rate of the input in Hz.
    pub sample_rate: u32,
    /// Samples per frame.
    pub window_size: usize,
    /// LPC model order.
    pub order: usize,
    /// Voicing ceiling as a fraction of the 22.05 kHz reference rate.
    pub voicing_threshold: f32,
    /// Pitch search bounds in Hz.
    pub min_pitch_hz: u32,
    pub max_pitch_hz: u32,
    /// Seed for unvoiced excitation noise.
    pub noise_seed: u64,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            window_size: defaults::WINDOW_SIZE,
            order: defaults::N_COEFFS,
            voicing_threshold: defaults::F_THRESHOLD,
            min_pitch_hz: defaults::MIN_PITCH_HZ,
            max_pitch_hz: defaults::MAX_PITCH_HZ,
            noise_seed: defaults::NOISE_SEED,
        }
    }
}

/// Orchestrates voicing, pitch and LPC for every frame of a signal.
pub struct LpcPipeline<L: LpcCodec> {
    codec: L,
    config: CodecConfig,
    classifier: FrameClassifier,
    estimator: PitchEstimator,
}

impl<L: LpcCodec> LpcPipeline<L> {
    /// Creates a pipeline around an LPC capability.
    pub fn new(codec: L, config: CodecConfig) -> Result<Self> {
        if config.window_size == 0 {
            return Err(VoxlpcError::ConfigInvalidValue {
                key: "window_size".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if config.sample_rate == 0 {
            return Err(VoxlpcError::ConfigInvalidValue {
                key: "sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }

        let classifier =
            FrameClassifier::for_sample_rate(config.voicing_threshold, config.sample_rate);
        let estimator =
            PitchEstimator::with_range(config.sample_rate, config.min_pitch_hz, config.max_pitch_hz);

        Ok(Self {
            codec,
            config,
            classifier,
            estimator,
        })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn codec(&self) -> &L {
        &self.codec
    }

    /// Number of whole frames in `len` samples; the remainder is dropped.
    pub fn frame_count(&self, len: usize) -> usize {
        len / self.config.window_size
    }

    /// Encodes every whole frame of `samples`.
    ///
    /// Either every frame is encoded or an error is returned.
    pub fn encode(&self, samples: &[f32]) -> Result<EncodedSignal> {
        let window = self.config.window_size;
        let mut frames = Vec::with_capacity(self.frame_count(samples.len()));

        for frame in samples.chunks_exact(window) {
            frames.push(self.encode_frame(frame)?);
        }

        let dropped = samples.len() % window;
        tracing::debug!(
            frames = frames.len(),
            dropped,
            codec = self.codec.name(),
            "encoded signal"
        );

        Ok(EncodedSignal::new(frames, window, self.config.sample_rate))
    }

    /// Classifies, pitch-tracks and analyses one frame.
    pub fn encode_frame(&self, frame: &[f32]) -> Result<EncodedFrame> {
        let pitch = match self.classifier.classify(frame) {
            Voicing::Voiced => self.estimator.estimate(frame).value,
            Voicing::Unvoiced => 0.0,
        };
        let coefficients = self.codec.analyze(frame, self.config.order)?;

        Ok(EncodedFrame {
            pitch,
            coefficients,
        })
    }

    /// Reconstructs `frame_count * chunk_size` samples from `signal`.
    pub fn decode(&self, signal: &EncodedSignal) -> Result<Vec<f32>> {
        let chunk = signal.chunk_size();
        if chunk == 0 {
            return Err(VoxlpcError::Synthesis {
                message: "encoded signal has a chunk size of 0".to_string(),
            });
        }
        let mut output = vec![0.0f32; signal.decoded_len()];
        let mut rng = StdRng::seed_from_u64(self.config.noise_seed);

        for (frame, out) in signal.frames().iter().zip(output.chunks_exact_mut(chunk)) {
            let samples = self.decode_frame(frame, chunk, &mut rng)?;
            out.copy_from_slice(&samples);
        }

        Ok(output)
    }

    /// Synthesizes `len` samples for one frame from a zero filter state.
    pub fn decode_frame(
        &self,
        frame: &EncodedFrame,
        len: usize,
        rng: &mut StdRng,
    ) -> Result<Vec<f32>> {
        let excitation = if frame.is_voiced() {
            pulse_train(len, pulse_period(frame.pitch))
        } else {
            white_noise(len, rng)
        };

        let samples = self
            .codec
            .synthesize(&frame.coefficients, &excitation, self.config.order)?;
        if samples.len() != len {
            return Err(VoxlpcError::Synthesis {
                message: format!("expected {} samples, got {}", len, samples.len()),
            });
        }
        Ok(samples)
    }
}
