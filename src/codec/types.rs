//! Analysis results handed from the encoder to the decoder.

use crate::error::VoxlpcError;
use serde::{Deserialize, Serialize};

/// Analysis result for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedFrame {
    /// 0 for unvoiced frames; otherwise the pitch measure of the frame.
    pub pitch: f32,
    /// Linear-prediction filter, one value per model order.
    pub coefficients: Vec<f32>,
}

impl EncodedFrame {
    pub fn is_voiced(&self) -> bool {
        self.pitch > 0.0
    }
}

/// Every whole frame of one encoded input signal, in order.
///
/// Deserializing rejects a zero `chunk_size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEncodedSignal")]
pub struct EncodedSignal {
    chunk_size: usize,
    sample_rate: u32,
    frames: Vec<EncodedFrame>,
}

impl EncodedSignal {
    pub(crate) fn new(frames: Vec<EncodedFrame>, chunk_size: usize, sample_rate: u32) -> Self {
        Self {
            chunk_size,
            sample_rate,
            frames,
        }
    }

    pub fn frames(&self) -> &[EncodedFrame] {
        &self.frames
    }

    /// Samples per frame.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// `floor(input_length / chunk_size)` of the encoded input.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Length of the signal `decode` reconstructs.
    pub fn decoded_len(&self) -> usize {
        self.frame_count() * self.chunk_size
    }

    pub fn voiced_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_voiced()).count()
    }

    /// Duration of the decoded signal in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        (self.decoded_len() as u64 * 1000) / self.sample_rate.max(1) as u64
    }
}

/// Unchecked serde form of [`EncodedSignal`].
#[derive(Deserialize)]
struct RawEncodedSignal {
    chunk_size: usize,
    sample_rate: u32,
    frames: Vec<EncodedFrame>,
}

impl TryFrom<RawEncodedSignal> for EncodedSignal {
    type Error = VoxlpcError;

    fn try_from(raw: RawEncodedSignal) -> Result<Self, Self::Error> {
        if raw.chunk_size == 0 {
            return Err(VoxlpcError::ConfigInvalidValue {
                key: "chunk_size".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(Self::new(raw.frames, raw.chunk_size, raw.sample_rate))
    }
}
