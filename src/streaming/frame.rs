//! Frame types for the streaming front end.
//!
//! Defines the data that crosses the ring buffer and the channels between
//! stations.

use crate::codec::EncodedFrame;

/// One analysis window of captured samples.
///
/// This is the ring buffer element; slots are reused, so `samples` keeps its
/// allocation between writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBlock {
    /// Capture order, starting at 0.
    pub sequence: u64,
    pub samples: Vec<f32>,
}

impl SampleBlock {
    /// A zeroed block of `window_size` samples.
    pub fn silent(window_size: usize) -> Self {
        Self {
            sequence: 0,
            samples: vec![0.0; window_size],
        }
    }

    /// Overwrites this block in place.
    pub fn fill_from(&mut self, sequence: u64, samples: impl IntoIterator<Item = f32>) {
        self.sequence = sequence;
        self.samples.clear();
        self.samples.extend(samples);
    }

    /// Returns the duration of this block in milliseconds.
    pub fn duration_ms(&self, sample_rate: u32) -> u32 {
        (self.samples.len() as u64 * 1000 / sample_rate.max(1) as u64) as u32
    }
}

/// Analysis output for one captured block.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBlock {
    pub sequence: u64,
    pub frame: EncodedFrame,
}

/// Reconstructed samples for one captured block.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBlock {
    pub sequence: u64,
    pub samples: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_block() {
        let block = SampleBlock::silent(256);
        assert_eq!(block.sequence, 0);
        assert_eq!(block.samples, vec![0.0; 256]);
    }

    #[test]
    fn test_fill_from_reuses_block() {
        let mut block = SampleBlock::silent(4);
        block.fill_from(9, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(block.sequence, 9);
        assert_eq!(block.samples, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_block_duration() {
        let block = SampleBlock::silent(22050);
        assert_eq!(block.duration_ms(22050), 1000);
        assert_eq!(SampleBlock::silent(256).duration_ms(16000), 16);
    }
}
