//! Encoder station: per-frame analysis on the consumer side of the ring.

use crate::codec::LpcPipeline;
use crate::lpc::LpcCodec;
use crate::streaming::error::StationError;
use crate::streaming::frame::{EncodedBlock, SampleBlock};
use crate::streaming::station::Station;
use std::sync::Arc;

/// Runs voicing, pitch and LPC analysis on every captured block.
pub struct EncoderStation<L: LpcCodec> {
    pipeline: Arc<LpcPipeline<L>>,
    next_sequence: Option<u64>,
    dropped: u64,
}

impl<L: LpcCodec + 'static> EncoderStation<L> {
    pub fn new(pipeline: Arc<LpcPipeline<L>>) -> Self {
        Self {
            pipeline,
            next_sequence: None,
            dropped: 0,
        }
    }

    /// Blocks lost to ring buffer overwrites, as seen from sequence gaps.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl<L: LpcCodec + 'static> Station for EncoderStation<L> {
    type Input = SampleBlock;
    type Output = EncodedBlock;

    fn process(&mut self, block: SampleBlock) -> Result<Option<EncodedBlock>, StationError> {
        let window = self.pipeline.config().window_size;
        if block.samples.len() != window {
            return Err(StationError::Recoverable(format!(
                "block {} has {} samples, expected {}",
                block.sequence,
                block.samples.len(),
                window
            )));
        }

        if let Some(expected) = self.next_sequence
            && block.sequence > expected
        {
            let gap = block.sequence - expected;
            self.dropped += gap;
            tracing::debug!(gap, sequence = block.sequence, "blocks lost to overwrite");
        }
        self.next_sequence = Some(block.sequence + 1);

        let frame = self
            .pipeline
            .encode_frame(&block.samples)
            .map_err(|e| StationError::Recoverable(format!("block {}: {}", block.sequence, e)))?;

        Ok(Some(EncodedBlock {
            sequence: block.sequence,
            frame,
        }))
    }

    fn name(&self) -> &'static str {
        "Encoder"
    }

    fn shutdown(&mut self) {
        tracing::debug!(dropped = self.dropped, "encoder station stopped");
    }
}
