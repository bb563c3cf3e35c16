//! Decoder station: excitation and LPC synthesis for encoded blocks.

use crate::codec::LpcPipeline;
use crate::lpc::LpcCodec;
use crate::streaming::error::StationError;
use crate::streaming::frame::{DecodedBlock, EncodedBlock};
use crate::streaming::station::Station;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

pub struct DecoderStation<L: LpcCodec> {
    pipeline: Arc<LpcPipeline<L>>,
    rng: StdRng,
}

impl<L: LpcCodec + 'static> DecoderStation<L> {
    pub fn new(pipeline: Arc<LpcPipeline<L>>) -> Self {
        let rng = StdRng::seed_from_u64(pipeline.config().noise_seed);
        Self { pipeline, rng }
    }
}

impl<L: LpcCodec + 'static> Station for DecoderStation<L> {
    type Input = EncodedBlock;
    type Output = DecodedBlock;

    fn process(&mut self, block: EncodedBlock) -> Result<Option<DecodedBlock>, StationError> {
        let window = self.pipeline.config().window_size;
        let samples = self
            .pipeline
            .decode_frame(&block.frame, window, &mut self.rng)
            .map_err(|e| StationError::Recoverable(format!("block {}: {}", block.sequence, e)))?;

        Ok(Some(DecodedBlock {
            sequence: block.sequence,
            samples,
        }))
    }

    fn name(&self) -> &'static str {
        "Decoder"
    }
}
