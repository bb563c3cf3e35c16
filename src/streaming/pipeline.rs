//! Streaming front end orchestrator.
//!
//! Connects all stations together:
//! ```text
//! AudioSource ─▶ Capture ─▶ RingBuffer ─▶ Encoder ─▶ (channel) ─▶ Decoder ─▶ (channel)
//!   producer thread   lossy boundary    consumer thread          station thread
//! ```

use crate::audio::recorder::AudioSource;
use crate::codec::LpcPipeline;
use crate::config::Config;
use crate::defaults;
use crate::error::{Result, VoxlpcError};
use crate::lpc::LpcCodec;
use crate::streaming::capture::{CaptureConfig, CaptureHandle, CaptureThread};
use crate::streaming::decoder::DecoderStation;
use crate::streaming::encoder::EncoderStation;
use crate::streaming::error::{ErrorReporter, LogReporter};
use crate::streaming::frame::{DecodedBlock, EncodedBlock, SampleBlock};
use crate::streaming::ring_buffer::RingBuffer;
use crate::streaming::station::StationRunner;
use crossbeam_channel::{Receiver, bounded};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the streaming front end.
#[derive(Debug, Clone)]
pub struct StreamingConfig {
    pub capture: CaptureConfig,
    /// Ring buffer capacity in blocks.
    pub ring_capacity: usize,
    /// Longest wait of the encoder for a block before it checks for stop.
    pub read_timeout_ms: u64,
    /// Bounded channel size between stations.
    pub channel_capacity: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            ring_capacity: defaults::RING_CAPACITY,
            read_timeout_ms: defaults::READ_TIMEOUT_MS,
            channel_capacity: defaults::CHANNEL_CAPACITY,
        }
    }
}

impl StreamingConfig {
    /// Creates configuration from app config.
    pub fn from_config(config: &Config) -> Self {
        let mut streaming = Self::default();
        streaming.capture.window_size = config.audio.window_size;
        streaming.ring_capacity = config.buffer.capacity;
        streaming.read_timeout_ms = config.buffer.read_timeout_ms;
        streaming
    }
}

/// Counters collected when a stream is joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamStats {
    /// Blocks the capture thread published.
    pub published: u64,
    /// Blocks overwritten before the encoder read them.
    pub overwritten: u64,
}

/// Handle to a running stream.
pub struct StreamingHandle<L: LpcCodec + 'static> {
    capture: CaptureHandle,
    encoder: StationRunner<EncoderStation<L>>,
    decoder: Option<StationRunner<DecoderStation<L>>>,
    ring: Arc<RingBuffer<SampleBlock>>,
}

impl<L: LpcCodec + 'static> StreamingHandle<L> {
    /// Stops capture; downstream stations finish the blocks already buffered.
    pub fn stop(&self) {
        self.capture.stop();
    }

    /// Returns true while the capture thread is running.
    pub fn is_running(&self) -> bool {
        self.capture.is_running()
    }

    /// Waits for every thread of the stream to finish.
    pub fn join(self) -> Result<StreamStats> {
        let capture_result = self.capture.join();

        self.encoder.join().map_err(VoxlpcError::Other)?;
        if let Some(decoder) = self.decoder {
            decoder.join().map_err(VoxlpcError::Other)?;
        }

        let published = capture_result?;
        let overwritten = self.ring.overwritten()?;
        if overwritten > 0 {
            tracing::warn!(overwritten, published, "analysis fell behind capture");
        }

        Ok(StreamStats {
            published,
            overwritten,
        })
    }
}

/// Streaming front end around one frame codec.
pub struct StreamingCodec<L: LpcCodec + 'static> {
    pipeline: Arc<LpcPipeline<L>>,
    config: StreamingConfig,
    error_reporter: Arc<dyn ErrorReporter>,
}

impl<L: LpcCodec + 'static> StreamingCodec<L> {
    pub fn new(pipeline: Arc<LpcPipeline<L>>, config: StreamingConfig) -> Result<Self> {
        if config.capture.window_size != pipeline.config().window_size {
            return Err(VoxlpcError::ConfigInvalidValue {
                key: "window_size".to_string(),
                message: format!(
                    "capture uses {} samples but the codec expects {}",
                    config.capture.window_size,
                    pipeline.config().window_size
                ),
            });
        }
        if config.ring_capacity == 0 {
            return Err(VoxlpcError::ConfigInvalidValue {
                key: "buffer.capacity".to_string(),
                message: "must be positive".to_string(),
            });
        }

        Ok(Self {
            pipeline,
            config,
            error_reporter: Arc::new(LogReporter),
        })
    }

    /// Replaces the default `tracing` error reporter.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = reporter;
        self
    }

    /// Starts capture and analysis. Encoded blocks arrive on the receiver.
    pub fn start_encoder<A: AudioSource + 'static>(
        &self,
        audio_source: A,
    ) -> Result<(StreamingHandle<L>, Receiver<EncodedBlock>)> {
        let (encoded_tx, encoded_rx) = bounded(self.config.channel_capacity);
        let ring = self.ring();

        let capture =
            CaptureThread::new(audio_source, Arc::clone(&ring), self.config.capture.clone())
                .start()?;
        let encoder = StationRunner::spawn_from_ring(
            EncoderStation::new(Arc::clone(&self.pipeline)),
            Arc::clone(&ring),
            Duration::from_millis(self.config.read_timeout_ms),
            encoded_tx,
            Arc::clone(&self.error_reporter),
        );

        let handle = StreamingHandle {
            capture,
            encoder,
            decoder: None,
            ring,
        };
        Ok((handle, encoded_rx))
    }

    /// Starts capture, analysis and resynthesis. Decoded blocks arrive on
    /// the receiver in capture order.
    pub fn start_roundtrip<A: AudioSource + 'static>(
        &self,
        audio_source: A,
    ) -> Result<(StreamingHandle<L>, Receiver<DecodedBlock>)> {
        let (mut handle, encoded_rx) = self.start_encoder(audio_source)?;
        let (decoded_tx, decoded_rx) = bounded(self.config.channel_capacity);

        handle.decoder = Some(StationRunner::spawn(
            DecoderStation::new(Arc::clone(&self.pipeline)),
            encoded_rx,
            decoded_tx,
            Arc::clone(&self.error_reporter),
        ));

        Ok((handle, decoded_rx))
    }

    fn ring(&self) -> Arc<RingBuffer<SampleBlock>> {
        let window = self.config.capture.window_size;
        Arc::new(RingBuffer::from_fn(self.config.ring_capacity, || {
            SampleBlock::silent(window)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::recorder::MockAudioSource;
    use crate::codec::CodecConfig;
    use crate::lpc::{LevinsonLpc, MockLpc};
    use std::f32::consts::PI;

    fn codec<L: LpcCodec + 'static>(lpc: L) -> StreamingCodec<L> {
        let pipeline = Arc::new(LpcPipeline::new(lpc, CodecConfig::default()).unwrap());
        let config = StreamingConfig {
            read_timeout_ms: 20,
            ring_capacity: 1024,
            ..StreamingConfig::default()
        };
        StreamingCodec::new(pipeline, config).unwrap()
    }

    fn sine_batches(blocks: usize) -> Vec<Vec<f32>> {
        let samples: Vec<f32> = (0..256 * blocks)
            .map(|n| (2.0 * PI * 150.0 * n as f32 / 22050.0).sin())
            .collect();
        samples.chunks(300).map(|c| c.to_vec()).collect()
    }

    #[test]
    fn test_streaming_config_default() {
        let config = StreamingConfig::default();
        assert_eq!(config.ring_capacity, 32);
        assert_eq!(config.read_timeout_ms, 1000);
        assert_eq!(config.capture.window_size, 256);
    }

    #[test]
    fn test_window_mismatch_is_rejected() {
        let pipeline = Arc::new(LpcPipeline::new(MockLpc::new(), CodecConfig::default()).unwrap());
        let mut config = StreamingConfig::default();
        config.capture.window_size = 128;
        assert!(StreamingCodec::new(pipeline, config).is_err());
    }

    #[test]
    fn test_encoder_emits_blocks_in_order() {
        let stream = codec(MockLpc::new());
        let source = MockAudioSource::new().with_batches(sine_batches(8));

        let (handle, encoded_rx) = stream.start_encoder(source).unwrap();
        let blocks: Vec<EncodedBlock> = encoded_rx.iter().collect();
        let stats = handle.join().unwrap();

        assert_eq!(stats.published, 8);
        assert_eq!(stats.overwritten, 0);
        let sequences: Vec<u64> = blocks.iter().map(|b| b.sequence).collect();
        assert_eq!(sequences, (0..8).collect::<Vec<_>>());
        assert!(blocks[1..7].iter().all(|b| b.frame.is_voiced()));
    }

    #[test]
    fn test_roundtrip_emits_window_sized_blocks() {
        let stream = codec(LevinsonLpc::default());
        let source = MockAudioSource::new().with_batches(sine_batches(4));

        let (handle, decoded_rx) = stream.start_roundtrip(source).unwrap();
        let blocks: Vec<DecodedBlock> = decoded_rx.iter().collect();
        handle.join().unwrap();

        assert_eq!(blocks.len(), 4);
        for block in &blocks {
            assert_eq!(block.samples.len(), 256);
            assert!(block.samples.iter().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn test_stop_endless_stream() {
        let stream = codec(MockLpc::new());
        let source = MockAudioSource::new().with_samples(vec![0.0; 256]);

        let (handle, encoded_rx) = stream.start_encoder(source).unwrap();
        let first = encoded_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(first.frame.pitch, 0.0);

        handle.stop();
        let drain = std::thread::spawn(move || encoded_rx.iter().count());
        let stats = handle.join().unwrap();
        assert!(stats.published >= 1);
        drain.join().unwrap();
    }
}
