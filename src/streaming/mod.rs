//! Real-time streaming front end.
//!
//! A producer thread captures audio into a lossy ring buffer; stations on
//! the consumer side analyze (and optionally resynthesize) each window:
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌──────────┐    ┌──────────┐
//! │   Capture   │───▶│ Ring Buffer │───▶│ Encoder  │───▶│ Decoder  │───▶ blocks
//! │  (producer) │    │ (overwrite) │    │ (LPC)    │    │ (synth)  │
//! └─────────────┘    └─────────────┘    └──────────┘    └──────────┘
//! ```

pub mod capture;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod ring_buffer;
pub mod station;

pub use capture::{CaptureConfig, CaptureHandle, CaptureThread};
pub use decoder::DecoderStation;
pub use encoder::EncoderStation;
pub use error::{ErrorReporter, LogReporter, StationError};
pub use frame::{DecodedBlock, EncodedBlock, SampleBlock};
pub use pipeline::{StreamStats, StreamingCodec, StreamingConfig, StreamingHandle};
pub use ring_buffer::{RingBuffer, WriteSlot};
pub use station::{Station, StationRunner};
