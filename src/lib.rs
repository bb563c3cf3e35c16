//! voxlpc - Real-time LPC speech front end
//!
//! Frame-based voicing, AMDF pitch and linear-prediction analysis with
//! pulse/noise resynthesis, fed by a lossy ring buffer between a capture
//! thread and an analysis thread.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod analysis;
pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod codec;
pub mod config;
pub mod defaults;
pub mod error;
pub mod lpc;
pub mod streaming;

// Core traits (source → analyze → synthesize)
pub use audio::recorder::AudioSource;
pub use lpc::LpcCodec;

// Analysis
pub use analysis::{FrameClassifier, PitchEstimate, PitchEstimator, Voicing};

// Codec
pub use codec::{CodecConfig, EncodedFrame, EncodedSignal, LpcPipeline};
pub use lpc::LevinsonLpc;

// Streaming
pub use streaming::{RingBuffer, StreamingCodec, StreamingConfig, StreamingHandle};

// Error handling
pub use error::{BufferError, Result, VoxlpcError};

// Config
pub use config::Config;

// Station framework (for advanced users)
pub use streaming::error::{ErrorReporter, StationError};
pub use streaming::station::Station;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
