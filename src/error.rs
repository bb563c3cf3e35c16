//! Error types for voxlpc.

use thiserror::Error;

/// Failures of the ring buffer's synchronization layer.
///
/// Neither variant is retried: a poisoned lock means a thread panicked while
/// holding buffer state, and a closed buffer will never produce data again.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("ring buffer lock poisoned by a panicked thread")]
    Poisoned,

    #[error("ring buffer closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum VoxlpcError {
    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio input/output errors
    #[error("Audio format mismatch: expected {expected}, got {actual}")]
    AudioFormatMismatch { expected: String, actual: String },

    #[error("Audio source failed: {message}")]
    AudioSource { message: String },

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    // LPC capability errors
    #[error("LPC analysis failed: {message}")]
    Analysis { message: String },

    #[error("LPC synthesis failed: {message}")]
    Synthesis { message: String },

    // Real-time boundary
    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, VoxlpcError>;
