//! Frame codec: chunking, voicing, pitch and LPC analysis/synthesis.

pub mod excitation;
pub mod pipeline;
pub mod types;

pub use pipeline::{CodecConfig, LpcPipeline};
pub use types::{EncodedFrame, EncodedSignal};
