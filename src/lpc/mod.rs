//! Linear-prediction capability used by the frame codec.

pub mod codec;
pub mod levinson;

pub use codec::{LpcCodec, MockLpc};
pub use levinson::LevinsonLpc;
