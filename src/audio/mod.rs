//! Audio sources and WAV I/O.

pub mod recorder;
pub mod wav;

pub use recorder::{AudioSource, MockAudioSource};
pub use wav::{WavAudioSource, write_wav, write_wav_file};
