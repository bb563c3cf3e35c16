use crate::defaults;
use crate::error::{Result, VoxlpcError};

/// Trait for audio sources feeding the capture thread.
///
/// This trait allows swapping implementations (WAV file vs mock, or a device
/// callback adapter supplied by the caller).
pub trait AudioSource: Send {
    /// Start producing audio.
    fn start(&mut self) -> Result<()>;

    /// Stop producing audio.
    fn stop(&mut self) -> Result<()>;

    /// Read the next batch of mono samples.
    ///
    /// An empty vector means no samples are ready yet. Batch sizes need not
    /// match the analysis window.
    fn read_samples(&mut self) -> Result<Vec<f32>>;

    /// Sample rate of the produced audio in Hz.
    fn sample_rate(&self) -> u32;

    /// True once the source will never produce more samples.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Mock audio source for testing.
///
/// Replays a fixed script of sample batches, then reports exhaustion.
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    is_started: bool,
    batches: Vec<Vec<f32>>,
    position: usize,
    repeat: bool,
    sample_rate: u32,
    should_fail_start: bool,
    should_fail_read: bool,
}

impl MockAudioSource {
    /// Create a new mock producing one batch of 160 zero samples forever.
    pub fn new() -> Self {
        Self {
            is_started: false,
            batches: vec![vec![0.0; 160]],
            position: 0,
            repeat: true,
            sample_rate: defaults::SAMPLE_RATE,
            should_fail_start: false,
            should_fail_read: false,
        }
    }

    /// Repeat `samples` on every read.
    pub fn with_samples(mut self, samples: Vec<f32>) -> Self {
        self.batches = vec![samples];
        self.repeat = true;
        self
    }

    /// Replay `batches` once, in order.
    pub fn with_batches(mut self, batches: Vec<Vec<f32>>) -> Self {
        self.batches = batches;
        self.repeat = false;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Configure the mock to fail on start
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on read
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            return Err(VoxlpcError::AudioSource {
                message: "mock start failure".to_string(),
            });
        }
        self.is_started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<f32>> {
        if self.should_fail_read {
            return Err(VoxlpcError::AudioSource {
                message: "mock read failure".to_string(),
            });
        }
        if self.repeat {
            return Ok(self.batches.first().cloned().unwrap_or_default());
        }
        match self.batches.get(self.position) {
            Some(batch) => {
                self.position += 1;
                Ok(batch.clone())
            }
            None => Ok(Vec::new()),
        }
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn is_exhausted(&self) -> bool {
        !self.repeat && self.position >= self.batches.len()
    }
}
