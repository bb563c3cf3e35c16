//! Capture thread: the real-time producer side of the ring buffer.
//!
//! Pulls samples from an audio source, cuts them into analysis windows and
//! publishes each window with the two-phase acquire/commit protocol. The
//! thread never waits on the consumer; if analysis falls behind, the oldest
//! unread windows are overwritten.

use crate::audio::recorder::AudioSource;
use crate::error::Result;
use crate::streaming::frame::SampleBlock;
use crate::streaming::ring_buffer::RingBuffer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Configuration for the capture thread.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Samples per published block.
    pub window_size: usize,
    /// Polling interval when no samples are available (ms).
    pub poll_interval_ms: u64,
    /// Close the ring buffer when capture ends so the consumer can drain.
    pub close_on_exit: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            window_size: crate::defaults::WINDOW_SIZE,
            poll_interval_ms: 10,
            close_on_exit: true,
        }
    }
}

/// Producer that feeds a ring buffer from an audio source.
pub struct CaptureThread<A: AudioSource> {
    audio_source: A,
    ring: Arc<RingBuffer<SampleBlock>>,
    config: CaptureConfig,
}

impl<A: AudioSource + 'static> CaptureThread<A> {
    pub fn new(audio_source: A, ring: Arc<RingBuffer<SampleBlock>>, config: CaptureConfig) -> Self {
        Self {
            audio_source,
            ring,
            config,
        }
    }

    /// Starts capture in a background thread.
    ///
    /// Runs until the source is exhausted, `stop()` is called on the handle,
    /// or the source or buffer fails. A trailing partial window is dropped.
    pub fn start(mut self) -> Result<CaptureHandle> {
        self.audio_source.start()?;

        let running = Arc::new(AtomicBool::new(true));
        let published = Arc::new(AtomicU64::new(0));
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);

        let thread_running = Arc::clone(&running);
        let thread_published = Arc::clone(&published);

        let thread = thread::spawn(move || {
            let result = self.run(&thread_running, &thread_published, poll_interval);
            thread_running.store(false, Ordering::SeqCst);
            result
        });

        Ok(CaptureHandle {
            running,
            published,
            thread: Some(thread),
        })
    }

    fn run(
        &mut self,
        running: &AtomicBool,
        published: &AtomicU64,
        poll_interval: Duration,
    ) -> Result<()> {
        let window = self.config.window_size;
        let mut pending: Vec<f32> = Vec::with_capacity(window * 2);
        let mut result = Ok(());

        while running.load(Ordering::SeqCst) {
            match self.audio_source.read_samples() {
                Ok(samples) if !samples.is_empty() => {
                    pending.extend_from_slice(&samples);
                    if let Err(e) = self.publish_full_windows(&mut pending, published) {
                        tracing::error!("capture stopped: {}", e);
                        result = Err(e);
                        break;
                    }
                }
                Ok(_) => {
                    if self.audio_source.is_exhausted() {
                        break;
                    }
                    thread::sleep(poll_interval);
                }
                Err(e) => {
                    tracing::error!("audio source error: {}", e);
                    result = Err(e);
                    break;
                }
            }
        }

        if !pending.is_empty() {
            tracing::debug!(samples = pending.len(), "dropping partial window");
        }
        if let Err(e) = self.audio_source.stop() {
            tracing::warn!("failed to stop audio source: {}", e);
        }
        if self.config.close_on_exit {
            self.ring.close()?;
        }

        result
    }

    fn publish_full_windows(&self, pending: &mut Vec<f32>, published: &AtomicU64) -> Result<()> {
        let window = self.config.window_size;
        let sample_rate = self.audio_source.sample_rate();
        while pending.len() >= window {
            let sequence = published.load(Ordering::SeqCst);
            let mut slot = self.ring.acquire_write_slot()?;
            slot.fill(|block| {
                block.fill_from(sequence, pending.drain(..window));
                tracing::trace!(sequence, ms = block.duration_ms(sample_rate), "window captured");
            })?;
            slot.commit()?;
            published.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Handle to control a running capture thread.
pub struct CaptureHandle {
    running: Arc<AtomicBool>,
    published: Arc<AtomicU64>,
    thread: Option<JoinHandle<Result<()>>>,
}

impl CaptureHandle {
    /// Stops capture after the current read.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Returns true while the capture thread is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Blocks published to the ring so far.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::SeqCst)
    }

    /// Waits for the capture thread and returns the number of published blocks.
    pub fn join(mut self) -> Result<u64> {
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| crate::error::VoxlpcError::Other("capture thread panicked".to_string()))??;
        }
        Ok(self.published())
    }
}
