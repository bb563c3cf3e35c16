//! Station abstraction and runner for the streaming front end.

use crate::error::BufferError;
use crate::streaming::error::{ErrorReporter, StationError};
use crate::streaming::ring_buffer::RingBuffer;
use crossbeam_channel::{Receiver, Sender};
use std::marker::PhantomData;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A processing station.
///
/// Each station receives input, processes it, and produces output.
/// Stations run in their own threads.
pub trait Station: Send + 'static {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Processes a single input item.
    ///
    /// Returns:
    /// - `Ok(Some(output))` - Successfully processed and produced output
    /// - `Ok(None)` - Successfully processed but no output
    /// - `Err(StationError)` - Processing failed
    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, StationError>;

    /// Returns the name of this station for logging and error reporting.
    fn name(&self) -> &'static str;

    /// Called when the station is shutting down.
    fn shutdown(&mut self) {}
}

/// Runs a station in a dedicated thread.
pub struct StationRunner<S: Station> {
    handle: Option<JoinHandle<()>>,
    station_name: &'static str,
    stop: Arc<AtomicBool>,
    _phantom: PhantomData<S>,
}

impl<S: Station> StationRunner<S> {
    /// Spawns a station fed by a channel.
    ///
    /// The station stops when the input channel disconnects, the output
    /// channel is dropped, or it reports a fatal error.
    pub fn spawn(
        mut station: S,
        input_rx: Receiver<S::Input>,
        output_tx: Sender<S::Output>,
        error_reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let station_name = station.name();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            while let Ok(input) = input_rx.recv() {
                if stop_flag.load(Ordering::SeqCst) {
                    break;
                }
                let result = station.process(input);
                if forward(station_name, result, &output_tx, error_reporter.as_ref()).is_break() {
                    break;
                }
            }
            station.shutdown();
        });

        Self {
            handle: Some(handle),
            station_name,
            stop,
            _phantom: PhantomData,
        }
    }

    /// Spawns a station that drains a ring buffer.
    ///
    /// Reads wait at most `read_timeout`, so [`stop`](Self::stop) is
    /// observed within one timeout. The station also stops once the ring is
    /// closed and drained. Any other buffer failure is fatal.
    pub fn spawn_from_ring(
        mut station: S,
        ring: Arc<RingBuffer<S::Input>>,
        read_timeout: Duration,
        output_tx: Sender<S::Output>,
        error_reporter: Arc<dyn ErrorReporter>,
    ) -> Self
    where
        S::Input: Clone,
    {
        let station_name = station.name();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            while !stop_flag.load(Ordering::SeqCst) {
                match ring.timed_read(read_timeout) {
                    Ok(Some(input)) => {
                        let result = station.process(input);
                        if forward(station_name, result, &output_tx, error_reporter.as_ref())
                            .is_break()
                        {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(BufferError::Closed) => {
                        tracing::debug!(station = station_name, "ring buffer closed, draining done");
                        break;
                    }
                    Err(e) => {
                        error_reporter.report(station_name, &StationError::Fatal(e.to_string()));
                        break;
                    }
                }
            }
            station.shutdown();
        });

        Self {
            handle: Some(handle),
            station_name,
            stop,
            _phantom: PhantomData,
        }
    }

    /// Asks the station to stop after the item it is working on.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Waits for the station thread to complete.
    pub fn join(mut self) -> Result<(), String> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| format!("Station '{}' thread panicked", self.station_name))
        } else {
            Ok(())
        }
    }

    pub fn name(&self) -> &'static str {
        self.station_name
    }
}

/// Sends a processing result downstream and decides whether to keep going.
fn forward<T>(
    station_name: &'static str,
    result: Result<Option<T>, StationError>,
    output_tx: &Sender<T>,
    error_reporter: &dyn ErrorReporter,
) -> ControlFlow<()> {
    match result {
        Ok(Some(output)) => {
            if output_tx.send(output).is_err() {
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        }
        Ok(None) => ControlFlow::Continue(()),
        Err(error @ StationError::Recoverable(_)) => {
            error_reporter.report(station_name, &error);
            ControlFlow::Continue(())
        }
        Err(error @ StationError::Fatal(_)) => {
            error_reporter.report(station_name, &error);
            ControlFlow::Break(())
        }
    }
}
