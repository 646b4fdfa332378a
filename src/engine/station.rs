//! Station abstraction and a runner that hosts one on its own thread.
//!
//! The runner plays the role of the host's periodic audio callback: it pulls
//! inputs off a channel and hands them to the station one at a time. Dropping
//! every sender ends the loop; whatever was still queued is discarded with it.

use crate::engine::error::{ErrorReporter, StationError};
use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A processing station fed one input at a time.
///
/// Stations deliver their results through their own outputs (sinks); the
/// runner only drives them.
pub trait Station: Send + 'static {
    /// The input type this station receives.
    type Input: Send + 'static;

    /// Processes a single input item.
    ///
    /// Returns:
    /// - `Ok(())` - Processed (with or without output)
    /// - `Err(StationError::Recoverable)` - Reported, processing continues
    /// - `Err(StationError::Fatal)` - Reported, the station shuts down
    fn process(&mut self, input: Self::Input) -> Result<(), StationError>;

    /// Returns the name of this station for logging and error reporting.
    fn name(&self) -> &'static str;

    /// Called when the station is shutting down.
    fn shutdown(&mut self) {}
}

/// Runs a station in a dedicated thread.
pub struct StationRunner<S: Station> {
    /// Handle to the spawned thread; yields the station back on exit.
    handle: Option<JoinHandle<S>>,
    /// Name of the station (cached for error reporting).
    station_name: &'static str,
}

impl<S: Station> StationRunner<S> {
    /// Spawns `station` on a new thread reading from `input_rx`.
    pub fn spawn(
        mut station: S,
        input_rx: Receiver<S::Input>,
        error_reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let station_name = station.name();

        let handle = thread::spawn(move || {
            Self::run_station(&mut station, input_rx, error_reporter);
            station
        });

        Self {
            handle: Some(handle),
            station_name,
        }
    }

    /// Main processing loop for the station.
    fn run_station(
        station: &mut S,
        input_rx: Receiver<S::Input>,
        error_reporter: Arc<dyn ErrorReporter>,
    ) {
        let station_name = station.name();
        tracing::debug!(station = station_name, "station started");

        while let Ok(input) = input_rx.recv() {
            if let Err(error) = station.process(input) {
                error_reporter.report(station_name, &error);
                if error.is_fatal() {
                    break;
                }
            }
        }

        station.shutdown();
        tracing::debug!(station = station_name, "station stopped");
    }

    /// Waits for the station thread to complete and returns the station.
    pub fn join(mut self) -> Result<S, String> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| format!("Station '{}' thread panicked", self.station_name)),
            None => Err(format!("Station '{}' already joined", self.station_name)),
        }
    }

    /// Returns the name of the station.
    pub fn name(&self) -> &'static str {
        self.station_name
    }

    /// True once the station thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }
}
