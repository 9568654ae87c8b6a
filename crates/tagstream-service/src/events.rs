//! Reader event handler.
//!
//! Applies the driver's connected/disconnected/inventory notifications to
//! [`ReaderState`](crate::state::ReaderState). Each event is handled as one
//! transaction under the [`StateGuard`]; driver I/O prompted by an event
//! (reader info fetch, stream restart) is launched on a detached task.

use crate::state::StateGuard;
use crate::stream::StreamController;
use crate::tags::Sighting;
use chrono::Local;
use std::sync::Arc;
use tagstream_core::TagId;
use tagstream_reader::{ReaderDriver, ReaderEvent};
use tracing::{debug, info, trace, warn};

/// Summary of one processed inventory batch, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BatchOutcome {
    /// Sightings taken from the driver buffer.
    pub drained: usize,
    /// Entries created for tags not seen before in this session.
    pub new_tags: usize,
    /// Sightings dropped: stream disabled or invalid identifier.
    pub discarded: usize,
    /// Strongest signal among the recorded sightings, in dBm.
    pub strongest_rssi: Option<i8>,
    /// A stream restart was launched.
    pub restarted: bool,
}

/// Reacts to driver events.
pub struct ReaderEventHandler<D> {
    state: StateGuard,
    driver: Arc<D>,
    stream: StreamController<D>,
}

impl<D> Clone for ReaderEventHandler<D> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            driver: Arc::clone(&self.driver),
            stream: self.stream.clone(),
        }
    }
}

impl<D: ReaderDriver> ReaderEventHandler<D> {
    pub fn new(state: StateGuard, driver: Arc<D>, stream: StreamController<D>) -> Self {
        Self {
            state,
            driver,
            stream,
        }
    }

    /// Dispatch one event.
    pub async fn handle(&self, event: ReaderEvent) {
        match event {
            ReaderEvent::Connected => self.on_connected().await,
            ReaderEvent::Disconnected => self.on_disconnected().await,
            ReaderEvent::InventoryStream { stopped } => {
                self.on_inventory_stream(stopped).await;
            }
        }
    }

    /// Mark the reader connected, then fetch its info off the guard.
    async fn on_connected(&self) {
        self.state.lock().await.mark_connected();
        info!("Reader connected");

        let state = self.state.clone();
        let driver = Arc::clone(&self.driver);
        tokio::spawn(async move {
            let reader_info = match driver.get_reader_info().await {
                Ok(reader_info) => {
                    info!(
                        name = %reader_info.name,
                        serial = %reader_info.serial,
                        sw_version = reader_info.sw_version.as_deref().unwrap_or("-"),
                        antennas = reader_info.num_antennas,
                        max_antennas = reader_info.max_antennas,
                        fcc_id = reader_info.fcc_id.as_deref().unwrap_or("-"),
                        "Reader info"
                    );
                    Some(reader_info)
                }
                Err(e) => {
                    warn!(error = %e, "Failed to get reader info");
                    None
                }
            };

            if !state.lock().await.set_reader_info(reader_info) {
                debug!("Reader disconnected before info arrived, discarding");
            }
        });
    }

    /// Forget everything tied to the link. Unconditional.
    async fn on_disconnected(&self) {
        self.state.lock().await.mark_disconnected();
        info!("Reader disconnected");
    }

    /// Drain the driver buffer into the tag store.
    ///
    /// Lock order: State Guard, then the driver's buffer lock. The buffer
    /// is emptied on every batch so the next one only carries new
    /// sightings; its contents are dropped when streaming is disabled.
    pub(crate) async fn on_inventory_stream(&self, stopped: bool) -> BatchOutcome {
        let storage = self.driver.tag_storage();
        let mut state = self.state.lock().await;
        let now = Local::now();

        let reads = storage.lock().drain();

        let mut outcome = BatchOutcome {
            drained: reads.len(),
            ..BatchOutcome::default()
        };

        if !state.stream_enabled() {
            outcome.discarded = reads.len();
            if !reads.is_empty() {
                debug!(
                    discarded = reads.len(),
                    "Inventory batch discarded, stream disabled"
                );
            }
            return outcome;
        }

        for read in reads {
            let id = match TagId::new(read.epc) {
                Ok(id) => id,
                Err(e) => {
                    warn!(error = %e, antenna_id = read.antenna_id, "Skipping tag read");
                    outcome.discarded += 1;
                    continue;
                }
            };

            outcome.strongest_rssi = outcome.strongest_rssi.max(Some(read.rssi));
            if let Some(Sighting::New) = state.record_sighting(id, read.antenna_id, now) {
                outcome.new_tags += 1;
            }
        }

        if stopped {
            info!("Reader halted the inventory stream, restarting");
            drop(self.stream.restart_stream());
            outcome.restarted = true;
        }

        state.complete_inventory_batch(now);
        trace!(
            drained = outcome.drained,
            new_tags = outcome.new_tags,
            strongest_rssi = outcome.strongest_rssi,
            total_tags = state.tags().len(),
            batches = state.stream_event_count(),
            "Inventory batch processed"
        );

        outcome
    }
}
