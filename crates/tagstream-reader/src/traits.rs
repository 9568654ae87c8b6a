//! Driver trait and event feed definitions.
//!
//! [`ReaderDriver`] is the outbound command surface the bridge consumes;
//! [`ReaderEvents`] is the inbound notification feed. Driver commands are
//! plain request/response calls with no timeout of their own: they run to
//! completion or failure.

use crate::error::Result;
use crate::storage::TagStorage;
use crate::types::ReaderInfo;
use std::future::Future;
use tokio::sync::mpsc;

/// Notification emitted by the driver on its own execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderEvent {
    /// Transport to the module is up.
    Connected,

    /// Transport to the module went down (requested or not).
    Disconnected,

    /// New sightings are waiting in the driver's [`TagStorage`].
    InventoryStream {
        /// The module halted the stream on its own (power management).
        stopped: bool,
    },
}

/// Receiving half of the driver's event feed.
///
/// Yields events in the order the driver emitted them and returns `None`
/// once the driver side has been dropped.
#[derive(Debug)]
pub struct ReaderEvents {
    rx: mpsc::Receiver<ReaderEvent>,
}

impl ReaderEvents {
    /// Wrap a channel receiver. Drivers create the matching sender.
    pub fn new(rx: mpsc::Receiver<ReaderEvent>) -> Self {
        Self { rx }
    }

    /// Receive the next event.
    pub async fn recv(&mut self) -> Option<ReaderEvent> {
        self.rx.recv().await
    }

    /// Receive an already-queued event without waiting.
    pub fn try_recv(&mut self) -> Option<ReaderEvent> {
        self.rx.try_recv().ok()
    }
}

/// Command surface of a radio driver.
///
/// Methods return `Send` futures so that callers can run them on detached
/// tasks. Implementors may write them as `async fn`.
///
/// # Examples
///
/// ```no_run
/// use tagstream_reader::{ReaderDriver, Result};
/// use tagstream_core::constants::OPFLAG_EN_PHASE_DIFF;
///
/// async fn restart_stream<D: ReaderDriver>(driver: &D) -> Result<()> {
///     driver.clear_tags().await?;
///     driver.start_inventory_stream(OPFLAG_EN_PHASE_DIFF).await
/// }
/// ```
pub trait ReaderDriver: Send + Sync + 'static {
    /// Open the transport to the module at `host:port`.
    ///
    /// A successful connect is followed by a [`ReaderEvent::Connected`].
    fn connect_socket(&self, host: &str, port: u16) -> impl Future<Output = Result<()>> + Send;

    /// Close the transport.
    ///
    /// Followed by a [`ReaderEvent::Disconnected`].
    fn disconnect(&self) -> impl Future<Output = Result<()>> + Send;

    /// Query the module's identity and capabilities.
    fn get_reader_info(&self) -> impl Future<Output = Result<ReaderInfo>> + Send;

    /// Clear the module-side and driver-side tag buffers.
    fn clear_tags(&self) -> impl Future<Output = Result<()>> + Send;

    /// Start the continuous inventory stream with the given operation flags
    /// OR-ed into the driver's current flags.
    fn start_inventory_stream(&self, op_flags: u32) -> impl Future<Output = Result<()>> + Send;

    /// Stop the inventory stream.
    fn stop_inventory_stream(&self) -> impl Future<Output = Result<()>> + Send;

    /// Handle to the driver's tag buffer.
    fn tag_storage(&self) -> TagStorage;
}
