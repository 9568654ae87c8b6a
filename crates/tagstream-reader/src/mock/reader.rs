//! Mock radio driver for testing and development.
//!
//! [`MockReader`] behaves like a module reachable over loopback: commands
//! succeed while "connected", fail with [`DriverError::NotConnected`]
//! otherwise, and emit the same event sequence a real driver would. Tests
//! can inject sightings, inventory notifications and one-shot failures.

use crate::{
    DriverError, Result,
    storage::TagStorage,
    traits::{ReaderDriver, ReaderEvent, ReaderEvents},
    types::{ReaderInfo, TagRead},
};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::debug;

/// Capacity of the mock event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A command the mock received, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    ConnectSocket { host: String, port: u16 },
    Disconnect,
    GetReaderInfo,
    ClearTags,
    StartInventoryStream { op_flags: u32 },
    StopInventoryStream,
}

/// Mock radio driver.
///
/// Cloning yields another handle to the same simulated module, so a test
/// can keep one clone for control while the bridge owns another.
///
/// # Examples
///
/// ```
/// use tagstream_reader::mock::MockReader;
/// use tagstream_reader::{ReaderDriver, ReaderEvent};
///
/// #[tokio::main]
/// async fn main() -> tagstream_reader::Result<()> {
///     let (reader, mut events) = MockReader::new();
///
///     reader.connect_socket("127.0.0.1", 4332).await?;
///     reader.start_inventory_stream(0).await?;
///
///     reader.sight(vec![0xAAu8, 0xBB], 1);
///     reader.emit_inventory(false).await;
///
///     assert_eq!(events.recv().await, Some(ReaderEvent::Connected));
///     assert_eq!(
///         events.recv().await,
///         Some(ReaderEvent::InventoryStream { stopped: false })
///     );
///     assert_eq!(reader.tag_storage().len(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockReader {
    inner: Arc<MockInner>,
}

#[derive(Debug)]
struct MockInner {
    /// Module name reported by `get_reader_info`.
    name: String,

    /// Driver-side event feed.
    event_tx: mpsc::Sender<ReaderEvent>,

    /// Driver-side tag buffer.
    storage: TagStorage,

    /// Simulated module state.
    state: Mutex<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    connected: bool,
    streaming: bool,
    op_flags: u32,
    calls: Vec<DriverCall>,
    connect_failure: Option<DriverError>,
    disconnect_failure: Option<DriverError>,
    reader_info_failure: Option<DriverError>,
    start_stream_failure: Option<DriverError>,
}

impl MockReader {
    /// Create a new mock driver with the default name.
    ///
    /// Returns the driver and the receiving half of its event feed.
    pub fn new() -> (Self, ReaderEvents) {
        Self::with_name("Mock NUR Reader")
    }

    /// Create a new mock driver with a custom module name.
    pub fn with_name(name: impl Into<String>) -> (Self, ReaderEvents) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let reader = Self {
            inner: Arc::new(MockInner {
                name: name.into(),
                event_tx,
                storage: TagStorage::new(),
                state: Mutex::new(MockState::default()),
            }),
        };

        (reader, ReaderEvents::new(event_rx))
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn emit(&self, event: ReaderEvent) {
        // Nobody listening is not an error for a driver.
        if self.inner.event_tx.send(event).await.is_err() {
            debug!(?event, "Mock reader event dropped, feed closed");
        }
    }

    // ------------------------------------------------------------------
    // Test controls
    // ------------------------------------------------------------------

    /// Buffer a sighting, as the module would while streaming.
    pub fn sight(&self, epc: impl Into<Vec<u8>>, antenna_id: u8) {
        self.inner.storage.push(TagRead::new(epc, antenna_id));
    }

    /// Buffer a sighting with a signal strength.
    pub fn sight_with_rssi(&self, epc: impl Into<Vec<u8>>, antenna_id: u8, rssi: i8) {
        self.inner.storage.push(TagRead::new(epc, antenna_id).with_rssi(rssi));
    }

    /// Notify that sightings are available.
    ///
    /// With `stopped = true` the module also reports that it halted the
    /// stream on its own.
    pub async fn emit_inventory(&self, stopped: bool) {
        if stopped {
            self.state().streaming = false;
        }
        self.emit(ReaderEvent::InventoryStream { stopped }).await;
    }

    /// Simulate the link dropping without a disconnect request.
    pub async fn emit_disconnected(&self) {
        {
            let mut state = self.state();
            state.connected = false;
            state.streaming = false;
        }
        self.emit(ReaderEvent::Disconnected).await;
    }

    /// Make the next `connect_socket` call fail with `error`.
    pub fn fail_connect(&self, error: DriverError) {
        self.state().connect_failure = Some(error);
    }

    /// Make the next `disconnect` call fail with `error`.
    pub fn fail_disconnect(&self, error: DriverError) {
        self.state().disconnect_failure = Some(error);
    }

    /// Make the next `get_reader_info` call fail with `error`.
    pub fn fail_reader_info(&self, error: DriverError) {
        self.state().reader_info_failure = Some(error);
    }

    /// Make the next `start_inventory_stream` call fail with `error`.
    pub fn fail_start_stream(&self, error: DriverError) {
        self.state().start_stream_failure = Some(error);
    }

    /// Every command received so far, in order.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.state().calls.clone()
    }

    /// Number of `start_inventory_stream` calls received so far.
    pub fn start_stream_calls(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| matches!(c, DriverCall::StartInventoryStream { .. }))
            .count()
    }

    /// Check whether the simulated transport is up.
    pub fn is_connected(&self) -> bool {
        self.state().connected
    }

    /// Check whether the simulated inventory stream is running.
    pub fn is_streaming(&self) -> bool {
        self.state().streaming
    }

    /// Operation flags accumulated from stream starts.
    pub fn op_flags(&self) -> u32 {
        self.state().op_flags
    }

    /// Module name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }
}

impl ReaderDriver for MockReader {
    async fn connect_socket(&self, host: &str, port: u16) -> Result<()> {
        {
            let mut state = self.state();
            state.calls.push(DriverCall::ConnectSocket {
                host: host.to_string(),
                port,
            });
            if let Some(error) = state.connect_failure.take() {
                return Err(error);
            }
            state.connected = true;
        }

        self.emit(ReaderEvent::Connected).await;
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        let was_connected = {
            let mut state = self.state();
            state.calls.push(DriverCall::Disconnect);
            if let Some(error) = state.disconnect_failure.take() {
                return Err(error);
            }
            let was_connected = state.connected;
            state.connected = false;
            state.streaming = false;
            was_connected
        };

        if was_connected {
            self.emit(ReaderEvent::Disconnected).await;
        }
        Ok(())
    }

    async fn get_reader_info(&self) -> Result<ReaderInfo> {
        let mut state = self.state();
        state.calls.push(DriverCall::GetReaderInfo);
        if let Some(error) = state.reader_info_failure.take() {
            return Err(error);
        }
        if !state.connected {
            return Err(DriverError::NotConnected);
        }
        if self.inner.name.trim().is_empty() {
            return Err(DriverError::invalid_data("empty module name"));
        }

        Ok(ReaderInfo::new(self.inner.name.clone(), "MOCK-0001")
            .with_versions("1.0", "5.0-mock")
            .with_antennas(2, 4)
            .with_fcc_id("MOCK-FCC-0001"))
    }

    async fn clear_tags(&self) -> Result<()> {
        {
            let mut state = self.state();
            state.calls.push(DriverCall::ClearTags);
            if !state.connected {
                return Err(DriverError::NotConnected);
            }
        }
        self.inner.storage.clear();
        Ok(())
    }

    async fn start_inventory_stream(&self, op_flags: u32) -> Result<()> {
        let mut state = self.state();
        state.calls.push(DriverCall::StartInventoryStream { op_flags });
        if let Some(error) = state.start_stream_failure.take() {
            return Err(error);
        }
        if !state.connected {
            return Err(DriverError::NotConnected);
        }
        state.op_flags |= op_flags;
        state.streaming = true;
        Ok(())
    }

    async fn stop_inventory_stream(&self) -> Result<()> {
        let mut state = self.state();
        state.calls.push(DriverCall::StopInventoryStream);
        if !state.connected {
            return Err(DriverError::NotConnected);
        }
        state.streaming = false;
        Ok(())
    }

    fn tag_storage(&self) -> TagStorage {
        self.inner.storage.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_reader_connect_emits_event() {
        let (reader, mut events) = MockReader::new();

        reader.connect_socket("127.0.0.1", 4332).await.unwrap();

        assert!(reader.is_connected());
        assert_eq!(events.recv().await, Some(ReaderEvent::Connected));
        assert_eq!(
            reader.calls(),
            vec![DriverCall::ConnectSocket {
                host: "127.0.0.1".to_string(),
                port: 4332
            }]
        );
    }

    #[tokio::test]
    async fn test_mock_reader_connect_failure_is_one_shot() {
        let (reader, mut events) = MockReader::new();
        reader.fail_connect(DriverError::connection_failed("127.0.0.1:4332", "refused"));

        let result = reader.connect_socket("127.0.0.1", 4332).await;
        assert!(result.is_err());
        assert!(!reader.is_connected());
        assert!(events.try_recv().is_none());

        reader.connect_socket("127.0.0.1", 4332).await.unwrap();
        assert!(reader.is_connected());
    }

    #[tokio::test]
    async fn test_mock_reader_commands_require_connection() {
        let (reader, _events) = MockReader::new();

        assert_eq!(
            reader.get_reader_info().await,
            Err(DriverError::NotConnected)
        );
        assert_eq!(reader.clear_tags().await, Err(DriverError::NotConnected));
        assert_eq!(
            reader.start_inventory_stream(0).await,
            Err(DriverError::NotConnected)
        );
        assert_eq!(
            reader.stop_inventory_stream().await,
            Err(DriverError::NotConnected)
        );
    }

    #[tokio::test]
    async fn test_mock_reader_stream_accumulates_op_flags() {
        let (reader, _events) = MockReader::new();
        reader.connect_socket("127.0.0.1", 4332).await.unwrap();

        reader.start_inventory_stream(1 << 17).await.unwrap();
        assert!(reader.is_streaming());
        assert_eq!(reader.op_flags(), 1 << 17);

        reader.stop_inventory_stream().await.unwrap();
        assert!(!reader.is_streaming());
        assert_eq!(reader.op_flags(), 1 << 17);
    }

    #[tokio::test]
    async fn test_mock_reader_auto_stop_inventory() {
        let (reader, mut events) = MockReader::new();
        reader.connect_socket("127.0.0.1", 4332).await.unwrap();
        reader.start_inventory_stream(0).await.unwrap();

        reader.emit_inventory(true).await;

        assert!(!reader.is_streaming());
        assert_eq!(events.recv().await, Some(ReaderEvent::Connected));
        assert_eq!(
            events.recv().await,
            Some(ReaderEvent::InventoryStream { stopped: true })
        );
    }

    #[tokio::test]
    async fn test_mock_reader_disconnect_emits_only_when_connected() {
        let (reader, mut events) = MockReader::new();

        reader.disconnect().await.unwrap();
        assert!(events.try_recv().is_none());

        reader.connect_socket("127.0.0.1", 4332).await.unwrap();
        reader.disconnect().await.unwrap();

        assert_eq!(events.recv().await, Some(ReaderEvent::Connected));
        assert_eq!(events.recv().await, Some(ReaderEvent::Disconnected));
    }

    #[tokio::test]
    async fn test_mock_reader_clear_tags_empties_storage() {
        let (reader, _events) = MockReader::new();
        reader.connect_socket("127.0.0.1", 4332).await.unwrap();

        reader.sight(vec![0x01u8, 0x02], 1);
        assert_eq!(reader.tag_storage().len(), 1);

        reader.clear_tags().await.unwrap();
        assert!(reader.tag_storage().is_empty());
    }

    #[tokio::test]
    async fn test_mock_reader_info() {
        let (reader, _events) = MockReader::with_name("Test Module");
        reader.connect_socket("127.0.0.1", 4332).await.unwrap();

        let info = reader.get_reader_info().await.unwrap();
        assert_eq!(info.name, "Test Module");
        assert_eq!(info.max_antennas, 4);
        assert_eq!(info.fcc_id.as_deref(), Some("MOCK-FCC-0001"));
    }

    #[tokio::test]
    async fn test_mock_reader_info_rejects_blank_name() {
        let (reader, _events) = MockReader::with_name("  ");
        reader.connect_socket("127.0.0.1", 4332).await.unwrap();

        let err = reader.get_reader_info().await.unwrap_err();
        assert!(matches!(err, DriverError::InvalidData { .. }));
    }

    #[test]
    fn test_sight_with_rssi() {
        let (reader, _events) = MockReader::new();

        reader.sight_with_rssi(vec![0xAAu8], 2, -52);

        let reads = reader.tag_storage().lock().drain();
        assert_eq!(reads.len(), 1);
        assert_eq!(reads[0].antenna_id, 2);
        assert_eq!(reads[0].rssi, -52);
    }

    #[tokio::test]
    async fn test_mock_reader_clone_shares_state() {
        let (reader, _events) = MockReader::new();
        let control = reader.clone();

        reader.connect_socket("127.0.0.1", 4332).await.unwrap();
        assert!(control.is_connected());

        control.sight(vec![0xAAu8], 2);
        assert_eq!(reader.tag_storage().len(), 1);
    }
}
