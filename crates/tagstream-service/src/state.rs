//! Shared reader state and the guard that serializes access to it.
//!
//! [`ReaderState`] is the single mutable object that driver events and RPC
//! calls both act on. Its fields are private; the only way to change them
//! is through the transaction methods below, which the event handler, the
//! controllers and the RPC handler call while holding the [`StateGuard`].
//!
//! # Rules for transactions
//!
//! - Acquire the guard, do bounded in-memory work, release it.
//! - Never await driver I/O while the guard is held. Launch it on a
//!   detached task instead and write results back under a fresh lock.
//! - When the driver's tag buffer is also needed, take the guard first and
//!   the buffer lock second.

use crate::tags::{Sighting, TagStore};
use std::sync::Arc;
use tagstream_core::{TagEntry, TagId, Timestamp};
use tagstream_reader::ReaderInfo;
use tokio::sync::{Mutex, MutexGuard};

/// Process-wide reader state.
#[derive(Debug, Default)]
pub struct ReaderState {
    connected: bool,
    connect_error: Option<String>,
    reader_info: Option<ReaderInfo>,
    stream_enabled: bool,
    last_stream_event: Option<Timestamp>,
    stream_event_count: u32,
    tags_seen: TagStore,
}

impl ReaderState {
    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn connect_error(&self) -> Option<&str> {
        self.connect_error.as_deref()
    }

    pub fn reader_info(&self) -> Option<&ReaderInfo> {
        self.reader_info.as_ref()
    }

    pub fn stream_enabled(&self) -> bool {
        self.stream_enabled
    }

    pub fn last_stream_event(&self) -> Option<Timestamp> {
        self.last_stream_event
    }

    pub fn stream_event_count(&self) -> u32 {
        self.stream_event_count
    }

    pub fn tags(&self) -> &TagStore {
        &self.tags_seen
    }

    // ------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------

    /// A connected event was observed.
    pub(crate) fn mark_connected(&mut self) {
        self.connected = true;
    }

    /// Store the identity snapshot fetched after a connect.
    ///
    /// Ignored when the reader disconnected while the fetch was in flight,
    /// so a disconnected state never carries reader info.
    pub(crate) fn set_reader_info(&mut self, info: Option<ReaderInfo>) -> bool {
        if !self.connected {
            return false;
        }
        self.reader_info = info;
        true
    }

    /// Reset everything that depends on the link being up.
    pub(crate) fn mark_disconnected(&mut self) {
        self.connected = false;
        self.reader_info = None;
        self.stream_enabled = false;
        self.tags_seen.clear();
        self.stream_event_count = 0;
    }

    /// Record the outcome of a connect or disconnect attempt.
    ///
    /// `None` clears a previous error.
    pub(crate) fn set_connect_error(&mut self, error: Option<String>) {
        self.connect_error = error;
    }

    /// Begin a fresh stream session: enabled, no tags, zero batches.
    ///
    /// Recorded whatever the link state; a later disconnected event still
    /// clears it.
    pub(crate) fn enable_stream(&mut self) {
        self.stream_enabled = true;
        self.tags_seen.clear();
        self.stream_event_count = 0;
    }

    /// Operator no longer wants the stream. Collected tags are kept.
    pub(crate) fn disable_stream(&mut self) {
        self.stream_enabled = false;
    }

    /// Fold one sighting into the store.
    ///
    /// Returns `None` without touching the store while streaming is
    /// disabled.
    pub(crate) fn record_sighting(
        &mut self,
        id: TagId,
        antenna_id: u8,
        now: Timestamp,
    ) -> Option<Sighting> {
        if !self.stream_enabled {
            return None;
        }
        Some(self.tags_seen.record_sighting(id, antenna_id, now))
    }

    /// Close out one processed inventory batch.
    pub(crate) fn complete_inventory_batch(&mut self, now: Timestamp) {
        self.last_stream_event = Some(now);
        self.stream_event_count = self.stream_event_count.saturating_add(1);
    }

    /// Copy the externally visible parts of the state.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            connected: self.connected,
            connect_error: self.connect_error.clone(),
            reader_info: self.reader_info.clone(),
            stream_enabled: self.stream_enabled,
            last_stream_event: self.last_stream_event,
            stream_event_count: self.stream_event_count,
            tags: self.tags_seen.snapshot(),
        }
    }
}

/// Point-in-time copy of [`ReaderState`].
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub connected: bool,
    pub connect_error: Option<String>,
    pub reader_info: Option<ReaderInfo>,
    pub stream_enabled: bool,
    pub last_stream_event: Option<Timestamp>,
    pub stream_event_count: u32,
    pub tags: Vec<TagEntry>,
}

/// The one exclusive lock over [`ReaderState`].
///
/// Cheap to clone; every clone guards the same state. Waiters are served in
/// arrival order.
#[derive(Debug, Clone, Default)]
pub struct StateGuard {
    inner: Arc<Mutex<ReaderState>>,
}

impl StateGuard {
    /// Create a guard over a fresh, default state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the guard for a transaction.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, ReaderState> {
        self.inner.lock().await
    }

    /// Read a consistent copy of the state.
    pub async fn snapshot(&self) -> StateSnapshot {
        self.inner.lock().await.snapshot()
    }
}
