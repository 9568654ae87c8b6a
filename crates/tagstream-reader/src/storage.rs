//! Driver-side tag buffer.
//!
//! The driver appends sightings to a [`TagStorage`] from its own execution
//! context while the bridge drains it when an inventory event arrives. The
//! buffer has its own lock, independent of any lock the consumer holds.
//!
//! # Lock Ordering
//!
//! Consumers that also hold a lock over their own state must always take
//! that lock first and the buffer lock second.

use crate::types::TagRead;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

/// Shared, clonable handle to the driver's tag buffer.
///
/// # Examples
///
/// ```
/// use tagstream_reader::{TagRead, TagStorage};
///
/// let storage = TagStorage::new();
/// storage.push(TagRead::new(vec![0xAAu8, 0xBB], 1));
///
/// let mut buffer = storage.lock();
/// assert_eq!(buffer.len(), 1);
/// buffer.clear();
/// assert!(buffer.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TagStorage {
    inner: Arc<Mutex<Vec<TagRead>>>,
}

impl TagStorage {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sighting. Called from the driver's context.
    pub fn push(&self, read: TagRead) {
        self.lock().push(read);
    }

    /// Number of buffered sightings.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Discard every buffered sighting.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Take the buffer lock for a drain.
    ///
    /// A lock poisoned by a panicking writer is recovered rather than
    /// propagated; the buffer contents are plain data and stay usable.
    pub fn lock(&self) -> TagStorageGuard<'_> {
        let guard = self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("Tag buffer lock was poisoned, recovering");
            poisoned.into_inner()
        });
        TagStorageGuard { guard }
    }
}

/// Exclusive access to the tag buffer for the lifetime of the guard.
#[derive(Debug)]
pub struct TagStorageGuard<'a> {
    guard: MutexGuard<'a, Vec<TagRead>>,
}

impl TagStorageGuard<'_> {
    /// Iterate over buffered sightings in arrival order.
    pub fn iter(&self) -> std::slice::Iter<'_, TagRead> {
        self.guard.iter()
    }

    /// Number of buffered sightings.
    pub fn len(&self) -> usize {
        self.guard.len()
    }

    /// Check whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.guard.is_empty()
    }

    /// Append a sighting while holding the lock.
    pub fn push(&mut self, read: TagRead) {
        self.guard.push(read);
    }

    /// Discard every buffered sighting.
    pub fn clear(&mut self) {
        self.guard.clear();
    }

    /// Remove and return every buffered sighting.
    pub fn drain(&mut self) -> Vec<TagRead> {
        std::mem::take(&mut *self.guard)
    }
}
