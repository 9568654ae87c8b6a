//! Radio module driver abstraction for the tag stream bridge.
//!
//! This crate defines the boundary between the bridge and the vendor radio
//! driver. The bridge only needs a handful of commands and an event feed;
//! everything below that (socket handling, byte-level protocol) belongs to
//! the driver implementation.
//!
//! # Design Philosophy
//!
//! - **Async-first**: driver commands return `Send` futures so they can be
//!   launched on detached Tokio tasks without blocking event handling.
//! - **Event feed as a channel**: connected/disconnected/inventory
//!   notifications arrive through [`ReaderEvents`], not callbacks.
//! - **Shared tag buffer**: the driver appends sightings to a [`TagStorage`]
//!   from its own context; consumers drain it under the buffer's own lock.
//! - **Error-aware**: every command returns [`Result<T>`][error::Result].
//!
//! # Example
//!
//! ```
//! use tagstream_reader::mock::MockReader;
//! use tagstream_reader::{ReaderDriver, ReaderEvent};
//! use tagstream_core::constants::{READER_HOST, READER_PORT};
//!
//! #[tokio::main]
//! async fn main() -> tagstream_reader::Result<()> {
//!     let (reader, mut events) = MockReader::new();
//!
//!     reader.connect_socket(READER_HOST, READER_PORT).await?;
//!     assert_eq!(events.recv().await, Some(ReaderEvent::Connected));
//!
//!     let info = reader.get_reader_info().await?;
//!     println!("Connected to {}", info.name);
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! All commands return [`Result<T>`][error::Result] using [`DriverError`].
//! Its `Display` text is what the bridge reports back as a connection error.

pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
pub mod storage;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DriverError, Result};
pub use storage::{TagStorage, TagStorageGuard};
pub use traits::{ReaderDriver, ReaderEvent, ReaderEvents};
pub use types::{ReaderInfo, TagRead};
