//! Tag stream bridge service.
//!
//! The concurrent core of the bridge: one [`ReaderState`] behind one
//! [`StateGuard`], written by driver events and read/written by RPC calls.
//!
//! # Components
//!
//! - [`TagStore`]: folds sightings into one [`TagEntry`](tagstream_core::TagEntry)
//!   per tag identifier, in first-sighting order.
//! - [`ReaderEventHandler`]: applies connected, disconnected and inventory
//!   events as transactions.
//! - [`StreamController`]: owns the stream intent and restarts the radio's
//!   stream when it halts on its own.
//! - [`ConnectionController`]: background connect/disconnect attempts.
//! - [`RpcHandler`]: the six parameterless routes.
//! - [`Bridge`]: wires the above around a driver and pumps its events.
//!
//! # Concurrency
//!
//! Every transaction takes the guard, does bounded in-memory work and
//! releases it. Driver I/O (connect, disconnect, reader info, stream
//! start/stop) runs on detached tasks; callers observe its outcome by
//! polling `rfid/connected` or `inventory/get`.

pub mod bridge;
pub mod connection;
pub mod error;
pub mod events;
pub mod rpc;
pub mod state;
pub mod stream;
pub mod tags;

pub use bridge::{Bridge, BridgeConfig, BridgeHandle};
pub use connection::ConnectionController;
pub use error::{Result, ServiceError};
pub use events::ReaderEventHandler;
pub use rpc::{Ack, ConnectionStatus, Inventory, Route, RpcHandler, RpcResponse};
pub use state::{ReaderState, StateGuard, StateSnapshot};
pub use stream::StreamController;
pub use tags::{Sighting, TagStore};
