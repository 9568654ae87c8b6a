//! RPC request handler.
//!
//! Answers the bridge's six parameterless routes from the shared state.
//! Every operation is a short transaction under the [`StateGuard`] and
//! always produces a well-formed payload: driver failures never turn into
//! RPC failures, they show up later as `connectError` or as inventory
//! counters that stop advancing.
//!
//! | Route | Payload |
//! |---|---|
//! | `rfid/connected` | [`ConnectionStatus`] |
//! | `rfid/connect` | [`Ack`] |
//! | `rfid/disconnect` | [`Ack`] |
//! | `tags/startStream` | [`Ack`] |
//! | `tags/stopStream` | [`Ack`] |
//! | `inventory/get` | [`Inventory`] |

use crate::connection::ConnectionController;
use crate::error::ServiceError;
use crate::state::StateGuard;
use crate::stream::StreamController;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tagstream_core::TagEntry;
use tagstream_core::constants::INVENTORY_TIMESTAMP_FORMAT;
use tagstream_reader::ReaderDriver;
use tracing::debug;

/// A route the bridge answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    ConnectionStatus,
    Connect,
    Disconnect,
    StartTagStream,
    StopTagStream,
    Inventory,
}

impl Route {
    /// Every route, in documentation order.
    pub const ALL: [Route; 6] = [
        Route::ConnectionStatus,
        Route::Connect,
        Route::Disconnect,
        Route::StartTagStream,
        Route::StopTagStream,
        Route::Inventory,
    ];

    /// Canonical path, without a leading slash.
    pub fn path(self) -> &'static str {
        match self {
            Route::ConnectionStatus => "rfid/connected",
            Route::Connect => "rfid/connect",
            Route::Disconnect => "rfid/disconnect",
            Route::StartTagStream => "tags/startStream",
            Route::StopTagStream => "tags/stopStream",
            Route::Inventory => "inventory/get",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = ServiceError;

    /// Parse a route path. A leading `/` is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim().strip_prefix('/').unwrap_or(s.trim());
        Route::ALL
            .into_iter()
            .find(|route| route.path() == path)
            .ok_or_else(|| ServiceError::UnknownRoute(s.to_string()))
    }
}

/// Payload of `rfid/connected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_error: Option<String>,
}

/// Empty acknowledgement, serialized as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {}

/// Payload of `inventory/get`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    /// Number of distinct tags in `tags`.
    pub count: usize,
    /// Inventory batches processed in the current stream session.
    pub n_inventories: u32,
    /// Operator's stream intent.
    pub update_enabled: bool,
    /// Tags in first-sighting order.
    pub tags: Vec<TagEntry>,
    /// Local time of the last processed batch, `YYYY-MM-DD HH:MM:SS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Any route's payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RpcResponse {
    ConnectionStatus(ConnectionStatus),
    Ack(Ack),
    Inventory(Inventory),
}

/// Serves the bridge's routes.
pub struct RpcHandler<D> {
    state: StateGuard,
    connection: ConnectionController<D>,
    stream: StreamController<D>,
}

impl<D> Clone for RpcHandler<D> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            connection: self.connection.clone(),
            stream: self.stream.clone(),
        }
    }
}

impl<D: ReaderDriver> RpcHandler<D> {
    pub fn new(
        state: StateGuard,
        connection: ConnectionController<D>,
        stream: StreamController<D>,
    ) -> Self {
        Self {
            state,
            connection,
            stream,
        }
    }

    /// Dispatch a parsed route.
    pub async fn call(&self, route: Route) -> RpcResponse {
        debug!(%route, "RPC call");
        match route {
            Route::ConnectionStatus => {
                RpcResponse::ConnectionStatus(self.connection_status().await)
            }
            Route::Connect => RpcResponse::Ack(self.connect()),
            Route::Disconnect => RpcResponse::Ack(self.disconnect()),
            Route::StartTagStream => RpcResponse::Ack(self.start_tag_stream().await),
            Route::StopTagStream => RpcResponse::Ack(self.stop_tag_stream().await),
            Route::Inventory => RpcResponse::Inventory(self.inventory().await),
        }
    }

    /// `rfid/connected`
    pub async fn connection_status(&self) -> ConnectionStatus {
        let state = self.state.lock().await;
        ConnectionStatus {
            connected: state.connected(),
            connect_error: state.connect_error().map(str::to_string),
        }
    }

    /// `rfid/connect`: launches the attempt and returns before it completes.
    pub fn connect(&self) -> Ack {
        drop(self.connection.connect());
        Ack {}
    }

    /// `rfid/disconnect`: launches the disconnect and returns before it
    /// completes.
    pub fn disconnect(&self) -> Ack {
        drop(self.connection.disconnect());
        Ack {}
    }

    /// `tags/startStream`
    pub async fn start_tag_stream(&self) -> Ack {
        drop(self.stream.start_stream().await);
        Ack {}
    }

    /// `tags/stopStream`
    pub async fn stop_tag_stream(&self) -> Ack {
        drop(self.stream.stop_stream().await);
        Ack {}
    }

    /// `inventory/get`
    pub async fn inventory(&self) -> Inventory {
        let state = self.state.lock().await;
        let tags = state.tags().snapshot();
        Inventory {
            count: tags.len(),
            n_inventories: state.stream_event_count(),
            update_enabled: state.stream_enabled(),
            tags,
            timestamp: state
                .last_stream_event()
                .map(|at| at.format(INVENTORY_TIMESTAMP_FORMAT).to_string()),
        }
    }
}
