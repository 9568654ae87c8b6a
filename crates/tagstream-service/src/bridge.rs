//! Bridge wiring.
//!
//! [`Bridge`] assembles the state guard, controllers and handlers around one
//! driver and runs the event pump that feeds driver events into the
//! [`ReaderEventHandler`].
//!
//! ```text
//! ┌──────────┐  ReaderEvents  ┌────────────┐
//! │  Driver  │───────────────►│ Event pump │──┐
//! └──────────┘                └────────────┘  │   ┌─────────────┐
//!      ▲                                      ├──►│ StateGuard  │
//!      │ detached I/O tasks   ┌────────────┐  │   │ ReaderState │
//!      └──────────────────────│ RpcHandler │──┘   └─────────────┘
//!                             └────────────┘
//! ```
//!
//! # Examples
//!
//! ```
//! use tagstream_reader::mock::MockReader;
//! use tagstream_service::{Bridge, BridgeConfig, Route};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (reader, events) = MockReader::new();
//!     let bridge = Bridge::new(reader, BridgeConfig { auto_connect: false });
//!     let rpc = bridge.rpc();
//!     let handle = bridge.start(events);
//!
//!     let status = rpc.call(Route::ConnectionStatus).await;
//!     println!("{}", serde_json::to_string(&status).unwrap());
//!
//!     handle.shutdown().await;
//! }
//! ```

use crate::connection::ConnectionController;
use crate::events::ReaderEventHandler;
use crate::rpc::RpcHandler;
use crate::state::{StateGuard, StateSnapshot};
use crate::stream::StreamController;
use std::sync::Arc;
use tagstream_reader::{ReaderDriver, ReaderEvents};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info};

/// Startup behaviour of the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Launch one background connect attempt when the bridge starts.
    pub auto_connect: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self { auto_connect: true }
    }
}

/// The assembled bridge, before it starts consuming events.
pub struct Bridge<D> {
    config: BridgeConfig,
    state: StateGuard,
    connection: ConnectionController<D>,
    events: ReaderEventHandler<D>,
    rpc: RpcHandler<D>,
}

impl<D: ReaderDriver> Bridge<D> {
    /// Wire a bridge around `driver`.
    pub fn new(driver: D, config: BridgeConfig) -> Self {
        let driver = Arc::new(driver);
        let state = StateGuard::new();
        let stream = StreamController::new(state.clone(), Arc::clone(&driver));
        let connection = ConnectionController::new(state.clone(), Arc::clone(&driver));
        let events = ReaderEventHandler::new(state.clone(), driver, stream.clone());
        let rpc = RpcHandler::new(state.clone(), connection.clone(), stream);

        Self {
            config,
            state,
            connection,
            events,
            rpc,
        }
    }

    /// Handler for driver events. [`Bridge::start`] drives one internally.
    pub fn event_handler(&self) -> ReaderEventHandler<D> {
        self.events.clone()
    }

    /// Handler for the RPC routes. Clone freely, one per connection.
    pub fn rpc(&self) -> RpcHandler<D> {
        self.rpc.clone()
    }

    /// Shared state guard.
    pub fn state(&self) -> StateGuard {
        self.state.clone()
    }

    /// Start the event pump and, if configured, the startup connect.
    pub fn start(self, mut feed: ReaderEvents) -> BridgeHandle {
        let mut tasks = JoinSet::new();
        let events = self.events;

        tasks.spawn(async move {
            while let Some(event) = feed.recv().await {
                debug!(?event, "Reader event");
                events.handle(event).await;
            }
            info!("Reader event feed closed");
        });

        if self.config.auto_connect {
            drop(self.connection.connect());
        }

        BridgeHandle {
            state: self.state,
            tasks,
        }
    }
}

/// Running bridge.
pub struct BridgeHandle {
    state: StateGuard,
    tasks: JoinSet<()>,
}

impl BridgeHandle {
    /// Read a consistent copy of the reader state.
    pub async fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot().await
    }

    /// Wait until the event feed closes.
    pub async fn join(mut self) {
        while let Some(result) = self.tasks.join_next().await {
            Self::log_termination(result);
        }
    }

    /// Stop the event pump.
    ///
    /// Driver I/O already launched on detached tasks is not awaited.
    pub async fn shutdown(mut self) {
        self.tasks.abort_all();
        while let Some(result) = self.tasks.join_next().await {
            Self::log_termination(result);
        }
        info!("Bridge stopped");
    }

    fn log_termination(result: Result<(), JoinError>) {
        match result {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {}
            Err(e) => error!(error = %e, "Event pump panicked"),
        }
    }
}
