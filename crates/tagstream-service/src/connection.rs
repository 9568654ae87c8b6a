//! Background connect and disconnect.
//!
//! Both operations return as soon as the driver task is launched. Their
//! outcome is only visible later through state: a failure lands in the
//! connection error, a success shows up as connected/disconnected events.

use crate::state::StateGuard;
use std::sync::Arc;
use tagstream_core::constants::{READER_HOST, READER_PORT};
use tagstream_reader::ReaderDriver;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Launches driver connect/disconnect attempts.
pub struct ConnectionController<D> {
    state: StateGuard,
    driver: Arc<D>,
}

impl<D> Clone for ConnectionController<D> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            driver: Arc::clone(&self.driver),
        }
    }
}

impl<D: ReaderDriver> ConnectionController<D> {
    pub fn new(state: StateGuard, driver: Arc<D>) -> Self {
        Self { state, driver }
    }

    /// Attempt to connect to the module's fixed loopback endpoint.
    ///
    /// On success the previous connection error is cleared; on failure the
    /// error text replaces it. There is no timeout: the attempt runs until
    /// the driver gives up.
    pub fn connect(&self) -> JoinHandle<()> {
        let state = self.state.clone();
        let driver = Arc::clone(&self.driver);

        tokio::spawn(async move {
            info!(host = READER_HOST, port = READER_PORT, "Connecting to reader");
            let outcome = match driver.connect_socket(READER_HOST, READER_PORT).await {
                Ok(()) => None,
                Err(e) => {
                    warn!(error = %e, "Failed to connect to reader");
                    Some(e.to_string())
                }
            };
            state.lock().await.set_connect_error(outcome);
        })
    }

    /// Ask the driver to close the transport.
    ///
    /// State is reset by the disconnected event that follows, not here. A
    /// failing disconnect is surfaced as the connection error.
    pub fn disconnect(&self) -> JoinHandle<()> {
        let state = self.state.clone();
        let driver = Arc::clone(&self.driver);

        tokio::spawn(async move {
            info!("Disconnecting from reader");
            if let Err(e) = driver.disconnect().await {
                warn!(error = %e, "Failed to disconnect from reader");
                state.lock().await.set_connect_error(Some(e.to_string()));
            }
        })
    }
}
