//! Streaming controller.
//!
//! Owns the operator's "stream enabled" intent and drives the radio's
//! inventory stream to match it. State changes happen under the
//! [`StateGuard`]; the driver commands that follow run on detached tasks
//! and report failures only through the log.

use crate::state::StateGuard;
use std::sync::Arc;
use tagstream_core::constants::OPFLAG_EN_PHASE_DIFF;
use tagstream_reader::ReaderDriver;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Starts, stops and restarts the inventory stream.
pub struct StreamController<D> {
    state: StateGuard,
    driver: Arc<D>,
}

impl<D> Clone for StreamController<D> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            driver: Arc::clone(&self.driver),
        }
    }
}

impl<D: ReaderDriver> StreamController<D> {
    pub fn new(state: StateGuard, driver: Arc<D>) -> Self {
        Self { state, driver }
    }

    /// Enable streaming and start a fresh session.
    ///
    /// Tags and the batch counter are reset before the guard is released,
    /// so no sighting from a previous session survives. The driver is then
    /// told to clear its buffer and start streaming with phase-difference
    /// reporting. If that fails the intent stays enabled; callers observe
    /// the lack of progress through the inventory counters.
    ///
    /// The returned handle may be dropped; the driver task runs detached.
    pub async fn start_stream(&self) -> JoinHandle<()> {
        self.state.lock().await.enable_stream();
        info!("Tag stream enabled");

        let driver = Arc::clone(&self.driver);
        tokio::spawn(async move {
            let result: tagstream_reader::Result<()> = async {
                driver.clear_tags().await?;
                driver.start_inventory_stream(OPFLAG_EN_PHASE_DIFF).await
            }
            .await;

            match result {
                Ok(()) => debug!("Inventory stream started"),
                Err(e) => warn!(error = %e, "Failed to start tag reading"),
            }
        })
    }

    /// Disable streaming and stop the radio's stream.
    ///
    /// Tags collected so far are kept until the next start.
    pub async fn stop_stream(&self) -> JoinHandle<()> {
        self.state.lock().await.disable_stream();
        info!("Tag stream disabled");

        let driver = Arc::clone(&self.driver);
        tokio::spawn(async move {
            match driver.stop_inventory_stream().await {
                Ok(()) => debug!("Inventory stream stopped"),
                Err(e) => warn!(error = %e, "Failed to stop tag reading"),
            }
        })
    }

    /// Re-issue the stream start after the radio halted it on its own.
    ///
    /// Does not touch state: collected tags and the batch counter carry on
    /// as if the stream had never paused. Safe to call with the guard held
    /// since the driver command runs on its own task.
    pub fn restart_stream(&self) -> JoinHandle<()> {
        let driver = Arc::clone(&self.driver);
        tokio::spawn(async move {
            match driver.start_inventory_stream(OPFLAG_EN_PHASE_DIFF).await {
                Ok(()) => debug!("Inventory stream restarted"),
                Err(e) => warn!(error = %e, "Failed to restart tag reading"),
            }
        })
    }
}
