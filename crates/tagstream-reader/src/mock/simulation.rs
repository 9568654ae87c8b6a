//! Synthetic tag traffic for the mock driver.
//!
//! Lets the bridge binary run end to end without a radio module: while the
//! mock's stream is running, a fixed population of tags is sighted on a
//! rotating set of antennas every period, followed by an inventory event.
//! Optionally the simulated module halts its stream every few batches, the
//! way the real module does when it decides nobody is consuming.

use super::reader::MockReader;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Configuration for [`MockReader::simulate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// EPCs of the simulated tag population.
    pub population: Vec<Vec<u8>>,

    /// Delay between inventory batches.
    pub period: Duration,

    /// Number of antennas sightings are spread across (at least 1).
    pub antennas: u8,

    /// Halt the stream after this many batches, if set.
    pub auto_stop_after: Option<u32>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            population: (1..=8u8)
                .map(|i| vec![0xE2, 0x00, 0x00, 0x17, 0x22, 0x0B, 0x01, i])
                .collect(),
            period: Duration::from_millis(500),
            antennas: 2,
            auto_stop_after: Some(20),
        }
    }
}

/// Signal strength in dBm, weaker on higher antennas and for later tags.
fn simulated_rssi(tag_index: usize, antenna_id: u8) -> i8 {
    let spread = (tag_index % 16) as i8;
    -40 - 4 * antenna_id.min(8) as i8 - spread
}

impl MockReader {
    /// Spawn a task that feeds synthetic sightings while streaming.
    ///
    /// The task runs until aborted.
    pub fn simulate(&self, config: SimulationConfig) -> JoinHandle<()> {
        let reader = self.clone();
        let antennas = config.antennas.max(1);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.period);
            let mut batches: u32 = 0;
            let mut round: usize = 0;

            debug!(
                tags = config.population.len(),
                period_ms = config.period.as_millis() as u64,
                "Mock reader simulation started"
            );

            loop {
                ticker.tick().await;
                if !reader.is_streaming() {
                    continue;
                }

                for (i, epc) in config.population.iter().enumerate() {
                    let antenna_id = ((i + round) % antennas as usize) as u8 + 1;
                    reader.sight_with_rssi(epc.clone(), antenna_id, simulated_rssi(i, antenna_id));
                }
                round = round.wrapping_add(1);
                batches += 1;

                let stopped = config
                    .auto_stop_after
                    .is_some_and(|limit| limit > 0 && batches % limit == 0);
                trace!(batches, stopped, "Mock reader inventory batch");
                reader.emit_inventory(stopped).await;
            }
        })
    }
}
