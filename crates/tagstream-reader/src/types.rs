//! Data types exchanged with the radio driver.

use serde::{Deserialize, Serialize};

/// Identity and capability snapshot of the connected radio module.
///
/// Fetched once per successful connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderInfo {
    /// Module name (e.g., "NUR-05WL2").
    pub name: String,

    /// Module serial number.
    pub serial: String,

    /// Optional FCC identifier.
    pub fcc_id: Option<String>,

    /// Hardware version string.
    pub hw_version: Option<String>,

    /// Firmware version string.
    pub sw_version: Option<String>,

    /// Number of antennas currently enabled.
    pub num_antennas: u8,

    /// Number of antenna ports the module supports.
    pub max_antennas: u8,
}

impl ReaderInfo {
    /// Create a new ReaderInfo with required fields.
    pub fn new(name: impl Into<String>, serial: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            serial: serial.into(),
            fcc_id: None,
            hw_version: None,
            sw_version: None,
            num_antennas: 1,
            max_antennas: 1,
        }
    }

    /// Set the FCC identifier.
    pub fn with_fcc_id(mut self, fcc_id: impl Into<String>) -> Self {
        self.fcc_id = Some(fcc_id.into());
        self
    }

    /// Set hardware and firmware versions.
    pub fn with_versions(mut self, hw: impl Into<String>, sw: impl Into<String>) -> Self {
        self.hw_version = Some(hw.into());
        self.sw_version = Some(sw.into());
        self
    }

    /// Set enabled and supported antenna counts.
    pub fn with_antennas(mut self, num_antennas: u8, max_antennas: u8) -> Self {
        self.num_antennas = num_antennas;
        self.max_antennas = max_antennas;
        self
    }
}

/// One tag sighting as buffered by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRead {
    /// Raw EPC bytes.
    pub epc: Vec<u8>,

    /// Antenna that saw the tag.
    pub antenna_id: u8,

    /// Received signal strength in dBm.
    pub rssi: i8,
}

impl TagRead {
    /// Create a sighting with an unknown (zero) RSSI.
    pub fn new(epc: impl Into<Vec<u8>>, antenna_id: u8) -> Self {
        Self {
            epc: epc.into(),
            antenna_id,
            rssi: 0,
        }
    }

    /// Set the received signal strength.
    pub fn with_rssi(mut self, rssi: i8) -> Self {
        self.rssi = rssi;
        self
    }
}
