//! Error types for radio driver operations.
//!
//! Every command the bridge issues to the driver can fail; these variants
//! cover the failure classes a driver reports. The `Display` text of a
//! connect failure is stored verbatim as the bridge's connection error.

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

/// Errors that can occur during driver operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    /// No transport is open to the radio module.
    #[error("Reader not connected")]
    NotConnected,

    /// Could not open the transport to the module.
    #[error("Connection to {endpoint} failed: {message}")]
    ConnectionFailed { endpoint: String, message: String },

    /// Module communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Module answered a command with a non-zero status.
    #[error("Command {command} failed with status {status}")]
    CommandFailed { command: String, status: u32 },

    /// Invalid data received from the module.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl DriverError {
    /// Create a new connection failed error.
    pub fn connection_failed(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new command failed error.
    pub fn command_failed(command: impl Into<String>, status: u32) -> Self {
        Self::CommandFailed {
            command: command.into(),
            status,
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<std::io::Error> for DriverError {
    fn from(error: std::io::Error) -> Self {
        Self::communication(error.to_string())
    }
}
