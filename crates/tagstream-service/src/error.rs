//! Error types for the bridge service.
//!
//! Route handlers never fail; the only error the service produces is for
//! input that does not name a route at all.

use thiserror::Error;

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors surfaced by the service API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Requested route is not one of the bridge's routes.
    #[error("Unknown route: {0}")]
    UnknownRoute(String),
}
