//! Core constants for the tag stream bridge.
//!
//! The reader endpoint and the stream feature flag are fixed for this
//! service; they are not exposed as configuration.
//!
//! # Usage
//!
//! ```
//! use tagstream_core::constants::*;
//!
//! assert_eq!(READER_HOST, "127.0.0.1");
//! assert_eq!(READER_PORT, 4332);
//! assert_eq!(OPFLAG_EN_PHASE_DIFF, 0x0002_0000);
//! ```

// ============================================================================
// Reader Endpoint
// ============================================================================

/// Host of the radio module's command socket (loopback).
pub const READER_HOST: &str = "127.0.0.1";

/// TCP port of the radio module's command socket.
pub const READER_PORT: u16 = 4332;

// ============================================================================
// Stream Options
// ============================================================================

/// Operation flag enabling tag phase-difference reporting.
///
/// Requested on every stream start whether or not the module advertises
/// support for it.
pub const OPFLAG_EN_PHASE_DIFF: u32 = 1 << 17;

// ============================================================================
// Formatting
// ============================================================================

/// `chrono` format string for the inventory `timestamp` field.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use tagstream_core::constants::INVENTORY_TIMESTAMP_FORMAT;
///
/// let at = Local.with_ymd_and_hms(2025, 3, 9, 7, 5, 2).unwrap();
/// assert_eq!(at.format(INVENTORY_TIMESTAMP_FORMAT).to_string(), "2025-03-09 07:05:02");
/// ```
pub const INVENTORY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// Tag Identity
// ============================================================================

/// Minimum tag identifier length in bytes.
pub const MIN_TAG_ID_LENGTH: usize = 1;

/// Maximum tag identifier length in bytes (EPC memory bank upper bound).
pub const MAX_TAG_ID_LENGTH: usize = 62;
