//! Mock driver implementations for testing and development.
//!
//! This module provides an in-memory radio driver that can be controlled
//! programmatically without requiring a physical module.

pub mod reader;
pub mod simulation;

// Re-export commonly used types
pub use reader::{DriverCall, MockReader};
pub use simulation::SimulationConfig;
