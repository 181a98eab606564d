//! Mock device implementations for testing and development.
//!
//! This module provides simulated controllers and a simulated platform
//! backend that can be driven programmatically without physical hardware.

pub mod backend;
pub mod gamepad;
pub mod haptics;
pub mod raw;

// Re-export commonly used types
pub use backend::MockBackend;
pub use gamepad::{MockGamepad, MockGamepadHandle};
pub use haptics::MockHapticMotor;
pub use raw::{MockRawController, MockRawControllerHandle};
