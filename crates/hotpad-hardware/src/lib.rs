//! Controller backend abstraction layer for the hotpad registry.
//!
//! This crate defines the contract between the registry and a platform's
//! game controller API, plus simulated devices for development and tests.
//!
//! # Design Philosophy
//!
//! - **Synchronous**: Backends deliver hot-plug notifications from their own
//!   threads. Every call here is blocking and cheap.
//! - **Object-safe**: All traits are used as trait objects (`Arc<dyn Trait>`).
//! - **Thread-safe**: All traits require `Send + Sync`.
//! - **Identity by object**: The registry compares devices with
//!   [`DeviceHandle`], which is equal only for the same device object.
//!
//! # Device Traits
//!
//! ## Gamepads
//!
//! The [`GamepadDevice`] trait represents controllers with the standard
//! gamepad layout. They are addressed by slot index in the registry:
//!
//! ```no_run
//! use hotpad_core::GamepadButtons;
//! use hotpad_hardware::traits::GamepadDevice;
//! use hotpad_hardware::error::Result;
//!
//! fn wants_to_jump(pad: &dyn GamepadDevice) -> Result<bool> {
//!     let reading = pad.current_reading()?;
//!     Ok(reading.is_pressed(GamepadButtons::A))
//! }
//! ```
//!
//! ## Raw Controllers
//!
//! The [`RawControllerDevice`] trait represents arbitrary controllers with a
//! device-specific layout, keyed by a persistent identity string:
//!
//! ```no_run
//! use hotpad_hardware::traits::RawControllerDevice;
//! use hotpad_hardware::error::Result;
//!
//! fn describe(stick: &dyn RawControllerDevice) -> Result<String> {
//!     Ok(format!(
//!         "{} ({} buttons, {} axes)",
//!         stick.display_name()?,
//!         stick.button_count(),
//!         stick.axis_count()
//!     ))
//! }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] which uses the
//! [`HardwareError`] error type.
//!
//! # Mock Implementations
//!
//! With the `mock` feature (on by default) the [`mock`] module provides
//! [`MockGamepad`](mock::MockGamepad),
//! [`MockRawController`](mock::MockRawController) and a
//! [`MockBackend`](mock::MockBackend) that simulates plugging and
//! unplugging.

pub mod error;
pub mod handle;
#[cfg(feature = "mock")]
pub mod mock;
pub mod traits;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use handle::DeviceHandle;
pub use traits::{
    ControllerBackend, DeviceSink, GameController, GamepadBackend, GamepadDevice, HapticMotor,
    RawControllerBackend, RawControllerDevice, Subscription,
};
