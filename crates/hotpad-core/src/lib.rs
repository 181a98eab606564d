//! Core value types for the hotpad controller registry.
//!
//! Everything in here is plain data shared by the backend traits in
//! `hotpad-hardware` and the registries in `hotpad-registry`: controller
//! identities, hot-plug events and the telemetry values a backend reports.

pub mod constants;
pub mod error;
pub mod telemetry;
pub mod types;

pub use error::{Error, Result};
pub use telemetry::*;
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
