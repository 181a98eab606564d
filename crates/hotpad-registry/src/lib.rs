//! Hot-plug registry for game controllers.
//!
//! This crate tracks which controllers are attached, gives each a stable
//! identifier, answers state and capability queries, and notifies
//! listeners when controllers come and go.
//!
//! # Architecture
//!
//! ```text
//!  backend ──► Discovery ──► PresenceTracker ──┬──► SlotRegistry  ◄── Gamepads
//!                                              ├──► KeyedRegistry ◄── RawControllers
//!                                              └──► NotificationBus ──► listeners
//! ```
//!
//! - Gamepads live in a [`SlotRegistry`](slot::SlotRegistry) and are
//!   addressed by slot index. Removed gamepads leave an empty slot that the
//!   next gamepad reuses.
//! - Raw controllers live in a [`KeyedRegistry`](keyed::KeyedRegistry) and
//!   are addressed by their persistent uid.
//! - [`ControllerHub`] owns everything and runs the initial scan on a
//!   background thread.
//!
//! # Locking
//!
//! Each registry has its own reader/writer lock, held only while copying a
//! handle in or out. Backend calls and listener callbacks always run with
//! no registry lock held, so a listener may query the registries.

pub mod bus;
pub mod config;
pub mod discovery;
pub mod error;
pub mod gamepads;
pub mod hub;
pub mod identity;
pub mod keyed;
pub mod raw;
pub mod slot;

// Re-export commonly used types for convenience
pub use bus::{Listener, ListenerToken, NotificationBus};
pub use config::HubConfig;
pub use discovery::{Discovery, GamepadTracker, PresenceTracker, RawControllerTracker, ScanReport};
pub use error::{HubError, QueryError, QueryResult, Result};
pub use gamepads::Gamepads;
pub use hub::{Backends, ControllerHub};
pub use keyed::{KeyedRegistry, Listing};
pub use raw::RawControllers;
pub use slot::{SlotAdmission, SlotRegistry};
