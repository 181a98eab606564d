//! Hub configuration.
//!
//! Configuration is read from TOML. Every key is optional; missing keys take
//! their [`Default`] value and unknown keys are rejected.
//!
//! ```toml
//! gamepads_enabled = true
//! raw_controllers_enabled = true
//! scan_on_start = true
//! background_scan = true
//! ```

use crate::error::{HubError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a [`ControllerHub`](crate::ControllerHub).
///
/// Controls which device families are tracked and how the initial scan
/// runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HubConfig {
    /// Track slot-addressed gamepads.
    pub gamepads_enabled: bool,

    /// Track uid-keyed raw controllers.
    pub raw_controllers_enabled: bool,

    /// Enumerate attached controllers when the hub starts.
    pub scan_on_start: bool,

    /// Run the initial enumeration on the discovery thread instead of
    /// blocking [`ControllerHub::start`](crate::ControllerHub::start).
    pub background_scan: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            gamepads_enabled: true,
            raw_controllers_enabled: true,
            scan_on_start: true,
            background_scan: true,
        }
    }
}

impl HubConfig {
    /// Parse configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Config`] for malformed TOML, wrongly typed values
    /// or unknown keys.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| HubError::config(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Config`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| HubError::config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Returns `true` if at least one device family is tracked.
    pub fn tracks_anything(&self) -> bool {
        self.gamepads_enabled || self.raw_controllers_enabled
    }
}
