//! Error types for controller backend operations.
//!
//! This module defines the errors a backend can report for a device call:
//! the device went away, the capability is missing, the transport failed or
//! the device handed back something unusable.

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during controller backend operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Operation is not supported by this device.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Backend refused to supply a persistent identity for the device.
    #[error("Identity unavailable: {device}")]
    IdentityUnavailable { device: String },
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new identity unavailable error.
    pub fn identity_unavailable(device: impl Into<String>) -> Self {
        Self::IdentityUnavailable {
            device: device.into(),
        }
    }

    /// Returns `true` if the device is gone rather than misbehaving.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }
}

impl From<hotpad_core::Error> for HardwareError {
    fn from(error: hotpad_core::Error) -> Self {
        Self::InvalidData {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("Xbox Wireless Controller");
        assert!(error.is_disconnected());
        assert_eq!(
            error.to_string(),
            "Device disconnected: Xbox Wireless Controller"
        );
    }

    #[test]
    fn test_unsupported_error() {
        let error = HardwareError::unsupported("set_vibration");
        assert!(matches!(error, HardwareError::Unsupported { .. }));
        assert_eq!(error.to_string(), "Unsupported operation: set_vibration");
    }

    #[test]
    fn test_communication_error() {
        let error = HardwareError::communication("HID read failed");
        assert!(!error.is_disconnected());
        assert_eq!(error.to_string(), "Communication error: HID read failed");
    }

    #[test]
    fn test_identity_unavailable_error() {
        let error = HardwareError::identity_unavailable("Arcade Stick");
        assert_eq!(error.to_string(), "Identity unavailable: Arcade Stick");
    }

    #[test]
    fn test_from_core_error() {
        let core = hotpad_core::ButtonLabel::from_code(99).unwrap_err();
        let error = HardwareError::from(core);
        assert!(matches!(error, HardwareError::InvalidData { .. }));
        assert_eq!(error.to_string(), "Invalid data: Invalid button label code: 99");
    }
}
