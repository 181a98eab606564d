//! Registry error types.

use hotpad_hardware::HardwareError;
use thiserror::Error;

/// Errors returned by the query façade.
///
/// Not-found cases are ordinary results: a controller can be unplugged
/// between any two calls.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// No gamepad occupies the slot.
    #[error("No gamepad in slot {index}")]
    SlotNotFound { index: usize },

    /// No raw controller is registered under the uid.
    #[error("No raw controller with uid '{uid}'")]
    UidNotFound { uid: String },

    /// Button index past the controller's button count.
    #[error("Button {button} out of range (controller has {count} buttons)")]
    ButtonOutOfRange { button: usize, count: usize },

    /// The controller does not report a battery.
    #[error("Controller has no battery report")]
    NoBatteryReport,

    /// The backend rejected the call.
    #[error("Backend error: {0}")]
    Backend(#[from] HardwareError),
}

impl QueryError {
    pub fn slot_not_found(index: usize) -> Self {
        QueryError::SlotNotFound { index }
    }

    pub fn uid_not_found(uid: impl Into<String>) -> Self {
        QueryError::UidNotFound { uid: uid.into() }
    }

    /// Check if the error means the controller is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            QueryError::SlotNotFound { .. } | QueryError::UidNotFound { .. }
        ) || matches!(self, QueryError::Backend(err) if err.is_disconnected())
    }
}

/// Errors from hub construction and configuration.
#[derive(Error, Debug)]
pub enum HubError {
    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A backend refused a subscription.
    #[error("Backend error: {0}")]
    Backend(#[from] HardwareError),

    /// The discovery thread could not be spawned.
    #[error("Thread error: {0}")]
    Thread(#[from] std::io::Error),

    /// The hub was already shut down.
    #[error("Controller hub is shut down")]
    ShutDown,
}

impl HubError {
    pub fn config(message: impl Into<String>) -> Self {
        HubError::Config(message.into())
    }
}

/// Result type for façade queries.
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Result type for hub operations.
pub type Result<T> = std::result::Result<T, HubError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(QueryError::slot_not_found(3), "No gamepad in slot 3")]
    #[case(QueryError::uid_not_found("HID\\1"), "No raw controller with uid 'HID\\1'")]
    #[case(
        QueryError::ButtonOutOfRange { button: 12, count: 12 },
        "Button 12 out of range (controller has 12 buttons)"
    )]
    #[case(QueryError::NoBatteryReport, "Controller has no battery report")]
    fn test_query_error_display(#[case] error: QueryError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case(QueryError::slot_not_found(0), true)]
    #[case(QueryError::uid_not_found("x"), true)]
    #[case(QueryError::Backend(HardwareError::disconnected("pad")), true)]
    #[case(QueryError::Backend(HardwareError::unsupported("rumble")), false)]
    #[case(QueryError::NoBatteryReport, false)]
    fn test_is_not_found(#[case] error: QueryError, #[case] expected: bool) {
        assert_eq!(error.is_not_found(), expected);
    }

    #[test]
    fn test_hardware_error_conversion() {
        let error: QueryError = HardwareError::communication("timeout").into();
        assert!(matches!(error, QueryError::Backend(_)));
    }
}
