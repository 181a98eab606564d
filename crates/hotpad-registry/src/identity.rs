//! Device identity resolution.
//!
//! Gamepads have no persistent identity, so the registry tells them apart
//! by device object. Raw controllers report a non-roamable id that stays
//! the same across reconnects; devices without a usable id are never
//! tracked.

use hotpad_core::ControllerUid;
use hotpad_hardware::{DeviceHandle, RawControllerDevice};
use tracing::debug;

/// Returns `true` if both handles refer to the same device object.
pub fn same_device<D: ?Sized>(a: &DeviceHandle<D>, b: &DeviceHandle<D>) -> bool {
    a.same_device(b)
}

/// Persistent identity of a raw controller.
///
/// Returns `None` when the backend refuses to supply an id or the id is
/// empty or longer than [`MAX_UID_LENGTH`](hotpad_core::constants::MAX_UID_LENGTH).
pub fn controller_uid(device: &dyn RawControllerDevice) -> Option<ControllerUid> {
    let raw = match device.non_roamable_id() {
        Ok(raw) => raw,
        Err(e) => {
            debug!(error = %e, "Raw controller has no identity, skipping");
            return None;
        }
    };

    match ControllerUid::new(raw) {
        Ok(uid) => Some(uid),
        Err(e) => {
            debug!(error = %e, "Raw controller identity rejected, skipping");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotpad_core::constants::MAX_UID_LENGTH;
    use hotpad_hardware::mock::MockRawController;
    use rstest::rstest;
    use std::sync::Arc;

    #[rstest]
    #[case("HID\\VID_045E&PID_02FF\\7&1A2B", true)]
    #[case("x", true)]
    #[case("", false)]
    fn test_controller_uid(#[case] raw: &str, #[case] accepted: bool) {
        let (stick, _) = MockRawController::new(1, 0, 0);
        let stick = stick.with_uid(raw);

        let uid = controller_uid(&stick);
        assert_eq!(uid.is_some(), accepted);
        if let Some(uid) = uid {
            assert_eq!(uid.as_str(), raw);
        }
    }

    #[test]
    fn test_controller_uid_length_limit() {
        let (stick, _) = MockRawController::new(1, 0, 0);
        let longest = stick.with_uid("u".repeat(MAX_UID_LENGTH));
        assert!(controller_uid(&longest).is_some());

        let (stick, _) = MockRawController::new(1, 0, 0);
        let oversized = stick.with_uid("u".repeat(MAX_UID_LENGTH + 1));
        assert!(controller_uid(&oversized).is_none());
    }

    #[test]
    fn test_controller_uid_withheld() {
        let (stick, _) = MockRawController::new(1, 0, 0);
        assert!(controller_uid(&stick.without_uid()).is_none());
    }

    #[test]
    fn test_same_device() {
        let (stick, _) = MockRawController::new(1, 0, 0);
        let device: Arc<dyn RawControllerDevice> = Arc::new(stick);
        let (twin, _) = MockRawController::new(1, 0, 0);
        let other: Arc<dyn RawControllerDevice> = Arc::new(twin.with_uid("same"));

        let a = DeviceHandle::new(device.clone());
        let b = DeviceHandle::new(device);
        let c = DeviceHandle::new(other);

        assert!(same_device(&a, &b));
        assert!(!same_device(&a, &c));
    }
}
