//! Identity-compared shared handle to a backend device.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Shared reference to a backend device object.
///
/// Two handles are equal only when they point at the same device object.
/// Value equality of the underlying device never matters: two controllers
/// that report identical state are still different devices.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use hotpad_hardware::DeviceHandle;
/// use hotpad_hardware::mock::MockGamepad;
/// use hotpad_hardware::traits::GamepadDevice;
///
/// let (pad, _control) = MockGamepad::new();
/// let device: Arc<dyn GamepadDevice> = Arc::new(pad);
///
/// let a = DeviceHandle::new(device.clone());
/// let b = DeviceHandle::new(device);
/// assert_eq!(a, b);
///
/// let (other, _) = MockGamepad::new();
/// let c: DeviceHandle<dyn GamepadDevice> = DeviceHandle::new(Arc::new(other));
/// assert_ne!(a, c);
/// ```
pub struct DeviceHandle<D: ?Sized>(Arc<D>);

impl<D: ?Sized> DeviceHandle<D> {
    /// Wrap a shared device.
    pub fn new(device: Arc<D>) -> Self {
        Self(device)
    }

    /// Borrow the shared device.
    pub fn device(&self) -> &Arc<D> {
        &self.0
    }

    /// Unwrap into the shared device.
    pub fn into_inner(self) -> Arc<D> {
        self.0
    }

    /// Returns `true` if both handles point at the same device object.
    pub fn same_device(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns `true` if this handle points at `device`.
    pub fn is(&self, device: &Arc<D>) -> bool {
        Arc::ptr_eq(&self.0, device)
    }
}

impl<D: ?Sized> Clone for DeviceHandle<D> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<D: ?Sized> PartialEq for DeviceHandle<D> {
    fn eq(&self, other: &Self) -> bool {
        self.same_device(other)
    }
}

impl<D: ?Sized> Eq for DeviceHandle<D> {}

impl<D: ?Sized> Deref for DeviceHandle<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.0
    }
}

impl<D: ?Sized> From<Arc<D>> for DeviceHandle<D> {
    fn from(device: Arc<D>) -> Self {
        Self(device)
    }
}

impl<D: ?Sized + fmt::Debug> fmt::Debug for DeviceHandle<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DeviceHandle").field(&&*self.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Fake(u8);

    #[test]
    fn test_equality_is_identity() {
        let a = Arc::new(Fake(1));
        let b = Arc::new(Fake(1));

        // Same value, different devices
        assert_ne!(DeviceHandle::new(a.clone()), DeviceHandle::new(b));
        assert_eq!(DeviceHandle::new(a.clone()), DeviceHandle::new(a));
    }

    #[test]
    fn test_clone_keeps_identity() {
        let handle = DeviceHandle::new(Arc::new(Fake(7)));
        let copy = handle.clone();

        assert!(handle.same_device(&copy));
        assert_eq!(Arc::strong_count(handle.device()), 2);
        assert_eq!(copy.device().0, 7);
    }

    #[test]
    fn test_is_matches_source_arc() {
        let device = Arc::new(Fake(3));
        let handle = DeviceHandle::from(device.clone());

        assert!(handle.is(&device));
        assert!(!handle.is(&Arc::new(Fake(3))));
        assert!(Arc::ptr_eq(&handle.into_inner(), &device));
    }
}
