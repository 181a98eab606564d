//! Mock controller backend.
//!
//! [`MockBackend`] simulates a platform's device list and hot-plug
//! notifications for one controller family. Tests attach devices before
//! discovery starts and plug or unplug them afterwards; every subscribed
//! sink is notified from the calling thread.

use crate::{
    HardwareError, Result,
    traits::{ControllerBackend, DeviceSink, Subscription},
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Mock backend for one controller family.
///
/// Cloned backends share the same device list and subscribers.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use hotpad_hardware::mock::{MockBackend, MockGamepad};
/// use hotpad_hardware::traits::{ControllerBackend, GamepadDevice};
///
/// let backend: MockBackend<dyn GamepadDevice> = MockBackend::new();
/// let (pad, _control) = MockGamepad::new();
/// backend.attach(Arc::new(pad));
///
/// assert_eq!(backend.enumerate().unwrap().len(), 1);
/// ```
pub struct MockBackend<D: ?Sized> {
    inner: Arc<Mutex<BackendState<D>>>,
}

struct BackendState<D: ?Sized> {
    devices: Vec<Arc<D>>,
    sinks: Vec<(u64, Arc<dyn DeviceSink<D>>)>,
    next_subscription: u64,
    enumeration_error: Option<HardwareError>,
    subscription_error: Option<HardwareError>,
}

impl<D: ?Sized + Send + Sync + 'static> MockBackend<D> {
    /// Create a backend with no devices attached.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(BackendState {
                devices: Vec::new(),
                sinks: Vec::new(),
                next_subscription: 0,
                enumeration_error: None,
                subscription_error: None,
            })),
        }
    }

    /// Add a device to the attached list without notifying subscribers.
    ///
    /// Models a device that was already present before discovery started.
    pub fn attach(&self, device: Arc<D>) {
        self.inner.lock().devices.push(device);
    }

    /// Drop a device from the attached list without notifying subscribers.
    ///
    /// Returns `true` if the device was attached.
    pub fn detach(&self, device: &Arc<D>) -> bool {
        let mut state = self.inner.lock();
        let before = state.devices.len();
        state.devices.retain(|attached| !Arc::ptr_eq(attached, device));
        state.devices.len() != before
    }

    /// Attach a device and notify every subscriber of its arrival.
    pub fn plug(&self, device: Arc<D>) {
        self.attach(device.clone());
        self.emit_added(device);
    }

    /// Detach a device and notify every subscriber of its removal.
    pub fn unplug(&self, device: &Arc<D>) {
        self.detach(device);
        self.emit_removed(device.clone());
    }

    /// Deliver an arrival notification without touching the device list.
    pub fn emit_added(&self, device: Arc<D>) {
        let sinks = self.sinks();
        trace!(subscribers = sinks.len(), "Mock backend delivering arrival");

        for sink in sinks {
            sink.on_added(device.clone());
        }
    }

    /// Deliver a removal notification without touching the device list.
    pub fn emit_removed(&self, device: Arc<D>) {
        let sinks = self.sinks();
        trace!(subscribers = sinks.len(), "Mock backend delivering removal");

        for sink in sinks {
            sink.on_removed(device.clone());
        }
    }

    /// Make subsequent enumerations fail with `error`, or succeed again
    /// with `None`.
    pub fn fail_enumeration(&self, error: Option<HardwareError>) {
        self.inner.lock().enumeration_error = error;
    }

    /// Make the next subscription attempt fail with `error`. Later
    /// attempts succeed.
    pub fn refuse_next_subscription(&self, error: HardwareError) {
        self.inner.lock().subscription_error = Some(error);
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().sinks.len()
    }

    /// Number of attached devices.
    pub fn device_count(&self) -> usize {
        self.inner.lock().devices.len()
    }

    // Sinks are called outside the lock so they may re-enter the backend
    fn sinks(&self) -> Vec<Arc<dyn DeviceSink<D>>> {
        self.inner
            .lock()
            .sinks
            .iter()
            .map(|(_, sink)| sink.clone())
            .collect()
    }
}

impl<D: ?Sized + Send + Sync + 'static> Default for MockBackend<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: ?Sized> Clone for MockBackend<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: ?Sized> fmt::Debug for MockBackend<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("MockBackend")
            .field("devices", &state.devices.len())
            .field("subscribers", &state.sinks.len())
            .finish()
    }
}

impl<D: ?Sized + Send + Sync + 'static> ControllerBackend<D> for MockBackend<D> {
    fn enumerate(&self) -> Result<Vec<Arc<D>>> {
        let state = self.inner.lock();
        if let Some(error) = &state.enumeration_error {
            return Err(error.clone());
        }
        Ok(state.devices.clone())
    }

    fn subscribe(&self, sink: Arc<dyn DeviceSink<D>>) -> Result<Subscription> {
        let id = {
            let mut state = self.inner.lock();
            if let Some(error) = state.subscription_error.take() {
                debug!(error = %error, "Mock backend refused subscription");
                return Err(error);
            }
            let id = state.next_subscription;
            state.next_subscription += 1;
            state.sinks.push((id, sink));
            id
        };

        debug!(subscription = id, "Mock backend subscription registered");

        let weak: Weak<Mutex<BackendState<D>>> = Arc::downgrade(&self.inner);
        Ok(Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.lock().sinks.retain(|(sink_id, _)| *sink_id != id);
                debug!(subscription = id, "Mock backend subscription cancelled");
            }
        }))
    }
}
