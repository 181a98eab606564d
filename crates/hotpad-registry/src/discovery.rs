//! Discovery engine.
//!
//! Devices reach the registries through two paths: a full enumeration of
//! the backend and the backend's arrival/removal notifications. Both paths
//! end in the same [`PresenceTracker`], whose `observe`/`unobserve` are
//! idempotent, so a device seen by both paths is registered and announced
//! once.
//!
//! # Ordering
//!
//! Each tracker owns a transition lock held across "mutate the registry,
//! release the registry lock, notify listeners". For one device this yields
//! at most one `Added` followed by at most one `Removed`, never in the
//! opposite order. Registry reads never take the transition lock, so
//! listeners may query the registries from inside a callback.
//!
//! A listener may cause discovery of the other family; the resulting event
//! is queued by the bus and delivered after the current one. It must not
//! cause discovery of the family it is being notified about, since that
//! family's transition lock is still held. A full rescan touches both
//! families and so must not run from inside a callback.
//!
//! ```text
//!  enumerate() ──┐
//!                ├──► PresenceTracker ──► registry ──► NotificationBus
//!  on_added()  ──┤      (transition lock)
//!  on_removed() ─┘
//! ```

use crate::bus::NotificationBus;
use crate::identity;
use crate::keyed::KeyedRegistry;
use crate::slot::{SlotAdmission, SlotRegistry};
use hotpad_core::{ControllerEvent, ControllerFamily};
use hotpad_hardware::{
    ControllerBackend, DeviceHandle, DeviceSink, GamepadDevice, RawControllerDevice, Subscription,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of [`PresenceTracker::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// The device was registered and `Added` was fired.
    Admitted,

    /// The device was already registered. Nothing was fired.
    AlreadyPresent,

    /// The device cannot be tracked (no usable identity).
    Rejected,
}

/// Idempotent presence bookkeeping for one device family.
pub trait PresenceTracker: Send + Sync + 'static {
    /// Device type tracked.
    type Device: ?Sized + Send + Sync + 'static;

    fn family(&self) -> ControllerFamily;

    /// Register `device` if it is not registered yet, firing `Added` on
    /// registration.
    fn observe(&self, device: Arc<Self::Device>) -> Observation;

    /// Unregister `device` if it is registered, firing `Removed` on
    /// removal. Returns `true` if an entry was removed.
    fn unobserve(&self, device: Arc<Self::Device>) -> bool;
}

/// Presence tracker for slot-addressed gamepads.
pub struct GamepadTracker {
    registry: Arc<SlotRegistry<dyn GamepadDevice>>,
    bus: Arc<NotificationBus>,
    transition: Mutex<()>,
}

impl GamepadTracker {
    pub fn new(registry: Arc<SlotRegistry<dyn GamepadDevice>>, bus: Arc<NotificationBus>) -> Self {
        Self {
            registry,
            bus,
            transition: Mutex::new(()),
        }
    }
}

impl PresenceTracker for GamepadTracker {
    type Device = dyn GamepadDevice;

    fn family(&self) -> ControllerFamily {
        ControllerFamily::Gamepad
    }

    fn observe(&self, device: Arc<dyn GamepadDevice>) -> Observation {
        let _transition = self.transition.lock();

        match self.registry.add(DeviceHandle::new(device)) {
            SlotAdmission::Added(index) => {
                debug!(slot = index, "Gamepad added");
                self.bus.fire(&ControllerEvent::gamepad_added(index));
                Observation::Admitted
            }
            SlotAdmission::Present(index) => {
                debug!(slot = index, "Gamepad already registered");
                Observation::AlreadyPresent
            }
        }
    }

    fn unobserve(&self, device: Arc<dyn GamepadDevice>) -> bool {
        let _transition = self.transition.lock();

        match self.registry.remove(&DeviceHandle::new(device)) {
            Some(index) => {
                debug!(slot = index, "Gamepad removed");
                self.bus.fire(&ControllerEvent::gamepad_removed(index));
                true
            }
            None => {
                debug!("Removal for unknown gamepad ignored");
                false
            }
        }
    }
}

impl fmt::Debug for GamepadTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GamepadTracker")
            .field("slots", &self.registry.count())
            .finish()
    }
}

/// Presence tracker for uid-keyed raw controllers.
pub struct RawControllerTracker {
    registry: Arc<KeyedRegistry<dyn RawControllerDevice>>,
    bus: Arc<NotificationBus>,
    transition: Mutex<()>,
}

impl RawControllerTracker {
    pub fn new(
        registry: Arc<KeyedRegistry<dyn RawControllerDevice>>,
        bus: Arc<NotificationBus>,
    ) -> Self {
        Self {
            registry,
            bus,
            transition: Mutex::new(()),
        }
    }
}

impl PresenceTracker for RawControllerTracker {
    type Device = dyn RawControllerDevice;

    fn family(&self) -> ControllerFamily {
        ControllerFamily::RawController
    }

    fn observe(&self, device: Arc<dyn RawControllerDevice>) -> Observation {
        // Backend call stays outside every lock
        let Some(uid) = identity::controller_uid(device.as_ref()) else {
            return Observation::Rejected;
        };

        let _transition = self.transition.lock();

        if self.registry.upsert(uid.clone(), DeviceHandle::new(device)) {
            debug!(%uid, "Raw controller added");
            self.bus.fire(&ControllerEvent::raw_added(uid));
            Observation::Admitted
        } else {
            debug!(%uid, "Raw controller already registered");
            Observation::AlreadyPresent
        }
    }

    fn unobserve(&self, device: Arc<dyn RawControllerDevice>) -> bool {
        let Some(uid) = identity::controller_uid(device.as_ref()) else {
            return false;
        };

        let _transition = self.transition.lock();

        if self.registry.remove(uid.as_str()).is_some() {
            debug!(%uid, "Raw controller removed");
            self.bus.fire(&ControllerEvent::raw_removed(uid));
            true
        } else {
            debug!(%uid, "Removal for unknown raw controller ignored");
            false
        }
    }
}

impl fmt::Debug for RawControllerTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawControllerTracker")
            .field("entries", &self.registry.count())
            .finish()
    }
}

/// Summary of one full enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Devices returned by the backend.
    pub enumerated: usize,

    /// Devices newly registered by this scan.
    pub added: usize,

    /// Devices that could not be tracked.
    pub skipped: usize,
}

impl ScanReport {
    /// Devices that were already registered before the scan.
    pub fn already_present(&self) -> usize {
        self.enumerated - self.added - self.skipped
    }
}

impl std::ops::AddAssign for ScanReport {
    fn add_assign(&mut self, other: Self) {
        self.enumerated += other.enumerated;
        self.added += other.added;
        self.skipped += other.skipped;
    }
}

/// Forwards backend notifications to a tracker.
struct TrackerSink<T>(Arc<T>);

impl<T: PresenceTracker> DeviceSink<T::Device> for TrackerSink<T> {
    fn on_added(&self, device: Arc<T::Device>) {
        if self.0.observe(device) == Observation::Rejected {
            debug!(family = %self.0.family(), "Arrival ignored for untrackable device");
        }
    }

    fn on_removed(&self, device: Arc<T::Device>) {
        self.0.unobserve(device);
    }
}

/// Binds a presence tracker to a backend.
pub struct Discovery<T: PresenceTracker> {
    tracker: Arc<T>,
    backend: Arc<dyn ControllerBackend<T::Device>>,
    subscription: Mutex<Option<Subscription>>,
}

impl<T: PresenceTracker> Discovery<T> {
    pub fn new(tracker: T, backend: Arc<dyn ControllerBackend<T::Device>>) -> Self {
        Self {
            tracker: Arc::new(tracker),
            backend,
            subscription: Mutex::new(None),
        }
    }

    pub fn tracker(&self) -> &Arc<T> {
        &self.tracker
    }

    /// Subscribe to backend notifications. Calling `start` again while
    /// subscribed does nothing.
    ///
    /// Subscribe before the first [`scan`](Self::scan) so a device that
    /// arrives in between is still seen by one of the two paths.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the subscription is refused.
    pub fn start(&self) -> hotpad_hardware::Result<()> {
        let mut subscription = self.subscription.lock();
        if subscription.is_some() {
            return Ok(());
        }

        let sink = Arc::new(TrackerSink(self.tracker.clone()));
        *subscription = Some(self.backend.subscribe(sink)?);

        info!(family = %self.tracker.family(), "Discovery subscribed to backend events");
        Ok(())
    }

    /// Observe every device the backend currently reports.
    ///
    /// Safe to repeat: devices already registered are left alone. A failed
    /// enumeration is logged and reported as an empty scan.
    pub fn scan(&self) -> ScanReport {
        let family = self.tracker.family();

        let devices = match self.backend.enumerate() {
            Ok(devices) => devices,
            Err(e) => {
                warn!(%family, error = %e, "Controller enumeration failed");
                return ScanReport::default();
            }
        };

        let mut report = ScanReport {
            enumerated: devices.len(),
            ..ScanReport::default()
        };

        for device in devices {
            match self.tracker.observe(device) {
                Observation::Admitted => report.added += 1,
                Observation::AlreadyPresent => {}
                Observation::Rejected => report.skipped += 1,
            }
        }

        info!(
            %family,
            enumerated = report.enumerated,
            added = report.added,
            skipped = report.skipped,
            "Controller scan complete"
        );

        report
    }

    /// Cancel the backend subscription.
    pub fn stop(&self) {
        if let Some(subscription) = self.subscription.lock().take() {
            subscription.cancel();
            info!(family = %self.tracker.family(), "Discovery unsubscribed from backend events");
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.lock().is_some()
    }
}

impl<T: PresenceTracker + fmt::Debug> fmt::Debug for Discovery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discovery")
            .field("tracker", &self.tracker)
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotpad_core::{ControllerId, EventKind};
    use hotpad_hardware::mock::{MockBackend, MockGamepad, MockRawController};
    use hotpad_hardware::{GamepadBackend, RawControllerBackend};

    struct Fixture {
        bus: Arc<NotificationBus>,
        events: Arc<Mutex<Vec<ControllerEvent>>>,
    }

    impl Fixture {
        fn new() -> Self {
            let bus = Arc::new(NotificationBus::new());
            let events = Arc::new(Mutex::new(Vec::new()));
            let log = events.clone();
            bus.register(move |event| log.lock().push(event.clone()));
            Self { bus, events }
        }

        fn events(&self) -> Vec<ControllerEvent> {
            self.events.lock().clone()
        }
    }

    fn gamepad() -> Arc<dyn GamepadDevice> {
        let (pad, _) = MockGamepad::new();
        Arc::new(pad)
    }

    fn raw(uid: &str) -> Arc<dyn RawControllerDevice> {
        let (stick, _) = MockRawController::new(4, 1, 2);
        Arc::new(stick.with_uid(uid))
    }

    fn gamepad_discovery(
        fixture: &Fixture,
    ) -> (
        Discovery<GamepadTracker>,
        MockBackend<dyn GamepadDevice>,
        Arc<SlotRegistry<dyn GamepadDevice>>,
    ) {
        let registry = Arc::new(SlotRegistry::new());
        let backend: MockBackend<dyn GamepadDevice> = MockBackend::new();
        let tracker = GamepadTracker::new(registry.clone(), fixture.bus.clone());
        let source: Arc<GamepadBackend> = Arc::new(backend.clone());
        let discovery = Discovery::new(tracker, source);
        (discovery, backend, registry)
    }

    fn raw_discovery(
        fixture: &Fixture,
    ) -> (
        Discovery<RawControllerTracker>,
        MockBackend<dyn RawControllerDevice>,
        Arc<KeyedRegistry<dyn RawControllerDevice>>,
    ) {
        let registry = Arc::new(KeyedRegistry::new());
        let backend: MockBackend<dyn RawControllerDevice> = MockBackend::new();
        let tracker = RawControllerTracker::new(registry.clone(), fixture.bus.clone());
        let source: Arc<RawControllerBackend> = Arc::new(backend.clone());
        let discovery = Discovery::new(tracker, source);
        (discovery, backend, registry)
    }

    #[test]
    fn test_scan_registers_attached_gamepads() {
        let fixture = Fixture::new();
        let (discovery, backend, registry) = gamepad_discovery(&fixture);
        backend.attach(gamepad());
        backend.attach(gamepad());

        let report = discovery.scan();

        assert_eq!(report, ScanReport { enumerated: 2, added: 2, skipped: 0 });
        assert_eq!(registry.count(), 2);
        assert_eq!(
            fixture.events(),
            vec![ControllerEvent::gamepad_added(0), ControllerEvent::gamepad_added(1)]
        );
    }

    #[test]
    fn test_rescan_is_idempotent() {
        let fixture = Fixture::new();
        let (discovery, backend, _registry) = gamepad_discovery(&fixture);
        backend.attach(gamepad());

        discovery.scan();
        let report = discovery.scan();

        assert_eq!(report.added, 0);
        assert_eq!(report.already_present(), 1);
        assert_eq!(fixture.events().len(), 1);
    }

    #[test]
    fn test_arrival_after_scan_is_deduplicated() {
        let fixture = Fixture::new();
        let (discovery, backend, registry) = gamepad_discovery(&fixture);
        let pad = gamepad();
        backend.attach(pad.clone());

        discovery.start().unwrap();
        discovery.scan();
        backend.emit_added(pad);

        assert_eq!(registry.occupied(), 1);
        assert_eq!(fixture.events().len(), 1);
    }

    #[test]
    fn test_removal_of_unknown_gamepad_is_silent() {
        let fixture = Fixture::new();
        let (discovery, backend, registry) = gamepad_discovery(&fixture);

        discovery.start().unwrap();
        backend.emit_removed(gamepad());

        assert_eq!(registry.count(), 0);
        assert!(fixture.events().is_empty());
    }

    #[test]
    fn test_plug_and_unplug_gamepad() {
        let fixture = Fixture::new();
        let (discovery, backend, registry) = gamepad_discovery(&fixture);
        discovery.start().unwrap();

        let pad = gamepad();
        backend.plug(pad.clone());
        backend.unplug(&pad);
        backend.unplug(&pad);

        assert_eq!(registry.count(), 1);
        assert_eq!(registry.occupied(), 0);
        assert_eq!(
            fixture.events(),
            vec![ControllerEvent::gamepad_added(0), ControllerEvent::gamepad_removed(0)]
        );
    }

    #[test]
    fn test_enumeration_failure_yields_empty_report() {
        let fixture = Fixture::new();
        let (discovery, backend, registry) = gamepad_discovery(&fixture);
        backend.attach(gamepad());
        backend.fail_enumeration(Some(hotpad_hardware::HardwareError::communication(
            "device manager unavailable",
        )));

        assert_eq!(discovery.scan(), ScanReport::default());
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_start_is_idempotent_and_stop_unsubscribes() {
        let fixture = Fixture::new();
        let (discovery, backend, registry) = gamepad_discovery(&fixture);

        discovery.start().unwrap();
        discovery.start().unwrap();
        assert_eq!(backend.subscriber_count(), 1);
        assert!(discovery.is_subscribed());

        discovery.stop();
        assert_eq!(backend.subscriber_count(), 0);

        backend.plug(gamepad());
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_raw_scan_skips_untrackable_devices() {
        let fixture = Fixture::new();
        let (discovery, backend, registry) = raw_discovery(&fixture);

        let (anonymous, _) = MockRawController::new(1, 0, 0);
        backend.attach(raw("HID\\A"));
        backend.attach(Arc::new(anonymous.without_uid()));
        backend.attach(raw("HID\\B"));

        let report = discovery.scan();

        assert_eq!(report, ScanReport { enumerated: 3, added: 2, skipped: 1 });
        assert_eq!(registry.count(), 2);
        assert!(fixture.events().iter().all(|event| event.kind == EventKind::Added));
    }

    #[test]
    fn test_raw_reconnect_with_new_object() {
        let fixture = Fixture::new();
        let (discovery, backend, registry) = raw_discovery(&fixture);
        discovery.start().unwrap();

        let first = raw("HID\\A");
        backend.plug(first.clone());
        backend.unplug(&first);

        let second = raw("HID\\A");
        backend.plug(second.clone());

        let held = registry.find("HID\\A").unwrap();
        assert!(held.is(&second));

        let kinds: Vec<_> = fixture.events().iter().map(|event| event.kind).collect();
        assert_eq!(kinds, vec![EventKind::Added, EventKind::Removed, EventKind::Added]);
    }

    #[test]
    fn test_raw_removal_of_unknown_uid_is_silent() {
        let fixture = Fixture::new();
        let (discovery, backend, _registry) = raw_discovery(&fixture);
        discovery.start().unwrap();

        backend.emit_removed(raw("HID\\never-seen"));

        assert!(fixture.events().is_empty());
    }

    #[test]
    fn test_raw_events_carry_uid() {
        let fixture = Fixture::new();
        let (discovery, backend, _registry) = raw_discovery(&fixture);
        discovery.start().unwrap();

        backend.plug(raw("HID\\A"));

        let events = fixture.events();
        assert_eq!(events[0].family, ControllerFamily::RawController);
        assert_eq!(
            events[0].id.as_uid().map(|uid| uid.as_str()),
            Some("HID\\A")
        );
        assert!(matches!(events[0].id, ControllerId::Uid(_)));
    }

    #[test]
    fn test_listener_can_trigger_discovery_of_other_family() {
        let fixture = Fixture::new();
        let (gamepads, gamepad_backend, _) = gamepad_discovery(&fixture);
        let (raw_controllers, raw_backend, raw_registry) = raw_discovery(&fixture);
        gamepads.start().unwrap();
        raw_controllers.start().unwrap();

        let plugger = raw_backend.clone();
        fixture.bus.register(move |event| {
            if event.family == ControllerFamily::Gamepad && event.kind == EventKind::Added {
                plugger.plug(raw("HID\\PAIRED"));
            }
        });

        gamepad_backend.plug(gamepad());

        assert_eq!(raw_registry.count(), 1);
        let families: Vec<_> = fixture.events().iter().map(|event| event.family).collect();
        assert_eq!(
            families,
            vec![ControllerFamily::Gamepad, ControllerFamily::RawController]
        );
    }

    #[test]
    fn test_scan_report_accumulates() {
        let mut total = ScanReport { enumerated: 2, added: 1, skipped: 0 };
        total += ScanReport { enumerated: 3, added: 2, skipped: 1 };

        assert_eq!(total, ScanReport { enumerated: 5, added: 3, skipped: 1 });
        assert_eq!(total.already_present(), 1);
    }
}
