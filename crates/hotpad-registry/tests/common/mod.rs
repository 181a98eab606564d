//! Common test utilities for integration tests.
//!
//! Every test drives a [`ControllerHub`] against mock backends through a
//! [`Rig`], which also records every event the hub fires.
//!
//! # Usage Examples
//!
//! ```ignore
//! let rig = common::Rig::new(common::foreground());
//! let pad = rig.attach_gamepad();
//! rig.start();
//!
//! rig.assert_events(&[ControllerEvent::gamepad_added(0)]);
//! ```

#![allow(dead_code)]

use hotpad_core::ControllerEvent;
use hotpad_hardware::mock::{
    MockBackend, MockGamepad, MockGamepadHandle, MockRawController, MockRawControllerHandle,
};
use hotpad_hardware::{GamepadDevice, RawControllerDevice};
use hotpad_registry::{Backends, ControllerHub, HubConfig};
use parking_lot::Mutex;
use std::sync::Arc;

/// Configuration that scans on the calling thread.
pub fn foreground() -> HubConfig {
    HubConfig {
        background_scan: false,
        ..HubConfig::default()
    }
}

/// Shared event recorder.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<ControllerEvent>>>);

impl EventLog {
    pub fn record(&self, event: &ControllerEvent) {
        self.0.lock().push(event.clone());
    }

    pub fn events(&self) -> Vec<ControllerEvent> {
        self.0.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Hub wired to mock backends with an event recorder attached.
pub struct Rig {
    pub hub: ControllerHub,
    pub gamepads: MockBackend<dyn GamepadDevice>,
    pub raw: MockBackend<dyn RawControllerDevice>,
    pub log: EventLog,
}

impl Rig {
    pub fn new(config: HubConfig) -> Self {
        let gamepads: MockBackend<dyn GamepadDevice> = MockBackend::new();
        let raw: MockBackend<dyn RawControllerDevice> = MockBackend::new();

        let hub = ControllerHub::new(
            config,
            Backends {
                gamepads: Arc::new(gamepads.clone()),
                raw_controllers: Arc::new(raw.clone()),
            },
        );

        let log = EventLog::default();
        let recorder = log.clone();
        hub.add_listener(move |event| recorder.record(event));

        Self {
            hub,
            gamepads,
            raw,
            log,
        }
    }

    /// Start the hub and wait for the initial scan.
    pub fn start(&self) {
        self.hub.start().expect("hub should start");
        self.hub.wait_for_initial_scan();
    }

    /// Attach a gamepad visible to enumeration only.
    pub fn attach_gamepad(&self) -> (Arc<dyn GamepadDevice>, MockGamepadHandle) {
        let (device, control) = gamepad();
        self.gamepads.attach(device.clone());
        (device, control)
    }

    /// Attach a raw controller visible to enumeration only.
    pub fn attach_raw(&self, uid: &str) -> (Arc<dyn RawControllerDevice>, MockRawControllerHandle) {
        let (device, control) = raw(uid);
        self.raw.attach(device.clone());
        (device, control)
    }

    pub fn assert_events(&self, expected: &[ControllerEvent]) {
        assert_eq!(self.log.events(), expected);
    }
}

/// Fresh mock gamepad as a trait object.
pub fn gamepad() -> (Arc<dyn GamepadDevice>, MockGamepadHandle) {
    let (pad, control) = MockGamepad::new();
    (Arc::new(pad), control)
}

/// Fresh mock raw controller with `uid` as a trait object.
pub fn raw(uid: &str) -> (Arc<dyn RawControllerDevice>, MockRawControllerHandle) {
    let (stick, control) = MockRawController::new(8, 1, 3);
    (Arc::new(stick.with_uid(uid)), control)
}
