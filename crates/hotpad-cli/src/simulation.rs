//! Simulated hot-plug session over the mock backends.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

use hotpad_core::{
    BatteryInfo, BatteryReport, BatteryStatus, ButtonLabel, ControllerDescription, GamepadButtons,
    SwitchPosition, Vibration,
};
use hotpad_hardware::mock::{
    MockBackend, MockGamepad, MockGamepadHandle, MockHapticMotor, MockRawController,
    MockRawControllerHandle,
};
use hotpad_hardware::{GamepadDevice, RawControllerDevice};
use hotpad_registry::{Backends, ControllerHub, HubConfig};

/// Shape of a simulated session.
#[derive(Debug, Clone, Copy)]
pub struct SessionPlan {
    pub gamepads: usize,
    pub raw_controllers: usize,
    pub cycles: usize,
}

/// Final registry state printed at the end of a session.
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub gamepad_slots: usize,
    pub connected_gamepads: Vec<usize>,
    pub raw_controllers: Vec<RawControllerSummary>,
    pub events: usize,
}

#[derive(Debug, Serialize)]
pub struct RawControllerSummary {
    #[serde(flatten)]
    pub description: ControllerDescription,
    pub has_vibration: bool,
    pub battery: Option<BatteryInfo>,
}

struct SimulatedGamepad {
    device: Arc<dyn GamepadDevice>,
    control: MockGamepadHandle,
}

/// Hub plus the mock backends feeding it.
pub struct Session {
    hub: ControllerHub,
    gamepads: MockBackend<dyn GamepadDevice>,
    raw: MockBackend<dyn RawControllerDevice>,
    attached: Vec<SimulatedGamepad>,
    sticks: Vec<MockRawControllerHandle>,
    events: Arc<AtomicUsize>,
}

impl Session {
    /// Attach the initial devices and build the hub.
    pub fn new(config: HubConfig, plan: &SessionPlan) -> Self {
        let gamepads: MockBackend<dyn GamepadDevice> = MockBackend::new();
        let raw: MockBackend<dyn RawControllerDevice> = MockBackend::new();

        let attached = (0..plan.gamepads)
            .map(|n| {
                let (pad, control) = MockGamepad::with_name(format!("Simulated Gamepad {n}"));
                control.set_wireless(n % 2 == 1);
                control.set_battery(Some(BatteryReport::new(
                    BatteryStatus::Discharging,
                    400 + 100 * n as i32,
                    1000,
                )));
                let device: Arc<dyn GamepadDevice> = Arc::new(pad);
                gamepads.attach(device.clone());
                SimulatedGamepad { device, control }
            })
            .collect();

        let sticks = (0..plan.raw_controllers)
            .map(|n| {
                let (stick, control) = MockRawController::new(8, 1, 4);
                let mut stick = stick
                    .with_uid(format!("HID\\VID_045E&PID_0B13\\SIM{n:04}"))
                    .with_display_name(format!("Simulated Stick {n}"))
                    .with_labels(&[ButtonLabel::XboxA, ButtonLabel::XboxB]);
                if n == 0 {
                    stick = stick.with_motor(Arc::new(MockHapticMotor::rumble()));
                }
                let device: Arc<dyn RawControllerDevice> = Arc::new(stick);
                raw.attach(device);
                control
            })
            .collect();

        let hub = ControllerHub::new(
            config,
            Backends {
                gamepads: Arc::new(gamepads.clone()),
                raw_controllers: Arc::new(raw.clone()),
            },
        );

        let events = Arc::new(AtomicUsize::new(0));
        let counter = events.clone();
        hub.add_listener(move |event| {
            counter.fetch_add(1, Ordering::Relaxed);
            info!(kind = ?event.kind, family = %event.family, id = ?event.id, "{event}");
        });

        Self {
            hub,
            gamepads,
            raw,
            attached,
            sticks,
            events,
        }
    }

    /// Start the hub and block until the initial scan is done.
    pub fn start(&self) -> hotpad_registry::Result<()> {
        self.hub.start()?;
        let report = self.hub.wait_for_initial_scan();
        info!(
            enumerated = report.enumerated,
            added = report.added,
            skipped = report.skipped,
            "Initial scan complete"
        );
        Ok(())
    }

    /// Exercise queries, then run the plug/unplug cycles.
    pub fn run(&self, plan: &SessionPlan) -> Result<()> {
        self.exercise_gamepads()?;
        self.exercise_raw_controllers()?;

        for cycle in 0..plan.cycles {
            debug!(cycle, "Hot-plug cycle");

            // Drop the first pad and bring a fresh one in; it reuses the slot
            if let Some(first) = self.attached.first() {
                first.control.disconnect();
                self.gamepads.unplug(&first.device);
            }
            let (pad, control) = MockGamepad::with_name(format!("Visitor {cycle}"));
            let visitor: Arc<dyn GamepadDevice> = Arc::new(pad);
            self.gamepads.plug(visitor.clone());
            control.press(GamepadButtons::MENU);
            self.log_gamepads();

            self.gamepads.unplug(&visitor);
            if let Some(first) = self.attached.first() {
                first.control.reconnect();
                self.gamepads.plug(first.device.clone());
            }

            // Same physical stick comes back as a new backend object
            if let Some(uid) = self.first_raw_uid() {
                let (stick, _) = MockRawController::new(8, 1, 4);
                let again: Arc<dyn RawControllerDevice> = Arc::new(stick.with_uid(uid));
                self.raw.emit_removed(again.clone());
                self.raw.emit_added(again);
            }
        }

        let report = self.hub.rescan();
        debug!(
            enumerated = report.enumerated,
            added = report.added,
            "Rescan after cycles"
        );
        Ok(())
    }

    fn exercise_gamepads(&self) -> Result<()> {
        for pad in &self.attached {
            pad.control.press(GamepadButtons::A);
            pad.control.set_triggers(0.25, 0.75);
        }

        let gamepads = self.hub.gamepads();
        for slot in gamepads.connected_slots() {
            let reading = gamepads.state(slot)?;
            info!(
                slot,
                buttons = ?reading.buttons,
                left_trigger = reading.left_trigger,
                right_trigger = reading.right_trigger,
                "Gamepad reading"
            );

            gamepads.set_vibration(slot, Vibration::rumble(0.5))?;
            let applied = gamepads.vibration(slot)?;
            debug!(slot, ?applied, "Vibration applied");
            gamepads.set_vibration(slot, Vibration::OFF)?;

            match gamepads.battery(slot) {
                Ok(battery) => info!(
                    slot,
                    wireless = gamepads.is_wireless(slot)?,
                    status = %battery.status,
                    charge = battery.charge,
                    "Gamepad battery"
                ),
                Err(e) => warn!(slot, error = %e, "No battery report"),
            }
        }
        Ok(())
    }

    fn exercise_raw_controllers(&self) -> Result<()> {
        for control in &self.sticks {
            control.set_button(0, true);
            control.set_switch(0, SwitchPosition::UpLeft);
            control.set_axis(0, -0.5);
        }

        let raw = self.hub.raw_controllers();
        for description in raw.controllers(self.sticks.len()).into_entries() {
            let uid = description.uid.as_str();
            let reading = raw.state(uid)?;
            info!(
                uid,
                name = %description.display_name,
                pressed = reading.buttons.iter().filter(|pressed| **pressed).count(),
                switches = ?reading.switches,
                "Raw controller reading"
            );

            let label = raw.button_label(uid, 0)?;
            debug!(uid, ?label, "Button 0 label");

            if raw.has_vibration(uid)? {
                raw.set_vibration(uid, 0.8)?;
                info!(uid, vibrating = raw.is_vibrating(uid)?, "Rumble on");
                raw.set_vibration(uid, 0.0)?;
            }
        }
        Ok(())
    }

    fn first_raw_uid(&self) -> Option<String> {
        self.hub
            .raw_controllers()
            .controllers(1)
            .into_entries()
            .into_iter()
            .next()
            .map(|description| description.uid.into_string())
    }

    fn log_gamepads(&self) {
        let gamepads = self.hub.gamepads();
        debug!(
            slots = gamepads.count(),
            connected = ?gamepads.connected_slots(),
            "Gamepad slots"
        );
    }

    pub fn summary(&self) -> SessionSummary {
        let gamepads = self.hub.gamepads();
        let raw = self.hub.raw_controllers();
        let raw_controllers = raw
            .controllers(raw.count())
            .into_entries()
            .into_iter()
            .map(|description| {
                let uid = description.uid.as_str();
                RawControllerSummary {
                    has_vibration: raw.has_vibration(uid).unwrap_or(false),
                    battery: raw.battery(uid).ok(),
                    description,
                }
            })
            .collect();

        SessionSummary {
            gamepad_slots: gamepads.count(),
            connected_gamepads: gamepads.connected_slots(),
            raw_controllers,
            events: self.events.load(Ordering::Relaxed),
        }
    }

    pub fn shutdown(&self) {
        self.hub.shutdown();
    }
}
