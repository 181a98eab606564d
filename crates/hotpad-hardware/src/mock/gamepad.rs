//! Mock gamepad implementation for testing and development.
//!
//! This module provides a simulated gamepad whose inputs, battery and
//! connection state can be driven programmatically through a
//! [`MockGamepadHandle`].

use crate::{
    HardwareError, Result,
    traits::{GameController, GamepadDevice},
};
use hotpad_core::{BatteryReport, GamepadButtons, GamepadReading, Vibration};
use parking_lot::Mutex;
use std::sync::Arc;

/// Mock gamepad for testing and development.
///
/// # Examples
///
/// ```
/// use hotpad_core::GamepadButtons;
/// use hotpad_hardware::mock::MockGamepad;
/// use hotpad_hardware::traits::GamepadDevice;
///
/// let (pad, handle) = MockGamepad::new();
///
/// handle.press(GamepadButtons::A);
/// let reading = pad.current_reading().unwrap();
/// assert!(reading.is_pressed(GamepadButtons::A));
///
/// handle.disconnect();
/// assert!(pad.current_reading().is_err());
/// ```
#[derive(Debug)]
pub struct MockGamepad {
    /// State shared with the control handle
    state: Arc<Mutex<GamepadState>>,

    /// Device name
    name: String,
}

#[derive(Debug)]
struct GamepadState {
    reading: GamepadReading,
    vibration: Vibration,
    wireless: bool,
    battery: Option<BatteryReport>,
    connected: bool,
    clock: u64,
}

impl MockGamepad {
    /// Create a new wired mock gamepad with the default name.
    ///
    /// Returns a tuple of (MockGamepad, MockGamepadHandle) where the handle
    /// drives the gamepad's inputs and connection state.
    pub fn new() -> (Self, MockGamepadHandle) {
        Self::with_name("Mock Gamepad".to_string())
    }

    /// Create a new wired mock gamepad with a custom name.
    pub fn with_name(name: String) -> (Self, MockGamepadHandle) {
        let state = Arc::new(Mutex::new(GamepadState {
            reading: GamepadReading::default(),
            vibration: Vibration::OFF,
            wireless: false,
            battery: None,
            connected: true,
            clock: 0,
        }));

        let pad = Self {
            state: state.clone(),
            name: name.clone(),
        };

        let handle = MockGamepadHandle { state, name };

        (pad, handle)
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn ensure_connected(&self, state: &GamepadState) -> Result<()> {
        if state.connected {
            Ok(())
        } else {
            Err(HardwareError::disconnected(self.name.clone()))
        }
    }
}

impl GameController for MockGamepad {
    fn is_wireless(&self) -> Result<bool> {
        let state = self.state.lock();
        self.ensure_connected(&state)?;
        Ok(state.wireless)
    }

    fn battery_report(&self) -> Result<Option<BatteryReport>> {
        let state = self.state.lock();
        self.ensure_connected(&state)?;
        Ok(state.battery)
    }
}

impl GamepadDevice for MockGamepad {
    fn current_reading(&self) -> Result<GamepadReading> {
        let mut state = self.state.lock();
        self.ensure_connected(&state)?;

        state.clock += 1;
        let mut reading = state.reading;
        reading.timestamp = state.clock;
        Ok(reading)
    }

    fn vibration(&self) -> Result<Vibration> {
        let state = self.state.lock();
        self.ensure_connected(&state)?;
        Ok(state.vibration)
    }

    fn set_vibration(&self, vibration: Vibration) -> Result<()> {
        let mut state = self.state.lock();
        self.ensure_connected(&state)?;
        state.vibration = vibration;
        Ok(())
    }
}

/// Handle for controlling a mock gamepad.
///
/// Cloned handles control the same gamepad.
#[derive(Debug, Clone)]
pub struct MockGamepadHandle {
    /// State shared with the gamepad
    state: Arc<Mutex<GamepadState>>,

    /// Device name
    name: String,
}

impl MockGamepadHandle {
    /// Hold `buttons` in addition to whatever is already held.
    pub fn press(&self, buttons: GamepadButtons) {
        self.state.lock().reading.buttons.insert(buttons);
    }

    /// Let go of `buttons`.
    pub fn release(&self, buttons: GamepadButtons) {
        self.state.lock().reading.buttons.remove(buttons);
    }

    /// Replace the whole reading. The timestamp is managed by the gamepad.
    pub fn set_reading(&self, reading: GamepadReading) {
        self.state.lock().reading = reading;
    }

    /// Set both trigger positions.
    pub fn set_triggers(&self, left: f64, right: f64) {
        let mut state = self.state.lock();
        state.reading.left_trigger = left;
        state.reading.right_trigger = right;
    }

    /// Set whether the gamepad reports a wireless connection.
    pub fn set_wireless(&self, wireless: bool) {
        self.state.lock().wireless = wireless;
    }

    /// Set the battery report, or `None` for a gamepad without battery.
    pub fn set_battery(&self, battery: Option<BatteryReport>) {
        self.state.lock().battery = battery;
    }

    /// Make every subsequent call on the gamepad fail as disconnected.
    pub fn disconnect(&self) {
        self.state.lock().connected = false;
    }

    /// Undo [`disconnect`](Self::disconnect).
    pub fn reconnect(&self) {
        self.state.lock().connected = true;
    }

    /// Check if the gamepad currently answers calls.
    pub fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    /// Motor intensities last applied through the gamepad.
    pub fn applied_vibration(&self) -> Vibration {
        self.state.lock().vibration
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotpad_core::BatteryStatus;

    #[test]
    fn test_mock_gamepad_press_and_read() {
        let (pad, handle) = MockGamepad::new();

        handle.press(GamepadButtons::A | GamepadButtons::DPAD_UP);
        handle.set_triggers(0.25, 1.0);

        let reading = pad.current_reading().unwrap();
        assert!(reading.is_pressed(GamepadButtons::A | GamepadButtons::DPAD_UP));
        assert_eq!(reading.left_trigger, 0.25);
        assert_eq!(reading.right_trigger, 1.0);

        handle.release(GamepadButtons::A);
        let reading = pad.current_reading().unwrap();
        assert!(!reading.is_pressed(GamepadButtons::A));
        assert!(reading.is_pressed(GamepadButtons::DPAD_UP));
    }

    #[test]
    fn test_mock_gamepad_timestamps_advance() {
        let (pad, _handle) = MockGamepad::new();

        let first = pad.current_reading().unwrap().timestamp;
        let second = pad.current_reading().unwrap().timestamp;
        assert!(second > first);
    }

    #[test]
    fn test_mock_gamepad_vibration() {
        let (pad, handle) = MockGamepad::new();

        assert!(pad.vibration().unwrap().is_off());

        pad.set_vibration(Vibration::rumble(0.75)).unwrap();
        assert_eq!(pad.vibration().unwrap(), Vibration::rumble(0.75));
        assert_eq!(handle.applied_vibration(), Vibration::rumble(0.75));
    }

    #[test]
    fn test_mock_gamepad_battery_and_wireless() {
        let (pad, handle) = MockGamepad::with_name("Wireless Pad".to_string());

        assert!(!pad.is_wireless().unwrap());
        assert_eq!(pad.battery_report().unwrap(), None);

        let report = BatteryReport::new(BatteryStatus::Discharging, 600, 1200);
        handle.set_wireless(true);
        handle.set_battery(Some(report));

        assert!(pad.is_wireless().unwrap());
        assert_eq!(pad.battery_report().unwrap(), Some(report));
        assert_eq!(pad.name(), "Wireless Pad");
        assert_eq!(handle.name(), "Wireless Pad");
    }

    #[test]
    fn test_mock_gamepad_disconnect() {
        let (pad, handle) = MockGamepad::new();

        handle.disconnect();
        assert!(!handle.is_connected());

        let err = pad.current_reading().unwrap_err();
        assert!(err.is_disconnected());
        assert!(pad.set_vibration(Vibration::OFF).is_err());
        assert!(pad.is_wireless().is_err());

        handle.reconnect();
        assert!(pad.current_reading().is_ok());
    }
}
