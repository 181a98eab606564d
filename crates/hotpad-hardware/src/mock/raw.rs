//! Mock raw controller implementation for testing and development.
//!
//! A raw controller has a device-specific number of buttons, switches and
//! axes and is identified by a persistent uid. The mock generates a random
//! uid per instance unless one is set explicitly, and can be configured to
//! withhold its identity the way some platform backends do.

use crate::{
    HardwareError, Result,
    traits::{GameController, HapticMotor, RawControllerDevice},
};
use hotpad_core::{
    BatteryReport, ButtonLabel, RawControllerReading, SwitchPosition,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Mock raw controller for testing and development.
///
/// # Examples
///
/// ```
/// use hotpad_hardware::mock::MockRawController;
/// use hotpad_hardware::traits::RawControllerDevice;
///
/// let (stick, handle) = MockRawController::new(12, 1, 4);
/// let stick = stick.with_uid("HID\\VID_044F&PID_B10A\\1");
///
/// handle.set_button(3, true);
/// handle.set_axis(0, -0.5);
///
/// let reading = stick.current_reading().unwrap();
/// assert!(reading.buttons[3]);
/// assert_eq!(reading.axes[0], -0.5);
/// assert_eq!(stick.non_roamable_id().unwrap(), "HID\\VID_044F&PID_B10A\\1");
/// ```
#[derive(Debug)]
pub struct MockRawController {
    /// Identity reported to the registry, `None` if withheld
    uid: Option<String>,

    /// Product name
    display_name: String,

    button_count: usize,
    switch_count: usize,
    axis_count: usize,

    /// Button labels, indexed by button
    labels: Vec<ButtonLabel>,

    /// Haptic motors
    motors: Vec<Arc<dyn HapticMotor>>,

    /// State shared with the control handle
    state: Arc<Mutex<RawState>>,
}

#[derive(Debug)]
struct RawState {
    reading: RawControllerReading,
    wireless: bool,
    battery: Option<BatteryReport>,
    connected: bool,
    clock: u64,
}

impl MockRawController {
    /// Create a mock raw controller with the given input layout.
    ///
    /// The controller gets a fresh random uid and reports every button as
    /// [`ButtonLabel::None`].
    pub fn new(
        button_count: usize,
        switch_count: usize,
        axis_count: usize,
    ) -> (Self, MockRawControllerHandle) {
        let state = Arc::new(Mutex::new(RawState {
            reading: RawControllerReading::at_rest(button_count, switch_count, axis_count),
            wireless: false,
            battery: None,
            connected: true,
            clock: 0,
        }));

        let controller = Self {
            uid: Some(format!("MOCK\\{}", uuid::Uuid::new_v4())),
            display_name: "Mock Raw Controller".to_string(),
            button_count,
            switch_count,
            axis_count,
            labels: vec![ButtonLabel::None; button_count],
            motors: Vec::new(),
            state: state.clone(),
        };

        (controller, MockRawControllerHandle { state })
    }

    /// Report `uid` as the persistent identity.
    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Refuse to report an identity.
    #[must_use]
    pub fn without_uid(mut self) -> Self {
        self.uid = None;
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Set button labels. Buttons past the end of `labels` keep
    /// [`ButtonLabel::None`], extra labels are ignored.
    #[must_use]
    pub fn with_labels(mut self, labels: &[ButtonLabel]) -> Self {
        for (slot, label) in self.labels.iter_mut().zip(labels) {
            *slot = *label;
        }
        self
    }

    /// Attach a haptic motor.
    #[must_use]
    pub fn with_motor(mut self, motor: Arc<dyn HapticMotor>) -> Self {
        self.motors.push(motor);
        self
    }

    /// Uid this controller reports, if any.
    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    fn ensure_connected(&self, state: &RawState) -> Result<()> {
        if state.connected {
            Ok(())
        } else {
            Err(HardwareError::disconnected(self.display_name.clone()))
        }
    }
}

impl GameController for MockRawController {
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

impl RawControllerDevice for MockRawController {
    fn non_roamable_id(&self) -> Result<String> {
        self.uid
            .clone()
            .ok_or_else(|| HardwareError::identity_unavailable(self.display_name.clone()))
    }

    fn display_name(&self) -> Result<String> {
        Ok(self.display_name.clone())
    }

    fn button_count(&self) -> usize {
        self.button_count
    }

    fn switch_count(&self) -> usize {
        self.switch_count
    }

    fn axis_count(&self) -> usize {
        self.axis_count
    }

    fn current_reading(&self) -> Result<RawControllerReading> {
        let mut state = self.state.lock();
        self.ensure_connected(&state)?;

        state.clock += 1;
        let mut reading = state.reading.clone();
        reading.timestamp = state.clock;
        Ok(reading)
    }

    fn button_label(&self, button: usize) -> Result<ButtonLabel> {
        self.labels.get(button).copied().ok_or_else(|| {
            HardwareError::invalid_data(format!(
                "button {button} out of range for {} buttons",
                self.button_count
            ))
        })
    }

    fn haptics(&self) -> Result<Vec<Arc<dyn HapticMotor>>> {
        let state = self.state.lock();
        self.ensure_connected(&state)?;
        Ok(self.motors.clone())
    }
}

/// Handle for controlling a mock raw controller.
#[derive(Debug, Clone)]
pub struct MockRawControllerHandle {
    state: Arc<Mutex<RawState>>,
}

impl MockRawControllerHandle {
    /// Set the state of one button. Out of range buttons are ignored.
    pub fn set_button(&self, button: usize, pressed: bool) {
        if let Some(slot) = self.state.lock().reading.buttons.get_mut(button) {
            *slot = pressed;
        }
    }

    /// Set the position of one switch. Out of range switches are ignored.
    pub fn set_switch(&self, switch: usize, position: SwitchPosition) {
        if let Some(slot) = self.state.lock().reading.switches.get_mut(switch) {
            *slot = position;
        }
    }

    /// Set the value of one axis. Out of range axes are ignored.
    pub fn set_axis(&self, axis: usize, value: f64) {
        if let Some(slot) = self.state.lock().reading.axes.get_mut(axis) {
            *slot = value;
        }
    }

    pub fn set_wireless(&self, wireless: bool) {
        self.state.lock().wireless = wireless;
    }

    pub fn set_battery(&self, battery: Option<BatteryReport>) {
        self.state.lock().battery = battery;
    }

    /// Make every subsequent input call fail as disconnected.
    pub fn disconnect(&self) {
        self.state.lock().connected = false;
    }

    pub fn reconnect(&self) {
        self.state.lock().connected = true;
    }
}
