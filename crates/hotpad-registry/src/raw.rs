//! Query surface for uid-keyed raw controllers.
//!
//! Haptics only use the continuous rumble waveform. A controller "has
//! vibration" when any of its motors supports that waveform and "is
//! vibrating" when any motor is currently playing it.

use crate::error::{QueryError, QueryResult};
use crate::keyed::{KeyedRegistry, Listing};
use hotpad_core::constants::{RUMBLE_CONTINUOUS_WAVEFORM, VIBRATION_EPSILON};
use hotpad_core::{BatteryInfo, ButtonLabel, ControllerDescription, ControllerUid, RawControllerReading};
use hotpad_hardware::{DeviceHandle, GameController, HapticMotor, HardwareError, RawControllerDevice};
use std::sync::Arc;
use tracing::{debug, warn};

/// Read and command access to registered raw controllers.
#[derive(Debug, Clone)]
pub struct RawControllers {
    registry: Arc<KeyedRegistry<dyn RawControllerDevice>>,
}

impl RawControllers {
    pub fn new(registry: Arc<KeyedRegistry<dyn RawControllerDevice>>) -> Self {
        Self { registry }
    }

    /// Number of registered raw controllers.
    pub fn count(&self) -> usize {
        self.registry.count()
    }

    /// Descriptions of up to `capacity` controllers, or the total count
    /// when `capacity` is zero.
    ///
    /// Controllers whose description cannot be read are left out.
    pub fn controllers(&self, capacity: usize) -> Listing<ControllerDescription> {
        match self.registry.list(capacity) {
            Listing::Count(count) => Listing::Count(count),
            Listing::Entries(entries) => Listing::Entries(
                entries
                    .into_iter()
                    .filter_map(|(uid, handle)| match describe(uid, &handle) {
                        Ok(description) => Some(description),
                        Err(e) => {
                            debug!(error = %e, "Skipping raw controller in listing");
                            None
                        }
                    })
                    .collect(),
            ),
        }
    }

    /// Description of one controller.
    pub fn controller(&self, uid: &str) -> QueryResult<ControllerDescription> {
        let handle = self.handle(uid)?;
        // Registry keys are validated on insert
        let uid = ControllerUid::new(uid).map_err(HardwareError::from)?;
        describe(uid, &handle)
    }

    /// Returns `true` if a controller with `uid` is registered.
    pub fn is_connected(&self, uid: &str) -> bool {
        self.registry.contains(uid)
    }

    /// Current input state.
    pub fn state(&self, uid: &str) -> QueryResult<RawControllerReading> {
        Ok(self.handle(uid)?.current_reading()?)
    }

    /// Label printed on `button`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::ButtonOutOfRange`] when `button` is not below
    /// the controller's button count.
    pub fn button_label(&self, uid: &str, button: usize) -> QueryResult<ButtonLabel> {
        let handle = self.handle(uid)?;

        let count = handle.button_count();
        if button >= count {
            return Err(QueryError::ButtonOutOfRange { button, count });
        }

        Ok(handle.button_label(button)?)
    }

    /// Returns `true` if any motor supports continuous rumble.
    pub fn has_vibration(&self, uid: &str) -> QueryResult<bool> {
        for motor in self.handle(uid)?.haptics()? {
            if supports_rumble(motor.as_ref())? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Returns `true` if any motor is playing continuous rumble.
    pub fn is_vibrating(&self, uid: &str) -> QueryResult<bool> {
        for motor in self.handle(uid)?.haptics()? {
            if motor.is_playing(RUMBLE_CONTINUOUS_WAVEFORM)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Play continuous rumble on every capable motor at `intensity`, or
    /// stop every motor when `intensity` is effectively zero.
    ///
    /// `intensity` is clamped to `0.0..=1.0`.
    ///
    /// # Errors
    ///
    /// Fails with an `Unsupported` backend error when no motor accepted the
    /// command. Individual motor failures are logged and do not fail the
    /// call as long as one motor succeeded.
    pub fn set_vibration(&self, uid: &str, intensity: f64) -> QueryResult<()> {
        let motors = self.handle(uid)?.haptics()?;
        let intensity = if intensity.is_nan() {
            0.0
        } else {
            intensity.clamp(0.0, 1.0)
        };

        let mut accepted = 0usize;
        for motor in &motors {
            match apply_rumble(motor.as_ref(), intensity) {
                Ok(true) => accepted += 1,
                Ok(false) => {}
                Err(e) => warn!(%uid, error = %e, "Haptic motor rejected command"),
            }
        }

        if accepted == 0 {
            return Err(HardwareError::unsupported("continuous rumble").into());
        }

        debug!(%uid, intensity, motors = accepted, "Raw controller vibration applied");
        Ok(())
    }

    pub fn is_wireless(&self, uid: &str) -> QueryResult<bool> {
        Ok(self.handle(uid)?.is_wireless()?)
    }

    /// Battery status and charge fraction.
    pub fn battery(&self, uid: &str) -> QueryResult<BatteryInfo> {
        let report = self
            .handle(uid)?
            .battery_report()?
            .ok_or(QueryError::NoBatteryReport)?;
        Ok(report.info())
    }

    fn handle(&self, uid: &str) -> QueryResult<DeviceHandle<dyn RawControllerDevice>> {
        self.registry
            .find(uid)
            .ok_or_else(|| QueryError::uid_not_found(uid))
    }
}

fn describe(
    uid: ControllerUid,
    handle: &DeviceHandle<dyn RawControllerDevice>,
) -> QueryResult<ControllerDescription> {
    Ok(ControllerDescription {
        uid,
        display_name: handle.display_name()?,
        button_count: handle.button_count(),
        switch_count: handle.switch_count(),
        axis_count: handle.axis_count(),
    })
}

fn supports_rumble(motor: &dyn HapticMotor) -> hotpad_hardware::Result<bool> {
    Ok(motor
        .supported_waveforms()?
        .contains(&RUMBLE_CONTINUOUS_WAVEFORM))
}

/// Returns `Ok(true)` if the motor took the command.
fn apply_rumble(motor: &dyn HapticMotor, intensity: f64) -> hotpad_hardware::Result<bool> {
    if intensity <= VIBRATION_EPSILON {
        motor.stop()?;
        return Ok(true);
    }

    if !supports_rumble(motor)? {
        return Ok(false);
    }

    motor.play(RUMBLE_CONTINUOUS_WAVEFORM, intensity)?;
    Ok(true)
}
