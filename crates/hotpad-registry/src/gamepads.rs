//! Query surface for slot-addressed gamepads.
//!
//! Every query resolves the slot to a handle under the registry's shared
//! lock, releases the lock, and only then calls into the backend. A
//! gamepad unplugged between the two steps makes the backend call fail,
//! which is reported as an ordinary error.

use crate::error::{QueryError, QueryResult};
use crate::slot::SlotRegistry;
use hotpad_core::{BatteryInfo, GamepadReading, Vibration};
use hotpad_hardware::{DeviceHandle, GameController, GamepadDevice};
use std::sync::Arc;
use tracing::debug;

/// Read and command access to registered gamepads.
#[derive(Debug, Clone)]
pub struct Gamepads {
    registry: Arc<SlotRegistry<dyn GamepadDevice>>,
}

impl Gamepads {
    pub fn new(registry: Arc<SlotRegistry<dyn GamepadDevice>>) -> Self {
        Self { registry }
    }

    /// Number of gamepad slots, including empty ones.
    pub fn count(&self) -> usize {
        self.registry.count()
    }

    /// Indices of the slots currently holding a gamepad.
    pub fn connected_slots(&self) -> Vec<usize> {
        self.registry
            .snapshot()
            .into_iter()
            .map(|(index, _)| index)
            .collect()
    }

    /// Returns `true` if the slot holds a gamepad that answers a reading.
    pub fn is_connected(&self, index: usize) -> bool {
        self.state(index).is_ok()
    }

    /// Current input state.
    pub fn state(&self, index: usize) -> QueryResult<GamepadReading> {
        Ok(self.handle(index)?.current_reading()?)
    }

    /// Motor intensities last applied.
    pub fn vibration(&self, index: usize) -> QueryResult<Vibration> {
        Ok(self.handle(index)?.vibration()?)
    }

    /// Apply motor intensities.
    pub fn set_vibration(&self, index: usize, vibration: Vibration) -> QueryResult<()> {
        self.handle(index)?.set_vibration(vibration)?;
        debug!(slot = index, ?vibration, "Gamepad vibration applied");
        Ok(())
    }

    pub fn is_wireless(&self, index: usize) -> QueryResult<bool> {
        Ok(self.handle(index)?.is_wireless()?)
    }

    /// Battery status and charge fraction.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NoBatteryReport`] for a gamepad without battery.
    pub fn battery(&self, index: usize) -> QueryResult<BatteryInfo> {
        let report = self
            .handle(index)?
            .battery_report()?
            .ok_or(QueryError::NoBatteryReport)?;
        Ok(report.info())
    }

    fn handle(&self, index: usize) -> QueryResult<DeviceHandle<dyn GamepadDevice>> {
        self.registry
            .get(index)
            .ok_or_else(|| QueryError::slot_not_found(index))
    }
}
