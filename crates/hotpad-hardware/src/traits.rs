//! Controller backend trait definitions.
//!
//! These traits are the whole contract between the registry and a platform
//! controller backend. The registry only ever:
//!
//! - enumerates the attached devices of a family ([`ControllerBackend::enumerate`]),
//! - subscribes to arrival/removal notifications ([`ControllerBackend::subscribe`]),
//! - and issues per-device queries through [`GamepadDevice`] and
//!   [`RawControllerDevice`].
//!
//! All methods are synchronous. Backends deliver events from their own
//! threads, so every trait requires `Send + Sync`.

use crate::error::Result;
use hotpad_core::{
    BatteryReport, ButtonLabel, GamepadReading, RawControllerReading, Vibration,
};
use std::fmt;
use std::sync::Arc;

/// Capabilities shared by every controller family.
pub trait GameController: Send + Sync + fmt::Debug {
    /// Returns `true` if the controller is connected wirelessly.
    fn is_wireless(&self) -> Result<bool>;

    /// Current battery report, or `None` if the controller has none.
    fn battery_report(&self) -> Result<Option<BatteryReport>>;
}

/// Slot-addressed gamepad with the standard button and axis layout.
pub trait GamepadDevice: GameController {
    /// Read the current state of every input.
    fn current_reading(&self) -> Result<GamepadReading>;

    /// Motor intensities last applied to the gamepad.
    fn vibration(&self) -> Result<Vibration>;

    /// Apply motor intensities.
    fn set_vibration(&self, vibration: Vibration) -> Result<()>;
}

/// Identity-keyed controller with a device-specific layout.
pub trait RawControllerDevice: GameController {
    /// Persistent identity string of the physical device.
    ///
    /// # Errors
    ///
    /// Backends may refuse to supply an identity. Such devices are never
    /// tracked by the registry.
    fn non_roamable_id(&self) -> Result<String>;

    /// Human readable product name.
    fn display_name(&self) -> Result<String>;

    fn button_count(&self) -> usize;

    fn switch_count(&self) -> usize;

    fn axis_count(&self) -> usize;

    /// Read the current state of every input.
    fn current_reading(&self) -> Result<RawControllerReading>;

    /// Label printed on `button`.
    ///
    /// Callers validate `button` against [`button_count`](Self::button_count)
    /// before asking.
    fn button_label(&self, button: usize) -> Result<ButtonLabel>;

    /// Haptic motors of the controller, possibly empty.
    fn haptics(&self) -> Result<Vec<Arc<dyn HapticMotor>>>;
}

/// Single haptic actuator of a raw controller.
pub trait HapticMotor: Send + Sync + fmt::Debug {
    /// Waveform ids this motor can play.
    fn supported_waveforms(&self) -> Result<Vec<u16>>;

    /// Start playing `waveform` at `intensity` (`0.0..=1.0`) until stopped.
    fn play(&self, waveform: u16, intensity: f64) -> Result<()>;

    /// Stop whatever the motor is playing.
    fn stop(&self) -> Result<()>;

    /// Returns `true` if `waveform` is currently playing.
    fn is_playing(&self, waveform: u16) -> Result<bool>;
}

/// Receiver of backend arrival/removal notifications.
///
/// Backends may call these from any thread, concurrently with enumeration
/// and with each other.
pub trait DeviceSink<D: ?Sized>: Send + Sync {
    fn on_added(&self, device: Arc<D>);

    fn on_removed(&self, device: Arc<D>);
}

/// Discovery side of a controller backend, one per device family.
pub trait ControllerBackend<D: ?Sized>: Send + Sync {
    /// Every device of this family currently attached.
    fn enumerate(&self) -> Result<Vec<Arc<D>>>;

    /// Deliver future arrivals and removals to `sink` until the returned
    /// subscription is cancelled or dropped.
    fn subscribe(&self, sink: Arc<dyn DeviceSink<D>>) -> Result<Subscription>;
}

/// Backend for the gamepad family.
pub type GamepadBackend = dyn ControllerBackend<dyn GamepadDevice>;

/// Backend for the raw controller family.
pub type RawControllerBackend = dyn ControllerBackend<dyn RawControllerDevice>;

/// Guard for a backend event subscription.
///
/// Dropping the guard cancels the subscription.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Subscription that runs `cancel` exactly once when cancelled or dropped.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Subscription with nothing to undo.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    /// Cancel the subscription now.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    /// Returns `true` until the subscription has been cancelled.
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
