//! Mock haptic motor.

use crate::{HardwareError, Result, traits::HapticMotor};
use hotpad_core::constants::RUMBLE_CONTINUOUS_WAVEFORM;
use parking_lot::Mutex;

/// Mock haptic motor that records what it was asked to play.
///
/// # Examples
///
/// ```
/// use hotpad_hardware::mock::MockHapticMotor;
/// use hotpad_hardware::traits::HapticMotor;
/// use hotpad_core::constants::RUMBLE_CONTINUOUS_WAVEFORM;
///
/// let motor = MockHapticMotor::rumble();
/// motor.play(RUMBLE_CONTINUOUS_WAVEFORM, 0.5).unwrap();
///
/// assert!(motor.is_playing(RUMBLE_CONTINUOUS_WAVEFORM).unwrap());
/// assert_eq!(motor.intensity(), Some(0.5));
/// ```
#[derive(Debug)]
pub struct MockHapticMotor {
    waveforms: Vec<u16>,
    playing: Mutex<Option<(u16, f64)>>,
}

impl MockHapticMotor {
    /// Motor supporting exactly `waveforms`.
    pub fn new(waveforms: Vec<u16>) -> Self {
        Self {
            waveforms,
            playing: Mutex::new(None),
        }
    }

    /// Motor supporting continuous rumble only.
    pub fn rumble() -> Self {
        Self::new(vec![RUMBLE_CONTINUOUS_WAVEFORM])
    }

    /// Intensity of the waveform being played, if any.
    pub fn intensity(&self) -> Option<f64> {
        self.playing.lock().map(|(_, intensity)| intensity)
    }
}

impl HapticMotor for MockHapticMotor {
    fn supported_waveforms(&self) -> Result<Vec<u16>> {
        Ok(self.waveforms.clone())
    }

    fn play(&self, waveform: u16, intensity: f64) -> Result<()> {
        if !self.waveforms.contains(&waveform) {
            return Err(HardwareError::unsupported(format!(
                "waveform {waveform:#06x}"
            )));
        }

        *self.playing.lock() = Some((waveform, intensity));
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        *self.playing.lock() = None;
        Ok(())
    }

    fn is_playing(&self, waveform: u16) -> Result<bool> {
        Ok(matches!(*self.playing.lock(), Some((playing, _)) if playing == waveform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_and_stop() {
        let motor = MockHapticMotor::rumble();
        assert_eq!(motor.intensity(), None);

        motor.play(RUMBLE_CONTINUOUS_WAVEFORM, 0.3).unwrap();
        assert!(motor.is_playing(RUMBLE_CONTINUOUS_WAVEFORM).unwrap());

        motor.stop().unwrap();
        assert!(!motor.is_playing(RUMBLE_CONTINUOUS_WAVEFORM).unwrap());
        assert_eq!(motor.intensity(), None);
    }

    #[test]
    fn test_unsupported_waveform() {
        let motor = MockHapticMotor::new(vec![0x1001]);

        let err = motor.play(RUMBLE_CONTINUOUS_WAVEFORM, 1.0).unwrap_err();
        assert!(matches!(err, HardwareError::Unsupported { .. }));
        assert_eq!(motor.supported_waveforms().unwrap(), vec![0x1001]);
    }
}
