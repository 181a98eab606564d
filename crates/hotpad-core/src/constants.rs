//! Core constants shared across the hotpad crates.
//!
//! # Usage
//!
//! ```
//! use hotpad_core::constants::*;
//!
//! fn is_rumble(waveform: u16) -> bool {
//!     waveform == RUMBLE_CONTINUOUS_WAVEFORM
//! }
//!
//! assert!(is_rumble(0x1005));
//! assert!(VIBRATION_EPSILON > 0.0);
//! ```

// ============================================================================
// Identity
// ============================================================================

/// Maximum length of a controller uid, in characters.
///
/// Platform identity strings are handed out through a 256-wide buffer that
/// includes the terminator, so anything longer cannot round-trip.
pub const MAX_UID_LENGTH: usize = 255;

/// Maximum length of a controller display name, in characters.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 255;

// ============================================================================
// Haptics
// ============================================================================

/// Waveform id of the continuous rumble effect.
///
/// This is the only haptic waveform the registry drives. Motors that do not
/// list it among their supported waveforms are treated as non-vibrating.
pub const RUMBLE_CONTINUOUS_WAVEFORM: u16 = 0x1005;

/// Intensities at or below this value stop the motor instead of playing.
pub const VIBRATION_EPSILON: f64 = 0.000_001;

// ============================================================================
// Gamepad layout
// ============================================================================

/// Number of buttons reported by [`GamepadButtons`](crate::GamepadButtons).
pub const GAMEPAD_BUTTON_COUNT: usize = 18;
