//! Telemetry values reported by controller backends.
//!
//! These are the shapes a backend hands back for state, vibration, battery
//! and labelling queries. The registry never interprets them beyond the
//! battery charge derivation in [`BatteryReport::charge_fraction`].

use crate::{Result, error::Error};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Pressed-button mask of a gamepad reading.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct GamepadButtons: u32 {
        const MENU = 0x1;
        const VIEW = 0x2;
        const A = 0x4;
        const B = 0x8;
        const X = 0x10;
        const Y = 0x20;
        const DPAD_UP = 0x40;
        const DPAD_DOWN = 0x80;
        const DPAD_LEFT = 0x100;
        const DPAD_RIGHT = 0x200;
        const LEFT_SHOULDER = 0x400;
        const RIGHT_SHOULDER = 0x800;
        const LEFT_THUMBSTICK = 0x1000;
        const RIGHT_THUMBSTICK = 0x2000;
        const PADDLE1 = 0x4000;
        const PADDLE2 = 0x8000;
        const PADDLE3 = 0x10000;
        const PADDLE4 = 0x20000;
    }
}

/// Point-in-time reading of a gamepad.
///
/// Triggers range over `0.0..=1.0`, thumbsticks over `-1.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GamepadReading {
    /// Backend timestamp in microseconds.
    pub timestamp: u64,
    pub buttons: GamepadButtons,
    pub left_trigger: f64,
    pub right_trigger: f64,
    pub left_thumbstick_x: f64,
    pub left_thumbstick_y: f64,
    pub right_thumbstick_x: f64,
    pub right_thumbstick_y: f64,
}

impl GamepadReading {
    /// Returns `true` if every button in `buttons` is held.
    #[must_use]
    pub fn is_pressed(&self, buttons: GamepadButtons) -> bool {
        self.buttons.contains(buttons)
    }
}

/// Motor intensities of a gamepad, each in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vibration {
    pub left_motor: f64,
    pub right_motor: f64,
    pub left_trigger: f64,
    pub right_trigger: f64,
}

impl Vibration {
    /// All motors off.
    pub const OFF: Vibration = Vibration {
        left_motor: 0.0,
        right_motor: 0.0,
        left_trigger: 0.0,
        right_trigger: 0.0,
    };

    /// Same intensity on both main motors, triggers off.
    #[must_use]
    pub fn rumble(intensity: f64) -> Self {
        Self {
            left_motor: intensity,
            right_motor: intensity,
            ..Self::OFF
        }
    }

    /// Returns `true` if every motor is at zero.
    #[must_use]
    pub fn is_off(&self) -> bool {
        *self == Self::OFF
    }
}

/// Battery state reported by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum BatteryStatus {
    NotPresent = 0,
    Discharging = 1,
    Idle = 2,
    Charging = 3,
}

impl BatteryStatus {
    /// Create a battery status from its platform code.
    ///
    /// # Errors
    /// Returns `Error::InvalidBatteryStatus` for codes outside 0-3.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(BatteryStatus::NotPresent),
            1 => Ok(BatteryStatus::Discharging),
            2 => Ok(BatteryStatus::Idle),
            3 => Ok(BatteryStatus::Charging),
            _ => Err(Error::InvalidBatteryStatus { code }),
        }
    }

    #[inline]
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BatteryStatus::NotPresent => write!(f, "NotPresent"),
            BatteryStatus::Discharging => write!(f, "Discharging"),
            BatteryStatus::Idle => write!(f, "Idle"),
            BatteryStatus::Charging => write!(f, "Charging"),
        }
    }
}

/// Raw battery report as delivered by the backend.
///
/// Capacities are optional because wired controllers and some wireless
/// receivers do not report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryReport {
    pub status: BatteryStatus,
    pub remaining_mwh: Option<i32>,
    pub full_mwh: Option<i32>,
}

impl BatteryReport {
    /// Create a report with both capacities present.
    #[must_use]
    pub fn new(status: BatteryStatus, remaining_mwh: i32, full_mwh: i32) -> Self {
        Self {
            status,
            remaining_mwh: Some(remaining_mwh),
            full_mwh: Some(full_mwh),
        }
    }

    /// Report without capacity information.
    #[must_use]
    pub fn status_only(status: BatteryStatus) -> Self {
        Self {
            status,
            remaining_mwh: None,
            full_mwh: None,
        }
    }

    /// Remaining charge as a fraction of full capacity.
    ///
    /// Missing capacities read as zero. A full capacity of zero or less
    /// yields `0.0`, never NaN or infinity.
    #[must_use]
    pub fn charge_fraction(&self) -> f64 {
        let remaining = self.remaining_mwh.unwrap_or(0);
        let full = self.full_mwh.unwrap_or(0);

        if full <= 0 {
            return 0.0;
        }

        f64::from(remaining) / f64::from(full)
    }

    /// Collapse the report into the status/charge pair exposed to callers.
    #[must_use]
    pub fn info(&self) -> BatteryInfo {
        BatteryInfo {
            status: self.status,
            charge: self.charge_fraction(),
        }
    }
}

/// Battery status plus derived charge fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryInfo {
    pub status: BatteryStatus,
    pub charge: f64,
}

/// Position of a hat switch on a raw controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum SwitchPosition {
    #[default]
    Center = 0,
    Up = 1,
    UpRight = 2,
    Right = 3,
    DownRight = 4,
    Down = 5,
    DownLeft = 6,
    Left = 7,
    UpLeft = 8,
}

impl SwitchPosition {
    /// Create a switch position from its platform code.
    ///
    /// # Errors
    /// Returns `Error::InvalidSwitchPosition` for codes outside 0-8.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(SwitchPosition::Center),
            1 => Ok(SwitchPosition::Up),
            2 => Ok(SwitchPosition::UpRight),
            3 => Ok(SwitchPosition::Right),
            4 => Ok(SwitchPosition::DownRight),
            5 => Ok(SwitchPosition::Down),
            6 => Ok(SwitchPosition::DownLeft),
            7 => Ok(SwitchPosition::Left),
            8 => Ok(SwitchPosition::UpLeft),
            _ => Err(Error::InvalidSwitchPosition { code }),
        }
    }

    #[inline]
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Label printed on a raw controller button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum ButtonLabel {
    #[default]
    None = 0,
    XboxBack = 1,
    XboxStart = 2,
    XboxMenu = 3,
    XboxView = 4,
    XboxUp = 5,
    XboxDown = 6,
    XboxLeft = 7,
    XboxRight = 8,
    XboxA = 9,
    XboxB = 10,
    XboxX = 11,
    XboxY = 12,
    XboxLeftBumper = 13,
    XboxLeftTrigger = 14,
    XboxLeftStickButton = 15,
    XboxRightBumper = 16,
    XboxRightTrigger = 17,
    XboxRightStickButton = 18,
    XboxPaddle1 = 19,
    XboxPaddle2 = 20,
    XboxPaddle3 = 21,
    XboxPaddle4 = 22,
    Mode = 23,
    Select = 24,
    Menu = 25,
    View = 26,
    Back = 27,
    Start = 28,
    Options = 29,
    Share = 30,
    Up = 31,
    Down = 32,
    Left = 33,
    Right = 34,
    LetterA = 35,
    LetterB = 36,
    LetterC = 37,
    LetterL = 38,
    LetterR = 39,
    LetterX = 40,
    LetterY = 41,
    LetterZ = 42,
    Cross = 43,
    Circle = 44,
    Square = 45,
    Triangle = 46,
    LeftBumper = 47,
    LeftTrigger = 48,
    LeftStickButton = 49,
    Left1 = 50,
    Left2 = 51,
    Left3 = 52,
    RightBumper = 53,
    RightTrigger = 54,
    RightStickButton = 55,
    Right1 = 56,
    Right2 = 57,
    Right3 = 58,
    Paddle1 = 59,
    Paddle2 = 60,
    Paddle3 = 61,
    Paddle4 = 62,
    Plus = 63,
    Minus = 64,
    DownLeftArrow = 65,
    DialLeft = 66,
    DialRight = 67,
    Suspension = 68,
}

impl ButtonLabel {
    /// Every label, indexed by its platform code.
    pub const ALL: [ButtonLabel; 69] = [
        ButtonLabel::None,
        ButtonLabel::XboxBack,
        ButtonLabel::XboxStart,
        ButtonLabel::XboxMenu,
        ButtonLabel::XboxView,
        ButtonLabel::XboxUp,
        ButtonLabel::XboxDown,
        ButtonLabel::XboxLeft,
        ButtonLabel::XboxRight,
        ButtonLabel::XboxA,
        ButtonLabel::XboxB,
        ButtonLabel::XboxX,
        ButtonLabel::XboxY,
        ButtonLabel::XboxLeftBumper,
        ButtonLabel::XboxLeftTrigger,
        ButtonLabel::XboxLeftStickButton,
        ButtonLabel::XboxRightBumper,
        ButtonLabel::XboxRightTrigger,
        ButtonLabel::XboxRightStickButton,
        ButtonLabel::XboxPaddle1,
        ButtonLabel::XboxPaddle2,
        ButtonLabel::XboxPaddle3,
        ButtonLabel::XboxPaddle4,
        ButtonLabel::Mode,
        ButtonLabel::Select,
        ButtonLabel::Menu,
        ButtonLabel::View,
        ButtonLabel::Back,
        ButtonLabel::Start,
        ButtonLabel::Options,
        ButtonLabel::Share,
        ButtonLabel::Up,
        ButtonLabel::Down,
        ButtonLabel::Left,
        ButtonLabel::Right,
        ButtonLabel::LetterA,
        ButtonLabel::LetterB,
        ButtonLabel::LetterC,
        ButtonLabel::LetterL,
        ButtonLabel::LetterR,
        ButtonLabel::LetterX,
        ButtonLabel::LetterY,
        ButtonLabel::LetterZ,
        ButtonLabel::Cross,
        ButtonLabel::Circle,
        ButtonLabel::Square,
        ButtonLabel::Triangle,
        ButtonLabel::LeftBumper,
        ButtonLabel::LeftTrigger,
        ButtonLabel::LeftStickButton,
        ButtonLabel::Left1,
        ButtonLabel::Left2,
        ButtonLabel::Left3,
        ButtonLabel::RightBumper,
        ButtonLabel::RightTrigger,
        ButtonLabel::RightStickButton,
        ButtonLabel::Right1,
        ButtonLabel::Right2,
        ButtonLabel::Right3,
        ButtonLabel::Paddle1,
        ButtonLabel::Paddle2,
        ButtonLabel::Paddle3,
        ButtonLabel::Paddle4,
        ButtonLabel::Plus,
        ButtonLabel::Minus,
        ButtonLabel::DownLeftArrow,
        ButtonLabel::DialLeft,
        ButtonLabel::DialRight,
        ButtonLabel::Suspension,
    ];

    /// Create a button label from its platform code.
    ///
    /// # Errors
    /// Returns `Error::InvalidButtonLabel` for codes outside 0-68.
    pub fn from_code(code: i32) -> Result<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or(Error::InvalidButtonLabel { code })
    }

    #[inline]
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Point-in-time reading of a raw controller.
///
/// Vector lengths match the controller's button, switch and axis counts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawControllerReading {
    /// Backend timestamp in microseconds.
    pub timestamp: u64,
    pub buttons: Vec<bool>,
    pub switches: Vec<SwitchPosition>,
    pub axes: Vec<f64>,
}

impl RawControllerReading {
    /// Reading with every input at rest.
    #[must_use]
    pub fn at_rest(button_count: usize, switch_count: usize, axis_count: usize) -> Self {
        Self {
            timestamp: 0,
            buttons: vec![false; button_count],
            switches: vec![SwitchPosition::Center; switch_count],
            axes: vec![0.0; axis_count],
        }
    }
}

/// Static description of a raw controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerDescription {
    pub uid: crate::ControllerUid,
    pub display_name: String,
    pub button_count: usize,
    pub switch_count: usize,
    pub axis_count: usize,
}
