use crate::{Result, constants::MAX_UID_LENGTH, error::Error};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Persistent identity string of a raw controller.
///
/// Comparison is exact and case-sensitive. The uid is stable for a physical
/// device, so it may reappear if the same controller reconnects.
///
/// Implements [`Borrow<str>`] so keyed lookups can take a `&str` without
/// allocating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ControllerUid(String);

impl ControllerUid {
    /// Create a new controller uid with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidUid` if the uid is empty or longer than
    /// [`MAX_UID_LENGTH`] characters.
    pub fn new(uid: impl Into<String>) -> Result<Self> {
        let uid = uid.into();

        if uid.is_empty() {
            return Err(Error::InvalidUid {
                message: "uid must not be empty".to_string(),
            });
        }

        let len = uid.chars().count();
        if len > MAX_UID_LENGTH {
            return Err(Error::InvalidUid {
                message: format!("uid must be at most {MAX_UID_LENGTH} chars, got {len}"),
            });
        }

        Ok(ControllerUid(uid))
    }

    /// Get the uid as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the uid and return the owned string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Borrow<str> for ControllerUid {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ControllerUid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControllerUid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ControllerUid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ControllerUid::new(s)
    }
}

impl TryFrom<String> for ControllerUid {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        ControllerUid::new(value)
    }
}

impl From<ControllerUid> for String {
    fn from(uid: ControllerUid) -> Self {
        uid.0
    }
}

/// Device family a controller belongs to.
///
/// Each family has its own registry and its own address space: gamepads are
/// addressed by slot index, raw controllers by [`ControllerUid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerFamily {
    /// Slot-addressed gamepads with a fixed button/axis layout.
    Gamepad,
    /// Identity-keyed controllers with a device-specific layout.
    RawController,
}

impl ControllerFamily {
    /// Returns `true` if the family is addressed by slot index.
    #[inline]
    #[must_use]
    pub fn is_slot_addressed(self) -> bool {
        matches!(self, ControllerFamily::Gamepad)
    }
}

impl fmt::Display for ControllerFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ControllerFamily::Gamepad => write!(f, "Gamepad"),
            ControllerFamily::RawController => write!(f, "RawController"),
        }
    }
}

/// Hot-plug event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Added,
    Removed,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventKind::Added => write!(f, "Added"),
            EventKind::Removed => write!(f, "Removed"),
        }
    }
}

/// Application-facing identity of a tracked controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerId {
    /// Slot index of a gamepad, stable for its connected lifetime.
    Slot(usize),
    /// Persistent uid of a raw controller.
    Uid(ControllerUid),
}

impl ControllerId {
    /// Slot index, if this is a slot identity.
    #[must_use]
    pub fn as_slot(&self) -> Option<usize> {
        match self {
            ControllerId::Slot(index) => Some(*index),
            ControllerId::Uid(_) => None,
        }
    }

    /// Uid, if this is a keyed identity.
    #[must_use]
    pub fn as_uid(&self) -> Option<&ControllerUid> {
        match self {
            ControllerId::Slot(_) => None,
            ControllerId::Uid(uid) => Some(uid),
        }
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ControllerId::Slot(index) => write!(f, "#{index}"),
            ControllerId::Uid(uid) => write!(f, "{uid}"),
        }
    }
}

/// Notification delivered to listeners when a controller comes or goes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControllerEvent {
    pub kind: EventKind,
    pub family: ControllerFamily,
    pub id: ControllerId,
}

impl ControllerEvent {
    /// A gamepad was placed in `index`.
    #[must_use]
    pub fn gamepad_added(index: usize) -> Self {
        Self {
            kind: EventKind::Added,
            family: ControllerFamily::Gamepad,
            id: ControllerId::Slot(index),
        }
    }

    /// The gamepad in `index` went away.
    #[must_use]
    pub fn gamepad_removed(index: usize) -> Self {
        Self {
            kind: EventKind::Removed,
            family: ControllerFamily::Gamepad,
            id: ControllerId::Slot(index),
        }
    }

    /// A raw controller with `uid` was registered.
    #[must_use]
    pub fn raw_added(uid: ControllerUid) -> Self {
        Self {
            kind: EventKind::Added,
            family: ControllerFamily::RawController,
            id: ControllerId::Uid(uid),
        }
    }

    /// The raw controller with `uid` went away.
    #[must_use]
    pub fn raw_removed(uid: ControllerUid) -> Self {
        Self {
            kind: EventKind::Removed,
            family: ControllerFamily::RawController,
            id: ControllerId::Uid(uid),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_added(&self) -> bool {
        matches!(self.kind, EventKind::Added)
    }

    #[inline]
    #[must_use]
    pub fn is_removed(&self) -> bool {
        matches!(self.kind, EventKind::Removed)
    }
}

impl fmt::Display for ControllerEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.family, self.id, self.kind)
    }
}
