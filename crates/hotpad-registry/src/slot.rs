//! Slot-indexed device registry.
//!
//! Gamepads are addressed by a small integer slot. Removing a device leaves a
//! tombstone in its slot so the indices of every other device stay valid;
//! the next addition reuses the lowest empty slot before growing the table.

use hotpad_hardware::DeviceHandle;
use parking_lot::RwLock;

/// Outcome of [`SlotRegistry::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotAdmission {
    /// The device was stored in this slot.
    Added(usize),

    /// The device already occupied this slot. Nothing changed.
    Present(usize),
}

impl SlotAdmission {
    /// Slot the device occupies after the call.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            SlotAdmission::Added(index) | SlotAdmission::Present(index) => index,
        }
    }

    #[must_use]
    pub fn is_added(self) -> bool {
        matches!(self, SlotAdmission::Added(_))
    }
}

/// Concurrent slot registry.
///
/// Reads take a shared lock, mutations an exclusive one. Every method
/// releases the lock before returning, so a returned [`DeviceHandle`] can
/// be queried without blocking other callers.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use hotpad_hardware::DeviceHandle;
/// use hotpad_registry::slot::{SlotAdmission, SlotRegistry};
///
/// let registry: SlotRegistry<&str> = SlotRegistry::new();
/// let a = DeviceHandle::new(Arc::new("a"));
/// let b = DeviceHandle::new(Arc::new("b"));
///
/// assert_eq!(registry.add(a.clone()), SlotAdmission::Added(0));
/// assert_eq!(registry.add(b.clone()), SlotAdmission::Added(1));
/// assert_eq!(registry.add(a.clone()), SlotAdmission::Present(0));
///
/// assert_eq!(registry.remove(&a), Some(0));
/// assert_eq!(registry.count(), 2);
/// assert!(registry.get(0).is_none());
/// ```
#[derive(Debug)]
pub struct SlotRegistry<D: ?Sized> {
    inner: RwLock<SlotTable<D>>,
}

#[derive(Debug)]
struct SlotTable<D: ?Sized> {
    slots: Vec<Option<DeviceHandle<D>>>,

    /// Lowest empty slot, `None` when every slot is occupied
    free_hint: Option<usize>,
}

impl<D: ?Sized> SlotTable<D> {
    fn position(&self, handle: &DeviceHandle<D>) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|held| held.same_device(handle)))
    }

    fn next_free_after(&self, index: usize) -> Option<usize> {
        self.slots
            .iter()
            .skip(index + 1)
            .position(Option::is_none)
            .map(|offset| index + 1 + offset)
    }
}

impl<D: ?Sized> SlotRegistry<D> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(SlotTable {
                slots: Vec::new(),
                free_hint: None,
            }),
        }
    }

    /// Store `handle` unless it is already present.
    ///
    /// A new device takes the lowest empty slot, or a new slot at the end
    /// when none is empty.
    pub fn add(&self, handle: DeviceHandle<D>) -> SlotAdmission {
        let mut table = self.inner.write();

        if let Some(index) = table.position(&handle) {
            return SlotAdmission::Present(index);
        }

        match table.free_hint {
            Some(index) => {
                debug_assert!(table.slots[index].is_none(), "free hint names occupied slot");
                table.slots[index] = Some(handle);
                table.free_hint = table.next_free_after(index);
                SlotAdmission::Added(index)
            }
            None => {
                table.slots.push(Some(handle));
                SlotAdmission::Added(table.slots.len() - 1)
            }
        }
    }

    /// Tombstone the slot holding `handle`.
    ///
    /// Returns the freed slot, or `None` if the device was not present.
    pub fn remove(&self, handle: &DeviceHandle<D>) -> Option<usize> {
        let mut table = self.inner.write();

        let index = table.position(handle)?;
        table.slots[index] = None;
        table.free_hint = Some(table.free_hint.map_or(index, |hint| hint.min(index)));
        Some(index)
    }

    /// Number of slots, tombstones included.
    ///
    /// Valid slot indices are `0..count()`.
    pub fn count(&self) -> usize {
        self.inner.read().slots.len()
    }

    /// Number of slots holding a device.
    pub fn occupied(&self) -> usize {
        self.inner.read().slots.iter().flatten().count()
    }

    /// Handle in `index`, or `None` if out of range or tombstoned.
    pub fn get(&self, index: usize) -> Option<DeviceHandle<D>> {
        self.inner.read().slots.get(index).cloned().flatten()
    }

    /// Slot currently holding `handle`.
    pub fn position(&self, handle: &DeviceHandle<D>) -> Option<usize> {
        self.inner.read().position(handle)
    }

    /// Every occupied slot with its handle, in slot order.
    pub fn snapshot(&self) -> Vec<(usize, DeviceHandle<D>)> {
        self.inner
            .read()
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.clone().map(|handle| (index, handle)))
            .collect()
    }

    /// Forget every slot. Used on shutdown.
    pub fn clear(&self) {
        let mut table = self.inner.write();
        table.slots.clear();
        table.free_hint = None;
    }
}

impl<D: ?Sized> Default for SlotRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}
