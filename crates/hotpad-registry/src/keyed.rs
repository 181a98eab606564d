//! Identity-keyed device registry.
//!
//! Raw controllers are addressed by their persistent uid. Keys are exact,
//! case-sensitive strings; listing order is insertion order.

use hotpad_core::ControllerUid;
use hotpad_hardware::DeviceHandle;
use indexmap::IndexMap;
use parking_lot::RwLock;

/// Result of a bounded listing.
///
/// Asking for zero entries is a size probe: the caller learns how many
/// entries exist without copying any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing<T> {
    /// Total number of entries, returned for a zero capacity.
    Count(usize),

    /// At most `capacity` entries.
    Entries(Vec<T>),
}

impl<T> Listing<T> {
    /// Number of entries described by the listing.
    pub fn len(&self) -> usize {
        match self {
            Listing::Count(count) => *count,
            Listing::Entries(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries of the listing, empty for a size probe.
    pub fn into_entries(self) -> Vec<T> {
        match self {
            Listing::Count(_) => Vec::new(),
            Listing::Entries(entries) => entries,
        }
    }

    /// Transform every entry, keeping a size probe as is.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        match self {
            Listing::Count(count) => Listing::Count(count),
            Listing::Entries(entries) => Listing::Entries(entries.into_iter().map(f).collect()),
        }
    }
}

/// Concurrent uid-to-device registry.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use hotpad_core::ControllerUid;
/// use hotpad_hardware::DeviceHandle;
/// use hotpad_registry::keyed::{KeyedRegistry, Listing};
///
/// let registry: KeyedRegistry<&str> = KeyedRegistry::new();
/// let uid = ControllerUid::new("HID\\VID_044F&PID_B10A\\1").unwrap();
///
/// assert!(registry.upsert(uid.clone(), DeviceHandle::new(Arc::new("stick"))));
/// assert!(registry.contains("HID\\VID_044F&PID_B10A\\1"));
/// assert_eq!(registry.list(0), Listing::Count(1));
/// ```
#[derive(Debug)]
pub struct KeyedRegistry<D: ?Sized> {
    inner: RwLock<IndexMap<ControllerUid, DeviceHandle<D>>>,
}

impl<D: ?Sized> KeyedRegistry<D> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(IndexMap::new()),
        }
    }

    /// Insert `handle` under `uid` if the uid is not registered yet.
    ///
    /// Returns `true` if the entry was inserted. An existing entry is left
    /// untouched.
    pub fn upsert(&self, uid: ControllerUid, handle: DeviceHandle<D>) -> bool {
        let mut map = self.inner.write();

        if map.contains_key(uid.as_str()) {
            return false;
        }

        map.insert(uid, handle);
        true
    }

    /// Erase the entry for `uid`, returning its handle.
    pub fn remove(&self, uid: &str) -> Option<DeviceHandle<D>> {
        // Keep the remaining entries in insertion order
        self.inner.write().shift_remove(uid)
    }

    pub fn find(&self, uid: &str) -> Option<DeviceHandle<D>> {
        self.inner.read().get(uid).cloned()
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.inner.read().contains_key(uid)
    }

    pub fn count(&self) -> usize {
        self.inner.read().len()
    }

    /// Up to `capacity` entries in insertion order, or the total count when
    /// `capacity` is zero.
    pub fn list(&self, capacity: usize) -> Listing<(ControllerUid, DeviceHandle<D>)> {
        let map = self.inner.read();

        if capacity == 0 {
            return Listing::Count(map.len());
        }

        let entries: Vec<_> = map
            .iter()
            .take(capacity)
            .map(|(uid, handle)| (uid.clone(), handle.clone()))
            .collect();
        assert!(entries.len() <= capacity);

        Listing::Entries(entries)
    }

    /// Forget every entry. Used on shutdown.
    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

impl<D: ?Sized> Default for KeyedRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}
