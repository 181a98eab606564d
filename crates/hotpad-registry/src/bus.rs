//! Listener registration and event fan-out.
//!
//! The bus keeps two locks: a list lock guarding the registered listeners
//! and a dispatch lock serializing fan-out. The list lock is only held long
//! enough to copy the listener list, so a listener may register or
//! unregister listeners while it is being called. Changes take effect for
//! the next event.
//!
//! The dispatch lock is reentrant. An event fired from inside a listener on
//! the dispatching thread is queued and delivered once the current event
//! has reached every listener, so nested fan-out never interleaves.
//!
//! Neither lock is ever taken while a registry lock is held.

use hotpad_core::ControllerEvent;
use parking_lot::{Mutex, ReentrantMutex};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Shared listener callback.
pub type Listener = Arc<dyn Fn(&ControllerEvent) + Send + Sync>;

/// Opaque handle identifying a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerToken(u64);

/// Ordered listener list with serialized fan-out.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use hotpad_core::ControllerEvent;
/// use hotpad_registry::bus::NotificationBus;
///
/// let bus = NotificationBus::new();
/// let seen = Arc::new(AtomicUsize::new(0));
///
/// let counter = seen.clone();
/// let token = bus.register(move |_event: &ControllerEvent| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// bus.fire(&ControllerEvent::gamepad_added(0));
/// assert!(bus.unregister(token));
/// bus.fire(&ControllerEvent::gamepad_removed(0));
///
/// assert_eq!(seen.load(Ordering::SeqCst), 1);
/// ```
pub struct NotificationBus {
    listeners: Mutex<Vec<(ListenerToken, Listener)>>,
    dispatch: ReentrantMutex<RefCell<Dispatch>>,
    next_token: AtomicU64,
}

#[derive(Default)]
struct Dispatch {
    active: bool,
    pending: VecDeque<ControllerEvent>,
}

// Clears the dispatch state even if a listener panics
struct ActiveDispatch<'a>(&'a RefCell<Dispatch>);

impl Drop for ActiveDispatch<'_> {
    fn drop(&mut self) {
        let mut dispatch = self.0.borrow_mut();
        dispatch.active = false;
        dispatch.pending.clear();
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            dispatch: ReentrantMutex::new(RefCell::new(Dispatch::default())),
            next_token: AtomicU64::new(0),
        }
    }

    /// Append a listener.
    pub fn register<F>(&self, listener: F) -> ListenerToken
    where
        F: Fn(&ControllerEvent) + Send + Sync + 'static,
    {
        let token = self.allocate_token();
        self.listeners.lock().push((token, Arc::new(listener)));
        token
    }

    /// Append a shared listener unless the same `Arc` is already registered.
    ///
    /// Registering the same listener twice returns the original token.
    pub fn register_shared(&self, listener: Listener) -> ListenerToken {
        let mut listeners = self.listeners.lock();

        if let Some((token, _)) = listeners
            .iter()
            .find(|(_, registered)| Arc::ptr_eq(registered, &listener))
        {
            return *token;
        }

        let token = self.allocate_token();
        listeners.push((token, listener));
        token
    }

    /// Remove the listener registered under `token`.
    ///
    /// Returns `false` if no such listener exists.
    pub fn unregister(&self, token: ListenerToken) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != token);
        listeners.len() != before
    }

    /// Call every listener with `event`, in registration order.
    ///
    /// Concurrent calls are serialized, so every listener observes events in
    /// one global order. A call made from inside a listener returns at once;
    /// its event is delivered after the event currently being dispatched.
    pub fn fire(&self, event: &ControllerEvent) {
        let dispatch = self.dispatch.lock();

        {
            let mut state = dispatch.borrow_mut();
            if state.active {
                trace!(%event, "Deferring controller event fired during dispatch");
                state.pending.push_back(event.clone());
                return;
            }
            state.active = true;
        }
        let _active = ActiveDispatch(&dispatch);

        self.deliver(event);
        loop {
            let next = dispatch.borrow_mut().pending.pop_front();
            match next {
                Some(event) => self.deliver(&event),
                None => break,
            }
        }
    }

    fn deliver(&self, event: &ControllerEvent) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        trace!(%event, listeners = listeners.len(), "Dispatching controller event");

        for listener in listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }

    /// Drop every listener.
    pub fn clear(&self) {
        self.listeners.lock().clear();
    }

    fn allocate_token(&self) -> ListenerToken {
        ListenerToken(self.next_token.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn recorder(bus: &NotificationBus, name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> ListenerToken {
        let log = log.clone();
        bus.register(move |event| log.lock().push(format!("{name}: {event}")))
    }

    #[test]
    fn test_fire_in_registration_order() {
        let bus = NotificationBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        recorder(&bus, "first", &log);
        recorder(&bus, "second", &log);

        bus.fire(&ControllerEvent::gamepad_added(2));

        assert_eq!(
            *log.lock(),
            vec!["first: Gamepad #2 Added", "second: Gamepad #2 Added"]
        );
    }

    #[test]
    fn test_unregister() {
        let bus = NotificationBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let token = recorder(&bus, "gone", &log);
        assert_eq!(bus.len(), 1);

        assert!(bus.unregister(token));
        assert!(!bus.unregister(token));
        assert!(bus.is_empty());

        bus.fire(&ControllerEvent::gamepad_added(0));
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_register_shared_dedups_by_identity() {
        let bus = NotificationBus::new();
        let listener: Listener = Arc::new(|_event: &ControllerEvent| {});

        let first = bus.register_shared(listener.clone());
        let second = bus.register_shared(listener);
        assert_eq!(first, second);
        assert_eq!(bus.len(), 1);

        // Same behavior, different closure: a new listener
        let other: Listener = Arc::new(|_event: &ControllerEvent| {});
        assert_ne!(bus.register_shared(other), first);
        assert_eq!(bus.len(), 2);
    }

    #[test]
    fn test_plain_registrations_never_dedup() {
        let bus = NotificationBus::new();

        let a = bus.register(|_event: &ControllerEvent| {});
        let b = bus.register(|_event: &ControllerEvent| {});

        assert_ne!(a, b);
        assert_eq!(bus.len(), 2);
    }

    #[test]
    fn test_listener_can_reenter_bus() {
        let bus = Arc::new(NotificationBus::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let inner_bus = Arc::downgrade(&bus);
        let inner_log = log.clone();
        let token = bus.register(move |_event| {
            if let Some(bus) = inner_bus.upgrade() {
                let log = inner_log.clone();
                bus.register(move |event| log.lock().push(event.to_string()));
            }
        });

        bus.fire(&ControllerEvent::gamepad_added(0));
        assert_eq!(bus.len(), 2);
        // Registered during fan-out: not called for the same event
        assert!(log.lock().is_empty());

        bus.unregister(token);
        bus.fire(&ControllerEvent::gamepad_removed(0));
        assert_eq!(*log.lock(), vec!["Gamepad #0 Removed"]);
    }

    #[test]
    fn test_nested_fire_is_delivered_after_current_event() {
        let bus = Arc::new(NotificationBus::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let inner_bus = Arc::downgrade(&bus);
        bus.register(move |event| {
            if *event != ControllerEvent::gamepad_added(0) {
                return;
            }
            if let Some(bus) = inner_bus.upgrade() {
                bus.fire(&ControllerEvent::gamepad_added(1));
            }
        });
        recorder(&bus, "after", &log);

        bus.fire(&ControllerEvent::gamepad_added(0));

        assert_eq!(
            *log.lock(),
            vec!["after: Gamepad #0 Added", "after: Gamepad #1 Added"]
        );

        // Dispatch state is reset for the next top-level event
        bus.fire(&ControllerEvent::gamepad_removed(1));
        assert_eq!(log.lock().len(), 3);
    }

    #[test]
    fn test_concurrent_fire_is_serialized() {
        let bus = Arc::new(NotificationBus::new());
        let in_flight = Arc::new(AtomicU64::new(0));
        let overlaps = Arc::new(AtomicU64::new(0));

        let (active, overlapped) = (in_flight.clone(), overlaps.clone());
        bus.register(move |_event| {
            if active.fetch_add(1, Ordering::SeqCst) != 0 {
                overlapped.fetch_add(1, Ordering::SeqCst);
            }
            thread::yield_now();
            active.fetch_sub(1, Ordering::SeqCst);
        });

        let workers: Vec<_> = (0..8)
            .map(|n| {
                let bus = bus.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        bus.fire(&ControllerEvent::gamepad_added(n));
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clear() {
        let bus = NotificationBus::new();
        bus.register(|_event: &ControllerEvent| {});
        bus.clear();
        assert!(bus.is_empty());
    }
}
