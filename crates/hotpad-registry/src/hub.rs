//! Controller hub lifecycle.
//!
//! The hub owns one registry, tracker and discovery per device family plus
//! the notification bus shared by both families. Nothing is global: every
//! hub is independent and tears its services down on [`shutdown`] or drop.
//!
//! # Lifecycle
//!
//! 1. Create the hub with [`ControllerHub::new`]
//! 2. Register listeners that must see the initial devices
//! 3. Call [`start`] to subscribe to the backends and run the initial scan
//! 4. Query through [`gamepads`] and [`raw_controllers`]
//! 5. Call [`shutdown`] (or drop the hub)
//!
//! [`shutdown`]: ControllerHub::shutdown
//! [`start`]: ControllerHub::start
//! [`gamepads`]: ControllerHub::gamepads
//! [`raw_controllers`]: ControllerHub::raw_controllers

use crate::bus::{Listener, ListenerToken, NotificationBus};
use crate::config::HubConfig;
use crate::discovery::{Discovery, GamepadTracker, RawControllerTracker, ScanReport};
use crate::error::{HubError, Result};
use crate::gamepads::Gamepads;
use crate::keyed::KeyedRegistry;
use crate::raw::RawControllers;
use crate::slot::SlotRegistry;
use hotpad_core::ControllerEvent;
use hotpad_hardware::{GamepadBackend, GamepadDevice, RawControllerBackend, RawControllerDevice};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// Name of the thread running the initial scan.
pub const DISCOVERY_THREAD_NAME: &str = "hotpad-discovery";

/// Platform backends, one per device family.
#[derive(Clone)]
pub struct Backends {
    pub gamepads: Arc<GamepadBackend>,
    pub raw_controllers: Arc<RawControllerBackend>,
}

impl fmt::Debug for Backends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backends").finish_non_exhaustive()
    }
}

/// Owner of every registry service.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use hotpad_hardware::mock::{MockBackend, MockGamepad};
/// use hotpad_hardware::{GamepadDevice, RawControllerDevice};
/// use hotpad_registry::{Backends, ControllerHub, HubConfig};
///
/// let gamepads: MockBackend<dyn GamepadDevice> = MockBackend::new();
/// let raw: MockBackend<dyn RawControllerDevice> = MockBackend::new();
///
/// let (pad, _control) = MockGamepad::new();
/// gamepads.attach(Arc::new(pad));
///
/// let hub = ControllerHub::new(
///     HubConfig::default(),
///     Backends {
///         gamepads: Arc::new(gamepads),
///         raw_controllers: Arc::new(raw),
///     },
/// );
///
/// hub.add_listener(|event| println!("{event}"));
/// hub.start().unwrap();
/// hub.wait_for_initial_scan();
///
/// assert_eq!(hub.gamepads().count(), 1);
/// hub.shutdown();
/// assert_eq!(hub.gamepads().count(), 0);
/// ```
pub struct ControllerHub {
    config: HubConfig,
    bus: Arc<NotificationBus>,
    gamepad_registry: Arc<SlotRegistry<dyn GamepadDevice>>,
    raw_registry: Arc<KeyedRegistry<dyn RawControllerDevice>>,
    gamepad_discovery: Option<Arc<Discovery<GamepadTracker>>>,
    raw_discovery: Option<Arc<Discovery<RawControllerTracker>>>,
    scan_thread: Mutex<Option<JoinHandle<ScanReport>>>,
    initial_scan: Mutex<Option<ScanReport>>,
    lifecycle: Mutex<()>,
    started: AtomicBool,
    shut_down: AtomicBool,
}

impl ControllerHub {
    /// Build every service for the enabled device families.
    ///
    /// Nothing talks to the backends until [`start`](Self::start).
    pub fn new(config: HubConfig, backends: Backends) -> Self {
        let bus = Arc::new(NotificationBus::new());
        let gamepad_registry = Arc::new(SlotRegistry::new());
        let raw_registry = Arc::new(KeyedRegistry::new());

        let gamepad_discovery = config.gamepads_enabled.then(|| {
            Arc::new(Discovery::new(
                GamepadTracker::new(gamepad_registry.clone(), bus.clone()),
                backends.gamepads.clone(),
            ))
        });

        let raw_discovery = config.raw_controllers_enabled.then(|| {
            Arc::new(Discovery::new(
                RawControllerTracker::new(raw_registry.clone(), bus.clone()),
                backends.raw_controllers.clone(),
            ))
        });

        Self {
            config,
            bus,
            gamepad_registry,
            raw_registry,
            gamepad_discovery,
            raw_discovery,
            scan_thread: Mutex::new(None),
            initial_scan: Mutex::new(None),
            lifecycle: Mutex::new(()),
            started: AtomicBool::new(false),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Subscribe to backend notifications and run the initial scan.
    ///
    /// With `background_scan` the scan runs on the
    /// [`DISCOVERY_THREAD_NAME`] thread; use
    /// [`wait_for_initial_scan`](Self::wait_for_initial_scan) to block until
    /// it has finished. Calling `start` again does nothing once it has
    /// succeeded. A failed start drops every subscription it made, so it
    /// can be retried.
    ///
    /// # Errors
    ///
    /// Fails if the hub was shut down, a backend refuses the subscription,
    /// or the discovery thread cannot be spawned.
    pub fn start(&self) -> Result<()> {
        let _lifecycle = self.lifecycle.lock();
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(HubError::ShutDown);
        }
        if self.started.load(Ordering::SeqCst) {
            return Ok(());
        }

        if let Err(e) = self.launch() {
            warn!(error = %e, "Controller hub failed to start, unsubscribing");
            self.stop_discovery();
            return Err(e);
        }

        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn launch(&self) -> Result<()> {
        // Subscribe first so arrivals during the scan are not lost
        if let Some(discovery) = &self.gamepad_discovery {
            discovery.start()?;
        }
        if let Some(discovery) = &self.raw_discovery {
            discovery.start()?;
        }

        if !self.config.scan_on_start {
            info!("Controller hub started without initial scan");
            return Ok(());
        }

        if self.config.background_scan {
            let gamepads = self.gamepad_discovery.clone();
            let raw = self.raw_discovery.clone();

            let handle = thread::Builder::new()
                .name(DISCOVERY_THREAD_NAME.to_string())
                .spawn(move || scan_all(gamepads.as_deref(), raw.as_deref()))?;

            *self.scan_thread.lock() = Some(handle);
            info!("Controller hub started, initial scan running in background");
        } else {
            let report = scan_all(self.gamepad_discovery.as_deref(), self.raw_discovery.as_deref());
            *self.initial_scan.lock() = Some(report);
            info!(
                added = report.added,
                skipped = report.skipped,
                "Controller hub started"
            );
        }

        Ok(())
    }

    fn stop_discovery(&self) {
        if let Some(discovery) = &self.gamepad_discovery {
            discovery.stop();
        }
        if let Some(discovery) = &self.raw_discovery {
            discovery.stop();
        }
    }

    /// Block until the initial scan has finished and return its report.
    ///
    /// Returns an empty report when no initial scan was requested.
    pub fn wait_for_initial_scan(&self) -> ScanReport {
        let handle = self.scan_thread.lock().take();

        if let Some(handle) = handle {
            let report = handle.join().unwrap_or_else(|_| {
                warn!("Discovery thread panicked during initial scan");
                ScanReport::default()
            });
            *self.initial_scan.lock() = Some(report);
        }

        self.initial_scan.lock().unwrap_or_default()
    }

    /// Enumerate every enabled family again on the calling thread.
    ///
    /// Devices already registered are left alone, so this only picks up
    /// devices whose arrival notification was missed. Must not be called
    /// from inside a listener: the family being notified is still locked.
    pub fn rescan(&self) -> ScanReport {
        if self.shut_down.load(Ordering::SeqCst) {
            return ScanReport::default();
        }
        scan_all(self.gamepad_discovery.as_deref(), self.raw_discovery.as_deref())
    }

    /// Register a listener for add/remove events of every family.
    pub fn add_listener<F>(&self, listener: F) -> ListenerToken
    where
        F: Fn(&ControllerEvent) + Send + Sync + 'static,
    {
        self.bus.register(listener)
    }

    /// Register a shared listener. Registering the same `Arc` twice
    /// returns the original token.
    pub fn add_shared_listener(&self, listener: Listener) -> ListenerToken {
        self.bus.register_shared(listener)
    }

    /// Returns `false` if the token was not registered.
    pub fn remove_listener(&self, token: ListenerToken) -> bool {
        self.bus.unregister(token)
    }

    pub fn gamepads(&self) -> Gamepads {
        Gamepads::new(self.gamepad_registry.clone())
    }

    pub fn raw_controllers(&self) -> RawControllers {
        RawControllers::new(self.raw_registry.clone())
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::SeqCst) && !self.shut_down.load(Ordering::SeqCst)
    }

    /// Stop discovery and drop every registered device and listener.
    ///
    /// Waits for a running initial scan first. Calling `shutdown` more than
    /// once is harmless.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }

        self.wait_for_initial_scan();
        self.stop_discovery();

        self.bus.clear();
        self.gamepad_registry.clear();
        self.raw_registry.clear();

        info!("Controller hub shut down");
    }
}

impl Drop for ControllerHub {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for ControllerHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerHub")
            .field("config", &self.config)
            .field("gamepad_slots", &self.gamepad_registry.count())
            .field("raw_controllers", &self.raw_registry.count())
            .field("listeners", &self.bus.len())
            .field("running", &self.is_running())
            .finish()
    }
}

fn scan_all(
    gamepads: Option<&Discovery<GamepadTracker>>,
    raw: Option<&Discovery<RawControllerTracker>>,
) -> ScanReport {
    let mut report = ScanReport::default();

    if let Some(discovery) = gamepads {
        report += discovery.scan();
    }
    if let Some(discovery) = raw {
        report += discovery.scan();
    }

    report
}
