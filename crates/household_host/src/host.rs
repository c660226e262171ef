//! Host service bundle injected into the household state context.

use std::rc::Rc;

use crate::{
    Clock, DeviceStorage, NoopDeviceStorage, NoopRemoteService, NoopToastService, RemoteService,
    SystemClock, ToastService,
};

/// Stable host strategy selected for the current build/runtime composition path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Browser-backed composition (`localStorage`, console toasts).
    Browser,
    /// Native composition, typically tests or tooling.
    Native,
    /// Composition with no-op adapters only.
    Detached,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Native => "native",
            Self::Detached => "detached",
        }
    }
}

/// Runtime-selected host service bundle.
///
/// All environment-specific adapter selection happens before this bundle crosses into
/// `household_state`, which keeps the cache layer independent of browser APIs.
#[derive(Clone)]
pub struct HostServices {
    /// Persistent device storage used for warm-start hints.
    pub device_storage: Rc<dyn DeviceStorage>,
    /// Serverless function transport.
    pub remote: Rc<dyn RemoteService>,
    /// User-visible toast feedback.
    pub toasts: Rc<dyn ToastService>,
    /// Time source for expiry decisions.
    pub clock: Rc<dyn Clock>,
    /// Strategy identifier for diagnostics.
    pub host_strategy: HostStrategy,
}

impl HostServices {
    /// Bundle made only of no-op adapters and the system clock.
    pub fn detached() -> Self {
        Self {
            device_storage: Rc::new(NoopDeviceStorage),
            remote: Rc::new(NoopRemoteService),
            toasts: Rc::new(NoopToastService),
            clock: Rc::new(SystemClock),
            host_strategy: HostStrategy::Detached,
        }
    }

    /// Replaces the device storage adapter.
    pub fn with_device_storage(mut self, storage: Rc<dyn DeviceStorage>) -> Self {
        self.device_storage = storage;
        self
    }

    /// Replaces the remote transport.
    pub fn with_remote(mut self, remote: Rc<dyn RemoteService>) -> Self {
        self.remote = remote;
        self
    }

    /// Replaces the toast service.
    pub fn with_toasts(mut self, toasts: Rc<dyn ToastService>) -> Self {
        self.toasts = toasts;
        self
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the strategy identifier.
    pub fn with_strategy(mut self, host_strategy: HostStrategy) -> Self {
        self.host_strategy = host_strategy;
        self
    }
}
