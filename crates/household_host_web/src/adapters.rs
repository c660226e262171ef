//! Compile-time host-strategy selection and adapter factories for runtime wiring.

use std::rc::Rc;

use household_host::{
    DeviceStorage, HostServices, HostStrategy, NoopDeviceStorage, NoopToastService,
    RemoteService, SystemClock, ToastService,
};

use crate::{WebDeviceStorage, WebToastService};

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(feature = "host-detached")]
    {
        HostStrategy::Detached
    }

    #[cfg(not(feature = "host-detached"))]
    {
        HostStrategy::Browser
    }
}

/// Adapter enum that erases the concrete device storage backend.
#[derive(Debug, Clone, Copy)]
pub enum DeviceStorageAdapter {
    /// `localStorage`-backed persistence.
    Browser(WebDeviceStorage),
    /// No-op fallback.
    Detached(NoopDeviceStorage),
}

impl DeviceStorage for DeviceStorageAdapter {
    fn get_item(&self, key: &str) -> Result<Option<String>, String> {
        match self {
            Self::Browser(storage) => storage.get_item(key),
            Self::Detached(storage) => storage.get_item(key),
        }
    }

    fn set_item(&self, key: &str, raw_json: &str) -> Result<(), String> {
        match self {
            Self::Browser(storage) => storage.set_item(key, raw_json),
            Self::Detached(storage) => storage.set_item(key, raw_json),
        }
    }

    fn remove_item(&self, key: &str) -> Result<(), String> {
        match self {
            Self::Browser(storage) => storage.remove_item(key),
            Self::Detached(storage) => storage.remove_item(key),
        }
    }
}

/// Adapter enum that erases the concrete toast backend.
#[derive(Debug, Clone, Copy)]
pub enum ToastServiceAdapter {
    /// Web Notifications-backed toasts.
    Browser(WebToastService),
    /// Toasts are dropped.
    Detached(NoopToastService),
}

impl ToastService for ToastServiceAdapter {
    fn show(&self, toast: household_host::Toast) {
        match self {
            Self::Browser(service) => service.show(toast),
            Self::Detached(service) => service.show(toast),
        }
    }
}

/// Builds the device storage adapter for the selected strategy.
pub fn device_storage() -> DeviceStorageAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => DeviceStorageAdapter::Browser(WebDeviceStorage),
        HostStrategy::Native | HostStrategy::Detached => {
            DeviceStorageAdapter::Detached(NoopDeviceStorage)
        }
    }
}

/// Builds the toast adapter for the selected strategy.
pub fn toast_service() -> ToastServiceAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => ToastServiceAdapter::Browser(WebToastService),
        HostStrategy::Native | HostStrategy::Detached => {
            ToastServiceAdapter::Detached(NoopToastService)
        }
    }
}

/// Assembles the browser host bundle around the platform-provided remote transport.
pub fn build_host_services(remote: Rc<dyn RemoteService>) -> HostServices {
    HostServices {
        device_storage: Rc::new(device_storage()),
        remote,
        toasts: Rc::new(toast_service()),
        clock: Rc::new(SystemClock),
        host_strategy: selected_host_strategy(),
    }
}
