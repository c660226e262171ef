//! Browser (`wasm32`) implementations of [`household_host`] service contracts.
//!
//! Off-wasm the adapters degrade to inert behaviour so the crate still builds and tests on
//! native targets.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod adapters;
pub mod storage;
pub mod toast;

pub use adapters::{
    build_host_services, device_storage, selected_host_strategy, toast_service,
    DeviceStorageAdapter, ToastServiceAdapter,
};
pub use storage::local_storage::WebDeviceStorage;
pub use toast::WebToastService;
