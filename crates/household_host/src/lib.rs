//! Typed host-domain contracts shared by the household state layer and its adapters.
//!
//! This crate is the API-first boundary for platform services: on-device storage, the
//! serverless call contract, toast feedback, and the clock. Concrete browser adapters live in
//! `household_host_web`; every contract also ships `Noop*` and `Memory*` adapters for tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod host;
pub mod remote;
pub mod storage;
pub mod time;
pub mod toast;

pub use host::{HostServices, HostStrategy};
pub use remote::{
    CallRequest, CallResponse, MemoryRemoteService, NoopRemoteService, RecordedCall, RemoteError,
    RemoteFuture, RemoteService, CODE_FAILED, CODE_OK,
};
pub use storage::{
    load_item_with, save_item_with, DeviceStorage, MemoryDeviceStorage, NoopDeviceStorage,
};
pub use time::{unix_time_ms_now, Clock, ManualClock, SystemClock};
pub use toast::{MemoryToastService, NoopToastService, Toast, ToastIcon, ToastService};
