//! Device storage contracts and lightweight adapters.

pub mod device;

pub use device::{
    load_item_with, save_item_with, DeviceStorage, MemoryDeviceStorage, NoopDeviceStorage,
};
