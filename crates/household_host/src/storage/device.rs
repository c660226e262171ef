//! On-device key/value storage contracts and adapters.
//!
//! Device storage is a warm-start hint for the in-memory cache, so every operation is
//! synchronous and best-effort: callers log failures and carry on.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use serde::{de::DeserializeOwned, Serialize};

/// Host service for synchronous JSON-text storage that survives process restarts.
pub trait DeviceStorage {
    /// Reads the raw JSON string stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>, String>;

    /// Stores a raw JSON string under `key`, replacing any previous value.
    fn set_item(&self, key: &str, raw_json: &str) -> Result<(), String>;

    /// Removes `key`. Removing an absent key succeeds.
    fn remove_item(&self, key: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op device storage for hosts without persistent storage.
pub struct NoopDeviceStorage;

impl DeviceStorage for NoopDeviceStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, String> {
        Ok(None)
    }

    fn set_item(&self, _key: &str, _raw_json: &str) -> Result<(), String> {
        Ok(())
    }

    fn remove_item(&self, _key: &str) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory device storage keyed by string.
///
/// Clones share the same map, which lets tests simulate a process restart by building a fresh
/// cache over a clone of the storage. Writes can be made to fail with
/// [`MemoryDeviceStorage::fail_writes`].
pub struct MemoryDeviceStorage {
    inner: Rc<RefCell<HashMap<String, String>>>,
    fail_writes: Rc<RefCell<bool>>,
}

impl MemoryDeviceStorage {
    /// Makes subsequent `set_item`/`remove_item` calls fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.borrow_mut() = fail;
    }

    /// Returns the raw stored text for `key`, bypassing the trait.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key).cloned()
    }

    /// Returns the stored keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = self.inner.borrow().keys().cloned().collect::<Vec<_>>();
        keys.sort();
        keys
    }
}

impl DeviceStorage for MemoryDeviceStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.inner.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, raw_json: &str) -> Result<(), String> {
        if *self.fail_writes.borrow() {
            return Err(format!("device storage write rejected for `{key}`"));
        }
        self.inner
            .borrow_mut()
            .insert(key.to_string(), raw_json.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), String> {
        if *self.fail_writes.borrow() {
            return Err(format!("device storage remove rejected for `{key}`"));
        }
        self.inner.borrow_mut().remove(key);
        Ok(())
    }
}

/// Reads and deserializes a typed value through a [`DeviceStorage`] implementation.
///
/// # Errors
///
/// Returns an error when the storage read or JSON deserialization fails.
pub fn load_item_with<S: DeviceStorage + ?Sized, T: DeserializeOwned>(
    storage: &S,
    key: &str,
) -> Result<Option<T>, String> {
    let Some(raw) = storage.get_item(key)? else {
        return Ok(None);
    };
    let value = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
    Ok(Some(value))
}

/// Serializes and stores a typed value through a [`DeviceStorage`] implementation.
///
/// # Errors
///
/// Returns an error when serialization or the storage write fails.
pub fn save_item_with<S: DeviceStorage + ?Sized, T: Serialize + ?Sized>(
    storage: &S,
    key: &str,
    value: &T,
) -> Result<(), String> {
    let raw = serde_json::to_string(value).map_err(|e| e.to_string())?;
    storage.set_item(key, &raw)
}
