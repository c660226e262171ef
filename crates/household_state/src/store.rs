//! In-memory key/value store with per-entry expiry and change notifications.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use household_host::Clock;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::notifier::EventNotifier;

/// Event emitted by [`ExpiringStore::clear`].
pub const CACHE_CLEARED_EVENT: &str = "cache:cleared";

/// Returns the event name emitted when `key` is written.
pub fn changed_event(key: &str) -> String {
    format!("{key}:changed")
}

/// Returns the event name emitted when `key` is deleted.
pub fn deleted_event(key: &str) -> String {
    format!("{key}:deleted")
}

#[derive(Debug, Clone, PartialEq)]
/// Cached value and the unix-millisecond instant after which it is stale.
pub struct CacheEntry {
    /// Stored JSON value.
    pub value: Value,
    /// Expiry instant in unix milliseconds.
    pub expires_at_ms: u64,
}

impl CacheEntry {
    /// Returns whether the entry is stale at `now_ms`.
    pub const fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at_ms < now_ms
    }
}

/// String-keyed store whose entries expire after a per-write TTL.
///
/// Reads evict stale entries lazily; [`ExpiringStore::clean_expired_cache`] reclaims entries
/// nobody reads again. Writes, deletes, and clears notify through the shared
/// [`EventNotifier`] after the internal borrow is released, so listeners may call back into
/// the store.
pub struct ExpiringStore {
    entries: RefCell<HashMap<String, CacheEntry>>,
    notifier: Rc<EventNotifier>,
    clock: Rc<dyn Clock>,
    default_ttl_ms: u64,
}

impl ExpiringStore {
    /// Creates an empty store.
    pub fn new(notifier: Rc<EventNotifier>, clock: Rc<dyn Clock>, default_ttl_ms: u64) -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            notifier,
            clock,
            default_ttl_ms,
        }
    }

    /// Returns the notifier this store emits on.
    pub fn notifier(&self) -> &Rc<EventNotifier> {
        &self.notifier
    }

    /// Returns the current instant according to the injected clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Stores `value` under `key` for `ttl_ms`, then emits `"<key>:changed"` with the value.
    pub fn set(&self, key: &str, value: Value, ttl_ms: u64) {
        let expires_at_ms = self.clock.now_ms().saturating_add(ttl_ms);
        self.entries.borrow_mut().insert(
            key.to_string(),
            CacheEntry {
                value: value.clone(),
                expires_at_ms,
            },
        );
        self.notifier.emit(&changed_event(key), &value);
    }

    /// Stores `value` with the configured default TTL.
    pub fn set_with_default_ttl(&self, key: &str, value: Value) {
        self.set(key, value, self.default_ttl_ms);
    }

    /// Returns the live value for `key`, evicting it silently when stale.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now_ms = self.clock.now_ms();
        let mut entries = self.entries.borrow_mut();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now_ms) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    /// Removes `key` and emits `"<key>:deleted"` with the key as payload.
    ///
    /// Deleting an absent key does nothing and emits nothing.
    pub fn delete(&self, key: &str) {
        let removed = self.entries.borrow_mut().remove(key).is_some();
        if removed {
            self.notifier
                .emit(&deleted_event(key), &Value::String(key.to_string()));
        }
    }

    /// Removes every entry and emits [`CACHE_CLEARED_EVENT`].
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
        self.notifier.emit(CACHE_CLEARED_EVENT, &Value::Null);
    }

    /// Removes every stale entry and returns how many were removed.
    pub fn clean_expired_cache(&self) -> usize {
        let now_ms = self.clock.now_ms();
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now_ms));
        before - entries.len()
    }

    /// Returns whether `key` holds a live entry. Never evicts.
    pub fn has_valid_cache(&self, key: &str) -> bool {
        let now_ms = self.clock.now_ms();
        self.entries
            .borrow()
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now_ms))
    }

    /// Returns every stored key, live or stale, in sorted order.
    pub fn cache_keys(&self) -> Vec<String> {
        let mut keys = self.entries.borrow().keys().cloned().collect::<Vec<_>>();
        keys.sort();
        keys
    }

    /// Returns the number of stored entries, including stale ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns whether no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Reads and decodes `key`. `null` values and decode failures are misses.
    pub fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        if value.is_null() {
            return None;
        }
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                leptos::logging::warn!("cache entry `{key}` decode failed: {err}");
                None
            }
        }
    }

    /// Encodes and stores `value` under `key`. Encoding failures are logged and skipped.
    pub fn set_typed<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl_ms: u64) {
        match serde_json::to_value(value) {
            Ok(encoded) => self.set(key, encoded, ttl_ms),
            Err(err) => leptos::logging::warn!("cache entry `{key}` encode failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use household_host::ManualClock;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn store_at(start_ms: u64) -> (ExpiringStore, ManualClock, Rc<EventNotifier>) {
        let clock = ManualClock::starting_at(start_ms);
        let notifier = Rc::new(EventNotifier::new());
        let store = ExpiringStore::new(Rc::clone(&notifier), Rc::new(clock.clone()), 300_000);
        (store, clock, notifier)
    }

    fn record_events(notifier: &EventNotifier, events: &[&str]) -> Rc<RefCell<Vec<(String, Value)>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for event in events {
            let log = Rc::clone(&log);
            let name = event.to_string();
            notifier.on(event, move |payload| {
                log.borrow_mut().push((name.clone(), payload.clone()));
                Ok(())
            });
        }
        log
    }

    #[test]
    fn get_returns_value_until_ttl_elapses_then_evicts() {
        let (store, clock, _) = store_at(1_000);
        store.set("taskList", json!([1, 2]), 180_000);

        assert_eq!(store.get("taskList"), Some(json!([1, 2])));
        clock.advance(180_000);
        assert_eq!(store.get("taskList"), Some(json!([1, 2])));

        clock.advance(1);
        assert_eq!(store.get("taskList"), None);
        assert!(!store.has_valid_cache("taskList"));
        assert!(store.is_empty());
    }

    #[test]
    fn set_overwrites_and_emits_changed_with_new_value() {
        let (store, _, notifier) = store_at(0);
        let log = record_events(&notifier, &["userInfo:changed"]);

        store.set("userInfo", json!({"nickName": "a"}), 10);
        store.set("userInfo", json!({"nickName": "b"}), 10);

        assert_eq!(store.get("userInfo"), Some(json!({"nickName": "b"})));
        assert_eq!(
            *log.borrow(),
            vec![
                ("userInfo:changed".to_string(), json!({"nickName": "a"})),
                ("userInfo:changed".to_string(), json!({"nickName": "b"})),
            ]
        );
    }

    #[test]
    fn lazy_eviction_is_silent_and_delete_emits_only_when_present() {
        let (store, clock, notifier) = store_at(0);
        let log = record_events(&notifier, &["rewardList:deleted", "cache:cleared"]);

        store.set("rewardList", json!([]), 5);
        clock.advance(6);
        assert_eq!(store.get("rewardList"), None);
        store.delete("rewardList");
        assert!(log.borrow().is_empty());

        store.set("rewardList", json!([]), 5);
        store.delete("rewardList");
        assert_eq!(
            *log.borrow(),
            vec![("rewardList:deleted".to_string(), json!("rewardList"))]
        );
    }

    #[test]
    fn clear_removes_everything_and_emits_once() {
        let (store, _, notifier) = store_at(0);
        let log = record_events(&notifier, &[CACHE_CLEARED_EVENT]);
        store.set("a", json!(1), 10);
        store.set("b", json!(2), 10);

        store.clear();

        assert!(store.is_empty());
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn sweep_removes_only_stale_entries_and_is_idempotent() {
        let (store, clock, _) = store_at(0);
        store.set("short", json!(1), 10);
        store.set("long", json!(2), 1_000);
        store.set("other", json!(3), 20);
        clock.advance(50);

        assert_eq!(store.clean_expired_cache(), 2);
        assert_eq!(store.clean_expired_cache(), 0);
        assert_eq!(store.cache_keys(), vec!["long".to_string()]);
    }

    #[test]
    fn has_valid_cache_does_not_evict() {
        let (store, clock, _) = store_at(0);
        store.set("k", json!(1), 1);
        clock.advance(2);

        assert!(!store.has_valid_cache("k"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.cache_keys(), vec!["k".to_string()]);
    }

    #[test]
    fn listener_can_read_back_the_value_it_was_notified_about() {
        let (store, _, notifier) = store_at(0);
        let store = Rc::new(store);
        let observed = Rc::new(RefCell::new(None));
        {
            let store_ref = Rc::clone(&store);
            let observed = Rc::clone(&observed);
            notifier.on("childrenList:changed", move |_| {
                *observed.borrow_mut() = store_ref.get("childrenList");
                Ok(())
            });
        }

        store.set("childrenList", json!(["a"]), 10);

        assert_eq!(*observed.borrow(), Some(json!(["a"])));
    }

    #[test]
    fn typed_helpers_treat_null_and_mismatch_as_miss() {
        let (store, _, _) = store_at(0);
        store.set_typed("currentChildIndex", &2_usize, 10);
        assert_eq!(store.get_typed::<usize>("currentChildIndex"), Some(2));

        store.set("currentChild", Value::Null, 10);
        assert_eq!(store.get_typed::<String>("currentChild"), None);

        store.set("currentChildIndex", json!("two"), 10);
        assert_eq!(store.get_typed::<usize>("currentChildIndex"), None);
    }

    #[test]
    fn default_ttl_and_saturating_expiry() {
        let (store, clock, _) = store_at(u64::MAX - 5);
        store.set("forever", json!(true), 100);
        clock.set(u64::MAX);
        assert!(store.has_valid_cache("forever"));

        let (store, clock, _) = store_at(0);
        store.set_with_default_ttl("dflt", json!(1));
        clock.advance(300_000);
        assert!(store.has_valid_cache("dflt"));
        clock.advance(1);
        assert!(!store.has_valid_cache("dflt"));
    }
}
