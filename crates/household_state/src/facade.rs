//! Typed per-entity cache wrappers with TTL policy and device-storage mirroring.
//!
//! The selected child and its index are mirrored to device storage so a restarted process
//! warm-starts with the same selection. The in-memory store stays authoritative: device writes
//! are best-effort and a failed write is only logged.

use std::rc::Rc;

use household_host::{load_item_with, save_item_with, DeviceStorage};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    config::CachePolicy,
    keys::CacheKey,
    model::{
        ChildRef, ChildSelection, DictionaryItem, RewardRecord, TaskRecord, TemplateRecord,
        UserProfile,
    },
    store::ExpiringStore,
};

/// Domain-level view over an [`ExpiringStore`].
pub struct DomainCache {
    store: Rc<ExpiringStore>,
    device: Rc<dyn DeviceStorage>,
    policy: CachePolicy,
}

impl DomainCache {
    /// Creates a facade over `store`, mirroring persisted keys into `device`.
    pub fn new(
        store: Rc<ExpiringStore>,
        device: Rc<dyn DeviceStorage>,
        policy: CachePolicy,
    ) -> Self {
        Self {
            store,
            device,
            policy,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Rc<ExpiringStore> {
        &self.store
    }

    /// Returns the TTL policy.
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Writes `value` under `key` with the key's TTL, mirroring persisted keys to device storage.
    pub fn write<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T) {
        let storage_key = key.storage_key();
        let encoded = match serde_json::to_value(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                leptos::logging::warn!("cache write `{storage_key}` encode failed: {err}");
                return;
            }
        };

        self.store
            .set(&storage_key, encoded.clone(), key.ttl_ms(&self.policy));
        if key.is_persisted() {
            if let Err(err) = save_item_with(&*self.device, &storage_key, &encoded) {
                leptos::logging::warn!("device storage write `{storage_key}` failed: {err}");
            }
        }
    }

    /// Reads `key`, falling back to device storage for persisted keys.
    ///
    /// A device-storage hit repopulates the store with the key's TTL. A live `null` entry in
    /// the store is an explicit "nothing selected" and never falls through.
    pub fn read<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let storage_key = key.storage_key();
        match self.store.get(&storage_key) {
            Some(Value::Null) => return None,
            Some(value) => return decode(&storage_key, value),
            None if !key.is_persisted() => return None,
            None => {}
        }

        let stored = match load_item_with::<_, Value>(&*self.device, &storage_key) {
            Ok(Some(stored)) if !stored.is_null() => stored,
            Ok(_) => return None,
            Err(err) => {
                leptos::logging::warn!("device storage read `{storage_key}` failed: {err}");
                return None;
            }
        };
        let decoded = decode(&storage_key, stored.clone())?;
        self.store
            .set(&storage_key, stored, key.ttl_ms(&self.policy));
        Some(decoded)
    }

    /// Returns whether `key` holds a live in-memory entry.
    pub fn has_valid(&self, key: &CacheKey) -> bool {
        self.store.has_valid_cache(&key.storage_key())
    }

    /// Drops `key` from the store. Device storage is left untouched.
    pub fn invalidate(&self, key: &CacheKey) {
        self.store.delete(&key.storage_key());
    }

    /// Returns the cached user profile.
    pub fn user_info(&self) -> Option<UserProfile> {
        self.read(&CacheKey::UserInfo)
    }

    /// Caches the user profile.
    pub fn set_user_info(&self, profile: &UserProfile) {
        self.write(&CacheKey::UserInfo, profile);
    }

    /// Returns the cached children list.
    pub fn children_list(&self) -> Option<Vec<ChildRef>> {
        self.read(&CacheKey::ChildrenList)
    }

    /// Caches the children list without touching the selection.
    pub fn set_children_list(&self, children: &[ChildRef]) {
        self.write(&CacheKey::ChildrenList, children);
    }

    /// Returns the selected child.
    pub fn current_child(&self) -> Option<ChildRef> {
        self.read(&CacheKey::CurrentChild)
    }

    /// Stores the selected child; `None` records an explicit empty selection.
    pub fn set_current_child(&self, child: Option<&ChildRef>) {
        self.write(&CacheKey::CurrentChild, &child);
    }

    /// Returns the selected child's index, `0` when unknown.
    pub fn current_child_index(&self) -> usize {
        self.read(&CacheKey::CurrentChildIndex).unwrap_or(0)
    }

    /// Stores the selected child's index.
    pub fn set_current_child_index(&self, index: usize) {
        self.write(&CacheKey::CurrentChildIndex, &index);
    }

    /// Returns the selected child and index together.
    pub fn selection(&self) -> ChildSelection {
        ChildSelection {
            current_child: self.current_child(),
            current_child_index: self.current_child_index(),
        }
    }

    /// Stores child, index, and children list in that order.
    pub fn write_selection(&self, selection: &ChildSelection, children: &[ChildRef]) {
        self.set_current_child(selection.current_child.as_ref());
        self.set_current_child_index(selection.current_child_index);
        self.set_children_list(children);
    }

    /// Stores a freshly loaded children list and repairs the selection against it.
    ///
    /// A selected child missing from a non-empty list resets the selection to the first child;
    /// an empty list clears it. A still-present child keeps its stored index.
    pub fn set_global_children_list(&self, children: &[ChildRef]) -> ChildSelection {
        self.set_children_list(children);

        let Some(first) = children.first() else {
            self.set_current_child(None);
            self.set_current_child_index(0);
            return ChildSelection::default();
        };

        let current = self.current_child();
        let still_present = current
            .as_ref()
            .is_some_and(|current| children.iter().any(|child| child.id == current.id));
        if still_present {
            return ChildSelection {
                current_child: current,
                current_child_index: self.current_child_index(),
            };
        }

        self.set_current_child(Some(first));
        self.set_current_child_index(0);
        ChildSelection {
            current_child: Some(first.clone()),
            current_child_index: 0,
        }
    }

    /// Forgets the selection and children list in memory and on the device.
    pub fn clear_child_cache(&self) {
        self.invalidate(&CacheKey::CurrentChild);
        self.invalidate(&CacheKey::CurrentChildIndex);
        self.invalidate(&CacheKey::ChildrenList);
        for key in [CacheKey::CurrentChild, CacheKey::CurrentChildIndex] {
            if let Err(err) = self.device.remove_item(&key.storage_key()) {
                leptos::logging::warn!("device storage remove `{key}` failed: {err}");
            }
        }
    }

    /// Returns the cached task list of the selected child.
    pub fn task_list(&self) -> Option<Vec<TaskRecord>> {
        self.read(&CacheKey::TaskList)
    }

    /// Caches the task list.
    pub fn set_task_list(&self, tasks: &[TaskRecord]) {
        self.write(&CacheKey::TaskList, tasks);
    }

    /// Returns the cached reward list.
    pub fn reward_list(&self) -> Option<Vec<RewardRecord>> {
        self.read(&CacheKey::RewardList)
    }

    /// Caches the reward list.
    pub fn set_reward_list(&self, rewards: &[RewardRecord]) {
        self.write(&CacheKey::RewardList, rewards);
    }

    /// Returns the cached items of a dictionary category.
    pub fn dictionary(&self, category: &str) -> Option<Vec<DictionaryItem>> {
        self.read(&CacheKey::Dictionary(category.to_string()))
    }

    /// Caches the items of a dictionary category.
    pub fn set_dictionary(&self, category: &str, items: &[DictionaryItem]) {
        self.write(&CacheKey::Dictionary(category.to_string()), items);
    }

    /// Returns the cached templates of one type.
    pub fn templates(&self, kind: &str) -> Option<Vec<TemplateRecord>> {
        self.read(&CacheKey::Templates(kind.to_string()))
    }

    /// Caches the templates of one type.
    pub fn set_templates(&self, kind: &str, templates: &[TemplateRecord]) {
        self.write(&CacheKey::Templates(kind.to_string()), templates);
    }
}

fn decode<T: DeserializeOwned>(storage_key: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            leptos::logging::warn!("cache entry `{storage_key}` decode failed: {err}");
            None
        }
    }
}
