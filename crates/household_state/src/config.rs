//! Cache TTL and scheduling policy.
//!
//! Every duration is expressed in milliseconds. Missing fields fall back to the defaults so a
//! partial TOML document only overrides what it names.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MINUTE_MS: u64 = 60 * 1000;
const HOUR_MS: u64 = 60 * MINUTE_MS;

#[derive(Debug, Error)]
/// Failures while loading a [`CachePolicy`].
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("cache policy parse failed: {0}")]
    Parse(#[from] toml::de::Error),
    /// A duration that must be positive was zero.
    #[error("cache policy field `{field}` must be greater than zero")]
    ZeroDuration {
        /// Offending field name.
        field: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// TTLs per cached entity plus sweeper and sync timing.
pub struct CachePolicy {
    /// Signed-in user profile.
    pub user_info_ttl_ms: u64,
    /// Children list.
    pub children_list_ttl_ms: u64,
    /// Selected child and its index (persisted to device storage).
    pub current_child_ttl_ms: u64,
    /// Task list of the selected child.
    pub task_list_ttl_ms: u64,
    /// Reward list.
    pub reward_list_ttl_ms: u64,
    /// Dictionary items per category.
    pub dictionary_ttl_ms: u64,
    /// Templates per type.
    pub templates_ttl_ms: u64,
    /// TTL used by [`crate::ExpiringStore::set_with_default_ttl`].
    pub default_ttl_ms: u64,
    /// Interval between expired-entry sweeps.
    pub sweep_interval_ms: u64,
    /// Age after which a page's local task list is refreshed on show.
    pub task_sync_stale_after_ms: u64,
    /// Duration of the "switched to child" toast.
    pub switch_toast_duration_ms: u32,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            user_info_ttl_ms: 10 * MINUTE_MS,
            children_list_ttl_ms: 5 * MINUTE_MS,
            current_child_ttl_ms: HOUR_MS,
            task_list_ttl_ms: 3 * MINUTE_MS,
            reward_list_ttl_ms: 3 * MINUTE_MS,
            dictionary_ttl_ms: 24 * HOUR_MS,
            templates_ttl_ms: HOUR_MS,
            default_ttl_ms: 5 * MINUTE_MS,
            sweep_interval_ms: MINUTE_MS,
            task_sync_stale_after_ms: MINUTE_MS,
            switch_toast_duration_ms: 1000,
        }
    }
}

impl CachePolicy {
    /// Parses and validates a policy from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML and [`ConfigError::ZeroDuration`] when a
    /// TTL or the sweep interval is zero.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let policy: Self = toml::from_str(raw)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Checks that every TTL and the sweep interval are positive.
    ///
    /// # Errors
    ///
    /// Returns the first zero-valued field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("user_info_ttl_ms", self.user_info_ttl_ms),
            ("children_list_ttl_ms", self.children_list_ttl_ms),
            ("current_child_ttl_ms", self.current_child_ttl_ms),
            ("task_list_ttl_ms", self.task_list_ttl_ms),
            ("reward_list_ttl_ms", self.reward_list_ttl_ms),
            ("dictionary_ttl_ms", self.dictionary_ttl_ms),
            ("templates_ttl_ms", self.templates_ttl_ms),
            ("default_ttl_ms", self.default_ttl_ms),
            ("sweep_interval_ms", self.sweep_interval_ms),
        ];
        match fields.into_iter().find(|(_, value)| *value == 0) {
            Some((field, _)) => Err(ConfigError::ZeroDuration { field }),
            None => Ok(()),
        }
    }
}
