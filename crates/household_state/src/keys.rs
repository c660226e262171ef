//! Typed cache keys and their wire names.

use std::{borrow::Cow, fmt};

use crate::config::CachePolicy;

const DICTIONARY_PREFIX: &str = "dictionary_";
const TEMPLATES_PREFIX: &str = "templates_";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Every entity the domain cache stores.
pub enum CacheKey {
    /// Signed-in user profile.
    UserInfo,
    /// Children of the signed-in parent.
    ChildrenList,
    /// Currently selected child.
    CurrentChild,
    /// Index of the selected child within the children list.
    CurrentChildIndex,
    /// Tasks of the selected child.
    TaskList,
    /// Rewards available to the household.
    RewardList,
    /// Dictionary items of one category.
    Dictionary(String),
    /// Templates of one type.
    Templates(String),
}

impl CacheKey {
    /// Returns the string key used in the store and device storage.
    pub fn storage_key(&self) -> Cow<'static, str> {
        match self {
            Self::UserInfo => Cow::Borrowed("userInfo"),
            Self::ChildrenList => Cow::Borrowed("childrenList"),
            Self::CurrentChild => Cow::Borrowed("currentChild"),
            Self::CurrentChildIndex => Cow::Borrowed("currentChildIndex"),
            Self::TaskList => Cow::Borrowed("taskList"),
            Self::RewardList => Cow::Borrowed("rewardList"),
            Self::Dictionary(category) => Cow::Owned(format!("{DICTIONARY_PREFIX}{category}")),
            Self::Templates(kind) => Cow::Owned(format!("{TEMPLATES_PREFIX}{kind}")),
        }
    }

    /// Returns whether writes are mirrored to device storage.
    pub const fn is_persisted(&self) -> bool {
        matches!(self, Self::CurrentChild | Self::CurrentChildIndex)
    }

    /// Returns the TTL `policy` assigns to this entity.
    pub fn ttl_ms(&self, policy: &CachePolicy) -> u64 {
        match self {
            Self::UserInfo => policy.user_info_ttl_ms,
            Self::ChildrenList => policy.children_list_ttl_ms,
            Self::CurrentChild | Self::CurrentChildIndex => policy.current_child_ttl_ms,
            Self::TaskList => policy.task_list_ttl_ms,
            Self::RewardList => policy.reward_list_ttl_ms,
            Self::Dictionary(_) => policy.dictionary_ttl_ms,
            Self::Templates(_) => policy.templates_ttl_ms,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}
