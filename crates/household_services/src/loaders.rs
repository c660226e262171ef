//! Cache-then-remote loaders for the child, task, and reward screens.
//!
//! Domain failures become [`LoadOutcome::Failed`] plus a toast. Transport and decode failures
//! also show a toast and then propagate as [`RemoteError`].

use std::{cell::RefCell, rc::Rc};

use household_host::{CallResponse, RemoteError, Toast};
use household_state::{
    ChildRef, ChildStateSnapshot, HouseholdContext, RewardRecord, TaskRecord,
};
use serde_json::json;

use crate::{apis::ApiServices, client::decode_list};

/// Toast shown when the children list cannot be loaded.
pub const CHILDREN_LOAD_FAILED: &str = "加载孩子列表失败";
/// Toast shown when the task list cannot be loaded.
pub const TASKS_LOAD_FAILED: &str = "加载任务失败";
/// Toast shown when the reward list cannot be loaded.
pub const REWARDS_LOAD_FAILED: &str = "加载奖励失败";

#[derive(Debug, Clone, PartialEq)]
/// Where loaded data came from, or why there is none.
pub enum LoadOutcome<T> {
    /// Served from a live cache entry.
    Cached(T),
    /// Fetched from the backend and cached.
    Fetched(T),
    /// No child is selected, so there is nothing to load.
    NoSelection,
    /// The backend reported a domain failure.
    Failed {
        /// Message shown to the user.
        msg: String,
    },
}

impl<T> LoadOutcome<T> {
    /// Returns the loaded value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Cached(value) | Self::Fetched(value) => Some(value),
            Self::NoSelection | Self::Failed { .. } => None,
        }
    }

    /// Consumes the outcome and returns the loaded value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Cached(value) | Self::Fetched(value) => Some(value),
            Self::NoSelection | Self::Failed { .. } => None,
        }
    }

    /// Returns whether the value came from the cache.
    pub const fn is_cached(&self) -> bool {
        matches!(self, Self::Cached(_))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Reward list plus the subset the selected child can afford.
pub struct RewardListing {
    /// Every reward.
    pub rewards: Vec<RewardRecord>,
    /// Rewards costing no more than the child's balance.
    pub available: Vec<RewardRecord>,
}

/// Keeps rewards whose cost is at most `child`'s balance. No child means a zero balance.
pub fn available_rewards(rewards: &[RewardRecord], child: Option<&ChildRef>) -> Vec<RewardRecord> {
    let balance = child.map_or(0, |child| child.total_points);
    rewards
        .iter()
        .filter(|reward| reward.points <= balance)
        .cloned()
        .collect()
}

/// Screen data loaders over a household context and the remote API.
pub struct DataLoader {
    context: Rc<HouseholdContext>,
    apis: ApiServices,
    task_list_child: RefCell<Option<String>>,
}

impl DataLoader {
    /// Creates a loader that calls the context's remote service.
    pub fn new(context: Rc<HouseholdContext>) -> Self {
        let apis = ApiServices::new(Rc::clone(&context.host().remote));
        Self::with_apis(context, apis)
    }

    /// Creates a loader over explicit API services.
    pub fn with_apis(context: Rc<HouseholdContext>, apis: ApiServices) -> Self {
        Self {
            context,
            apis,
            task_list_child: RefCell::new(None),
        }
    }

    /// Returns the API services.
    pub fn apis(&self) -> &ApiServices {
        &self.apis
    }

    /// Fetches the children list and reconciles the selection against it.
    ///
    /// # Errors
    ///
    /// Propagates transport and decode failures after showing a toast.
    pub async fn load_children(&self) -> Result<LoadOutcome<ChildStateSnapshot>, RemoteError> {
        let response = self
            .surface(self.apis.children.list().await, CHILDREN_LOAD_FAILED)?;
        if !response.is_ok() {
            return Ok(self.domain_failure(&response, CHILDREN_LOAD_FAILED));
        }
        let children: Vec<ChildRef> = self.surface(decode_list(&response), CHILDREN_LOAD_FAILED)?;
        let selection = self.context.child_state().init_child_state(&children);
        Ok(LoadOutcome::Fetched(ChildStateSnapshot {
            selection,
            children_list: children,
        }))
    }

    /// Loads the selected child's tasks, preferring the cache.
    ///
    /// The cached list is not keyed by child: when this loader last fetched it for a different
    /// child, the list is force-refreshed before fetching. A fetched list goes through the task
    /// data manager so mounted pages see it.
    ///
    /// # Errors
    ///
    /// Propagates transport and decode failures after showing a toast.
    pub async fn load_task_list(&self) -> Result<LoadOutcome<Vec<TaskRecord>>, RemoteError> {
        let Some(child) = self.context.cache().current_child() else {
            return Ok(LoadOutcome::NoSelection);
        };
        let fetched_for_other_child = self
            .task_list_child
            .borrow()
            .as_deref()
            .is_some_and(|owner| owner != child.id);
        if fetched_for_other_child {
            self.context.tasks().force_refresh_task_data();
        } else if let Some(tasks) = self.context.tasks().task_list() {
            return Ok(LoadOutcome::Cached(tasks));
        }

        let response = self.surface(
            self.apis.tasks.list(json!({ "childId": child.id })).await,
            TASKS_LOAD_FAILED,
        )?;
        if !response.is_ok() {
            return Ok(self.domain_failure(&response, TASKS_LOAD_FAILED));
        }
        let tasks: Vec<TaskRecord> = self.surface(decode_list(&response), TASKS_LOAD_FAILED)?;
        self.task_list_child.replace(Some(child.id.clone()));
        let report = self.context.tasks().set_task_list(&tasks);
        if !report.failures.is_empty() {
            leptos::logging::warn!(
                "{} page(s) failed to take the task list",
                report.failures.len()
            );
        }
        Ok(LoadOutcome::Fetched(tasks))
    }

    /// Loads every reward, preferring the cache, and filters what the selected child can afford.
    ///
    /// # Errors
    ///
    /// Propagates transport and decode failures after showing a toast.
    pub async fn load_reward_list(&self) -> Result<LoadOutcome<RewardListing>, RemoteError> {
        let child = self.context.cache().current_child();
        let listing = |rewards: Vec<RewardRecord>| RewardListing {
            available: available_rewards(&rewards, child.as_ref()),
            rewards,
        };

        if let Some(rewards) = self.context.cache().reward_list() {
            return Ok(LoadOutcome::Cached(listing(rewards)));
        }

        let response = self.surface(
            self.apis.rewards.list(json!({})).await,
            REWARDS_LOAD_FAILED,
        )?;
        if !response.is_ok() {
            return Ok(self.domain_failure(&response, REWARDS_LOAD_FAILED));
        }
        let rewards: Vec<RewardRecord> =
            self.surface(decode_list(&response), REWARDS_LOAD_FAILED)?;
        self.context.cache().set_reward_list(&rewards);
        Ok(LoadOutcome::Fetched(listing(rewards)))
    }

    fn surface<T>(&self, result: Result<T, RemoteError>, title: &str) -> Result<T, RemoteError> {
        result.map_err(|err| {
            leptos::logging::error!("{title}: {err}");
            self.context.host().toasts.show(Toast::plain(title));
            err
        })
    }

    fn domain_failure<T>(&self, response: &CallResponse, fallback: &str) -> LoadOutcome<T> {
        let msg = response.msg_or(fallback).to_string();
        self.context.host().toasts.show(Toast::plain(msg.clone()));
        LoadOutcome::Failed { msg }
    }
}
