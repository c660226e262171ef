//! Task list publication: cache write, page fan-out, and task events.

use std::rc::Rc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    facade::DomainCache,
    keys::CacheKey,
    model::{TaskRecord, TaskStats},
    notifier::{EventNotifier, Listener},
    pages::{BroadcastReport, PageRegistry},
};

/// Emitted with the full list after every republish.
pub const TASK_LIST_UPDATED_EVENT: &str = "task:list:updated";
/// Emitted with the task after an in-place update.
pub const TASK_UPDATED_EVENT: &str = "task:updated";
/// Emitted with the task after it was appended.
pub const TASK_ADDED_EVENT: &str = "task:added";
/// Emitted with the task id after removal.
pub const TASK_DELETED_EVENT: &str = "task:deleted";
/// Emitted after the cached list was dropped for a reload.
pub const TASK_FORCE_REFRESH_EVENT: &str = "task:force:refresh";

const TASK_EVENTS: [&str; 5] = [
    TASK_LIST_UPDATED_EVENT,
    TASK_UPDATED_EVENT,
    TASK_ADDED_EVENT,
    TASK_DELETED_EVENT,
    TASK_FORCE_REFRESH_EVENT,
];

/// Publishes task list changes to the cache, mounted pages, and event listeners.
pub struct TaskDataManager {
    cache: Rc<DomainCache>,
    pages: Rc<PageRegistry>,
    notifier: Rc<EventNotifier>,
}

impl TaskDataManager {
    /// Creates a manager publishing through `cache`, `pages`, and `notifier`.
    pub fn new(
        cache: Rc<DomainCache>,
        pages: Rc<PageRegistry>,
        notifier: Rc<EventNotifier>,
    ) -> Self {
        Self {
            cache,
            pages,
            notifier,
        }
    }

    /// Returns the cached task list.
    pub fn task_list(&self) -> Option<Vec<TaskRecord>> {
        self.cache.task_list()
    }

    /// Caches `tasks`, hands them to every mounted page, then emits [`TASK_LIST_UPDATED_EVENT`].
    pub fn set_task_list(&self, tasks: &[TaskRecord]) -> BroadcastReport {
        self.cache.set_task_list(tasks);
        let report = self
            .pages
            .broadcast_task_list(tasks, self.cache.store().now_ms());
        self.emit(TASK_LIST_UPDATED_EVENT, tasks);
        report
    }

    /// Replaces the cached task with the same id and emits [`TASK_UPDATED_EVENT`].
    ///
    /// Without a cached list only the event is emitted.
    pub fn notify_task_updated(&self, task: &TaskRecord) {
        if let Some(tasks) = self.task_list() {
            let patched = tasks
                .into_iter()
                .map(|cached| if cached.id == task.id { task.clone() } else { cached })
                .collect::<Vec<_>>();
            self.set_task_list(&patched);
        }
        self.emit(TASK_UPDATED_EVENT, task);
    }

    /// Removes the cached task with `task_id` and emits [`TASK_DELETED_EVENT`].
    pub fn notify_task_deleted(&self, task_id: &str) {
        if let Some(mut tasks) = self.task_list() {
            tasks.retain(|task| task.id != task_id);
            self.set_task_list(&tasks);
        }
        self.emit(TASK_DELETED_EVENT, task_id);
    }

    /// Appends `task` to the cached list, starting a new list when none is cached, and emits
    /// [`TASK_ADDED_EVENT`].
    pub fn notify_task_added(&self, task: &TaskRecord) {
        let mut tasks = self.task_list().unwrap_or_default();
        tasks.push(task.clone());
        self.set_task_list(&tasks);
        self.emit(TASK_ADDED_EVENT, task);
    }

    /// Drops the cached list, emits [`TASK_FORCE_REFRESH_EVENT`], and asks pages to reload.
    pub fn force_refresh_task_data(&self) -> BroadcastReport {
        self.cache.invalidate(&CacheKey::TaskList);
        self.notifier.emit(TASK_FORCE_REFRESH_EVENT, &Value::Null);
        let report = self.pages.broadcast_task_force_refresh();
        leptos::logging::log!("task data force refresh reached {} pages", report.notified);
        report
    }

    /// Returns completion counts over the cached list.
    pub fn task_stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.task_list().unwrap_or_default())
    }

    /// Subscribes to republished task lists.
    pub fn on_task_list_updated(
        &self,
        callback: impl Fn(&[TaskRecord]) -> Result<(), String> + 'static,
    ) -> Listener {
        self.on_typed(TASK_LIST_UPDATED_EVENT, move |tasks: Vec<TaskRecord>| {
            callback(&tasks)
        })
    }

    /// Subscribes to single-task updates.
    pub fn on_task_updated(
        &self,
        callback: impl Fn(&TaskRecord) -> Result<(), String> + 'static,
    ) -> Listener {
        self.on_typed(TASK_UPDATED_EVENT, move |task: TaskRecord| callback(&task))
    }

    /// Subscribes to task additions.
    pub fn on_task_added(
        &self,
        callback: impl Fn(&TaskRecord) -> Result<(), String> + 'static,
    ) -> Listener {
        self.on_typed(TASK_ADDED_EVENT, move |task: TaskRecord| callback(&task))
    }

    /// Subscribes to task deletions; the callback receives the task id.
    pub fn on_task_deleted(
        &self,
        callback: impl Fn(&str) -> Result<(), String> + 'static,
    ) -> Listener {
        self.on_typed(TASK_DELETED_EVENT, move |task_id: String| callback(&task_id))
    }

    /// Removes one list-updated subscription.
    pub fn off_task_list_updated(&self, listener: &Listener) {
        self.notifier.off(TASK_LIST_UPDATED_EVENT, listener);
    }

    /// Removes every task event subscription.
    pub fn off_all_task_listeners(&self) {
        for event in TASK_EVENTS {
            self.notifier.off_all(event);
        }
    }

    fn on_typed<T: DeserializeOwned>(
        &self,
        event: &'static str,
        callback: impl Fn(T) -> Result<(), String> + 'static,
    ) -> Listener {
        self.notifier.on(event, move |payload| {
            let decoded = serde_json::from_value::<T>(payload.clone())
                .map_err(|err| format!("`{event}` payload decode failed: {err}"))?;
            callback(decoded)
        })
    }

    fn emit<T: Serialize + ?Sized>(&self, event: &str, payload: &T) {
        match serde_json::to_value(payload) {
            Ok(payload) => self.notifier.emit(event, &payload),
            Err(err) => leptos::logging::warn!("`{event}` payload encode failed: {err}"),
        }
    }
}
