//! Per-page handle bundling the child-selection and task-data page behaviours.
//!
//! A [`PageSession`] is what a page owns between mount and unmount. It keeps the page's local
//! render copy in step with the shared cache and routes user actions through the synchronizer
//! and task manager. Dropping the session deregisters the page.

use std::rc::Rc;

use household_host::{Toast, ToastService};

use crate::{
    child_state::{ChildStateSnapshot, ChildStateSync},
    facade::DomainCache,
    model::{ChildRef, TaskRecord},
    notifier::invoke_isolated,
    pages::{MountedPage, PageId, PageLocalState, PagePhase, PageRegistry},
    task_data::TaskDataManager,
};

/// Title of the toast shown when a switch is rejected.
pub const SWITCH_FAILED_TITLE: &str = "切换失败";

/// Returns the title of the toast shown after switching to `child`.
pub fn switched_to_title(child: &ChildRef) -> String {
    format!("已切换到 {}", child.name)
}

/// A mounted page's view of the shared household state.
pub struct PageSession {
    page: Rc<MountedPage>,
    pages: Rc<PageRegistry>,
    cache: Rc<DomainCache>,
    child_state: Rc<ChildStateSync>,
    tasks: Rc<TaskDataManager>,
    toasts: Rc<dyn ToastService>,
}

impl PageSession {
    pub(crate) fn new(
        page: Rc<MountedPage>,
        pages: Rc<PageRegistry>,
        cache: Rc<DomainCache>,
        child_state: Rc<ChildStateSync>,
        tasks: Rc<TaskDataManager>,
        toasts: Rc<dyn ToastService>,
    ) -> Self {
        Self {
            page,
            pages,
            cache,
            child_state,
            tasks,
            toasts,
        }
    }

    /// Returns the registry id of this page.
    pub fn id(&self) -> PageId {
        self.page.id()
    }

    /// Returns the route this page was mounted under.
    pub fn route(&self) -> &str {
        self.page.route()
    }

    /// Returns the lifecycle phase.
    pub fn phase(&self) -> PagePhase {
        self.page.phase()
    }

    /// Returns a copy of the page's local state.
    pub fn local(&self) -> PageLocalState {
        self.page.local().clone()
    }

    /// Reads the cached selection into the local copy and marks the page synced.
    pub fn init_global_child_state(&self) -> ChildStateSnapshot {
        let snapshot = self.child_state.snapshot();
        self.page.update_local(|local| {
            local.children_list = snapshot.children_list.clone();
            local.current_child = snapshot.selection.current_child.clone();
            local.current_child_index = snapshot.selection.current_child_index;
            local.phase = PagePhase::Synced;
        });
        snapshot
    }

    /// Foreground re-entry: re-syncs the child selection, then the task list.
    pub fn on_show(&self) {
        self.sync_global_child_state();
        self.sync_task_data_state();
    }

    /// Re-reads the cached selection and adopts it when it differs from the local copy.
    ///
    /// Returns whether the local copy changed. The `child_state_changed` hook runs only on a
    /// change, and only when a child is actually selected.
    pub fn sync_global_child_state(&self) -> bool {
        if self.phase() == PagePhase::Terminated {
            return false;
        }
        let Some(child) = self.cache.current_child() else {
            return false;
        };
        let index = self.cache.current_child_index();

        let needs_update = {
            let local = self.page.local();
            local
                .current_child
                .as_ref()
                .map_or(true, |current| current.id != child.id)
                || local.current_child_index != index
        };
        if !needs_update {
            return false;
        }

        let children = self.cache.children_list().unwrap_or_default();
        self.page.update_local(|local| {
            local.children_list = children;
            local.current_child = Some(child.clone());
            local.current_child_index = index;
            local.phase = PagePhase::Synced;
        });
        if let Some(hook) = self.page.hooks().child_state_changed.clone() {
            self.report_hook("child state", invoke_isolated(|| hook(&child, index)));
        }
        true
    }

    /// Switches the shared selection to `children[index]` with user feedback.
    ///
    /// On success the local copy is updated, a success toast names the child, and the
    /// `child_switched` hook runs. On failure a failure toast is shown.
    pub fn switch_global_child(&self, children: &[ChildRef], index: usize) -> bool {
        if !self.child_state.switch_child(children, index) {
            self.toasts.show(Toast::plain(SWITCH_FAILED_TITLE));
            return false;
        }

        let child = children[index].clone();
        self.page.update_local(|local| {
            local.children_list = children.to_vec();
            local.current_child = Some(child.clone());
            local.current_child_index = index;
        });
        self.toasts.show(Toast::success(
            switched_to_title(&child),
            self.cache.policy().switch_toast_duration_ms,
        ));
        if let Some(hook) = self.page.hooks().child_switched.clone() {
            self.report_hook("child switched", invoke_isolated(|| hook(&child, index)));
        }
        true
    }

    /// Switches to `index` within this page's children list. Out-of-range indexes return
    /// `false` without feedback.
    pub fn switch_child(&self, index: usize) -> bool {
        let children = self.children_list();
        if index >= children.len() {
            return false;
        }
        self.switch_global_child(&children, index)
    }

    /// Stores a freshly loaded children list and adopts the repaired selection locally.
    pub fn set_global_children_list(&self, children: &[ChildRef]) -> ChildStateSnapshot {
        let selection = self.child_state.set_global_children_list(children);
        self.page.update_local(|local| {
            local.children_list = children.to_vec();
            local.current_child = selection.current_child.clone();
            local.current_child_index = selection.current_child_index;
        });
        ChildStateSnapshot {
            selection,
            children_list: children.to_vec(),
        }
    }

    /// Returns the selected child, preferring the local copy.
    pub fn current_child(&self) -> Option<ChildRef> {
        let local = self.page.local().current_child.clone();
        local.or_else(|| self.cache.current_child())
    }

    /// Returns the selected index, preferring the local copy once the page is synced.
    pub fn current_child_index(&self) -> usize {
        let local = self.page.local();
        if local.phase == PagePhase::Synced {
            return local.current_child_index;
        }
        drop(local);
        self.cache.current_child_index()
    }

    /// Returns the children list, preferring a non-empty local copy.
    pub fn children_list(&self) -> Vec<ChildRef> {
        let local = self.page.local().children_list.clone();
        if !local.is_empty() {
            return local;
        }
        self.cache.children_list().unwrap_or_default()
    }

    /// Reads the cached task list into the local copy.
    pub fn init_task_data_state(&self) -> Vec<TaskRecord> {
        let tasks = self.tasks.task_list().unwrap_or_default();
        let now_ms = self.cache.store().now_ms();
        self.page.update_local(|local| {
            local.task_list = tasks.clone();
            local.task_data_last_updated_ms = Some(now_ms);
        });
        tasks
    }

    /// Refreshes the local task list when its length differs from the cache or it is stale.
    ///
    /// Returns whether the local copy changed; the `task_data_state_changed` hook runs only then.
    pub fn sync_task_data_state(&self) -> bool {
        if self.phase() == PagePhase::Terminated {
            return false;
        }
        let tasks = self.tasks.task_list().unwrap_or_default();
        let now_ms = self.cache.store().now_ms();
        let stale_after_ms = self.cache.policy().task_sync_stale_after_ms;

        let needs_update = {
            let local = self.page.local();
            local.task_list.len() != tasks.len()
                || local
                    .task_data_last_updated_ms
                    .map_or(true, |updated| now_ms.saturating_sub(updated) > stale_after_ms)
        };
        if !needs_update {
            return false;
        }

        self.page.update_local(|local| {
            local.task_list = tasks.clone();
            local.task_data_last_updated_ms = Some(now_ms);
        });
        if let Some(hook) = self.page.hooks().task_data_state_changed.clone() {
            self.report_hook("task data state", invoke_isolated(|| hook(&tasks)));
        }
        true
    }

    /// Returns the task list, preferring a non-empty local copy.
    pub fn current_task_list(&self) -> Vec<TaskRecord> {
        let local = self.page.local().task_list.clone();
        if !local.is_empty() {
            return local;
        }
        self.tasks.task_list().unwrap_or_default()
    }

    /// Publishes a task list to the cache and every mounted page.
    pub fn set_task_list(&self, tasks: &[TaskRecord]) {
        self.tasks.set_task_list(tasks);
    }

    /// Appends a task to the shared list.
    pub fn add_task(&self, task: &TaskRecord) {
        self.tasks.notify_task_added(task);
    }

    /// Replaces a task in the shared list.
    pub fn update_task(&self, task: &TaskRecord) {
        self.tasks.notify_task_updated(task);
    }

    /// Removes a task from the shared list.
    pub fn delete_task(&self, task_id: &str) {
        self.tasks.notify_task_deleted(task_id);
    }

    /// Drops the shared task list and asks every page to reload.
    pub fn force_refresh_tasks(&self) {
        self.tasks.force_refresh_task_data();
    }

    /// Deregisters the page. Later fan-outs no longer reach it.
    pub fn unmount(&self) {
        self.pages.unmount(self.page.id());
    }

    fn report_hook(&self, hook: &str, outcome: Result<(), String>) {
        if let Err(err) = outcome {
            leptos::logging::warn!(
                "{hook} hook failed on {} ({}): {err}",
                self.page.id(),
                self.page.route()
            );
        }
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        self.unmount();
    }
}
