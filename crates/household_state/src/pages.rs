//! Registry of mounted pages and the fan-out passes that address them.
//!
//! Pages register when mounted and deregister when unmounted; a fan-out only ever walks the
//! pages registered at the moment it starts. Each page keeps its own render copy of the shared
//! state in [`PageLocalState`], and exposes optional hooks that fan-outs invoke when present.

use std::{
    cell::{Cell, Ref, RefCell},
    fmt,
    rc::Rc,
};

use crate::{
    model::{ChildRef, TaskRecord},
    notifier::invoke_isolated,
};

/// Hook receiving the selected child and its index.
pub type ChildHook = Rc<dyn Fn(&ChildRef, usize) -> Result<(), String>>;
/// Hook receiving the current task list.
pub type TaskListHook = Rc<dyn Fn(&[TaskRecord]) -> Result<(), String>>;
/// Hook without payload.
pub type RefreshHook = Rc<dyn Fn() -> Result<(), String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Registry-assigned page identity.
pub struct PageId(pub u64);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Lifecycle of a page's view of the shared child state.
pub enum PagePhase {
    /// Mounted but not yet initialized from the cache.
    #[default]
    Uninitialized,
    /// Local copy read from the cache.
    Synced,
    /// Unmounted; no longer addressed by fan-outs.
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Default)]
/// A page's local render copy of the shared state.
pub struct PageLocalState {
    /// Lifecycle phase.
    pub phase: PagePhase,
    /// Children list as last seen by the page.
    pub children_list: Vec<ChildRef>,
    /// Selected child as last seen by the page.
    pub current_child: Option<ChildRef>,
    /// Selected index as last seen by the page.
    pub current_child_index: usize,
    /// Task list as last seen by the page.
    pub task_list: Vec<TaskRecord>,
    /// When the local task list was last refreshed; `None` forces the next sync.
    pub task_data_last_updated_ms: Option<u64>,
}

#[derive(Clone, Default)]
/// Optional page callbacks. Absent hooks are skipped by every fan-out.
pub struct PageHooks {
    /// Another page switched the selected child.
    pub child_changed: Option<ChildHook>,
    /// The page re-synced and found a different selection.
    pub child_state_changed: Option<ChildHook>,
    /// This page itself switched the selected child.
    pub child_switched: Option<ChildHook>,
    /// The task list was republished.
    pub task_data_updated: Option<TaskListHook>,
    /// The page re-synced and refreshed its task list.
    pub task_data_state_changed: Option<TaskListHook>,
    /// Cached tasks were dropped and must be reloaded.
    pub task_force_refresh: Option<RefreshHook>,
}

impl PageHooks {
    /// Creates a hook set with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the broadcast hook for child switches made elsewhere.
    pub fn on_child_changed(
        mut self,
        hook: impl Fn(&ChildRef, usize) -> Result<(), String> + 'static,
    ) -> Self {
        self.child_changed = Some(Rc::new(hook));
        self
    }

    /// Sets the hook called when a re-sync finds a different selection.
    pub fn on_child_state_changed(
        mut self,
        hook: impl Fn(&ChildRef, usize) -> Result<(), String> + 'static,
    ) -> Self {
        self.child_state_changed = Some(Rc::new(hook));
        self
    }

    /// Sets the hook called after this page switched the child.
    pub fn on_child_switched(
        mut self,
        hook: impl Fn(&ChildRef, usize) -> Result<(), String> + 'static,
    ) -> Self {
        self.child_switched = Some(Rc::new(hook));
        self
    }

    /// Sets the task-list fan-out hook.
    pub fn on_task_data_updated(
        mut self,
        hook: impl Fn(&[TaskRecord]) -> Result<(), String> + 'static,
    ) -> Self {
        self.task_data_updated = Some(Rc::new(hook));
        self
    }

    /// Sets the hook called when a re-sync refreshed the task list.
    pub fn on_task_data_state_changed(
        mut self,
        hook: impl Fn(&[TaskRecord]) -> Result<(), String> + 'static,
    ) -> Self {
        self.task_data_state_changed = Some(Rc::new(hook));
        self
    }

    /// Sets the forced task reload hook.
    pub fn on_task_force_refresh(mut self, hook: impl Fn() -> Result<(), String> + 'static) -> Self {
        self.task_force_refresh = Some(Rc::new(hook));
        self
    }
}

impl fmt::Debug for PageHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageHooks")
            .field("child_changed", &self.child_changed.is_some())
            .field("child_state_changed", &self.child_state_changed.is_some())
            .field("child_switched", &self.child_switched.is_some())
            .field("task_data_updated", &self.task_data_updated.is_some())
            .field("task_data_state_changed", &self.task_data_state_changed.is_some())
            .field("task_force_refresh", &self.task_force_refresh.is_some())
            .finish()
    }
}

#[derive(Debug)]
/// A page registered with the [`PageRegistry`].
pub struct MountedPage {
    id: PageId,
    route: String,
    hooks: PageHooks,
    local: RefCell<PageLocalState>,
}

impl MountedPage {
    /// Returns the page identity.
    pub fn id(&self) -> PageId {
        self.id
    }

    /// Returns the route the page was mounted under.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Returns the page hooks.
    pub fn hooks(&self) -> &PageHooks {
        &self.hooks
    }

    /// Borrows the page's local state.
    pub fn local(&self) -> Ref<'_, PageLocalState> {
        self.local.borrow()
    }

    /// Returns the lifecycle phase.
    pub fn phase(&self) -> PagePhase {
        self.local.borrow().phase
    }

    /// Mutates the local state. The borrow ends before this returns.
    pub fn update_local<R>(&self, f: impl FnOnce(&mut PageLocalState) -> R) -> R {
        f(&mut self.local.borrow_mut())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A page hook that failed during a fan-out.
pub struct PageFailure {
    /// Failing page.
    pub page: PageId,
    /// Route of the failing page.
    pub route: String,
    /// Error or panic message.
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Outcome of one fan-out pass.
pub struct BroadcastReport {
    /// Pages whose hook ran successfully.
    pub notified: usize,
    /// Pages whose hook failed.
    pub failures: Vec<PageFailure>,
}

impl BroadcastReport {
    fn record(&mut self, page: &MountedPage, outcome: Result<(), String>, pass: &str) {
        match outcome {
            Ok(()) => self.notified += 1,
            Err(message) => {
                leptos::logging::warn!(
                    "{pass} hook failed on {} ({}): {message}",
                    page.id,
                    page.route
                );
                self.failures.push(PageFailure {
                    page: page.id,
                    route: page.route.clone(),
                    message,
                });
            }
        }
    }
}

#[derive(Debug, Default)]
/// Explicit observer list of mounted pages, in mount order.
pub struct PageRegistry {
    pages: RefCell<Vec<Rc<MountedPage>>>,
    next_id: Cell<u64>,
}

impl PageRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a page and returns its handle.
    pub fn mount(&self, route: impl Into<String>, hooks: PageHooks) -> Rc<MountedPage> {
        let id = PageId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let page = Rc::new(MountedPage {
            id,
            route: route.into(),
            hooks,
            local: RefCell::new(PageLocalState::default()),
        });
        self.pages.borrow_mut().push(Rc::clone(&page));
        page
    }

    /// Deregisters a page and marks it terminated. Returns whether it was mounted.
    pub fn unmount(&self, id: PageId) -> bool {
        let removed = {
            let mut pages = self.pages.borrow_mut();
            let position = pages.iter().position(|page| page.id == id);
            position.map(|position| pages.remove(position))
        };
        match removed {
            Some(page) => {
                page.update_local(|local| local.phase = PagePhase::Terminated);
                true
            }
            None => false,
        }
    }

    /// Deregisters every page.
    pub fn unmount_all(&self) {
        let pages = std::mem::take(&mut *self.pages.borrow_mut());
        for page in pages {
            page.update_local(|local| local.phase = PagePhase::Terminated);
        }
    }

    /// Returns a snapshot of the mounted pages.
    pub fn mounted(&self) -> Vec<Rc<MountedPage>> {
        self.pages.borrow().clone()
    }

    /// Returns the number of mounted pages.
    pub fn len(&self) -> usize {
        self.pages.borrow().len()
    }

    /// Returns whether no pages are mounted.
    pub fn is_empty(&self) -> bool {
        self.pages.borrow().is_empty()
    }

    /// Tells every mounted page that the selection moved to `child` at `index`.
    ///
    /// Every page's local copy is updated; pages with a `child_changed` hook are then called.
    pub fn broadcast_child_changed(&self, child: &ChildRef, index: usize) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        for page in self.mounted() {
            if page.phase() == PagePhase::Terminated {
                continue;
            }
            page.update_local(|local| {
                local.current_child = Some(child.clone());
                local.current_child_index = index;
            });
            if let Some(hook) = page.hooks.child_changed.clone() {
                report.record(&page, invoke_isolated(|| hook(child, index)), "child changed");
            }
        }
        report
    }

    /// Hands a republished task list to every mounted page.
    pub fn broadcast_task_list(&self, tasks: &[TaskRecord], now_ms: u64) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        for page in self.mounted() {
            if page.phase() == PagePhase::Terminated {
                continue;
            }
            page.update_local(|local| {
                local.task_list = tasks.to_vec();
                local.task_data_last_updated_ms = Some(now_ms);
            });
            if let Some(hook) = page.hooks.task_data_updated.clone() {
                report.record(&page, invoke_isolated(|| hook(tasks)), "task data");
            }
        }
        report
    }

    /// Drops every page's local task list and asks pages to reload.
    pub fn broadcast_task_force_refresh(&self) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        for page in self.mounted() {
            if page.phase() == PagePhase::Terminated {
                continue;
            }
            page.update_local(|local| {
                local.task_list.clear();
                local.task_data_last_updated_ms = None;
            });
            if let Some(hook) = page.hooks.task_force_refresh.clone() {
                report.record(&page, invoke_isolated(|| hook()), "task refresh");
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn child(id: &str) -> ChildRef {
        ChildRef::new(id, id, 0)
    }

    #[test]
    fn mount_assigns_ids_in_order_and_unmount_terminates() {
        let registry = PageRegistry::new();
        let home = registry.mount("pages/home", PageHooks::new());
        let tasks = registry.mount("pages/tasks", PageHooks::new());
        assert_eq!((home.id(), tasks.id()), (PageId(0), PageId(1)));
        assert_eq!(registry.len(), 2);

        assert!(registry.unmount(home.id()));
        assert!(!registry.unmount(home.id()));
        assert_eq!(home.phase(), PagePhase::Terminated);
        assert_eq!(
            registry.mounted().iter().map(|page| page.id()).collect::<Vec<_>>(),
            vec![PageId(1)]
        );
    }

    #[test]
    fn child_broadcast_updates_every_page_and_calls_present_hooks() {
        let registry = PageRegistry::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let with_hook = {
            let seen = Rc::clone(&seen);
            registry.mount(
                "pages/home",
                PageHooks::new().on_child_changed(move |child, index| {
                    seen.borrow_mut().push((child.id.clone(), index));
                    Ok(())
                }),
            )
        };
        let without_hook = registry.mount("pages/settings", PageHooks::new());

        let report = registry.broadcast_child_changed(&child("b"), 1);

        assert_eq!(report.notified, 1);
        assert_eq!(*seen.borrow(), vec![("b".to_string(), 1)]);
        assert_eq!(with_hook.local().current_child_index, 1);
        assert_eq!(
            without_hook.local().current_child.as_ref().map(|c| c.id.as_str()),
            Some("b")
        );
    }

    #[test]
    fn failing_page_does_not_block_later_pages() {
        let registry = PageRegistry::new();
        let reached = Rc::new(Cell::new(false));
        registry.mount(
            "pages/broken",
            PageHooks::new().on_child_changed(|_, _| Err("render failed".to_string())),
        );
        registry.mount(
            "pages/panicky",
            PageHooks::new().on_child_changed(|_, _| panic!("page crashed")),
        );
        {
            let reached = Rc::clone(&reached);
            registry.mount(
                "pages/ok",
                PageHooks::new().on_child_changed(move |_, _| {
                    reached.set(true);
                    Ok(())
                }),
            );
        }

        let report = registry.broadcast_child_changed(&child("a"), 0);

        assert!(reached.get());
        assert_eq!(report.notified, 1);
        assert_eq!(
            report
                .failures
                .iter()
                .map(|failure| failure.route.as_str())
                .collect::<Vec<_>>(),
            vec!["pages/broken", "pages/panicky"]
        );
    }

    #[test]
    fn page_unmounted_by_an_earlier_hook_is_skipped() {
        let registry = Rc::new(PageRegistry::new());
        let calls = Rc::new(Cell::new(0));
        let second_id = PageId(1);
        {
            let registry_ref = Rc::clone(&registry);
            let calls = Rc::clone(&calls);
            registry.mount(
                "pages/first",
                PageHooks::new().on_child_changed(move |_, _| {
                    calls.set(calls.get() + 1);
                    registry_ref.unmount(second_id);
                    Ok(())
                }),
            );
        }
        let second = {
            let calls = Rc::clone(&calls);
            registry.mount(
                "pages/second",
                PageHooks::new().on_child_changed(move |_, _| {
                    calls.set(calls.get() + 1);
                    Ok(())
                }),
            )
        };

        let report = registry.broadcast_child_changed(&child("b"), 1);

        assert_eq!(calls.get(), 1);
        assert_eq!(report.notified, 1);
        assert_eq!(second.phase(), PagePhase::Terminated);
        assert_eq!(second.local().current_child, None);

        registry.broadcast_task_list(&[TaskRecord::new("t1", "Read", 5)], 10);
        registry.broadcast_child_changed(&child("a"), 0);
        assert_eq!(calls.get(), 2);
        assert!(second.local().task_list.is_empty());
    }

    #[test]
    fn terminated_pages_still_in_a_snapshot_are_not_addressed() {
        let registry = PageRegistry::new();
        let refreshed = Rc::new(Cell::new(0));
        let page = {
            let refreshed = Rc::clone(&refreshed);
            registry.mount(
                "pages/tasks",
                PageHooks::new().on_task_force_refresh(move || {
                    refreshed.set(refreshed.get() + 1);
                    Ok(())
                }),
            )
        };
        page.update_local(|local| local.phase = PagePhase::Terminated);

        let report = registry.broadcast_task_force_refresh();

        assert_eq!(report.notified, 0);
        assert_eq!(refreshed.get(), 0);
    }

    #[test]
    fn task_fan_outs_update_and_reset_local_copies() {
        let registry = PageRegistry::new();
        let refreshed = Rc::new(Cell::new(0));
        let page = {
            let refreshed = Rc::clone(&refreshed);
            registry.mount(
                "pages/tasks",
                PageHooks::new().on_task_force_refresh(move || {
                    refreshed.set(refreshed.get() + 1);
                    Ok(())
                }),
            )
        };

        registry.broadcast_task_list(&[TaskRecord::new("t1", "Read", 2)], 500);
        assert_eq!(page.local().task_list.len(), 1);
        assert_eq!(page.local().task_data_last_updated_ms, Some(500));

        let report = registry.broadcast_task_force_refresh();
        assert_eq!(report.notified, 1);
        assert_eq!(refreshed.get(), 1);
        assert!(page.local().task_list.is_empty());
        assert_eq!(page.local().task_data_last_updated_ms, None);
    }

    #[test]
    fn unmount_all_terminates_everything() {
        let registry = PageRegistry::new();
        let page = registry.mount("pages/home", PageHooks::new());
        registry.unmount_all();
        assert!(registry.is_empty());
        assert_eq!(page.phase(), PagePhase::Terminated);
    }
}
