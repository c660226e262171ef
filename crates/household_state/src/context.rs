//! Explicitly constructed household state context.
//!
//! One [`HouseholdContext`] owns the notifier, store, domain cache, page registry, child
//! synchronizer, task manager, and sweeper for a process. The entry layer builds it from a
//! [`HostServices`] bundle and hands it to whatever owns page lifecycles.

use std::rc::Rc;

use household_host::HostServices;

use crate::{
    child_state::ChildStateSync,
    config::CachePolicy,
    facade::DomainCache,
    notifier::EventNotifier,
    pages::{PageHooks, PageRegistry},
    session::PageSession,
    store::ExpiringStore,
    sweeper::CacheSweeper,
    task_data::TaskDataManager,
};

/// Every shared household state component, wired together.
pub struct HouseholdContext {
    host: HostServices,
    policy: CachePolicy,
    notifier: Rc<EventNotifier>,
    store: Rc<ExpiringStore>,
    cache: Rc<DomainCache>,
    pages: Rc<PageRegistry>,
    child_state: Rc<ChildStateSync>,
    tasks: Rc<TaskDataManager>,
    sweeper: Rc<CacheSweeper>,
}

impl HouseholdContext {
    /// Wires a fresh context over `host` using `policy`.
    pub fn new(host: HostServices, policy: CachePolicy) -> Self {
        let notifier = Rc::new(EventNotifier::new());
        let store = Rc::new(ExpiringStore::new(
            Rc::clone(&notifier),
            Rc::clone(&host.clock),
            policy.default_ttl_ms,
        ));
        let cache = Rc::new(DomainCache::new(
            Rc::clone(&store),
            Rc::clone(&host.device_storage),
            policy,
        ));
        let pages = Rc::new(PageRegistry::new());
        let child_state = Rc::new(ChildStateSync::new(Rc::clone(&cache), Rc::clone(&pages)));
        let tasks = Rc::new(TaskDataManager::new(
            Rc::clone(&cache),
            Rc::clone(&pages),
            Rc::clone(&notifier),
        ));
        let sweeper = Rc::new(CacheSweeper::new(Rc::clone(&store), policy.sweep_interval_ms));
        leptos::logging::log!(
            "household context ready on {} host",
            host.host_strategy.as_str()
        );

        Self {
            host,
            policy,
            notifier,
            store,
            cache,
            pages,
            child_state,
            tasks,
            sweeper,
        }
    }

    /// Returns the injected host services.
    pub fn host(&self) -> &HostServices {
        &self.host
    }

    /// Returns the cache policy.
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Returns the shared event notifier.
    pub fn notifier(&self) -> &Rc<EventNotifier> {
        &self.notifier
    }

    /// Returns the expiring store.
    pub fn store(&self) -> &Rc<ExpiringStore> {
        &self.store
    }

    /// Returns the domain cache facade.
    pub fn cache(&self) -> &Rc<DomainCache> {
        &self.cache
    }

    /// Returns the mounted-page registry.
    pub fn pages(&self) -> &Rc<PageRegistry> {
        &self.pages
    }

    /// Returns the child-state synchronizer.
    pub fn child_state(&self) -> &Rc<ChildStateSync> {
        &self.child_state
    }

    /// Returns the task data manager.
    pub fn tasks(&self) -> &Rc<TaskDataManager> {
        &self.tasks
    }

    /// Returns the cache sweeper.
    pub fn sweeper(&self) -> &Rc<CacheSweeper> {
        &self.sweeper
    }

    /// Registers a page and returns its session. Dropping the session unmounts the page.
    pub fn mount_page(&self, route: impl Into<String>, hooks: PageHooks) -> PageSession {
        let page = self.pages.mount(route, hooks);
        PageSession::new(
            page,
            Rc::clone(&self.pages),
            Rc::clone(&self.cache),
            Rc::clone(&self.child_state),
            Rc::clone(&self.tasks),
            Rc::clone(&self.host.toasts),
        )
    }

    /// Starts periodic sweeping of expired entries.
    ///
    /// Browser builds schedule an interval owned by the sweeper; [`HouseholdContext::teardown`]
    /// clears it. Other hosts drive [`HouseholdContext::poll_sweep`] from their own loop.
    pub fn start_sweeping(&self) {
        #[cfg(target_arch = "wasm32")]
        {
            if let Err(err) = self.sweeper.install_interval() {
                leptos::logging::warn!("{err}");
            }
        }
    }

    /// Sweeps when a full sweep interval has elapsed. Returns the removed count.
    pub fn poll_sweep(&self) -> Option<usize> {
        self.sweeper.poll()
    }

    /// Forgets everything cached for the signed-in user, including the persisted selection.
    pub fn logout(&self) {
        self.child_state.clear_child_state();
        self.store.clear();
    }

    /// Stops background sweeping and deregisters every page.
    pub fn teardown(&self) {
        self.sweeper.stop();
        self.pages.unmount_all();
        leptos::logging::log!("household context torn down");
    }
}

/// Makes `context` available to descendant reactive scopes and starts sweeping.
///
/// The context is torn down when the providing scope is cleaned up.
pub fn provide_household_context(context: Rc<HouseholdContext>) {
    context.start_sweeping();
    let owned = Rc::clone(&context);
    leptos::on_cleanup(move || owned.teardown());
    leptos::provide_context(context);
}

/// Returns the context provided by [`provide_household_context`], if any.
pub fn use_household_context() -> Option<Rc<HouseholdContext>> {
    leptos::use_context::<Rc<HouseholdContext>>()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use household_host::{ManualClock, MemoryDeviceStorage, MemoryToastService, ToastIcon};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{
        keys::CacheKey,
        model::{ChildRef, ChildSelection, TaskRecord},
        pages::PagePhase,
        store::changed_event,
    };

    struct Harness {
        context: HouseholdContext,
        clock: ManualClock,
        device: MemoryDeviceStorage,
        toasts: MemoryToastService,
    }

    fn harness_with(device: MemoryDeviceStorage) -> Harness {
        let clock = ManualClock::starting_at(1_700_000_000_000);
        let toasts = MemoryToastService::default();
        let host = HostServices::detached()
            .with_clock(Rc::new(clock.clone()))
            .with_device_storage(Rc::new(device.clone()))
            .with_toasts(Rc::new(toasts.clone()));
        Harness {
            context: HouseholdContext::new(host, CachePolicy::default()),
            clock,
            device,
            toasts,
        }
    }

    fn harness() -> Harness {
        harness_with(MemoryDeviceStorage::default())
    }

    fn child(id: &str) -> ChildRef {
        ChildRef::new(id, id.to_uppercase(), 10)
    }

    type Calls = Rc<RefCell<Vec<(String, usize)>>>;

    fn recording_hook(calls: &Calls) -> impl Fn(&ChildRef, usize) -> Result<(), String> {
        let calls = Rc::clone(calls);
        move |child, index| {
            calls.borrow_mut().push((child.id.clone(), index));
            Ok(())
        }
    }

    #[test]
    fn select_switch_and_reconcile_across_pages() {
        let h = harness();
        let broadcasts: Calls = Rc::default();
        let observer = h.context.mount_page(
            "pages/tasks",
            PageHooks::new().on_child_changed(recording_hook(&broadcasts)),
        );
        let cache_events = Rc::new(RefCell::new(Vec::new()));
        {
            let cache_events = Rc::clone(&cache_events);
            h.context
                .notifier()
                .on(&changed_event("currentChild"), move |payload| {
                    cache_events.borrow_mut().push(payload["_id"].clone());
                    Ok(())
                });
        }

        let list = vec![child("a"), child("b")];
        let selection = h.context.child_state().init_child_state(&list);
        assert_eq!(
            (selection.child_id(), selection.current_child_index),
            (Some("a"), 0)
        );

        assert!(h.context.child_state().switch_child(&list, 1));
        assert_eq!(h.context.cache().current_child().map(|c| c.id), Some("b".to_string()));
        assert_eq!(*broadcasts.borrow(), vec![("b".to_string(), 1)]);
        assert_eq!(observer.local().current_child_index, 1);

        let refetched = vec![child("b"), child("a")];
        let selection = h.context.child_state().init_child_state(&refetched);
        assert_eq!(
            (selection.child_id(), selection.current_child_index),
            (Some("b"), 0)
        );
        assert_eq!(h.context.cache().current_child_index(), 0);
        assert_eq!(
            *cache_events.borrow(),
            vec![json!("a"), json!("b"), json!("b")]
        );
    }

    #[test]
    fn page_sync_suppresses_unchanged_state() {
        let h = harness();
        let list = vec![child("a"), child("b")];
        h.context.child_state().init_child_state(&list);
        let changes: Calls = Rc::default();
        let page = h.context.mount_page(
            "pages/rewards",
            PageHooks::new().on_child_state_changed(recording_hook(&changes)),
        );
        assert_eq!(page.phase(), PagePhase::Uninitialized);

        let snapshot = page.init_global_child_state();
        assert_eq!(snapshot.selection.child_id(), Some("a"));
        assert_eq!(page.phase(), PagePhase::Synced);

        assert!(!page.sync_global_child_state());
        assert!(changes.borrow().is_empty());

        h.context.cache().set_current_child(Some(&list[1]));
        h.context.cache().set_current_child_index(1);
        page.on_show();
        assert_eq!(*changes.borrow(), vec![("b".to_string(), 1)]);
        assert_eq!(page.current_child().map(|c| c.id), Some("b".to_string()));

        page.on_show();
        assert_eq!(changes.borrow().len(), 1);
    }

    #[test]
    fn sync_without_global_child_leaves_page_alone() {
        let h = harness();
        let changes: Calls = Rc::default();
        let page = h.context.mount_page(
            "pages/home",
            PageHooks::new().on_child_state_changed(recording_hook(&changes)),
        );

        assert!(!page.sync_global_child_state());
        assert!(changes.borrow().is_empty());
        assert_eq!(page.phase(), PagePhase::Uninitialized);
    }

    #[test]
    fn page_switch_shows_feedback_and_calls_switched_hook() {
        let h = harness();
        let switched: Calls = Rc::default();
        let page = h.context.mount_page(
            "pages/home",
            PageHooks::new().on_child_switched(recording_hook(&switched)),
        );
        page.set_global_children_list(&[child("a"), child("b")]);

        assert!(page.switch_child(1));
        let toast = h.toasts.last().expect("toast");
        assert_eq!(toast.title, "已切换到 B");
        assert_eq!(toast.icon, ToastIcon::Success);
        assert_eq!(toast.duration_ms, 1000);
        assert_eq!(*switched.borrow(), vec![("b".to_string(), 1)]);
        assert_eq!(page.current_child_index(), 1);

        assert!(!page.switch_child(5));
        assert_eq!(h.toasts.shown().len(), 1);

        assert!(!page.switch_global_child(&[], 0));
        let toast = h.toasts.last().expect("toast");
        assert_eq!(toast.title, "切换失败");
        assert_eq!(toast.icon, ToastIcon::None);
    }

    #[test]
    fn broken_page_does_not_stop_broadcast_to_others() {
        let h = harness();
        let _broken = h.context.mount_page(
            "pages/broken",
            PageHooks::new().on_child_changed(|_, _| Err("stale view".to_string())),
        );
        let healthy: Calls = Rc::default();
        let _healthy = h.context.mount_page(
            "pages/healthy",
            PageHooks::new().on_child_changed(recording_hook(&healthy)),
        );

        let list = vec![child("a"), child("b")];
        assert!(h.context.child_state().switch_child(&list, 0));
        assert_eq!(*healthy.borrow(), vec![("a".to_string(), 0)]);
    }

    #[test]
    fn dropped_session_is_no_longer_addressed() {
        let h = harness();
        let calls: Calls = Rc::default();
        let page = h.context.mount_page(
            "pages/tasks",
            PageHooks::new().on_child_changed(recording_hook(&calls)),
        );
        assert_eq!(h.context.pages().len(), 1);
        drop(page);
        assert!(h.context.pages().is_empty());

        h.context
            .child_state()
            .switch_child(&[child("a")], 0);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn task_sync_refreshes_on_length_change_or_staleness() {
        let h = harness();
        let states = Rc::new(RefCell::new(Vec::new()));
        let page = {
            let states = Rc::clone(&states);
            h.context.mount_page(
                "pages/tasks",
                PageHooks::new().on_task_data_state_changed(move |tasks| {
                    states.borrow_mut().push(tasks.len());
                    Ok(())
                }),
            )
        };
        page.init_task_data_state();
        assert!(!page.sync_task_data_state());

        page.add_task(&TaskRecord::new("t1", "Read", 5));
        assert_eq!(page.current_task_list().len(), 1);
        assert!(!page.sync_task_data_state());

        h.clock.advance(60_001);
        assert!(page.sync_task_data_state());
        assert_eq!(*states.borrow(), vec![1]);

        page.force_refresh_tasks();
        assert!(page.local().task_list.is_empty());
        assert!(page.current_task_list().is_empty());
    }

    #[test]
    fn restart_restores_persisted_selection() {
        let device = MemoryDeviceStorage::default();
        {
            let h = harness_with(device.clone());
            let list = vec![child("a"), child("b")];
            h.context.child_state().init_child_state(&list);
            h.context.child_state().switch_child(&list, 1);
        }

        let h = harness_with(device);
        let page = h.context.mount_page("pages/home", PageHooks::new());
        let snapshot = page.init_global_child_state();
        assert_eq!(snapshot.selection.child_id(), Some("b"));
        assert_eq!(snapshot.selection.current_child_index, 1);
        assert!(snapshot.children_list.is_empty());

        let selection = h.context.child_state().init_child_state(&[child("a"), child("b")]);
        assert_eq!(
            selection,
            ChildSelection {
                current_child: Some(child("b")),
                current_child_index: 1,
            }
        );
    }

    #[test]
    fn logout_clears_memory_and_device_then_teardown_stops_everything() {
        let h = harness();
        let list = vec![child("a")];
        h.context.child_state().init_child_state(&list);
        h.context.tasks().set_task_list(&[TaskRecord::new("t1", "Read", 5)]);
        let page = h.context.mount_page("pages/home", PageHooks::new());

        h.context.logout();
        assert!(h.context.store().is_empty());
        assert!(h.device.keys().is_empty());
        assert!(!h.context.cache().has_valid(&CacheKey::TaskList));

        h.context.teardown();
        assert_eq!(page.phase(), PagePhase::Terminated);
        assert!(h.context.sweeper().is_stopped());
        h.clock.advance(120_000);
        assert_eq!(h.context.sweeper().poll(), None);
    }

    #[test]
    fn poll_sweep_reclaims_expired_entries_until_teardown() {
        let h = harness();
        h.context.start_sweeping();
        h.context.store().set("scratch", json!(1), 10);
        h.context.store().set("kept", json!(2), 10_000_000);

        h.clock.advance(h.context.policy().sweep_interval_ms - 1);
        assert_eq!(h.context.poll_sweep(), None);
        h.clock.advance(1);
        assert_eq!(h.context.poll_sweep(), Some(1));
        assert_eq!(h.context.store().cache_keys(), vec!["kept".to_string()]);

        h.context.store().set("scratch", json!(1), 10);
        h.context.teardown();
        h.clock.advance(h.context.policy().sweep_interval_ms);
        assert_eq!(h.context.poll_sweep(), None);
        assert_eq!(h.context.store().len(), 2);
    }

    #[test]
    fn context_can_be_provided_to_reactive_scopes() {
        let runtime = leptos::create_runtime();
        let h = harness();
        let context = Rc::new(h.context);
        provide_household_context(Rc::clone(&context));

        let found = use_household_context().expect("provided");
        assert!(Rc::ptr_eq(&found, &context));
        runtime.dispose();
    }
}
