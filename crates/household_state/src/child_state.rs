//! Process-wide "selected child" shared by every mounted page.

use std::rc::Rc;

use crate::{
    facade::DomainCache,
    model::{ChildRef, ChildSelection},
    pages::{BroadcastReport, PageRegistry},
};

#[derive(Debug, Clone, PartialEq, Default)]
/// The selection together with the list it indexes into.
pub struct ChildStateSnapshot {
    /// Selected child and index.
    pub selection: ChildSelection,
    /// Cached children list, empty when not cached.
    pub children_list: Vec<ChildRef>,
}

/// Chooses the selection for a freshly loaded `children` list.
///
/// A previously selected child that is still listed stays selected at its new position;
/// otherwise the first child is selected. An empty list selects nothing.
pub fn reconcile_selection(previous: Option<&ChildRef>, children: &[ChildRef]) -> ChildSelection {
    let Some(first) = children.first() else {
        return ChildSelection::default();
    };
    let kept = previous.and_then(|previous| {
        children
            .iter()
            .position(|child| child.id == previous.id)
            .map(|index| (index, &children[index]))
    });
    let (index, child) = kept.unwrap_or((0, first));
    ChildSelection {
        current_child: Some(child.clone()),
        current_child_index: index,
    }
}

/// Keeps the cached selection and mounted pages in agreement.
pub struct ChildStateSync {
    cache: Rc<DomainCache>,
    pages: Rc<PageRegistry>,
}

impl ChildStateSync {
    /// Creates a synchronizer over `cache` that broadcasts to `pages`.
    pub fn new(cache: Rc<DomainCache>, pages: Rc<PageRegistry>) -> Self {
        Self { cache, pages }
    }

    /// Returns the cached selection and children list.
    pub fn snapshot(&self) -> ChildStateSnapshot {
        ChildStateSnapshot {
            selection: self.cache.selection(),
            children_list: self.cache.children_list().unwrap_or_default(),
        }
    }

    /// Reconciles the cached selection against a freshly loaded `children` list and stores the
    /// result together with the list. Calling it again with the same list changes nothing.
    pub fn init_child_state(&self, children: &[ChildRef]) -> ChildSelection {
        let previous = self.cache.current_child();
        let selection = reconcile_selection(previous.as_ref(), children);
        self.cache.write_selection(&selection, children);
        selection
    }

    /// Selects `children[index]`, stores it with the list, and broadcasts to every mounted page.
    ///
    /// Returns `false` without touching any state when `index` is out of range.
    pub fn switch_child(&self, children: &[ChildRef], index: usize) -> bool {
        self.switch_child_with_report(children, index).is_some()
    }

    /// Like [`ChildStateSync::switch_child`] but returns the broadcast outcome.
    pub fn switch_child_with_report(
        &self,
        children: &[ChildRef],
        index: usize,
    ) -> Option<BroadcastReport> {
        let Some(child) = children.get(index) else {
            leptos::logging::warn!(
                "child switch rejected: index {index} out of range for {} children",
                children.len()
            );
            return None;
        };

        let selection = ChildSelection {
            current_child: Some(child.clone()),
            current_child_index: index,
        };
        self.cache.write_selection(&selection, children);
        Some(self.pages.broadcast_child_changed(child, index))
    }

    /// Stores a children list and repairs the selection against it without broadcasting.
    pub fn set_global_children_list(&self, children: &[ChildRef]) -> ChildSelection {
        self.cache.set_global_children_list(children)
    }

    /// Forgets the selection everywhere, for example on logout.
    pub fn clear_child_state(&self) {
        self.cache.clear_child_cache();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use household_host::{ManualClock, MemoryDeviceStorage};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        config::CachePolicy, notifier::EventNotifier, pages::PageHooks, store::ExpiringStore,
    };

    fn sync() -> (ChildStateSync, Rc<DomainCache>, Rc<PageRegistry>) {
        let policy = CachePolicy::default();
        let store = Rc::new(ExpiringStore::new(
            Rc::new(EventNotifier::new()),
            Rc::new(ManualClock::starting_at(0)),
            policy.default_ttl_ms,
        ));
        let cache = Rc::new(DomainCache::new(
            store,
            Rc::new(MemoryDeviceStorage::default()),
            policy,
        ));
        let pages = Rc::new(PageRegistry::new());
        (
            ChildStateSync::new(Rc::clone(&cache), Rc::clone(&pages)),
            cache,
            pages,
        )
    }

    fn kids(ids: &[&str]) -> Vec<ChildRef> {
        ids.iter().map(|id| ChildRef::new(*id, id.to_uppercase(), 0)).collect()
    }

    #[test]
    fn reconcile_keeps_listed_child_and_resets_otherwise() {
        let list = kids(&["a", "b", "c"]);
        let kept = reconcile_selection(Some(&list[2]), &list);
        assert_eq!((kept.child_id(), kept.current_child_index), (Some("c"), 2));

        let reset = reconcile_selection(Some(&ChildRef::new("z", "Z", 0)), &list);
        assert_eq!((reset.child_id(), reset.current_child_index), (Some("a"), 0));

        assert_eq!(reconcile_selection(None, &list).child_id(), Some("a"));
        assert_eq!(reconcile_selection(Some(&list[0]), &[]), ChildSelection::default());
    }

    #[test]
    fn init_child_state_is_idempotent() {
        let (sync, cache, _) = sync();
        let list = kids(&["a", "b"]);

        let first = sync.init_child_state(&list);
        let second = sync.init_child_state(&list);

        assert_eq!(first, second);
        assert_eq!(cache.children_list(), Some(list));
    }

    #[test]
    fn init_child_state_with_empty_list_clears_selection() {
        let (sync, cache, _) = sync();
        sync.init_child_state(&kids(&["a"]));

        let selection = sync.init_child_state(&[]);

        assert_eq!(selection, ChildSelection::default());
        assert_eq!(cache.current_child(), None);
        assert_eq!(cache.current_child_index(), 0);
    }

    #[test]
    fn out_of_range_switch_changes_nothing() {
        let (sync, cache, pages) = sync();
        let list = kids(&["a", "b"]);
        sync.init_child_state(&list);
        let called = Rc::new(RefCell::new(false));
        {
            let called = Rc::clone(&called);
            pages.mount(
                "pages/home",
                PageHooks::new().on_child_changed(move |_, _| {
                    *called.borrow_mut() = true;
                    Ok(())
                }),
            );
        }
        let before = sync.snapshot();

        assert!(!sync.switch_child(&list, 2));
        assert!(!sync.switch_child(&[], 0));

        assert_eq!(sync.snapshot(), before);
        assert_eq!(cache.current_child_index(), 0);
        assert!(!*called.borrow());
    }

    #[test]
    fn switch_writes_selection_before_broadcasting() {
        let (sync, cache, pages) = sync();
        let list = kids(&["a", "b"]);
        sync.init_child_state(&list);
        let observed = Rc::new(RefCell::new(None));
        {
            let cache = Rc::clone(&cache);
            let observed = Rc::clone(&observed);
            pages.mount(
                "pages/tasks",
                PageHooks::new().on_child_changed(move |child, index| {
                    *observed.borrow_mut() = Some((
                        child.id.clone(),
                        index,
                        cache.current_child().map(|c| c.id),
                    ));
                    Ok(())
                }),
            );
        }

        let report = sync.switch_child_with_report(&list, 1).expect("valid index");

        assert_eq!(report.notified, 1);
        assert_eq!(
            *observed.borrow(),
            Some(("b".to_string(), 1, Some("b".to_string())))
        );
    }

    #[test]
    fn set_global_children_list_and_clear() {
        let (sync, cache, _) = sync();
        sync.init_child_state(&kids(&["a", "b"]));
        sync.switch_child(&kids(&["a", "b"]), 1);

        let selection = sync.set_global_children_list(&kids(&["c"]));
        assert_eq!(selection.child_id(), Some("c"));

        sync.clear_child_state();
        assert_eq!(sync.snapshot(), ChildStateSnapshot::default());
        assert_eq!(cache.children_list(), None);
    }
}
