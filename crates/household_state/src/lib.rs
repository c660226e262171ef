//! Client-side household state: TTL cache, event notification, and cross-page child selection.
//!
//! The crate is single-threaded by construction. Components share ownership through `Rc` and
//! mutate through `RefCell`/`Cell`; no borrow is held while listeners or page hooks run, so
//! callbacks may re-enter any component.
//!
//! [`HouseholdContext`] wires every component over an injected
//! [`household_host::HostServices`] bundle.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod child_state;
pub mod config;
pub mod context;
pub mod facade;
pub mod keys;
pub mod model;
pub mod notifier;
pub mod pages;
pub mod session;
pub mod store;
pub mod sweeper;
pub mod task_data;

pub use child_state::{reconcile_selection, ChildStateSnapshot, ChildStateSync};
pub use config::{CachePolicy, ConfigError};
pub use context::{provide_household_context, use_household_context, HouseholdContext};
pub use facade::DomainCache;
pub use keys::CacheKey;
pub use model::{
    ChildRef, ChildSelection, DictionaryItem, RewardRecord, TaskRecord, TaskStats,
    TemplateRecord, UserProfile,
};
pub use notifier::{EmitReport, EventNotifier, Listener, ListenerFailure};
pub use pages::{
    BroadcastReport, ChildHook, MountedPage, PageFailure, PageHooks, PageId, PageLocalState,
    PagePhase, PageRegistry, RefreshHook, TaskListHook,
};
pub use session::{switched_to_title, PageSession, SWITCH_FAILED_TITLE};
pub use store::{changed_event, deleted_event, CacheEntry, ExpiringStore, CACHE_CLEARED_EVENT};
pub use sweeper::{CacheSweeper, CACHE_SWEPT_EVENT};
pub use task_data::{
    TaskDataManager, TASK_ADDED_EVENT, TASK_DELETED_EVENT, TASK_FORCE_REFRESH_EVENT,
    TASK_LIST_UPDATED_EVENT, TASK_UPDATED_EVENT,
};
