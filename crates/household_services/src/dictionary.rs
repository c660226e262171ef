//! Dictionary lookups backed by the domain cache.
//!
//! Categories load cache-then-remote. Domain and transport failures degrade to an empty list
//! with a warning so form pickers still render.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use futures::future::{join_all, FutureExt, LocalBoxFuture, Shared};
use household_state::{CacheKey, DictionaryItem, DomainCache};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{apis::DictionaryApi, client::decode_list};

/// Categories loaded by [`DictionaryManager::init`].
pub const DICTIONARY_CATEGORIES: [&str; 8] = [
    "task_type",
    "reward_type",
    "change_type",
    "task_status",
    "exchange_status",
    "age_group",
    "difficulty",
    "category",
];

/// Reward type used when the dictionary is empty.
pub const DEFAULT_REWARD_TYPE: &str = "physical";
/// Task type used when the dictionary is empty.
pub const DEFAULT_TASK_TYPE: &str = "daily";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Picker option derived from a dictionary item.
pub struct DictionaryOption {
    /// Stored value.
    pub value: String,
    /// Display label.
    pub label: String,
    /// Stable machine code.
    pub code: String,
}

impl From<&DictionaryItem> for DictionaryOption {
    fn from(item: &DictionaryItem) -> Self {
        Self {
            value: item.value.clone(),
            label: item.name.clone(),
            code: item.code.clone(),
        }
    }
}

type PendingLoad = Shared<LocalBoxFuture<'static, ()>>;

/// Cache-then-remote dictionary access.
pub struct DictionaryManager {
    api: DictionaryApi,
    cache: Rc<DomainCache>,
    pending: RefCell<Option<PendingLoad>>,
    initialized: Cell<bool>,
}

impl DictionaryManager {
    /// Creates a manager over `api` and `cache`.
    pub fn new(api: DictionaryApi, cache: Rc<DomainCache>) -> Self {
        Self {
            api,
            cache,
            pending: RefCell::new(None),
            initialized: Cell::new(false),
        }
    }

    /// Returns whether [`DictionaryManager::init`] has completed.
    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    /// Loads every well-known category concurrently, once.
    ///
    /// Callers arriving while the first load is in flight wait for that same load.
    pub async fn init(&self) {
        if self.initialized.get() {
            return;
        }
        let pending = self
            .pending
            .borrow_mut()
            .get_or_insert_with(|| {
                load_all(self.api.clone(), Rc::clone(&self.cache))
                    .boxed_local()
                    .shared()
            })
            .clone();
        pending.await;
        if !self.initialized.replace(true) {
            leptos::logging::log!("dictionary data loaded");
        }
    }

    /// Returns every item of `category`, fetching it on a cache miss.
    pub async fn get_dictionary(&self, category: &str) -> Vec<DictionaryItem> {
        self.init().await;
        load_category(&self.api, &self.cache, category).await
    }

    /// Finds the item of `category` whose value is `value`.
    pub async fn get_dictionary_item(&self, category: &str, value: &str) -> Option<DictionaryItem> {
        self.get_dictionary(category)
            .await
            .into_iter()
            .find(|item| item.value == value)
    }

    /// Finds the item of `category` whose code is `code`.
    pub async fn get_dictionary_item_by_code(
        &self,
        category: &str,
        code: &str,
    ) -> Option<DictionaryItem> {
        self.get_dictionary(category)
            .await
            .into_iter()
            .find(|item| item.code == code)
    }

    /// Returns the display name for `value`, or `value` itself when unknown.
    pub async fn get_dictionary_name(&self, category: &str, value: &str) -> String {
        match self.get_dictionary_item(category, value).await {
            Some(item) => item.name,
            None => value.to_string(),
        }
    }

    /// Drops cached entries and reloads them: one category, or all of them for `None`.
    pub async fn refresh(&self, category: Option<&str>) {
        match category {
            Some(category) => {
                self.cache
                    .invalidate(&CacheKey::Dictionary(category.to_string()));
                load_category(&self.api, &self.cache, category).await;
            }
            None => {
                for category in DICTIONARY_CATEGORIES {
                    self.cache
                        .invalidate(&CacheKey::Dictionary(category.to_string()));
                }
                load_all(self.api.clone(), Rc::clone(&self.cache)).await;
            }
        }
    }

    /// Reward types.
    pub async fn reward_types(&self) -> Vec<DictionaryItem> {
        self.get_dictionary("reward_type").await
    }

    /// Task types.
    pub async fn task_types(&self) -> Vec<DictionaryItem> {
        self.get_dictionary("task_type").await
    }

    /// Task statuses.
    pub async fn task_statuses(&self) -> Vec<DictionaryItem> {
        self.get_dictionary("task_status").await
    }

    /// Exchange statuses.
    pub async fn exchange_statuses(&self) -> Vec<DictionaryItem> {
        self.get_dictionary("exchange_status").await
    }

    /// Points change types.
    pub async fn change_types(&self) -> Vec<DictionaryItem> {
        self.get_dictionary("change_type").await
    }

    /// Reward types as picker options.
    pub async fn reward_type_options(&self) -> Vec<DictionaryOption> {
        self.reward_types()
            .await
            .iter()
            .map(DictionaryOption::from)
            .collect()
    }

    /// Task types as picker options.
    pub async fn task_type_options(&self) -> Vec<DictionaryOption> {
        self.task_types()
            .await
            .iter()
            .map(DictionaryOption::from)
            .collect()
    }

    /// Returns whether `value` is a known reward type.
    pub async fn is_valid_reward_type(&self, value: &str) -> bool {
        self.reward_types()
            .await
            .iter()
            .any(|item| item.value == value)
    }

    /// Returns whether `value` is a known task type.
    pub async fn is_valid_task_type(&self, value: &str) -> bool {
        self.task_types()
            .await
            .iter()
            .any(|item| item.value == value)
    }

    /// First reward type, or [`DEFAULT_REWARD_TYPE`].
    pub async fn default_reward_type(&self) -> String {
        first_value_or(self.reward_types().await, DEFAULT_REWARD_TYPE)
    }

    /// First task type, or [`DEFAULT_TASK_TYPE`].
    pub async fn default_task_type(&self) -> String {
        first_value_or(self.task_types().await, DEFAULT_TASK_TYPE)
    }
}

async fn load_all(api: DictionaryApi, cache: Rc<DomainCache>) {
    join_all(
        DICTIONARY_CATEGORIES
            .iter()
            .map(|category| load_category(&api, &cache, category)),
    )
    .await;
}

async fn load_category(
    api: &DictionaryApi,
    cache: &DomainCache,
    category: &str,
) -> Vec<DictionaryItem> {
    if let Some(items) = cache.dictionary(category) {
        return items;
    }

    let response = match api.get_by_category(category).await {
        Ok(response) => response,
        Err(err) => {
            leptos::logging::warn!("dictionary `{category}` load failed: {err}");
            return Vec::new();
        }
    };
    if !response.is_ok() {
        leptos::logging::warn!(
            "dictionary `{category}` load failed: {}",
            response.msg_or("unknown error")
        );
        return Vec::new();
    }
    if response.data.as_ref().map_or(true, Value::is_null) {
        leptos::logging::warn!("dictionary `{category}` load returned no data");
        return Vec::new();
    }
    match decode_list::<DictionaryItem>(&response) {
        Ok(items) => {
            cache.set_dictionary(category, &items);
            items
        }
        Err(err) => {
            leptos::logging::warn!("dictionary `{category}` payload rejected: {err}");
            Vec::new()
        }
    }
}

fn first_value_or(items: Vec<DictionaryItem>, fallback: &str) -> String {
    items
        .into_iter()
        .next()
        .map(|item| item.value)
        .unwrap_or_else(|| fallback.to_string())
}
