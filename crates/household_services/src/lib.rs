//! Remote-facing services for the household client.
//!
//! [`ApiServices`] wraps each serverless function in a typed facade. [`DictionaryManager`] and
//! [`DataLoader`] combine those calls with the `household_state` cache: they read the cache
//! first and write fetched data back through it.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod apis;
pub mod client;
pub mod dictionary;
pub mod loaders;

pub use apis::{
    ApiServices, ChildrenApi, DictionaryApi, ExchangeApi, ImportExportApi, PointsApi, RewardsApi,
    TasksApi, TemplateDataApi, TemplatesApi, UserApi,
};
pub use client::{decode_list, ApiClient};
pub use dictionary::{
    DictionaryManager, DictionaryOption, DEFAULT_REWARD_TYPE, DEFAULT_TASK_TYPE,
    DICTIONARY_CATEGORIES,
};
pub use loaders::{available_rewards, DataLoader, LoadOutcome, RewardListing};
