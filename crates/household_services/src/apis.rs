//! Typed wrappers for each serverless function. Every method issues exactly one call.
//!
//! Methods return the raw [`CallResponse`]; callers branch on [`CallResponse::is_ok`] and
//! decode `data` themselves. Transport failures propagate as [`RemoteError`].

use std::rc::Rc;

use household_host::{CallRequest, CallResponse, RemoteError, RemoteService};
use serde_json::Value;

use crate::client::ApiClient;

type ApiResult = Result<CallResponse, RemoteError>;

/// `getUserInfo` function name.
pub const USER_FUNCTION: &str = "getUserInfo";
/// `manageChildren` function name.
pub const CHILDREN_FUNCTION: &str = "manageChildren";
/// `manageTasks` function name.
pub const TASKS_FUNCTION: &str = "manageTasks";
/// `manageRewards` function name.
pub const REWARDS_FUNCTION: &str = "manageRewards";
/// `managePoints` function name, shared by points and exchanges.
pub const POINTS_FUNCTION: &str = "managePoints";
/// `manageDictionary` function name.
pub const DICTIONARY_FUNCTION: &str = "manageDictionary";
/// `manageTemplates` function name.
pub const TEMPLATES_FUNCTION: &str = "manageTemplates";
/// `manageTemplateData` function name.
pub const TEMPLATE_DATA_FUNCTION: &str = "manageTemplateData";
/// `importExportTemplates` function name.
pub const IMPORT_EXPORT_FUNCTION: &str = "importExportTemplates";

#[derive(Clone)]
/// Signed-in user profile calls.
pub struct UserApi {
    client: ApiClient,
}

impl UserApi {
    /// Fetches the current user.
    pub async fn get_current_user(&self) -> ApiResult {
        self.client.action(USER_FUNCTION, "getCurrent").await
    }

    /// Updates profile fields.
    pub async fn update_profile(&self, data: Value) -> ApiResult {
        self.client
            .action_with_data(USER_FUNCTION, "update", data)
            .await
    }

    /// Signs in, creating the account on first use.
    pub async fn login_or_register(&self, user_info: Value) -> ApiResult {
        self.client
            .action_with_data(USER_FUNCTION, "loginOrRegister", user_info)
            .await
    }
}

#[derive(Clone)]
/// Children CRUD calls.
pub struct ChildrenApi {
    client: ApiClient,
}

impl ChildrenApi {
    /// Lists the parent's children.
    pub async fn list(&self) -> ApiResult {
        self.client.action(CHILDREN_FUNCTION, "list").await
    }

    /// Creates a child.
    pub async fn create(&self, data: Value) -> ApiResult {
        self.client
            .action_with_data(CHILDREN_FUNCTION, "create", data)
            .await
    }

    /// Updates a child.
    pub async fn update(&self, id: &str, data: Value) -> ApiResult {
        let request = CallRequest::new("update")
            .with_param("id", id)
            .with_data(data);
        self.client.call(CHILDREN_FUNCTION, request).await
    }

    /// Deletes a child.
    pub async fn delete(&self, id: &str) -> ApiResult {
        let request = CallRequest::new("delete").with_param("id", id);
        self.client.call(CHILDREN_FUNCTION, request).await
    }

    /// Fetches a child's statistics.
    pub async fn get_stats(&self, child_id: &str) -> ApiResult {
        let request = CallRequest::new("getStats").with_param("childId", child_id);
        self.client.call(CHILDREN_FUNCTION, request).await
    }
}

#[derive(Clone)]
/// Task CRUD and completion calls.
pub struct TasksApi {
    client: ApiClient,
}

impl TasksApi {
    /// Lists tasks. `options` fields (for example `childId`) become top-level parameters.
    pub async fn list(&self, options: Value) -> ApiResult {
        let request = CallRequest::new("list").with_params(options);
        self.client.call(TASKS_FUNCTION, request).await
    }

    /// Creates a task.
    pub async fn create(&self, data: Value) -> ApiResult {
        self.client
            .action_with_data(TASKS_FUNCTION, "create", data)
            .await
    }

    /// Updates a task.
    pub async fn update(&self, id: &str, data: Value) -> ApiResult {
        let request = CallRequest::new("update")
            .with_param("id", id)
            .with_data(data);
        self.client.call(TASKS_FUNCTION, request).await
    }

    /// Deletes a task.
    pub async fn delete(&self, id: &str) -> ApiResult {
        let request = CallRequest::new("delete").with_param("id", id);
        self.client.call(TASKS_FUNCTION, request).await
    }

    /// Marks a task completed for a child.
    pub async fn complete(&self, task_id: &str, child_id: &str) -> ApiResult {
        let request = CallRequest::new("complete")
            .with_param("taskId", task_id)
            .with_param("childId", child_id);
        self.client.call(TASKS_FUNCTION, request).await
    }
}

#[derive(Clone)]
/// Reward CRUD calls.
pub struct RewardsApi {
    client: ApiClient,
}

impl RewardsApi {
    /// Lists rewards. `options` fields become top-level parameters.
    pub async fn list(&self, options: Value) -> ApiResult {
        let request = CallRequest::new("list").with_params(options);
        self.client.call(REWARDS_FUNCTION, request).await
    }

    /// Creates a reward.
    pub async fn create(&self, data: Value) -> ApiResult {
        self.client
            .action_with_data(REWARDS_FUNCTION, "create", data)
            .await
    }

    /// Updates a reward.
    pub async fn update(&self, id: &str, data: Value) -> ApiResult {
        let request = CallRequest::new("update")
            .with_param("id", id)
            .with_data(data);
        self.client.call(REWARDS_FUNCTION, request).await
    }

    /// Deletes a reward.
    pub async fn delete(&self, id: &str) -> ApiResult {
        let request = CallRequest::new("delete").with_param("id", id);
        self.client.call(REWARDS_FUNCTION, request).await
    }
}

#[derive(Clone)]
/// Points ledger calls.
pub struct PointsApi {
    client: ApiClient,
}

impl PointsApi {
    /// Fetches a child's points history. `options` fields become top-level parameters.
    pub async fn get_history(&self, child_id: &str, options: Value) -> ApiResult {
        let request = CallRequest::new("getHistory")
            .with_param("childId", child_id)
            .with_params(options);
        self.client.call(POINTS_FUNCTION, request).await
    }

    /// Fetches a child's balance.
    pub async fn get_balance(&self, child_id: &str) -> ApiResult {
        let request = CallRequest::new("getBalance").with_param("childId", child_id);
        self.client.call(POINTS_FUNCTION, request).await
    }

    /// Fetches a child's points statistics.
    pub async fn get_statistics(&self, child_id: &str) -> ApiResult {
        let request = CallRequest::new("getStatistics").with_param("childId", child_id);
        self.client.call(POINTS_FUNCTION, request).await
    }
}

#[derive(Clone)]
/// Reward exchange calls, served by the points function.
pub struct ExchangeApi {
    client: ApiClient,
}

impl ExchangeApi {
    /// Requests an exchange.
    pub async fn create_exchange(&self, data: Value) -> ApiResult {
        self.client
            .action_with_data(POINTS_FUNCTION, "createExchange", data)
            .await
    }

    /// Fetches a child's exchange history.
    pub async fn get_history(&self, child_id: &str) -> ApiResult {
        let request = CallRequest::new("getExchangeHistory").with_param("childId", child_id);
        self.client.call(POINTS_FUNCTION, request).await
    }

    /// Approves a pending exchange.
    pub async fn approve(&self, exchange_id: &str) -> ApiResult {
        let request = CallRequest::new("approveExchange").with_param("exchangeId", exchange_id);
        self.client.call(POINTS_FUNCTION, request).await
    }

    /// Rejects a pending exchange.
    pub async fn reject(&self, exchange_id: &str) -> ApiResult {
        let request = CallRequest::new("rejectExchange").with_param("exchangeId", exchange_id);
        self.client.call(POINTS_FUNCTION, request).await
    }
}

#[derive(Clone)]
/// Dictionary calls.
pub struct DictionaryApi {
    client: ApiClient,
}

impl DictionaryApi {
    /// Fetches one category.
    pub async fn get_by_category(&self, category: &str) -> ApiResult {
        let request = CallRequest::new("getByCategory").with_param("category", category);
        self.client.call(DICTIONARY_FUNCTION, request).await
    }

    /// Fetches every category.
    pub async fn get_all(&self) -> ApiResult {
        self.client.action(DICTIONARY_FUNCTION, "getAll").await
    }

    /// Adds an item.
    pub async fn add(&self, data: Value) -> ApiResult {
        self.client
            .action_with_data(DICTIONARY_FUNCTION, "add", data)
            .await
    }

    /// Updates an item.
    pub async fn update(&self, id: &str, data: Value) -> ApiResult {
        let request = CallRequest::new("update")
            .with_param("id", id)
            .with_data(data);
        self.client.call(DICTIONARY_FUNCTION, request).await
    }

    /// Deletes an item.
    pub async fn delete(&self, id: &str) -> ApiResult {
        let request = CallRequest::new("delete").with_param("id", id);
        self.client.call(DICTIONARY_FUNCTION, request).await
    }

    /// Asks the backend to rebuild its dictionary data.
    pub async fn refresh(&self) -> ApiResult {
        self.client.action(DICTIONARY_FUNCTION, "refresh").await
    }
}

#[derive(Clone)]
/// Task and reward template calls.
pub struct TemplatesApi {
    client: ApiClient,
}

impl TemplatesApi {
    /// Fetches task templates for an age group.
    pub async fn get_task_templates(&self, age_group: &str) -> ApiResult {
        let request = CallRequest::new("getTaskTemplates").with_param("ageGroup", age_group);
        self.client.call(TEMPLATES_FUNCTION, request).await
    }

    /// Fetches reward templates for an age group.
    pub async fn get_reward_templates(&self, age_group: &str) -> ApiResult {
        let request = CallRequest::new("getRewardTemplates").with_param("ageGroup", age_group);
        self.client.call(TEMPLATES_FUNCTION, request).await
    }

    /// Instantiates a template into real tasks or rewards.
    pub async fn apply_template(&self, data: Value) -> ApiResult {
        self.client
            .action_with_data(TEMPLATES_FUNCTION, "applyTemplate", data)
            .await
    }

    /// Fetches every template for an age group.
    pub async fn get_by_age_group(&self, age_group: &str) -> ApiResult {
        let request = CallRequest::new("getByAgeGroup").with_param("ageGroup", age_group);
        self.client.call(TEMPLATES_FUNCTION, request).await
    }
}

#[derive(Clone)]
/// Template administration calls.
pub struct TemplateDataApi {
    client: ApiClient,
}

impl TemplateDataApi {
    /// Lists task templates. `options` fields become top-level parameters.
    pub async fn task_template_list(&self, options: Value) -> ApiResult {
        let request = CallRequest::new("getTaskTemplateList").with_params(options);
        self.client.call(TEMPLATE_DATA_FUNCTION, request).await
    }

    /// Lists reward templates. `options` fields become top-level parameters.
    pub async fn reward_template_list(&self, options: Value) -> ApiResult {
        let request = CallRequest::new("getRewardTemplateList").with_params(options);
        self.client.call(TEMPLATE_DATA_FUNCTION, request).await
    }

    /// Creates a task template.
    pub async fn create_task_template(&self, data: Value) -> ApiResult {
        self.client
            .action_with_data(TEMPLATE_DATA_FUNCTION, "createTaskTemplate", data)
            .await
    }

    /// Updates a task template.
    pub async fn update_task_template(&self, id: &str, data: Value) -> ApiResult {
        let request = CallRequest::new("updateTaskTemplate")
            .with_param("id", id)
            .with_data(data);
        self.client.call(TEMPLATE_DATA_FUNCTION, request).await
    }

    /// Deletes a task template.
    pub async fn delete_task_template(&self, id: &str) -> ApiResult {
        let request = CallRequest::new("deleteTaskTemplate").with_param("id", id);
        self.client.call(TEMPLATE_DATA_FUNCTION, request).await
    }

    /// Creates a reward template.
    pub async fn create_reward_template(&self, data: Value) -> ApiResult {
        self.client
            .action_with_data(TEMPLATE_DATA_FUNCTION, "createRewardTemplate", data)
            .await
    }

    /// Updates a reward template.
    pub async fn update_reward_template(&self, id: &str, data: Value) -> ApiResult {
        let request = CallRequest::new("updateRewardTemplate")
            .with_param("id", id)
            .with_data(data);
        self.client.call(TEMPLATE_DATA_FUNCTION, request).await
    }

    /// Deletes a reward template.
    pub async fn delete_reward_template(&self, id: &str) -> ApiResult {
        let request = CallRequest::new("deleteRewardTemplate").with_param("id", id);
        self.client.call(TEMPLATE_DATA_FUNCTION, request).await
    }

    /// Fetches template usage statistics.
    pub async fn stats(&self) -> ApiResult {
        self.client.action(TEMPLATE_DATA_FUNCTION, "getStats").await
    }

    /// Activates or deactivates a template.
    pub async fn toggle_status(&self, id: &str, is_active: bool) -> ApiResult {
        let request = CallRequest::new("toggleStatus")
            .with_param("id", id)
            .with_param("isActive", is_active);
        self.client.call(TEMPLATE_DATA_FUNCTION, request).await
    }
}

#[derive(Clone)]
/// Template import and export calls.
pub struct ImportExportApi {
    client: ApiClient,
}

impl ImportExportApi {
    /// Imports templates.
    pub async fn import_templates(&self, data: Value) -> ApiResult {
        self.client
            .action_with_data(IMPORT_EXPORT_FUNCTION, "import", data)
            .await
    }

    /// Exports templates. `options` fields become top-level parameters.
    pub async fn export_templates(&self, options: Value) -> ApiResult {
        let request = CallRequest::new("export").with_params(options);
        self.client.call(IMPORT_EXPORT_FUNCTION, request).await
    }

    /// Fetches past import and export runs.
    pub async fn records(&self) -> ApiResult {
        self.client.action(IMPORT_EXPORT_FUNCTION, "getRecords").await
    }
}

#[derive(Clone)]
/// Every API wrapper over one shared client.
pub struct ApiServices {
    /// User profile calls.
    pub user: UserApi,
    /// Children calls.
    pub children: ChildrenApi,
    /// Task calls.
    pub tasks: TasksApi,
    /// Reward calls.
    pub rewards: RewardsApi,
    /// Points calls.
    pub points: PointsApi,
    /// Exchange calls.
    pub exchange: ExchangeApi,
    /// Dictionary calls.
    pub dictionary: DictionaryApi,
    /// Template calls.
    pub templates: TemplatesApi,
    /// Template administration calls.
    pub template_data: TemplateDataApi,
    /// Template import and export calls.
    pub import_export: ImportExportApi,
}

impl ApiServices {
    /// Builds every wrapper over `remote`.
    pub fn new(remote: Rc<dyn RemoteService>) -> Self {
        Self::with_client(ApiClient::new(remote))
    }

    /// Builds every wrapper over an existing client.
    pub fn with_client(client: ApiClient) -> Self {
        Self {
            user: UserApi {
                client: client.clone(),
            },
            children: ChildrenApi {
                client: client.clone(),
            },
            tasks: TasksApi {
                client: client.clone(),
            },
            rewards: RewardsApi {
                client: client.clone(),
            },
            points: PointsApi {
                client: client.clone(),
            },
            exchange: ExchangeApi {
                client: client.clone(),
            },
            dictionary: DictionaryApi {
                client: client.clone(),
            },
            templates: TemplatesApi {
                client: client.clone(),
            },
            template_data: TemplateDataApi {
                client: client.clone(),
            },
            import_export: ImportExportApi { client },
        }
    }
}
