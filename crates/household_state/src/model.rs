//! Domain records cached by the client.
//!
//! Records keep every field the backend sends: the few fields the client reads are typed and
//! the rest ride along in a flattened map so a cached snapshot round-trips unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A child of the signed-in parent.
pub struct ChildRef {
    /// Backend document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Current points balance.
    #[serde(default)]
    pub total_points: i64,
    /// Remaining backend fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChildRef {
    /// Creates a child with only identity, name, and balance.
    pub fn new(id: impl Into<String>, name: impl Into<String>, total_points: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            total_points,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Signed-in parent profile.
pub struct UserProfile {
    /// Backend document id.
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub nick_name: String,
    /// Remaining backend fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A task assigned to one or more children.
pub struct TaskRecord {
    /// Backend document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Points granted on completion.
    #[serde(default)]
    pub points: i64,
    /// Whether the selected child has completed the task.
    #[serde(default)]
    pub completed: bool,
    /// Lifecycle status such as `active`.
    #[serde(default)]
    pub status: String,
    /// Remaining backend fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskRecord {
    /// Creates an active, uncompleted task.
    pub fn new(id: impl Into<String>, name: impl Into<String>, points: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            points,
            completed: false,
            status: "active".to_string(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A reward children can exchange points for.
pub struct RewardRecord {
    /// Backend document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Points required for an exchange.
    #[serde(default)]
    pub points: i64,
    /// Remaining backend fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RewardRecord {
    /// Creates a reward with only identity, name, and cost.
    pub fn new(id: impl Into<String>, name: impl Into<String>, points: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            points,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One entry of a dictionary category.
pub struct DictionaryItem {
    /// Stable machine code.
    #[serde(default)]
    pub code: String,
    /// Value stored on records referring to this item.
    #[serde(default)]
    pub value: String,
    /// Display label.
    #[serde(default)]
    pub name: String,
    /// Owning category.
    #[serde(default)]
    pub category: String,
    /// Remaining backend fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A task or reward template.
pub struct TemplateRecord {
    /// Backend document id.
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Remaining backend fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// The selected child and its position in the children list.
pub struct ChildSelection {
    /// Selected child, `None` when no children exist.
    pub current_child: Option<ChildRef>,
    /// Position of the selected child; `0` when nothing is selected.
    pub current_child_index: usize,
}

impl ChildSelection {
    /// Returns the selected child's id.
    pub fn child_id(&self) -> Option<&str> {
        self.current_child.as_ref().map(|child| child.id.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Completion counts over the cached task list.
pub struct TaskStats {
    /// Number of tasks.
    pub total: usize,
    /// Tasks not yet completed.
    pub active: usize,
    /// Completed tasks.
    pub completed: usize,
}

impl TaskStats {
    /// Computes counts for `tasks`.
    pub fn from_tasks(tasks: &[TaskRecord]) -> Self {
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            total: tasks.len(),
            active: tasks.len() - completed,
            completed,
        }
    }
}
