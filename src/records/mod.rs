//! Record shapes accepted at the API boundary and stored as documents.
//!
//! Each record is keyed by a caller-chosen `id`; nothing here checks uniqueness.
//! Optional fields serialize as `null` so every stored document carries the full shape.

pub mod script;
pub mod timestamp;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Collection holding [`Conversation`] documents.
pub const CONVERSATIONS: &str = "conversations";
/// Collection holding [`Project`] documents.
pub const PROJECTS: &str = "projects";
/// Collection holding [`Task`] documents.
pub const TASKS: &str = "tasks";
/// Collection holding [`Memory`] documents.
pub const USER_MEMORY: &str = "user_memory";

/// Memory category consulted by script generation.
pub const CODING_PREFERENCES: &str = "coding_preferences";

/// One exchange between the user and the assistant. Never updated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    pub message: String,
    pub response: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub context: Option<Map<String, Value>>,
}

/// A Unity project entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Caller-asserted on create; overwritten by the server on every update.
    #[serde(with = "timestamp")]
    pub last_modified: DateTime<Utc>,
    /// Script descriptors, in order.
    #[serde(default)]
    pub scripts: Vec<Map<String, Value>>,
    #[serde(default = "default_project_status")]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    /// Free-form; no transition rules are enforced.
    #[serde(default = "default_task_status")]
    pub status: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub project_id: Option<String>,
}

/// A remembered user preference or fact, unique per (user_id, key, category).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    pub user_id: String,
    pub key: String,
    /// Arbitrary JSON; `null` when omitted.
    #[serde(default)]
    pub value: Value,
    pub category: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/generate-script`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptRequest {
    pub user_id: String,
    pub script_type: String,
    pub description: String,
}

fn default_project_status() -> String {
    "active".into()
}

fn default_priority() -> String {
    "medium".into()
}

fn default_task_status() -> String {
    "pending".into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_defaults_fill_optional_fields() {
        let task: Task = serde_json::from_value(json!({
            "id": "t1",
            "user_id": "u1",
            "title": "Jump",
            "description": "Add double jump",
            "created_at": "2026-10-19T08:00:00+00:00",
        }))
        .unwrap();

        assert_eq!(task.priority, "medium");
        assert_eq!(task.status, "pending");
        assert!(task.due_date.is_none());
        assert!(task.project_id.is_none());

        let stored = serde_json::to_value(&task).unwrap();
        assert_eq!(stored["created_at"], "2026-10-19T08:00:00.000000Z");
        assert_eq!(stored["due_date"], Value::Null);
    }

    #[test]
    fn project_defaults_to_active_with_no_scripts() {
        let project: Project = serde_json::from_value(json!({
            "id": "p1",
            "user_id": "u1",
            "name": "Platformer",
            "description": "2D platformer",
            "created_at": "2026-10-19T08:00:00Z",
            "last_modified": "2026-10-19T08:00:00Z",
        }))
        .unwrap();

        assert_eq!(project.status, "active");
        assert!(project.scripts.is_empty());
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let result = serde_json::from_value::<Conversation>(json!({
            "id": "c1",
            "user_id": "u1",
            "message": "hi",
            "timestamp": "2026-10-19T08:00:00Z",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn memory_value_accepts_any_json() {
        let memory: Memory = serde_json::from_value(json!({
            "id": "m1",
            "user_id": "u1",
            "key": "naming",
            "value": {"fields": "camelCase", "private_prefix": "_"},
            "category": "coding_preferences",
            "created_at": "2026-10-19T08:00:00Z",
            "updated_at": "2026-10-19T08:00:00Z",
        }))
        .unwrap();
        assert_eq!(memory.value["fields"], "camelCase");
    }
}
