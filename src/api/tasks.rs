use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{updated, ApiError, AppContext, LIST_LIMIT};
use crate::records::{timestamp, Task, TASKS};
use crate::store::{Filter, FindOptions, SortOrder};

/// Fields rewritten into the stored timestamp format before an update.
const TIMESTAMP_FIELDS: &[&str] = &["created_at", "due_date"];

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
}

pub async fn create_task(
    State(ctx): State<AppContext>,
    Json(task): Json<Task>,
) -> Result<Json<Value>, ApiError> {
    tracing::info!(id = %task.id, user_id = %task.user_id, status = %task.status, "create task");

    let document = serde_json::to_value(&task)?;
    ctx.store.collection(TASKS).insert_one(document.clone()).await?;

    Ok(Json(json!({ "status": "success", "task": document })))
}

/// Path parameter is the owning user id. Newest tasks first.
pub async fn list_tasks(
    State(ctx): State<AppContext>,
    Path(user_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let filter = Filter::new()
        .eq("user_id", user_id)
        .eq_opt("status", params.status.as_deref());

    let tasks = ctx
        .store
        .collection(TASKS)
        .find(
            filter,
            FindOptions::new()
                .sort("created_at", SortOrder::Desc)
                .limit(LIST_LIMIT),
        )
        .await?;
    Ok(Json(tasks))
}

/// Path parameter is the task id.
pub async fn update_task(
    State(ctx): State<AppContext>,
    Path(task_id): Path<String>,
    Json(mut fields): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    timestamp::normalize_fields(&mut fields, TIMESTAMP_FIELDS)?;

    let result = ctx
        .store
        .collection(TASKS)
        .update_one(Filter::new().eq("id", task_id.as_str()), fields, false)
        .await?;

    tracing::info!(id = %task_id, matched = result.matched, modified = result.modified, "update task");
    if result.matched == 0 {
        return Err(ApiError::NotFound("Task"));
    }
    Ok(Json(updated("Task", result)))
}
