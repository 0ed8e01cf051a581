use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Map, Value};

use super::{updated, ApiError, AppContext, LIST_LIMIT};
use crate::records::{timestamp, Project, PROJECTS};
use crate::store::{Filter, FindOptions};

pub async fn create_project(
    State(ctx): State<AppContext>,
    Json(project): Json<Project>,
) -> Result<Json<Value>, ApiError> {
    tracing::info!(id = %project.id, user_id = %project.user_id, name = %project.name, "create project");

    let document = serde_json::to_value(&project)?;
    ctx.store
        .collection(PROJECTS)
        .insert_one(document.clone())
        .await?;

    Ok(Json(json!({ "status": "success", "project": document })))
}

/// Path parameter is the owning user id.
pub async fn list_projects(
    State(ctx): State<AppContext>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let projects = ctx
        .store
        .collection(PROJECTS)
        .find(
            Filter::new().eq("user_id", user_id),
            FindOptions::new().limit(LIST_LIMIT),
        )
        .await?;
    Ok(Json(projects))
}

/// Path parameter is the project id. `last_modified` is always stamped by the server,
/// overriding any value in the body; `created_at` is normalized like on create.
pub async fn update_project(
    State(ctx): State<AppContext>,
    Path(project_id): Path<String>,
    Json(mut fields): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    timestamp::normalize_fields(&mut fields, &["created_at"])?;
    fields.insert(
        "last_modified".into(),
        Value::String(timestamp::format(&chrono::Utc::now())),
    );

    let result = ctx
        .store
        .collection(PROJECTS)
        .update_one(Filter::new().eq("id", project_id.as_str()), fields, false)
        .await?;

    tracing::info!(id = %project_id, matched = result.matched, modified = result.modified, "update project");
    if result.matched == 0 {
        return Err(ApiError::NotFound("Project"));
    }
    Ok(Json(updated("Project", result)))
}
