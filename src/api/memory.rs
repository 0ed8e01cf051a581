use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ApiError, AppContext, LIST_LIMIT};
use crate::records::{Memory, USER_MEMORY};
use crate::store::{Filter, FindOptions, StoreError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
}

/// Upsert on (user_id, key, category); the whole record replaces any previous one.
pub async fn save_memory(
    State(ctx): State<AppContext>,
    Json(memory): Json<Memory>,
) -> Result<Json<Value>, ApiError> {
    let filter = Filter::new()
        .eq("user_id", memory.user_id.as_str())
        .eq("key", memory.key.as_str())
        .eq("category", memory.category.as_str());

    let Value::Object(fields) = serde_json::to_value(&memory)? else {
        return Err(StoreError::NotAnObject.into());
    };

    let result = ctx
        .store
        .collection(USER_MEMORY)
        .update_one(filter, fields, true)
        .await?;

    tracing::info!(
        user_id = %memory.user_id,
        key = %memory.key,
        category = %memory.category,
        upserted = result.upserted,
        "save memory"
    );
    Ok(Json(json!({ "status": "success", "message": "Memory saved" })))
}

pub async fn list_memory(
    State(ctx): State<AppContext>,
    Path(user_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let filter = Filter::new()
        .eq("user_id", user_id)
        .eq_opt("category", params.category.as_deref());

    let memories = ctx
        .store
        .collection(USER_MEMORY)
        .find(filter, FindOptions::new().limit(LIST_LIMIT))
        .await?;
    Ok(Json(memories))
}
