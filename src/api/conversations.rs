use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ApiError, AppContext};
use crate::records::{Conversation, CONVERSATIONS};
use crate::store::{Filter, FindOptions, SortOrder};

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ListParams {
    /// `0` or absent means [`DEFAULT_LIMIT`]; larger values are capped at [`MAX_LIMIT`].
    pub fn effective_limit(&self) -> usize {
        match self.limit {
            None | Some(0) => DEFAULT_LIMIT,
            Some(n) => n.min(MAX_LIMIT),
        }
    }
}

pub async fn create_conversation(
    State(ctx): State<AppContext>,
    Json(conversation): Json<Conversation>,
) -> Result<Json<Value>, ApiError> {
    tracing::info!(id = %conversation.id, user_id = %conversation.user_id, "save conversation");

    let document = serde_json::to_value(&conversation)?;
    ctx.store
        .collection(CONVERSATIONS)
        .insert_one(document.clone())
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Conversation saved",
        "conversation": document,
    })))
}

/// Most recent conversations first.
pub async fn list_conversations(
    State(ctx): State<AppContext>,
    Path(user_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let limit = params.effective_limit();
    let conversations = ctx
        .store
        .collection(CONVERSATIONS)
        .find(
            Filter::new().eq("user_id", user_id.as_str()),
            FindOptions::new().sort("timestamp", SortOrder::Desc).limit(limit),
        )
        .await?;

    tracing::debug!(user_id = %user_id, limit, count = conversations.len(), "list conversations");
    Ok(Json(conversations))
}
