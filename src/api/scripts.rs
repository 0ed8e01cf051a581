use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::{ApiError, AppContext};
use crate::records::script::render_template;
use crate::records::{timestamp, ScriptRequest, CODING_PREFERENCES, USER_MEMORY};
use crate::store::{Filter, FindOptions};

/// Maximum number of stored preferences consulted per request.
const PREFERENCE_LOOKUP_LIMIT: usize = 10;

/// Return the Unity boilerplate for the requested script.
///
/// The caller's `coding_preferences` are fetched and logged but do not influence the
/// rendered template.
pub async fn generate_script(
    State(ctx): State<AppContext>,
    Json(request): Json<ScriptRequest>,
) -> Result<Json<Value>, ApiError> {
    let preferences = ctx
        .store
        .collection(USER_MEMORY)
        .find(
            Filter::new()
                .eq("user_id", request.user_id.as_str())
                .eq("category", CODING_PREFERENCES),
            FindOptions::new().limit(PREFERENCE_LOOKUP_LIMIT),
        )
        .await?;

    tracing::debug!(
        user_id = %request.user_id,
        script_type = %request.script_type,
        preferences = preferences.len(),
        "generate script"
    );

    Ok(Json(json!({
        "status": "success",
        "script": render_template(&request.script_type, &request.description),
        "generated_at": timestamp::format(&chrono::Utc::now()),
    })))
}
