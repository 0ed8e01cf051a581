use axum::Json;
use serde_json::{json, Value};

/// Liveness only: the store is not consulted.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "AI Voice Assistant",
    }))
}
