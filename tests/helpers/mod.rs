#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use studiomind::api::AppContext;
use studiomind::config::AppConfig;
use studiomind::records::timestamp;
use studiomind::server::build_app;
use studiomind::store::DocumentStore;

/// A fresh in-memory store with schema and migrations applied.
pub fn test_store() -> DocumentStore {
    DocumentStore::in_memory().unwrap()
}

/// Defaults with no realtime credential, independent of the environment.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.realtime.api_key = None;
    config
}

/// The full application router over `store`.
pub fn test_app(store: &DocumentStore) -> Router {
    build_app(AppContext::new(store.clone()), &test_config())
}

/// Send one request through the router. Returns the status and the body parsed as JSON
/// (non-JSON bodies come back as a JSON string, empty bodies as `null`).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send_request(app, request).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

/// A user id no other test shares.
pub fn unique_user() -> String {
    format!("user_{}", uuid::Uuid::now_v7())
}

pub fn now_string() -> String {
    timestamp::format(&chrono::Utc::now())
}

pub fn task_body(id: &str, user_id: &str, status: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "title": format!("Task {id}"),
        "description": "Implement it",
        "priority": "high",
        "status": status,
        "created_at": created_at,
    })
}

pub fn project_body(id: &str, user_id: &str, last_modified: &str) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "name": "Space Shooter",
        "description": "Top-down shooter prototype",
        "created_at": last_modified,
        "last_modified": last_modified,
        "scripts": [{"name": "PlayerShip", "type": "MonoBehaviour"}],
    })
}

pub fn memory_body(id: &str, user_id: &str, key: &str, category: &str, value: Value) -> Value {
    let now = now_string();
    json!({
        "id": id,
        "user_id": user_id,
        "key": key,
        "category": category,
        "value": value,
        "created_at": now,
        "updated_at": now,
    })
}

/// The `id` field of every document in a list response.
pub fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|doc| doc["id"].as_str().unwrap().to_string())
        .collect()
}
