//! REST surface: one axum handler per (resource, verb), each issuing a single store call.
//!
//! Handlers share an [`AppContext`] injected through axum `State`. The realtime bridge is
//! mounted separately by [`crate::realtime::mount_realtime_routes`].

pub mod conversations;
pub mod error;
pub mod health;
pub mod memory;
pub mod projects;
pub mod scripts;
pub mod tasks;

pub use error::ApiError;

use axum::routing::{get, post};
use axum::Router;
use serde_json::Value;

use crate::store::{DocumentStore, UpdateResult};

/// Upper bound on documents returned by the project, task and memory listings.
pub const LIST_LIMIT: usize = 100;

/// Per-process state handed to every handler. Built once at startup.
#[derive(Clone)]
pub struct AppContext {
    pub store: DocumentStore,
}

impl AppContext {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }
}

/// Build the core API router with `ctx` installed as state.
pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/conversations", post(conversations::create_conversation))
        .route("/api/conversations/{user_id}", get(conversations::list_conversations))
        .route("/api/projects", post(projects::create_project))
        // GET takes a user id, PUT a project id; axum needs one parameter name per path.
        .route(
            "/api/projects/{id}",
            get(projects::list_projects).put(projects::update_project),
        )
        .route("/api/tasks", post(tasks::create_task))
        .route("/api/tasks/{id}", get(tasks::list_tasks).put(tasks::update_task))
        .route("/api/memory", post(memory::save_memory))
        .route("/api/memory/{user_id}", get(memory::list_memory))
        .route("/api/generate-script", post(scripts::generate_script))
        .with_state(ctx)
}

/// Response body shared by the update endpoints.
fn updated(label: &str, result: UpdateResult) -> Value {
    serde_json::json!({
        "status": "success",
        "message": format!("{label} updated"),
        "modified": result.modified > 0,
    })
}
