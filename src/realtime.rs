//! Bridge to the external realtime voice provider.
//!
//! The provider's session protocol is opaque here: `POST /api/v1/realtime/session` is
//! relayed to `{base_url}/realtime/sessions` with the configured model and voice, and
//! the provider's status and JSON body come back unchanged. Without a credential the
//! routes are simply not mounted.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::config::RealtimeConfig;

/// Prefix under which the bridge is nested.
pub const MOUNT_PREFIX: &str = "/api/v1";

#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    #[error("request body must be a JSON object: {0}")]
    InvalidBody(serde_json::Error),
    #[error("realtime provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

impl IntoResponse for RealtimeError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Transport(_) => StatusCode::BAD_GATEWAY,
        };
        tracing::warn!(error = %self, "realtime session request failed");
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// HTTP client for the provider's session endpoint.
pub struct RealtimeClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    voice: String,
}

impl RealtimeClient {
    pub fn new(api_key: &str, config: &RealtimeConfig) -> Result<Self, RealtimeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            voice: config.voice.clone(),
        })
    }

    /// Request a new session. Caller-supplied fields override the configured defaults.
    /// Returns the provider's status code and body.
    pub async fn create_session(
        &self,
        overrides: Map<String, Value>,
    ) -> Result<(u16, Value), RealtimeError> {
        let mut body = Map::new();
        body.insert("model".into(), Value::String(self.model.clone()));
        body.insert("voice".into(), Value::String(self.voice.clone()));
        body.extend(overrides);

        let url = format!("{}/realtime/sessions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| json!({ "detail": String::from_utf8_lossy(&bytes) }));

        tracing::info!(status, "realtime session requested");
        Ok((status, body))
    }
}

async fn create_session(
    State(client): State<Arc<RealtimeClient>>,
    body: Bytes,
) -> Result<Response, RealtimeError> {
    let overrides = if body.iter().all(u8::is_ascii_whitespace) {
        Map::new()
    } else {
        serde_json::from_slice(&body).map_err(RealtimeError::InvalidBody)?
    };

    let (status, body) = client.create_session(overrides).await?;
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(body)).into_response())
}

/// Nest the realtime routes under [`MOUNT_PREFIX`] when a credential is available.
///
/// Returns the router and whether the bridge was mounted. A missing or blank
/// credential is a configuration choice, not an error: requests under the prefix then
/// fall through to the router's 404.
pub fn mount_realtime_routes(
    router: Router,
    credential: Option<&str>,
    config: &RealtimeConfig,
) -> (Router, bool) {
    let Some(api_key) = credential.map(str::trim).filter(|key| !key.is_empty()) else {
        tracing::warn!("no realtime credential configured; voice session routes disabled");
        return (router, false);
    };

    match RealtimeClient::new(api_key, config) {
        Ok(client) => {
            let routes = Router::new()
                .route("/realtime/session", post(create_session))
                .with_state(Arc::new(client));
            tracing::info!(base_url = %config.base_url, "realtime session routes mounted");
            (router.nest(MOUNT_PREFIX, routes), true)
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to build realtime client; voice session routes disabled");
            (router, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_credential_does_not_mount() {
        let config = RealtimeConfig::default();
        let (_, mounted) = mount_realtime_routes(Router::new(), None, &config);
        assert!(!mounted);
        let (_, mounted) = mount_realtime_routes(Router::new(), Some("  "), &config);
        assert!(!mounted);
    }

    #[test]
    fn credential_mounts_routes() {
        let config = RealtimeConfig::default();
        let (_, mounted) = mount_realtime_routes(Router::new(), Some("sk-test"), &config);
        assert!(mounted);
    }
}
