//! HTTP server bootstrap.
//!
//! [`build_app`] assembles the full router (core API, optional realtime bridge, CORS
//! and request tracing); [`serve`] owns the application context for the lifetime of
//! the listener and closes the store after graceful shutdown.

use anyhow::Result;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::{self, AppContext};
use crate::config::AppConfig;
use crate::realtime;
use crate::store::DocumentStore;

/// Assemble the application router around `ctx`.
pub fn build_app(ctx: AppContext, config: &AppConfig) -> Router {
    let router = api::routes(ctx);
    let (router, mounted) =
        realtime::mount_realtime_routes(router, config.realtime_credential(), &config.realtime);
    tracing::debug!(realtime = mounted, "router assembled");

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Open the store, bind the listener and serve until ctrl-c.
pub async fn serve(config: AppConfig) -> Result<()> {
    let store = DocumentStore::open(&config.storage.url)?;
    let ctx = AppContext::new(store.clone());
    let app = build_app(ctx, &config);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "assistant backend listening at http://{bind_addr}/api");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    if let Err(e) = store.close() {
        tracing::warn!(error = %e, "document store not closed cleanly");
    }
    Ok(())
}
