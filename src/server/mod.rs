//! HTTP API for the dashboard.

mod api;
mod auth;
mod mock;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::azure::WorkItemSink;
use crate::config::Defaults;
use crate::error::{PusherError, Result};
use crate::generator::CompletionBackend;
use crate::store::Store;

/// Everything a request handler needs, built once in `serve` and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub generator: Arc<dyn CompletionBackend>,
    pub sink: Arc<dyn WorkItemSink>,
    pub defaults: Arc<Defaults>,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/generate", post(api::generate))
        .route("/azure-push", post(api::azure_push))
        .route("/user/settings", get(api::get_settings).post(api::save_settings))
        .route("/models", get(api::models))
        .route("/deployments", get(mock::deployments).post(mock::create_deployment))
        .route("/environments", get(mock::environments))
        .route("/stats", get(mock::stats));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(url = %format!("http://{addr}"), "DevOps pusher listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

impl IntoResponse for PusherError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
