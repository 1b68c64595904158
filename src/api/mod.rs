use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, patch, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

pub mod logs;
pub mod websocket;

pub async fn health_check() -> &'static str {
    "OK"
}

pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws/logs", get(websocket::ws_handler))
        .route("/logs", get(logs::list_logs))
        .route("/logs/bulk-delete", post(logs::bulk_delete))
        .route("/logs/{id}", delete(logs::delete_log))
        .route("/logs/{id}/favorite", patch(logs::update_favorite))
        .with_state(state)
        .layer(cors_layer(allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|s| match s.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %s, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    tracing::info!(?allowed_origins, "restricting CORS origins");
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
