use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::metrics;
use crate::state::AppState;
use crate::websocket::handlers::ws_handler;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .route("/metrics", get(metrics::metrics_handler))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "collab-service" }))
}
