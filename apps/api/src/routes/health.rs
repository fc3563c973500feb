use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Reports service version and whether the upload store root is reachable.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let storage = match tokio::fs::metadata(state.store.root()).await {
        Ok(meta) if meta.is_dir() => "ok",
        _ => "unavailable",
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resumematch-api",
        "storage": storage
    }))
}
