use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version and which optional capabilities are configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "upskill-api",
        "generation": state.config.anthropic_api_key.is_some(),
        "resource_lookup": state.config.enable_resource_lookup
    }))
}
