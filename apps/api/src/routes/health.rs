use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Service version plus which collaborators have keys configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "folio-api",
        "generation_configured": state.config.gemini_api_key.is_some(),
        "identity_configured": state.config.firebase_api_key.is_some(),
    }))
}
