//! Health and readiness probes.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use stocklink_core::Channel;

use crate::state::AppState;

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "time": chrono::Utc::now() }))
}

/// `GET /health/ready`
///
/// Verifies that the configured Airtable base is reachable with the
/// configured credentials.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let table = state.config.airtable.table_for(Channel::default());
    match state.airtable.ping(table).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(err) => {
            tracing::error!(error = %err, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
