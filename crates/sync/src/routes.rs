//! HTTP route handlers for the sync service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health              - Health check with queue depths
//! GET  /status              - Sync status (queue depths, live tracker entries, uptime)
//! POST /webhook/airtable    - Airtable change webhook (X-Airtable-Signature)
//! POST /webhook/woocommerce - WooCommerce change webhook (X-WC-Webhook-Signature)
//! POST /sync/manual         - Queue specific records or products
//! POST /sync/full           - Queue a full sync in one or both directions
//! ```

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::queue::{AirtableTask, WooTask};
use crate::signature::{verify_airtable_signature, verify_woo_signature};
use crate::state::AppState;
use crate::woocommerce::WooProduct;

/// Build the full router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/webhook/airtable", post(airtable_webhook))
        .route("/webhook/woocommerce", post(woo_webhook))
        .route("/sync/manual", post(manual_sync))
        .route("/sync/full", post(full_sync))
}

/// What an Airtable webhook body asks us to do.
#[derive(Debug, PartialEq, Eq)]
pub enum AirtableEvent {
    /// One or more record-level tasks.
    Tasks(Vec<AirtableTask>),
    /// Envelope names a different base.
    WrongBase,
    /// Nothing actionable in the body.
    Empty,
}

/// Classify an Airtable webhook envelope.
///
/// Single-record payloads carry a `type` ("record.created" and similar)
/// and a `record`; batch payloads carry `records` and are treated as
/// updates. The envelope's `base.id`, when present, must match ours.
#[must_use]
pub fn classify_airtable_event(data: &Value, expected_base: &str) -> AirtableEvent {
    if let Some(base_id) = data
        .get("base")
        .and_then(|b| b.get("id"))
        .and_then(Value::as_str)
        && base_id != expected_base
    {
        return AirtableEvent::WrongBase;
    }

    let webhook_type = data
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase();

    if let Some(record_id) = data
        .get("record")
        .and_then(|r| r.get("id"))
        .and_then(Value::as_str)
    {
        let record_id = record_id.to_string();
        // Record-scoped types only; schema and table events carry no work
        let task = match webhook_type.as_str() {
            "record.deleted" => Some(AirtableTask::Delete { record_id }),
            "record.created" | "record.updated" | "record.changed" => {
                Some(AirtableTask::Upsert { record_id })
            }
            _ => None,
        };
        return match task {
            Some(task) => AirtableEvent::Tasks(vec![task]),
            None => AirtableEvent::Empty,
        };
    }

    if let Some(records) = data.get("records").and_then(Value::as_array) {
        let tasks: Vec<AirtableTask> = records
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_str))
            .map(|id| AirtableTask::Upsert {
                record_id: id.to_string(),
            })
            .collect();
        if !tasks.is_empty() {
            return AirtableEvent::Tasks(tasks);
        }
    }

    AirtableEvent::Empty
}

/// `POST /webhook/airtable`
pub async fn airtable_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>)> {
    let signature = headers
        .get("x-airtable-signature")
        .and_then(|v| v.to_str().ok());
    verify_airtable_signature(state.config.webhook_secret.as_ref(), &body, signature)?;

    let data: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;

    match classify_airtable_event(&data, &state.config.airtable.base_id) {
        AirtableEvent::WrongBase => {
            tracing::warn!("Airtable webhook for a different base, ignoring");
            Err(AppError::BadRequest("Invalid base ID".to_string()))
        }
        AirtableEvent::Empty => {
            Ok((StatusCode::OK, Json(json!({ "status": "no action taken" }))))
        }
        AirtableEvent::Tasks(tasks) => {
            let count = tasks.len();
            for task in tasks {
                state.queues.enqueue_airtable(task);
            }
            tracing::info!(count, "Airtable webhook queued");
            Ok((
                StatusCode::ACCEPTED,
                Json(json!({ "status": "queued", "count": count })),
            ))
        }
    }
}

/// `POST /webhook/woocommerce`
pub async fn woo_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>)> {
    let signature = headers
        .get("x-wc-webhook-signature")
        .and_then(|v| v.to_str().ok());
    verify_woo_signature(state.config.webhook_secret.as_ref(), &body, signature)?;

    let product: WooProduct = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid product body: {e}")))?;
    if product.id == 0 {
        // Woo pings each registered webhook with a bodyless test request
        return Ok((StatusCode::OK, Json(json!({ "status": "no action taken" }))));
    }

    let product_id = product.id;
    state.queues.enqueue_woo(WooTask { product });
    tracing::info!(product_id, "WooCommerce webhook queued");
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "status": "queued", "product_id": product_id })),
    ))
}

/// Body for `POST /sync/manual`.
#[derive(Debug, Deserialize)]
pub struct ManualSyncRequest {
    /// `airtable` or `woocommerce`: which side the IDs belong to.
    pub source: stocklink_core::SyncOrigin,
    #[serde(default)]
    pub record_ids: Vec<String>,
}

/// `POST /sync/manual`
pub async fn manual_sync(
    State(state): State<AppState>,
    Json(body): Json<ManualSyncRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let count = body.record_ids.len();
    match body.source {
        stocklink_core::SyncOrigin::Airtable => {
            for record_id in body.record_ids {
                state
                    .queues
                    .enqueue_airtable(AirtableTask::Upsert { record_id });
            }
        }
        stocklink_core::SyncOrigin::WooCommerce => {
            for raw_id in body.record_ids {
                let product_id: i64 = raw_id
                    .parse()
                    .map_err(|_| AppError::BadRequest(format!("Invalid product ID: {raw_id}")))?;
                let product = state
                    .engine
                    .woo()
                    .get_product(product_id)
                    .await
                    .map_err(|e| AppError::Internal(e.to_string()))?;
                state.queues.enqueue_woo(WooTask { product });
            }
        }
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "status": "queued", "source": body.source, "count": count })),
    ))
}

/// Direction of a full sync.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FullSyncDirection {
    AirtableToWoo,
    WooToAirtable,
    Bidirectional,
}

/// Body for `POST /sync/full`.
#[derive(Debug, Deserialize)]
pub struct FullSyncRequest {
    pub direction: FullSyncDirection,
}

/// `POST /sync/full`
///
/// Lists everything on the requested side(s) and queues each item. The
/// listing happens inline so the response can report real counts; the
/// pushes run in the background.
pub async fn full_sync(
    State(state): State<AppState>,
    Json(body): Json<FullSyncRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let mut airtable_count = 0usize;
    let mut woo_count = 0usize;

    if matches!(
        body.direction,
        FullSyncDirection::AirtableToWoo | FullSyncDirection::Bidirectional
    ) {
        let records = state
            .engine
            .airtable()
            .list_all(
                state.engine.table(),
                &stocklink_api::airtable::ListOptions::default(),
            )
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        airtable_count = records.len();
        for record in records {
            state
                .queues
                .enqueue_airtable(AirtableTask::Upsert { record_id: record.id });
        }
    }

    if matches!(
        body.direction,
        FullSyncDirection::WooToAirtable | FullSyncDirection::Bidirectional
    ) {
        let products = state
            .engine
            .woo()
            .list_all()
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        woo_count = products.len();
        for product in products {
            state.queues.enqueue_woo(WooTask { product });
        }
    }

    tracing::info!(?body.direction, airtable_count, woo_count, "Full sync queued");
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "status": "full sync queued",
            "airtable_count": airtable_count,
            "woocommerce_count": woo_count,
        })),
    ))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
        "queues": {
            "airtable": state.queues.airtable_depth(),
            "woocommerce": state.queues.woo_depth(),
        }
    }))
}

/// `GET /status`
pub async fn status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "running",
        "timestamp": chrono::Utc::now(),
        "queues": {
            "airtable_pending": state.queues.airtable_depth(),
            "woocommerce_pending": state.queues.woo_depth(),
        },
        "recent_syncs": state.engine.tracker().len(),
        "uptime_secs": state.started.elapsed().as_secs(),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BASE: &str = "appTESTTESTTESTTE";

    #[test]
    fn test_classify_single_created() {
        let event = classify_airtable_event(
            &json!({
                "type": "record.created",
                "base": { "id": BASE },
                "record": { "id": "recAAA" }
            }),
            BASE,
        );
        assert_eq!(
            event,
            AirtableEvent::Tasks(vec![AirtableTask::Upsert {
                record_id: "recAAA".to_string()
            }])
        );
    }

    #[test]
    fn test_classify_single_deleted() {
        let event = classify_airtable_event(
            &json!({
                "type": "record.deleted",
                "record": { "id": "recAAA" }
            }),
            BASE,
        );
        assert_eq!(
            event,
            AirtableEvent::Tasks(vec![AirtableTask::Delete {
                record_id: "recAAA".to_string()
            }])
        );
    }

    #[test]
    fn test_classify_batch_records() {
        let event = classify_airtable_event(
            &json!({
                "records": [{ "id": "recAAA" }, { "id": "recBBB" }]
            }),
            BASE,
        );
        let AirtableEvent::Tasks(tasks) = event else {
            panic!("expected tasks");
        };
        assert_eq!(tasks.len(), 2);
        assert!(matches!(&tasks[1], AirtableTask::Upsert { record_id } if record_id == "recBBB"));
    }

    #[test]
    fn test_classify_foreign_base_rejected() {
        let event = classify_airtable_event(
            &json!({
                "type": "record.updated",
                "base": { "id": "appSOMEOTHERBASE0" },
                "record": { "id": "recAAA" }
            }),
            BASE,
        );
        assert_eq!(event, AirtableEvent::WrongBase);
    }

    #[test]
    fn test_classify_unknown_type_is_empty() {
        let event = classify_airtable_event(
            &json!({
                "type": "table.schema.changed",
                "record": { "id": "recAAA" }
            }),
            BASE,
        );
        assert_eq!(event, AirtableEvent::Empty);
    }

    #[test]
    fn test_classify_empty_body() {
        assert_eq!(classify_airtable_event(&json!({}), BASE), AirtableEvent::Empty);
    }
}
