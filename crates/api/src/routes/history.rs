//! Scan history endpoints.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::airtable::{ListOptions, field_equals};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Page, RecordScanRequest, ScanFields};
use crate::state::AppState;

/// Query parameters for `GET /history`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Restrict to scans recorded by this email.
    pub scanned_by: Option<String>,
    /// Page size, capped at Airtable's limit of 100.
    pub page_size: Option<u32>,
    /// Continuation token from a previous page's response.
    pub offset: Option<String>,
}

/// A scan history entry with its record ID.
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub id: String,
    #[serde(flatten)]
    pub fields: ScanFields,
}

/// `GET /history`
pub async fn list(
    RequireAuth(_claims): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Page<ScanResponse>>> {
    let table = &state.config.airtable.history_table;
    let options = ListOptions {
        filter_by_formula: query
            .scanned_by
            .as_deref()
            .map(|email| field_equals("Scanned By", email)),
        page_size: query.page_size,
        offset: query.offset.clone(),
        ..ListOptions::default()
    };

    let page = state.airtable.list_records(table, &options).await?;
    let mut entries = page
        .records
        .iter()
        .map(|r| {
            Ok(ScanResponse {
                id: r.id.clone(),
                fields: r.fields_as().map_err(AppError::Airtable)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    // Newest first within the page
    entries.sort_by(|a, b| b.fields.scanned_at.cmp(&a.fields.scanned_at));
    Ok(Json(Page {
        records: entries,
        offset: page.offset,
    }))
}

/// `POST /history`
pub async fn record(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<RecordScanRequest>,
) -> Result<(StatusCode, Json<ScanResponse>)> {
    let fields = ScanFields {
        barcode: Some(body.barcode),
        product_name: body.product_name,
        channel: Some(body.channel.as_str().to_string()),
        scanned_by: Some(claims.email),
        scanned_at: Some(Utc::now()),
        source: body.source,
    };

    let table = &state.config.airtable.history_table;
    let created = state.airtable.create_record(table, &fields).await?;
    Ok((
        StatusCode::CREATED,
        Json(ScanResponse {
            id: created.id.clone(),
            fields: created.fields_as().map_err(AppError::Airtable)?,
        }),
    ))
}
