//! Product CRUD over the channel item tables.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use stocklink_core::{Barcode, Channel, ItemCondition, ProductStatus};

use crate::airtable::{Record, and, escape_formula_value, field_equals};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{
    Page, ProductFields, ProductResponse, ScanFields, UpdateProductRequest, UpsertProductRequest,
};
use crate::state::AppState;

/// Query parameters shared by the product endpoints.
#[derive(Debug, Deserialize)]
pub struct ChannelQuery {
    #[serde(default)]
    pub channel: Channel,
}

/// Query parameters for product listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub channel: Channel,
    /// Optional `{Status}` filter.
    pub status: Option<ProductStatus>,
    /// Optional `{Condition}` filter.
    pub condition: Option<ItemCondition>,
    /// Case-insensitive substring match on `{Product Name}`.
    pub search: Option<String>,
    /// Page size, capped at Airtable's limit of 100.
    pub page_size: Option<u32>,
    /// Continuation token from a previous page's response.
    pub offset: Option<String>,
}

fn to_response(record: &Record, channel: Channel) -> Result<ProductResponse> {
    let fields: ProductFields = record.fields_as().map_err(AppError::Airtable)?;
    Ok(ProductResponse {
        id: record.id.clone(),
        channel,
        fields: Box::new(fields),
        created_time: record.created_time,
    })
}

fn parse_barcode(raw: &str) -> Result<Barcode> {
    Barcode::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// `GET /products`
///
/// Returns one page of records; the response carries Airtable's opaque
/// `offset` token when more pages remain.
pub async fn list(
    RequireAuth(_claims): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<ProductResponse>>> {
    let table = state.config.airtable.table_for(query.channel);

    let mut clauses = Vec::new();
    if let Some(status) = query.status {
        clauses.push(field_equals("Status", status.as_str()));
    }
    if let Some(condition) = query.condition {
        clauses.push(field_equals("Condition", condition.as_str()));
    }
    if let Some(search) = query.search.as_deref().map(str::trim)
        && !search.is_empty()
    {
        clauses.push(format!(
            "SEARCH(LOWER('{}'), LOWER({{Product Name}}))",
            escape_formula_value(search)
        ));
    }

    let options = crate::airtable::ListOptions {
        filter_by_formula: (!clauses.is_empty()).then(|| and(&clauses)),
        page_size: query.page_size,
        offset: query.offset.clone(),
        ..crate::airtable::ListOptions::default()
    };

    let page = state.airtable.list_records(table, &options).await?;
    let records = page
        .records
        .iter()
        .map(|r| to_response(r, query.channel))
        .collect::<Result<Vec<_>>>()?;
    Ok(Json(Page {
        records,
        offset: page.offset,
    }))
}

/// `GET /products/{id}`
pub async fn get_by_id(
    RequireAuth(_claims): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ChannelQuery>,
) -> Result<Json<ProductResponse>> {
    let table = state.config.airtable.table_for(query.channel);
    let record = state.airtable.get_record(table, &id).await?;
    Ok(Json(to_response(&record, query.channel)?))
}

/// `GET /products/barcode/{barcode}`
pub async fn get_by_barcode(
    RequireAuth(_claims): RequireAuth,
    State(state): State<AppState>,
    Path(barcode): Path<String>,
    Query(query): Query<ChannelQuery>,
) -> Result<Json<ProductResponse>> {
    let barcode = parse_barcode(&barcode)?;
    let table = state.config.airtable.table_for(query.channel);
    let formula = field_equals("Barcode", barcode.as_str());
    let record = state
        .airtable
        .find_first(table, &formula)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No product with barcode {barcode}")))?;
    Ok(Json(to_response(&record, query.channel)?))
}

/// `POST /products`
///
/// Creates a product, or updates the existing record when the barcode is
/// already present in the channel table. With `increment_stock` set, an
/// existing record only has its stock bumped; a repeated scan of the same
/// code then counts units instead of rewriting fields.
pub async fn upsert(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<UpsertProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let barcode = parse_barcode(&body.barcode)?;
    let table = state.config.airtable.table_for(body.channel);
    let formula = field_equals("Barcode", barcode.as_str());
    let existing = state.airtable.find_first(table, &formula).await?;

    let (status_code, record) = match existing {
        Some(record) => {
            let mut fields = body.fields;
            if body.increment_stock {
                let current: ProductFields =
                    record.fields_as().map_err(AppError::Airtable)?;
                fields = ProductFields {
                    stock_quantity: Some(current.stock_quantity.unwrap_or(0) + 1),
                    scanned_at: Some(Utc::now()),
                    scanned_by: Some(claims.email.clone()),
                    ..ProductFields::default()
                };
            }
            let updated = state.airtable.update_record(table, &record.id, &fields).await?;
            tracing::info!(barcode = %barcode, record_id = %updated.id, "Product updated via upsert");
            (StatusCode::OK, updated)
        }
        None => {
            let fields = ProductFields {
                barcode: Some(barcode.to_string()),
                stock_quantity: body.fields.stock_quantity.or(Some(1)),
                status: body
                    .fields
                    .status
                    .clone()
                    .or_else(|| Some(ProductStatus::Scraped.as_str().to_string())),
                scanned_at: Some(Utc::now()),
                scanned_by: Some(claims.email.clone()),
                ..body.fields
            };
            let created = state.airtable.create_record(table, &fields).await?;
            tracing::info!(barcode = %barcode, record_id = %created.id, "Product created");
            (StatusCode::CREATED, created)
        }
    };

    let response = to_response(&record, body.channel)?;
    append_scan_history(&state, &barcode, body.channel, &claims.email, &response.fields).await;
    Ok((status_code, Json(response)))
}

/// Best-effort scan-history append; a failure here never fails the scan.
async fn append_scan_history(
    state: &AppState,
    barcode: &Barcode,
    channel: Channel,
    email: &str,
    product: &ProductFields,
) {
    let entry = ScanFields {
        barcode: Some(barcode.to_string()),
        product_name: product.product_name.clone(),
        channel: Some(channel.as_str().to_string()),
        scanned_by: Some(email.to_string()),
        scanned_at: Some(Utc::now()),
        source: product.scraping_website.clone(),
    };

    let table = &state.config.airtable.history_table;
    if let Err(err) = state.airtable.create_record(table, &entry).await {
        tracing::warn!(barcode = %barcode, "Failed to append scan history: {err}");
    }
}

/// `PATCH /products/{id}`
pub async fn update(
    RequireAuth(_claims): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>> {
    let table = state.config.airtable.table_for(body.channel);
    let updated = state.airtable.update_record(table, &id, &body.fields).await?;
    Ok(Json(to_response(&updated, body.channel)?))
}

/// `DELETE /products/{id}`
pub async fn delete(
    RequireAuth(_claims): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ChannelQuery>,
) -> Result<StatusCode> {
    let table = state.config.airtable.table_for(query.channel);
    state.airtable.delete_record(table, &id).await?;
    tracing::info!(record_id = %id, channel = %query.channel, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
