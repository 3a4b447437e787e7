//! Barcode and URL lookup endpoint.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use stocklink_core::Barcode;

use crate::error::{AppError, Result};
use crate::lookup::LookupItem;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Query parameters for `GET /lookup`.
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub barcode: Option<String>,
    pub url: Option<String>,
}

/// `GET /lookup`
///
/// Resolves a scanned barcode through the provider chain, or a product URL
/// through the retailer scrapers. At least one of the two must be given.
pub async fn lookup(
    RequireAuth(_claims): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<LookupItem>> {
    if query.barcode.is_none() && query.url.is_none() {
        return Err(AppError::BadRequest("Provide barcode or url".to_string()));
    }

    let barcode = query
        .barcode
        .as_deref()
        .map(Barcode::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let item = state
        .lookup
        .resolve(barcode.as_ref().map(Barcode::as_str), query.url.as_deref())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Item not found from providers".to_string()))?;

    Ok(Json(item))
}
