//! Settings endpoints.
//!
//! Settings live in Airtable as one record per key/value pair; the API
//! exposes them as a flat JSON map.

use std::collections::BTreeMap;

use axum::{Json, extract::State};

use crate::airtable::{ListOptions, field_equals};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::SettingFields;
use crate::state::AppState;

/// `GET /settings`
pub async fn list(
    RequireAuth(_claims): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, String>>> {
    let table = &state.config.airtable.settings_table;
    let records = state
        .airtable
        .list_all(table, &ListOptions::default())
        .await?;

    let mut settings = BTreeMap::new();
    for record in &records {
        let fields: SettingFields = record.fields_as().map_err(AppError::Airtable)?;
        if let Some(key) = fields.key {
            settings.insert(key, fields.value.unwrap_or_default());
        }
    }
    Ok(Json(settings))
}

/// `PUT /settings`
///
/// Upserts each provided key: existing records are updated in place, new
/// keys get new records. Keys absent from the body are left untouched.
pub async fn upsert(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<BTreeMap<String, String>>,
) -> Result<Json<BTreeMap<String, String>>> {
    let table = &state.config.airtable.settings_table;

    for (key, value) in &body {
        let fields = SettingFields {
            key: Some(key.clone()),
            value: Some(value.clone()),
        };
        let formula = field_equals("Key", key);
        match state.airtable.find_first(table, &formula).await? {
            Some(record) => {
                state.airtable.update_record(table, &record.id, &fields).await?;
            }
            None => {
                state.airtable.create_record(table, &fields).await?;
            }
        }
    }
    tracing::info!(user = %claims.email, count = body.len(), "Settings updated");

    list(RequireAuth(claims), State(state)).await
}
