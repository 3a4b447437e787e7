//! Inventory statistics endpoint.
//!
//! The stats computation pages through entire channel tables, so results
//! are cached for a minute in [`AppState`], keyed by the channel filter.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use stocklink_core::Channel;

use crate::airtable::ListOptions;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{ChannelStats, ProductFields, StatsResponse};
use crate::state::AppState;

/// Query parameters for `GET /stats`.
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Restrict to one channel; omitted walks every channel table.
    pub channel: Option<Channel>,
}

/// `GET /stats`
pub async fn stats(
    RequireAuth(_claims): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>> {
    if let Some(cached) = state.stats_cache.get(&query.channel).await {
        return Ok(Json(cached));
    }

    let computed = compute_stats(&state, query.channel).await?;
    state.stats_cache.insert(query.channel, computed.clone()).await;
    Ok(Json(computed))
}

async fn compute_stats(state: &AppState, channel: Option<Channel>) -> Result<StatsResponse> {
    let targets: Vec<Channel> = match channel {
        Some(c) => vec![c],
        None => Channel::ALL.to_vec(),
    };

    let mut channels = std::collections::BTreeMap::new();
    let mut total_items = 0u64;
    let mut total_value = Decimal::ZERO;

    for channel in targets {
        let table = state.config.airtable.table_for(channel);
        let records = state
            .airtable
            .list_all(table, &ListOptions::default())
            .await?;

        let mut entry = ChannelStats::default();
        for record in &records {
            let fields: ProductFields = record.fields_as().map_err(AppError::Airtable)?;
            entry.total_items += 1;
            let quantity = fields.stock_quantity.unwrap_or(0);
            entry.total_stock += quantity;
            if quantity > 0 {
                entry.in_stock += 1;
            } else {
                entry.out_of_stock += 1;
            }
            if let Some(price) = fields.price {
                entry.inventory_value += price * Decimal::from(quantity.max(0));
            }
            if let Some(status) = &fields.status {
                *entry.by_status.entry(status.clone()).or_default() += 1;
            }
            if let Some(condition) = &fields.condition {
                *entry.by_condition.entry(condition.clone()).or_default() += 1;
            }
        }
        total_items += entry.total_items;
        total_value += entry.inventory_value;
        channels.insert(channel.as_str().to_string(), entry);
    }

    Ok(StatsResponse {
        channels,
        total_items,
        total_value,
        generated_at: Utc::now(),
    })
}
