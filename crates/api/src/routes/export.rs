//! CSV export of a channel table.

use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use stocklink_core::{Channel, ProductStatus};

use crate::airtable::{ListOptions, field_equals};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::ProductFields;
use crate::state::AppState;

const CSV_HEADER: [&str; 12] = [
    "Barcode",
    "Product Name",
    "Brand",
    "Category",
    "Price",
    "Sale Price",
    "Cost",
    "Stock Quantity",
    "Location",
    "Condition",
    "Status",
    "ScannedAt",
];

/// Query parameters for `GET /export`.
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub channel: Channel,
    /// Optional `{Status}` filter.
    pub status: Option<ProductStatus>,
}

/// `GET /export`
pub async fn export(
    RequireAuth(_claims): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response> {
    let table = state.config.airtable.table_for(query.channel);
    let options = ListOptions {
        filter_by_formula: query
            .status
            .map(|status| field_equals("Status", status.as_str())),
        ..ListOptions::default()
    };
    let records = state.airtable.list_all(table, &options).await?;

    let fields = records
        .iter()
        .map(|r| r.fields_as().map_err(AppError::Airtable))
        .collect::<Result<Vec<ProductFields>>>()?;

    let csv = render_csv(&fields).map_err(|e| AppError::Internal(e.to_string()))?;
    let filename = format!("{}-export.csv", query.channel);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

fn render_csv(products: &[ProductFields]) -> std::result::Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for product in products {
        writer.write_record([
            product.barcode.clone().unwrap_or_default(),
            product.product_name.clone().unwrap_or_default(),
            product.brand.clone().unwrap_or_default(),
            product.category.clone().unwrap_or_default(),
            product.price.map(|p| p.to_string()).unwrap_or_default(),
            product.sale_price.map(|p| p.to_string()).unwrap_or_default(),
            product.cost.map(|c| c.to_string()).unwrap_or_default(),
            product
                .stock_quantity
                .map(|q| q.to_string())
                .unwrap_or_default(),
            product.location.clone().unwrap_or_default(),
            product.condition.clone().unwrap_or_default(),
            product.status.clone().unwrap_or_default(),
            product
                .scanned_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_render_csv_shape() {
        let products = vec![
            ProductFields {
                barcode: Some("012345678905".to_string()),
                product_name: Some("Widget, Deluxe".to_string()),
                price: Some(Decimal::new(2499, 2)),
                stock_quantity: Some(3),
                ..ProductFields::default()
            },
            ProductFields::default(),
        ];

        let bytes = render_csv(&products).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("Barcode,Product Name"));

        let first = lines.next().unwrap();
        // Comma inside the name gets quoted
        assert!(first.contains("\"Widget, Deluxe\""));
        assert!(first.contains("24.99"));

        // Empty product renders as an all-empty row
        let second = lines.next().unwrap();
        assert_eq!(second, ",".repeat(CSV_HEADER.len() - 1));
        assert!(lines.next().is_none());
    }
}
