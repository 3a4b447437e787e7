//! Request/response models and Airtable field payloads.
//!
//! Field structs mirror the Airtable column names exactly via serde renames.
//! Every field is optional because Airtable omits empty cells from record
//! payloads rather than sending nulls.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stocklink_core::{Channel, CurrencyCode, WooProductId};

/// An Airtable attachment cell entry. Only the fields we read are modeled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Fields of a product record in one of the channel item tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFields {
    #[serde(rename = "Barcode", skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(rename = "Product Name", skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(rename = "Brand", skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(rename = "Category", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "Price", skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(rename = "Sale Price", skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Decimal>,
    #[serde(rename = "Cost", skip_serializing_if = "Option::is_none")]
    pub cost: Option<Decimal>,
    #[serde(rename = "Stock Quantity", skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    #[serde(rename = "Location", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "Condition", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "Currency", skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
    #[serde(rename = "Weight", skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(rename = "Dimensions", skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(rename = "Product URL", skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,
    #[serde(rename = "Scraping Website", skip_serializing_if = "Option::is_none")]
    pub scraping_website: Option<String>,
    #[serde(rename = "Images", skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<Attachment>>,
    #[serde(rename = "ScannedAt", skip_serializing_if = "Option::is_none")]
    pub scanned_at: Option<DateTime<Utc>>,
    #[serde(rename = "Scanned By", skip_serializing_if = "Option::is_none")]
    pub scanned_by: Option<String>,
    #[serde(
        rename = "Last WooCommerce Sync",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_woocommerce_sync: Option<DateTime<Utc>>,
    #[serde(
        rename = "Created From WooCommerce",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_from_woocommerce: Option<bool>,
    #[serde(rename = "WooCommerce ID", skip_serializing_if = "Option::is_none")]
    pub woocommerce_id: Option<WooProductId>,
}

/// Fields of a record in the Users table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserFields {
    #[serde(rename = "Email", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Password Hash", skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(rename = "Role", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(rename = "Active", skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Fields of a record in the Scan History table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanFields {
    #[serde(rename = "Barcode", skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(rename = "Product Name", skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(rename = "Channel", skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(rename = "Scanned By", skip_serializing_if = "Option::is_none")]
    pub scanned_by: Option<String>,
    #[serde(rename = "ScannedAt", skip_serializing_if = "Option::is_none")]
    pub scanned_at: Option<DateTime<Utc>>,
    #[serde(rename = "Source", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Fields of a record in the Settings table (one key/value pair per record).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingFields {
    #[serde(rename = "Key", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "Value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

// =============================================================================
// Request / Response bodies
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// The authenticated user, as returned by `GET /auth/me`.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
}

/// A product record with its Airtable metadata, as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub channel: Channel,
    #[serde(flatten)]
    pub fields: Box<ProductFields>,
    pub created_time: Option<DateTime<Utc>>,
}

/// Body for creating or upserting a product via `POST /products`.
#[derive(Debug, Deserialize)]
pub struct UpsertProductRequest {
    pub barcode: String,
    #[serde(default)]
    pub channel: Channel,
    #[serde(flatten)]
    pub fields: ProductFields,
    /// When true and the barcode already exists, increment stock instead of
    /// overwriting fields.
    #[serde(default)]
    pub increment_stock: bool,
}

/// Body for partial product updates via `PATCH /products/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub channel: Channel,
    #[serde(flatten)]
    pub fields: ProductFields,
}

/// Body for recording a scan via `POST /history`.
#[derive(Debug, Deserialize)]
pub struct RecordScanRequest {
    pub barcode: String,
    #[serde(default)]
    pub channel: Channel,
    #[serde(default)]
    pub product_name: Option<String>,
    /// Where the scan data came from (provider name, "Internet", manual).
    #[serde(default)]
    pub source: Option<String>,
}

/// One page of list results. `offset` is Airtable's opaque continuation
/// token; pass it back to fetch the next page.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

/// Per-channel inventory counts, as returned by `GET /stats`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChannelStats {
    pub total_items: u64,
    pub total_stock: i64,
    pub in_stock: u64,
    pub out_of_stock: u64,
    /// Sum of price × quantity over records that carry a price.
    pub inventory_value: Decimal,
    pub by_status: std::collections::BTreeMap<String, u64>,
    pub by_condition: std::collections::BTreeMap<String, u64>,
}

/// Aggregate inventory statistics.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub channels: std::collections::BTreeMap<String, ChannelStats>,
    pub total_items: u64,
    pub total_value: Decimal,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_fields_serialize_airtable_names() {
        let fields = ProductFields {
            barcode: Some("012345678905".to_string()),
            product_name: Some("Widget".to_string()),
            stock_quantity: Some(3),
            ..Default::default()
        };

        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["Barcode"], "012345678905");
        assert_eq!(json["Product Name"], "Widget");
        assert_eq!(json["Stock Quantity"], 3);
        // Empty cells are omitted entirely
        assert!(json.get("Brand").is_none());
    }

    #[test]
    fn test_product_fields_deserialize_sparse_record() {
        let json = serde_json::json!({
            "Barcode": "012345678905",
            "Price": "24.99",
            "WooCommerce ID": 812
        });

        let fields: ProductFields = serde_json::from_value(json).unwrap();
        assert_eq!(fields.barcode.as_deref(), Some("012345678905"));
        assert_eq!(fields.price.unwrap().to_string(), "24.99");
        assert_eq!(fields.woocommerce_id, Some(WooProductId::new(812)));
        assert!(fields.product_name.is_none());
    }

    #[test]
    fn test_upsert_request_defaults() {
        let json = serde_json::json!({
            "barcode": "4006381333931",
            "Product Name": "Stabilo Pen"
        });

        let req: UpsertProductRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.channel, Channel::Catalogue);
        assert!(!req.increment_stock);
        assert_eq!(req.fields.product_name.as_deref(), Some("Stabilo Pen"));
    }

    #[test]
    fn test_user_fields_round_trip() {
        let json = serde_json::json!({
            "Email": "ops@example.com",
            "Password Hash": "$argon2id$v=19$m=19456,t=2,p=1$abc$def",
            "Active": true
        });

        let fields: UserFields = serde_json::from_value(json).unwrap();
        assert_eq!(fields.email.as_deref(), Some("ops@example.com"));
        assert_eq!(fields.active, Some(true));
        assert!(fields.role.is_none());
    }
}
