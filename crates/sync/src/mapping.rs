//! Field mapping between Airtable records and WooCommerce products.
//!
//! The barcode doubles as the WooCommerce SKU. Prices go out as strings
//! because that's what the Woo API expects; coming back they are parsed
//! into decimals and dropped when empty.

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use stocklink_core::{StockStatus, WooProductId};
use stocklink_api::airtable::Record;
use stocklink_api::models::ProductFields;

use crate::woocommerce::{META_AIRTABLE_ID, META_LAST_AIRTABLE_SYNC, WooProduct};

/// Build the WooCommerce product payload for an Airtable record.
#[must_use]
pub fn map_airtable_to_woo(record: &Record, fields: &ProductFields) -> Value {
    let quantity = fields.stock_quantity.unwrap_or(0);

    let mut payload = json!({
        "name": fields.product_name.clone().unwrap_or_default(),
        "type": "simple",
        "sku": fields.barcode.clone().unwrap_or_default(),
        "regular_price": fields.price.map(|p| p.to_string()).unwrap_or_default(),
        "sale_price": fields.sale_price.map(|p| p.to_string()).unwrap_or_default(),
        "description": fields.description.clone().unwrap_or_default(),
        "manage_stock": true,
        "stock_quantity": quantity,
        "stock_status": StockStatus::from_quantity(quantity).as_str(),
        "meta_data": [
            { "key": META_AIRTABLE_ID, "value": record.id },
            { "key": META_LAST_AIRTABLE_SYNC, "value": Utc::now().to_rfc3339() }
        ]
    });

    if let Some(weight) = &fields.weight {
        payload["weight"] = json!(weight);
    }

    if let Some(category) = &fields.category {
        payload["categories"] = json!([{ "name": category }]);
    }

    if let Some(images) = &fields.images {
        let sources: Vec<Value> = images
            .iter()
            .map(|img| json!({ "src": img.url }))
            .collect();
        if !sources.is_empty() {
            payload["images"] = Value::Array(sources);
        }
    }

    payload
}

/// Build the Airtable field update for a WooCommerce product.
///
/// Stamps `Last WooCommerce Sync`; the caller decides whether to also set
/// `Created From WooCommerce` on new records.
#[must_use]
pub fn map_woo_to_airtable(product: &WooProduct) -> ProductFields {
    ProductFields {
        barcode: non_empty(&product.sku),
        product_name: non_empty(&product.name),
        description: non_empty(&product.description),
        weight: non_empty(&product.weight),
        price: parse_decimal(&product.regular_price),
        sale_price: parse_decimal(&product.sale_price),
        stock_quantity: product.stock_quantity,
        category: product
            .categories
            .iter()
            .find_map(|cat| cat.name.clone()),
        woocommerce_id: Some(WooProductId::new(product.id)),
        last_woocommerce_sync: Some(Utc::now()),
        ..ProductFields::default()
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() { None } else { s.parse().ok() }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use stocklink_api::models::Attachment;
    use crate::woocommerce::{WooCategory, WooMeta};

    fn record(id: &str) -> Record {
        Record {
            id: id.to_string(),
            created_time: None,
            fields: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_airtable_to_woo_core_fields() {
        let fields = ProductFields {
            barcode: Some("012345678905".to_string()),
            product_name: Some("Widget".to_string()),
            price: Some(Decimal::new(2499, 2)),
            stock_quantity: Some(3),
            category: Some("Electronics".to_string()),
            ..ProductFields::default()
        };

        let payload = map_airtable_to_woo(&record("recAAA"), &fields);
        assert_eq!(payload["name"], "Widget");
        assert_eq!(payload["sku"], "012345678905");
        assert_eq!(payload["regular_price"], "24.99");
        assert_eq!(payload["stock_quantity"], 3);
        assert_eq!(payload["stock_status"], "instock");
        assert_eq!(payload["manage_stock"], true);
        assert_eq!(payload["categories"][0]["name"], "Electronics");
        assert_eq!(payload["meta_data"][0]["key"], META_AIRTABLE_ID);
        assert_eq!(payload["meta_data"][0]["value"], "recAAA");
    }

    #[test]
    fn test_airtable_to_woo_out_of_stock() {
        let fields = ProductFields::default();
        let payload = map_airtable_to_woo(&record("recAAA"), &fields);
        assert_eq!(payload["stock_quantity"], 0);
        assert_eq!(payload["stock_status"], "outofstock");
        // No categories key when the record has none
        assert!(payload.get("categories").is_none());
    }

    #[test]
    fn test_airtable_to_woo_images() {
        let fields = ProductFields {
            images: Some(vec![Attachment {
                url: "https://dl.airtable.com/a.jpg".to_string(),
                filename: None,
            }]),
            ..ProductFields::default()
        };
        let payload = map_airtable_to_woo(&record("recAAA"), &fields);
        assert_eq!(payload["images"][0]["src"], "https://dl.airtable.com/a.jpg");
    }

    #[test]
    fn test_woo_to_airtable_core_fields() {
        let product = WooProduct {
            id: 812,
            name: "Widget".to_string(),
            sku: "012345678905".to_string(),
            regular_price: "24.99".to_string(),
            sale_price: String::new(),
            stock_quantity: Some(5),
            categories: vec![WooCategory {
                id: Some(9),
                name: Some("Electronics".to_string()),
            }],
            meta_data: vec![WooMeta {
                key: "airtable_id".to_string(),
                value: serde_json::json!("recAAA"),
            }],
            ..WooProduct::default()
        };

        let fields = map_woo_to_airtable(&product);
        assert_eq!(fields.barcode.as_deref(), Some("012345678905"));
        assert_eq!(fields.price.unwrap().to_string(), "24.99");
        assert!(fields.sale_price.is_none());
        assert_eq!(fields.stock_quantity, Some(5));
        assert_eq!(fields.category.as_deref(), Some("Electronics"));
        assert_eq!(fields.woocommerce_id, Some(WooProductId::new(812)));
        assert!(fields.last_woocommerce_sync.is_some());
    }

    #[test]
    fn test_woo_to_airtable_empty_strings_dropped() {
        let product = WooProduct::default();
        let fields = map_woo_to_airtable(&product);
        assert!(fields.barcode.is_none());
        assert!(fields.product_name.is_none());
        assert!(fields.price.is_none());
    }
}
