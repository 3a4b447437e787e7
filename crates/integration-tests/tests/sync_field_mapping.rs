//! Round-trip consistency of the Airtable/WooCommerce field mapping.
//!
//! The outbound payload built from an Airtable record must deserialize as
//! a WooCommerce product whose reverse mapping lands on the same values.

use rust_decimal::Decimal;
use stocklink_api::airtable::Record;
use stocklink_api::models::ProductFields;
use stocklink_sync::mapping::{map_airtable_to_woo, map_woo_to_airtable};
use stocklink_sync::woocommerce::WooProduct;

fn record(id: &str) -> Record {
    Record {
        id: id.to_string(),
        created_time: None,
        fields: serde_json::Map::new(),
    }
}

fn sample_fields() -> ProductFields {
    ProductFields {
        barcode: Some("036000291452".to_string()),
        product_name: Some("Stainless Kettle".to_string()),
        description: Some("1.7L cordless kettle".to_string()),
        price: Some(Decimal::new(3999, 2)),
        sale_price: Some(Decimal::new(2999, 2)),
        stock_quantity: Some(4),
        category: Some("Kitchen".to_string()),
        ..ProductFields::default()
    }
}

#[test]
fn test_outbound_payload_parses_as_woo_product() {
    let payload = map_airtable_to_woo(&record("recMAP1"), &sample_fields());
    let product: WooProduct = serde_json::from_value(payload).unwrap();

    assert_eq!(product.sku, "036000291452");
    assert_eq!(product.name, "Stainless Kettle");
    assert_eq!(product.regular_price, "39.99");
    assert_eq!(product.sale_price, "29.99");
    assert_eq!(product.stock_quantity, Some(4));
    assert_eq!(product.stock_status.as_deref(), Some("instock"));
    assert_eq!(product.airtable_id(), Some("recMAP1"));
}

#[test]
fn test_round_trip_preserves_core_fields() {
    let fields = sample_fields();
    let payload = map_airtable_to_woo(&record("recMAP2"), &fields);
    let product: WooProduct = serde_json::from_value(payload).unwrap();
    let back = map_woo_to_airtable(&product);

    assert_eq!(back.barcode, fields.barcode);
    assert_eq!(back.product_name, fields.product_name);
    assert_eq!(back.description, fields.description);
    assert_eq!(back.price, fields.price);
    assert_eq!(back.sale_price, fields.sale_price);
    assert_eq!(back.stock_quantity, fields.stock_quantity);
    assert_eq!(back.category, fields.category);
    assert!(back.last_woocommerce_sync.is_some());
}

#[test]
fn test_zero_stock_round_trips_out_of_stock() {
    let fields = ProductFields {
        barcode: Some("036000291452".to_string()),
        product_name: Some("Kettle".to_string()),
        stock_quantity: Some(0),
        ..ProductFields::default()
    };

    let payload = map_airtable_to_woo(&record("recMAP3"), &fields);
    assert_eq!(payload["stock_status"], "outofstock");

    let product: WooProduct = serde_json::from_value(payload).unwrap();
    let back = map_woo_to_airtable(&product);
    assert_eq!(back.stock_quantity, Some(0));
}

#[test]
fn test_empty_prices_map_to_none_on_return() {
    let fields = ProductFields {
        barcode: Some("036000291452".to_string()),
        product_name: Some("Kettle".to_string()),
        ..ProductFields::default()
    };

    let payload = map_airtable_to_woo(&record("recMAP4"), &fields);
    assert_eq!(payload["regular_price"], "");

    let product: WooProduct = serde_json::from_value(payload).unwrap();
    let back = map_woo_to_airtable(&product);
    assert_eq!(back.price, None);
    assert_eq!(back.sale_price, None);
}

#[test]
fn test_airtable_update_payload_is_valid_airtable_json() {
    // The reverse mapping must serialize with Airtable's display field
    // names, not Rust identifiers.
    let product = WooProduct {
        id: 77,
        name: "Kettle".to_string(),
        sku: "036000291452".to_string(),
        regular_price: "39.99".to_string(),
        ..WooProduct::default()
    };

    let back = map_woo_to_airtable(&product);
    let json = serde_json::to_value(&back).unwrap();

    assert_eq!(json["Barcode"], "036000291452");
    assert_eq!(json["Product Name"], "Kettle");
    assert_eq!(json["WooCommerce ID"], 77);
    assert!(json.get("Stock Quantity").is_none());
}
