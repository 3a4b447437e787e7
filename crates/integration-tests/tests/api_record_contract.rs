//! The Airtable field-name contract.
//!
//! Airtable addresses fields by display name, so the serde renames on the
//! API models are load-bearing: a drift here silently stops data landing
//! in the base. These tests pin the wire names against raw record JSON.

use serde_json::json;
use stocklink_api::airtable::{Record, escape_formula_value, field_equals};
use stocklink_api::models::{ProductFields, ScanFields, UserFields};
use stocklink_core::WooProductId;

#[test]
fn test_product_record_deserializes_display_names() {
    let record: Record = serde_json::from_value(json!({
        "id": "recCONTRACT1",
        "createdTime": "2026-03-01T12:00:00.000Z",
        "fields": {
            "Barcode": "036000291452",
            "Product Name": "Stainless Kettle",
            "Price": 39.99,
            "Stock Quantity": 4,
            "Scanned By": "ops@example.com",
            "Created From WooCommerce": true,
            "WooCommerce ID": 77,
            "Images": [
                { "url": "https://dl.airtable.com/x/kettle.jpg", "filename": "kettle.jpg" }
            ]
        }
    }))
    .unwrap();

    let fields: ProductFields = record.fields_as().unwrap();
    assert_eq!(fields.barcode.as_deref(), Some("036000291452"));
    assert_eq!(fields.product_name.as_deref(), Some("Stainless Kettle"));
    assert_eq!(fields.stock_quantity, Some(4));
    assert_eq!(fields.scanned_by.as_deref(), Some("ops@example.com"));
    assert_eq!(fields.created_from_woocommerce, Some(true));
    assert_eq!(fields.woocommerce_id, Some(WooProductId::new(77)));
    let images = fields.images.unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].filename.as_deref(), Some("kettle.jpg"));
    assert!(record.created_time.is_some());
}

#[test]
fn test_unset_fields_stay_off_the_wire() {
    // Airtable treats an explicit null differently from an absent key, so
    // unset fields must not serialize at all.
    let fields = ProductFields {
        barcode: Some("036000291452".to_string()),
        ..ProductFields::default()
    };

    let json = serde_json::to_value(&fields).unwrap();
    let map = json.as_object().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map["Barcode"], "036000291452");
}

#[test]
fn test_user_record_contract() {
    let record: Record = serde_json::from_value(json!({
        "id": "recUSER0001",
        "fields": {
            "Email": "ops@example.com",
            "Password Hash": "$argon2id$v=19$...",
            "Role": "admin",
            "Active": true
        }
    }))
    .unwrap();

    let fields: UserFields = record.fields_as().unwrap();
    assert_eq!(fields.email.as_deref(), Some("ops@example.com"));
    assert!(fields.password_hash.as_deref().unwrap().starts_with("$argon2id$"));
    assert_eq!(fields.role.as_deref(), Some("admin"));
    assert_eq!(fields.active, Some(true));
}

#[test]
fn test_scan_record_serializes_display_names() {
    let fields = ScanFields {
        barcode: Some("036000291452".to_string()),
        channel: Some("auction".to_string()),
        scanned_by: Some("ops@example.com".to_string()),
        source: Some("UPCItemDB".to_string()),
        ..ScanFields::default()
    };

    let json = serde_json::to_value(&fields).unwrap();
    assert_eq!(json["Barcode"], "036000291452");
    assert_eq!(json["Channel"], "auction");
    assert_eq!(json["Scanned By"], "ops@example.com");
    assert_eq!(json["Source"], "UPCItemDB");
}

#[test]
fn test_formula_quoting_survives_hostile_values() {
    // Barcodes come from client scans; a stray quote must not break out of
    // the filterByFormula string literal.
    let formula = field_equals("Barcode", "12345' OR TRUE() '");
    assert_eq!(formula, "{Barcode} = '12345'' OR TRUE() '''");

    assert_eq!(escape_formula_value("plain"), "plain");
    assert_eq!(escape_formula_value("O'Brien"), "O''Brien");
}
