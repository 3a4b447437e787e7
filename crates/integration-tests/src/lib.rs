//! Integration tests for StockLink.
//!
//! These exercise the contracts between crates without standing up live
//! Airtable or WooCommerce accounts: field mapping consistency, webhook
//! envelope handling, and echo suppression across the sync boundary.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p stocklink-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `sync_field_mapping` - Airtable/WooCommerce field mapping round trips
//! - `sync_webhook_contract` - Webhook signature and envelope handling
//! - `sync_echo_suppression` - Echo suppression semantics
//! - `api_record_contract` - Airtable field-name contract for API models
