//! Stocklink Core - Shared types library.
//!
//! This crate provides common types used across all Stocklink components:
//! - `api` - Airtable-backed inventory REST API
//! - `sync` - Airtable / WooCommerce bidirectional sync service
//! - `cli` - Command-line tools for image downloads and management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no Airtable
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Barcodes, channels, currency codes, product IDs, and
//!   status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
