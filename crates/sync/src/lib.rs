//! StockLink sync service library.
//!
//! Keeps an Airtable products table and a WooCommerce store in step.
//! Webhooks from either side land on this service, get classified and
//! queued, and background workers push the change to the opposite side.
//! A TTL tracker suppresses the echo each push would otherwise trigger.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod queue;
pub mod routes;
pub mod signature;
pub mod state;
pub mod tracker;
pub mod woocommerce;
