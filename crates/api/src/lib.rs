//! Stocklink API library.
//!
//! This crate provides the inventory API functionality as a library,
//! allowing it to be tested and reused. The sync service and the CLI
//! both reuse the [`airtable`] client and the [`models`] field mappings.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod airtable;
pub mod config;
pub mod error;
pub mod lookup;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
