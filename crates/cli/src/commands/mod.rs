//! CLI command implementations.

pub mod auth;
pub mod images;
pub mod sync;
