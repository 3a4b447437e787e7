//! Core types for Stocklink.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod barcode;
pub mod channel;
pub mod currency;
pub mod id;
pub mod status;

pub use barcode::{Barcode, BarcodeError};
pub use channel::{Channel, ChannelParseError};
pub use currency::CurrencyCode;
pub use id::WooProductId;
pub use status::*;
