//! Typed entity identifiers.
//!
//! Airtable record identifiers are opaque strings (`recXXXXXXXXXXXXXX`)
//! and travel as plain `String`s alongside the raw record JSON. WooCommerce
//! product IDs are numeric and get a wrapper so they cannot be confused
//! with stock quantities or other integers in field payloads.

use serde::{Deserialize, Serialize};

/// A WooCommerce product ID (numeric, assigned by WordPress).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WooProductId(i64);

impl WooProductId {
    /// Create a new ID from an i64 value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying i64 value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for WooProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for WooProductId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<WooProductId> for i64 {
    fn from(id: WooProductId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn woo_product_id_conversions() {
        let id = WooProductId::new(512);
        assert_eq!(id.as_i64(), 512);
        assert_eq!(i64::from(id), 512);
        assert_eq!(WooProductId::from(512), id);
    }

    #[test]
    fn woo_product_id_serde_transparent() {
        let json = serde_json::to_string(&WooProductId::new(812)).expect("serialize");
        assert_eq!(json, "812");
    }
}
