//! Status enums for inventory records and sync bookkeeping.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a product record.
///
/// Matches the single-select options in the Airtable base; the serde
/// renames are the exact option labels so records round-trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductStatus {
    /// Freshly scanned or scraped, not yet reviewed.
    #[default]
    Scraped,
    /// Reviewed and listed on a sales channel.
    Listed,
    /// Sold and awaiting pickup or shipment.
    Sold,
    /// Returned by a buyer.
    Returned,
    /// Pulled from sale.
    Archived,
}

impl ProductStatus {
    /// The Airtable single-select label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scraped => "Scraped",
            Self::Listed => "Listed",
            Self::Sold => "Sold",
            Self::Returned => "Returned",
            Self::Archived => "Archived",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical condition of a liquidation item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ItemCondition {
    #[default]
    New,
    #[serde(rename = "Open Box")]
    OpenBox,
    Used,
    Damaged,
    #[serde(rename = "For Parts")]
    ForParts,
}

impl ItemCondition {
    /// The Airtable single-select label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::OpenBox => "Open Box",
            Self::Used => "Used",
            Self::Damaged => "Damaged",
            Self::ForParts => "For Parts",
        }
    }
}

impl fmt::Display for ItemCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WooCommerce stock status, derived from the stock quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    InStock,
    OutOfStock,
}

impl StockStatus {
    /// Derive the stock status from an on-hand quantity.
    #[must_use]
    pub const fn from_quantity(quantity: i64) -> Self {
        if quantity > 0 {
            Self::InStock
        } else {
            Self::OutOfStock
        }
    }

    /// The WooCommerce REST value (`instock` / `outofstock`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InStock => "instock",
            Self::OutOfStock => "outofstock",
        }
    }
}

/// Which side of the Airtable / WooCommerce pair produced a change.
///
/// Used by the sync service's loop-suppression tracker: a change is an
/// echo when the same record was just written by the *opposite* origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOrigin {
    Airtable,
    #[serde(rename = "woocommerce")]
    WooCommerce,
}

impl SyncOrigin {
    /// The other side of the pair.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Airtable => Self::WooCommerce,
            Self::WooCommerce => Self::Airtable,
        }
    }

    /// Short key prefix used in tracker keys and logs.
    #[must_use]
    pub const fn key_prefix(self) -> &'static str {
        match self {
            Self::Airtable => "at",
            Self::WooCommerce => "woo",
        }
    }
}

impl fmt::Display for SyncOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Airtable => f.write_str("airtable"),
            Self::WooCommerce => f.write_str("woocommerce"),
        }
    }
}
