//! Sales channels.
//!
//! A tenant's Airtable base holds one items table per sales channel. The
//! REST API and the sync service both address tables through this enum
//! rather than raw table-name strings.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a channel name cannot be parsed.
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown channel: {0}")]
pub struct ChannelParseError(pub String);

/// A sales channel backed by its own Airtable items table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Lots sold through timed online auctions.
    Auction,
    /// Fixed-price bin-store inventory.
    Bin,
    /// Direct retail listings (the WooCommerce-synced channel).
    Retail,
    /// The master product catalogue.
    #[default]
    Catalogue,
    /// Items undergoing repair or refurbishment.
    Repair,
}

impl Channel {
    /// All channels, in display order.
    pub const ALL: [Self; 5] = [
        Self::Auction,
        Self::Bin,
        Self::Retail,
        Self::Catalogue,
        Self::Repair,
    ];

    /// The canonical lowercase name used in query parameters and configs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auction => "auction",
            Self::Bin => "bin",
            Self::Retail => "retail",
            Self::Catalogue => "catalogue",
            Self::Repair => "repair",
        }
    }

    /// The default Airtable table name for this channel.
    ///
    /// Deployments override these via `AIRTABLE_TABLE_*` env vars.
    #[must_use]
    pub const fn default_table_name(self) -> &'static str {
        match self {
            Self::Auction => "Items-Auction",
            Self::Bin => "Items-Bin",
            Self::Retail => "Items-Retail",
            Self::Catalogue => "Items-Catalogue",
            Self::Repair => "Items-Repair",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ChannelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auction" => Ok(Self::Auction),
            "bin" => Ok(Self::Bin),
            "retail" => Ok(Self::Retail),
            "catalogue" | "catalog" => Ok(Self::Catalogue),
            "repair" => Ok(Self::Repair),
            other => Err(ChannelParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_channel() {
        for channel in Channel::ALL {
            let parsed: Channel = channel.as_str().parse().expect("canonical name parses");
            assert_eq!(parsed, channel);
        }
    }

    #[test]
    fn parse_accepts_catalog_spelling() {
        assert_eq!("catalog".parse::<Channel>().expect("parses"), Channel::Catalogue);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Retail".parse::<Channel>().expect("parses"), Channel::Retail);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("wholesale".parse::<Channel>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Channel::Auction).expect("serialize");
        assert_eq!(json, "\"auction\"");
    }
}
