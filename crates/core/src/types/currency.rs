//! Currency codes for lookup results.

use core::fmt;

use serde::{Deserialize, Serialize};

/// ISO 4217 currency code.
///
/// Only the currencies the lookup providers and stores actually emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    CAD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// The ISO code as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::CAD => "CAD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_iso_code() {
        let json = serde_json::to_string(&CurrencyCode::CAD).expect("serialize");
        assert_eq!(json, "\"CAD\"");
    }

    #[test]
    fn display_matches_as_str() {
        for code in [
            CurrencyCode::USD,
            CurrencyCode::CAD,
            CurrencyCode::EUR,
            CurrencyCode::GBP,
        ] {
            assert_eq!(code.to_string(), code.as_str());
        }
    }
}
