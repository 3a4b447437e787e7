//! Barcode type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Barcode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum BarcodeError {
    /// The input string is empty after trimming.
    #[error("barcode cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("barcode must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains characters outside the allowed set.
    #[error("barcode may only contain letters, digits, and hyphens")]
    InvalidCharacter,
}

/// A product barcode (UPC, EAN, or internal SKU-style code).
///
/// Within a tenant's Airtable base a barcode uniquely identifies a product.
/// That uniqueness is enforced by the lookup-then-create-or-update flow in
/// the API, not by this type - the type only guarantees the value is a
/// plausible code.
///
/// ## Constraints
///
/// - Length: 1-64 characters after trimming surrounding whitespace
/// - ASCII letters, digits, and hyphens only
///
/// ## Examples
///
/// ```
/// use stocklink_core::Barcode;
///
/// assert!(Barcode::parse("036000291452").is_ok());
/// assert!(Barcode::parse("4MORE-00123").is_ok());
///
/// assert!(Barcode::parse("").is_err());        // empty
/// assert!(Barcode::parse("  \t ").is_err());   // whitespace only
/// assert!(Barcode::parse("abc def").is_err()); // interior whitespace
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Barcode(String);

impl Barcode {
    /// Maximum length of a barcode.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `Barcode` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than 64
    /// characters, or contains characters outside `[A-Za-z0-9-]`.
    pub fn parse(s: &str) -> Result<Self, BarcodeError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(BarcodeError::Empty);
        }

        if trimmed.len() > Self::MAX_LENGTH {
            return Err(BarcodeError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(BarcodeError::InvalidCharacter);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the barcode as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Barcode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Whether this looks like a numeric retail code (UPC-A, EAN-8/13).
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.0.chars().all(|c| c.is_ascii_digit())
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Barcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Barcode {
    type Error = BarcodeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_upc() {
        let barcode = Barcode::parse("036000291452").expect("valid UPC");
        assert_eq!(barcode.as_str(), "036000291452");
        assert!(barcode.is_numeric());
    }

    #[test]
    fn parse_trims_whitespace() {
        let barcode = Barcode::parse("  4MORE-00123 \n").expect("valid code");
        assert_eq!(barcode.as_str(), "4MORE-00123");
        assert!(!barcode.is_numeric());
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(matches!(Barcode::parse(""), Err(BarcodeError::Empty)));
        assert!(matches!(Barcode::parse("   "), Err(BarcodeError::Empty)));
    }

    #[test]
    fn parse_rejects_interior_whitespace() {
        assert!(matches!(
            Barcode::parse("123 456"),
            Err(BarcodeError::InvalidCharacter)
        ));
    }

    #[test]
    fn parse_rejects_too_long() {
        let long = "9".repeat(Barcode::MAX_LENGTH + 1);
        assert!(matches!(
            Barcode::parse(&long),
            Err(BarcodeError::TooLong { .. })
        ));
    }

    #[test]
    fn serde_is_transparent() {
        let barcode = Barcode::parse("036000291452").expect("valid UPC");
        let json = serde_json::to_string(&barcode).expect("serialize");
        assert_eq!(json, "\"036000291452\"");

        let back: Barcode = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, barcode);
    }
}
