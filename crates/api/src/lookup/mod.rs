//! Barcode and product-URL lookup.
//!
//! Providers are tried in a fixed order until one returns a usable item;
//! URL enrichment dispatches on the retailer host. Results are cached by
//! the [`resolver::LookupResolver`].

pub mod providers;
pub mod resolver;
pub mod scrape;

pub use resolver::LookupResolver;

use serde::{Deserialize, Serialize};
use stocklink_core::CurrencyCode;
use thiserror::Error;

/// Errors from lookup providers and scrapers.
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse a provider response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A normalized product description assembled from any lookup source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<CurrencyCode>,
    #[serde(default)]
    pub images: Vec<String>,
    pub dimensions: Option<String>,
    pub weight: Option<String>,
    pub source: Option<String>,
    pub barcode: Option<String>,
    pub url: Option<String>,
}

impl LookupItem {
    /// An item is usable when it carries at least a name or an image.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.name.is_some() || !self.images.is_empty()
    }
}

/// Extract the first number from a free-form price or quantity string.
///
/// Accepts both `.` and `,` decimal separators.
#[must_use]
pub fn extract_number(value: &str) -> Option<f64> {
    let mut start = None;
    let bytes = value.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() {
            start = Some(i);
            break;
        }
    }
    let start = start?;
    let mut end = start;
    let mut seen_separator = false;
    for (i, b) in bytes.iter().enumerate().skip(start) {
        match b {
            b'0'..=b'9' => end = i + 1,
            b'.' | b',' if !seen_separator => {
                seen_separator = true;
                end = i + 1;
            }
            _ => break,
        }
    }
    value[start..end]
        .trim_end_matches(['.', ','])
        .replace(',', ".")
        .parse()
        .ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_number_plain() {
        assert!((extract_number("24.99").unwrap() - 24.99).abs() < f64::EPSILON);
    }

    #[test]
    fn test_extract_number_currency_prefix() {
        assert!((extract_number("$ 1099.95").unwrap() - 1099.95).abs() < f64::EPSILON);
    }

    #[test]
    fn test_extract_number_comma_decimal() {
        assert!((extract_number("24,99 EUR").unwrap() - 24.99).abs() < f64::EPSILON);
    }

    #[test]
    fn test_extract_number_none() {
        assert!(extract_number("no price listed").is_none());
    }

    #[test]
    fn test_is_usable() {
        assert!(!LookupItem::default().is_usable());
        let named = LookupItem {
            name: Some("Widget".to_string()),
            ..LookupItem::default()
        };
        assert!(named.is_usable());
        let imaged = LookupItem {
            images: vec!["https://example.com/a.jpg".to_string()],
            ..LookupItem::default()
        };
        assert!(imaged.is_usable());
    }
}
