//! Retailer product-page scraping.
//!
//! Amazon pages are parsed with targeted regexes; Walmart embeds its page
//! state in a `__NEXT_DATA__` JSON blob. Parsing is split out from fetching
//! so the extractors can be tested against captured HTML.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::providers::browser_headers;
use super::{LookupError, LookupItem, extract_number};
use stocklink_core::CurrencyCode;

const MAX_IMAGES: usize = 6;
const MAX_BULLETS: usize = 5;

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<span id="productTitle"[^>]*>(.*?)</span>"#).expect("Invalid regex")
});

static BULLETS_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)id="feature-bullets".*?<ul[^>]*>(.*?)</ul>"#).expect("Invalid regex")
});

static BULLET_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<li[^>]*>\s*<span[^>]*>(.*?)</span>"#).expect("Invalid regex")
});

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s*([0-9]+[\.,]?[0-9]*)").expect("Invalid regex"));

static DYNAMIC_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-a-dynamic-image="(\{.*?\})""#).expect("Invalid regex")
});

static NEXT_DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script id="__NEXT_DATA__" type="application/json">(.*?)</script>"#)
        .expect("Invalid regex")
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid regex"));

/// Which scraper handles a given product URL, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retailer {
    Amazon,
    Walmart,
}

impl Retailer {
    /// Dispatch on the URL host. Shortlink domains count as Amazon.
    #[must_use]
    pub fn for_url(url: &str) -> Option<Self> {
        if url.contains("amazon.") || url.contains("a.co") || url.contains("amzn.to") {
            Some(Self::Amazon)
        } else if url.contains("walmart.") {
            Some(Self::Walmart)
        } else {
            None
        }
    }
}

/// Parse an Amazon product page.
#[must_use]
pub fn parse_amazon(html: &str, url: &str) -> Option<LookupItem> {
    let title = TITLE_RE
        .captures(html)
        .map(|c| decode_entities(c[1].trim()));

    // The feature-bullets block appears once; the items are matched within it
    let bullets: Vec<String> = BULLETS_BLOCK_RE
        .captures(html)
        .map(|block| {
            BULLET_ITEM_RE
                .captures_iter(&block[1])
                .take(MAX_BULLETS)
                .map(|c| decode_entities(TAG_RE.replace_all(&c[1], "").trim()))
                .filter(|b| !b.is_empty())
                .collect()
        })
        .unwrap_or_default();
    let description = if bullets.is_empty() {
        None
    } else {
        Some(bullets.join(". "))
    };

    let price = PRICE_RE
        .captures(html)
        .and_then(|c| extract_number(&c[1]));

    let images = DYNAMIC_IMAGE_RE
        .captures(html)
        .and_then(|c| serde_json::from_str::<Value>(&c[1]).ok())
        .and_then(|v| {
            v.as_object()
                .map(|map| map.keys().take(MAX_IMAGES).cloned().collect::<Vec<_>>())
        })
        .unwrap_or_default();

    if title.is_none() && images.is_empty() {
        return None;
    }

    let currency = if url.contains(".com") {
        CurrencyCode::USD
    } else {
        CurrencyCode::CAD
    };
    Some(LookupItem {
        name: title,
        description,
        price,
        currency: Some(currency),
        images,
        source: Some("Amazon".to_string()),
        url: Some(url.to_string()),
        ..LookupItem::default()
    })
}

/// Parse a Walmart product page via its embedded `__NEXT_DATA__` state.
#[must_use]
pub fn parse_walmart(html: &str, url: &str) -> Option<LookupItem> {
    let captures = NEXT_DATA_RE.captures(html)?;
    let state: Value = serde_json::from_str(&captures[1]).ok()?;

    let data = state
        .get("props")?
        .get("pageProps")?
        .get("initialData")?
        .get("data")?;
    let product = data.get("product")?;

    let name = product
        .get("name")
        .and_then(Value::as_str)
        .map(ToString::to_string);
    let description = product
        .get("shortDescription")
        .and_then(Value::as_str)
        .map(ToString::to_string);

    let price = data
        .get("price")
        .and_then(|p| p.get("item"))
        .and_then(|item| item.get("price"))
        .and_then(|raw| match raw {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => extract_number(s),
            _ => None,
        });

    let images: Vec<String> = product
        .get("imageInfo")
        .and_then(|info| info.get("allImages"))
        .and_then(Value::as_array)
        .map(|imgs| {
            imgs.iter()
                .filter_map(|img| img.get("url").and_then(Value::as_str))
                .take(MAX_IMAGES)
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default();

    name.as_ref()?;

    let currency = if url.contains(".ca") {
        CurrencyCode::CAD
    } else {
        CurrencyCode::USD
    };
    Some(LookupItem {
        name,
        description,
        price,
        currency: Some(currency),
        images,
        source: Some("Walmart".to_string()),
        url: Some(url.to_string()),
        ..LookupItem::default()
    })
}

/// Fetch a retailer product page and extract an item from it.
///
/// # Errors
///
/// Returns an error if the page cannot be fetched. An unrecognized host or
/// an unparseable page yields `Ok(None)`.
pub async fn enrich_from_url(
    client: &reqwest::Client,
    url: &str,
) -> Result<Option<LookupItem>, LookupError> {
    let Some(retailer) = Retailer::for_url(url) else {
        return Ok(None);
    };

    let response = client.get(url).headers(browser_headers()).send().await?;
    if !response.status().is_success() {
        return Ok(None);
    }
    let html = response.text().await?;

    Ok(match retailer {
        Retailer::Amazon => parse_amazon(&html, url),
        Retailer::Walmart => parse_walmart(&html, url),
    })
}

/// Minimal entity decoding for the handful that show up in product titles.
fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}
