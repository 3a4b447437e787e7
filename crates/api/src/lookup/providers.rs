//! Barcode lookup providers.
//!
//! Each provider returns `Ok(None)` when it is not configured, the barcode
//! is unknown, or the upstream answered with anything but a clean hit. The
//! resolver treats all of those the same way and falls through to the next
//! provider in the chain.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;

use crate::config::ProviderConfig;

use super::{LookupError, LookupItem, extract_number};

const UPCITEMDB_URL: &str = "https://api.upcitemdb.com/prod/trial/lookup";
const BARCODELOOKUP_URL: &str = "https://api.barcodelookup.com/v3/products";
const OPENFOODFACTS_URL: &str = "https://world.openfoodfacts.org/api/v0/product";

/// Provider chain backed by a shared HTTP client.
#[derive(Debug, Clone)]
pub struct ProviderChain {
    client: reqwest::Client,
    config: ProviderConfig,
    upcitemdb_url: String,
    barcodelookup_url: String,
    openfoodfacts_url: String,
}

#[derive(Debug, Deserialize)]
struct UpcItemDbResponse {
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct BarcodeLookupResponse {
    #[serde(default)]
    products: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct OpenFoodFactsResponse {
    product: Option<Value>,
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn number_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => extract_number(s),
        _ => None,
    }
}

fn string_array(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl ProviderChain {
    /// Create the chain with a pre-built HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client, config: ProviderConfig) -> Self {
        Self {
            client,
            config,
            upcitemdb_url: UPCITEMDB_URL.to_string(),
            barcodelookup_url: BARCODELOOKUP_URL.to_string(),
            openfoodfacts_url: OPENFOODFACTS_URL.to_string(),
        }
    }

    /// Point every provider at a different base URL. Test hook.
    #[must_use]
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.upcitemdb_url = format!("{base}/upcitemdb/lookup");
        self.barcodelookup_url = format!("{base}/barcodelookup/products");
        self.openfoodfacts_url = format!("{base}/openfoodfacts/product");
        self
    }

    /// Try providers in order and return the first usable item.
    ///
    /// # Errors
    ///
    /// Individual provider failures are logged and skipped; an error is only
    /// returned if the final provider fails with a transport error worth
    /// surfacing. In practice this resolves to `Ok(None)` for unknown codes.
    pub async fn resolve(&self, barcode: &str) -> Result<Option<LookupItem>, LookupError> {
        for (name, result) in [
            ("upcitemdb", self.upcitemdb(barcode).await),
            ("barcodelookup", self.barcodelookup(barcode).await),
            ("openfoodfacts", self.openfoodfacts(barcode).await),
        ] {
            match result {
                Ok(Some(item)) if item.is_usable() => {
                    tracing::debug!(provider = name, barcode, "Lookup hit");
                    return Ok(Some(item));
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(provider = name, barcode, error = %err, "Provider failed");
                }
            }
        }
        Ok(None)
    }

    async fn upcitemdb(&self, barcode: &str) -> Result<Option<LookupItem>, LookupError> {
        let Some(key) = &self.config.upcitemdb_api_key else {
            return Ok(None);
        };
        let mut headers = HeaderMap::new();
        headers.insert(
            "user_key",
            HeaderValue::from_str(key.expose_secret())
                .map_err(|e| LookupError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let response = self
            .client
            .get(&self.upcitemdb_url)
            .headers(headers)
            .query(&[("upc", barcode)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(None);
        }

        let body: UpcItemDbResponse = response.json().await?;
        let Some(item) = body.items.first() else {
            return Ok(None);
        };

        Ok(Some(LookupItem {
            name: str_field(item, "title"),
            description: str_field(item, "description").or_else(|| str_field(item, "brand")),
            price: number_field(item, "lowest_recorded_price"),
            images: string_array(item, "images"),
            dimensions: str_field(item, "size"),
            source: Some("upcitemdb".to_string()),
            barcode: Some(barcode.to_string()),
            url: item
                .get("offers")
                .and_then(Value::as_array)
                .and_then(|offers| offers.first())
                .and_then(|offer| str_field(offer, "link")),
            ..LookupItem::default()
        }))
    }

    async fn barcodelookup(&self, barcode: &str) -> Result<Option<LookupItem>, LookupError> {
        let Some(key) = &self.config.barcodelookup_api_key else {
            return Ok(None);
        };

        let response = self
            .client
            .get(&self.barcodelookup_url)
            .query(&[("barcode", barcode), ("key", key.expose_secret())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(None);
        }

        let body: BarcodeLookupResponse = response.json().await?;
        let Some(product) = body.products.first() else {
            return Ok(None);
        };

        let first_store = product
            .get("stores")
            .and_then(Value::as_array)
            .and_then(|stores| stores.first());

        Ok(Some(LookupItem {
            name: str_field(product, "product_name").or_else(|| str_field(product, "title")),
            description: str_field(product, "description")
                .or_else(|| str_field(product, "category")),
            price: number_field(product, "list_price")
                .or_else(|| first_store.and_then(|s| number_field(s, "price"))),
            images: string_array(product, "images"),
            dimensions: str_field(product, "size"),
            weight: str_field(product, "weight")
                .or_else(|| str_field(product, "package_weight")),
            source: Some("barcodelookup".to_string()),
            barcode: Some(barcode.to_string()),
            url: first_store.and_then(|s| str_field(s, "link")),
            ..LookupItem::default()
        }))
    }

    async fn openfoodfacts(&self, barcode: &str) -> Result<Option<LookupItem>, LookupError> {
        if !self.config.openfoodfacts_enabled {
            return Ok(None);
        }

        let url = format!("{}/{barcode}.json", self.openfoodfacts_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }

        let body: OpenFoodFactsResponse = response.json().await?;
        let Some(product) = body.product else {
            return Ok(None);
        };

        let images = str_field(&product, "image_url")
            .map(|url| vec![url])
            .unwrap_or_default();

        Ok(Some(LookupItem {
            name: str_field(&product, "product_name"),
            description: str_field(&product, "generic_name")
                .or_else(|| str_field(&product, "categories")),
            images,
            source: Some("openfoodfacts".to_string()),
            barcode: Some(barcode.to_string()),
            ..LookupItem::default()
        }))
    }
}

/// Default user agent for outbound scraping requests.
pub(super) fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
    headers
}
