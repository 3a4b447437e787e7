//! WooCommerce REST API client (wc/v3).
//!
//! Credentials travel as HTTP basic auth. Product meta is the bridge to
//! Airtable: an `airtable_id` entry in `meta_data` ties a Woo product to its
//! source record.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use crate::config::WooConfig;

/// WooCommerce pages product listings at 100 per page.
const PER_PAGE: u32 = 100;

/// Meta key tying a product to its Airtable record.
pub const META_AIRTABLE_ID: &str = "airtable_id";

/// Meta key stamped when a push from Airtable lands.
pub const META_LAST_AIRTABLE_SYNC: &str = "last_airtable_sync";

/// Errors that can occur when interacting with the WooCommerce API.
#[derive(Debug, Error)]
pub enum WooError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Product not found.
    #[error("Product not found")]
    NotFound,
}

/// A product category reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WooCategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A product image reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WooImage {
    pub src: String,
}

/// One `meta_data` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WooMeta {
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

/// A WooCommerce product, as returned by the API.
///
/// Prices arrive as strings; absent ones as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WooProduct {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub regular_price: String,
    #[serde(default)]
    pub sale_price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub stock_status: Option<String>,
    #[serde(default)]
    pub categories: Vec<WooCategory>,
    #[serde(default)]
    pub images: Vec<WooImage>,
    #[serde(default)]
    pub meta_data: Vec<WooMeta>,
}

impl WooProduct {
    /// The Airtable record ID stored in this product's meta, if any.
    #[must_use]
    pub fn airtable_id(&self) -> Option<&str> {
        self.meta_data
            .iter()
            .find(|meta| meta.key == META_AIRTABLE_ID)
            .and_then(|meta| meta.value.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// WooCommerce REST API client.
#[derive(Debug, Clone)]
pub struct WooClient {
    client: reqwest::Client,
    base_url: String,
    consumer_key: SecretString,
    consumer_secret: SecretString,
}

impl WooClient {
    /// Create a client for a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &WooConfig, timeout: std::time::Duration) -> Result<Self, WooError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: format!("{}/wp-json/wc/v3", config.url.trim_end_matches('/')),
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.clone(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/{path}", self.base_url))
            .basic_auth(
                self.consumer_key.expose_secret(),
                Some(self.consumer_secret.expose_secret()),
            )
    }

    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, WooError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(WooError::NotFound);
        }
        let message = response.text().await.unwrap_or_default();
        Err(WooError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Fetch a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `WooError::NotFound` if no such product exists.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i64) -> Result<WooProduct, WooError> {
        let response = self
            .request(reqwest::Method::GET, &format!("products/{id}"))
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    /// Find a product by SKU.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn find_by_sku(&self, sku: &str) -> Result<Option<WooProduct>, WooError> {
        let response = self
            .request(reqwest::Method::GET, "products")
            .query(&[("sku", sku)])
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        let products: Vec<WooProduct> = response.json().await?;
        Ok(products.into_iter().next())
    }

    /// Find a product carrying the given Airtable record ID in its meta.
    ///
    /// The REST API can't filter on meta, so this walks the catalog page by
    /// page. Callers should try [`Self::find_by_sku`] first.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    #[instrument(skip(self))]
    pub async fn find_by_airtable_id(
        &self,
        airtable_id: &str,
    ) -> Result<Option<WooProduct>, WooError> {
        let mut page = 1u32;
        loop {
            let batch = self.list_page(page).await?;
            if batch.is_empty() {
                return Ok(None);
            }
            let count = batch.len();
            if let Some(found) = batch
                .into_iter()
                .find(|p| p.airtable_id() == Some(airtable_id))
            {
                return Ok(Some(found));
            }
            if count < PER_PAGE as usize {
                return Ok(None);
            }
            page += 1;
        }
    }

    /// Fetch one page of the product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_page(&self, page: u32) -> Result<Vec<WooProduct>, WooError> {
        let response = self
            .request(reqwest::Method::GET, "products")
            .query(&[("per_page", PER_PAGE.to_string()), ("page", page.to_string())])
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    /// Fetch the entire product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    pub async fn list_all(&self) -> Result<Vec<WooProduct>, WooError> {
        let mut products = Vec::new();
        let mut page = 1u32;
        loop {
            let batch = self.list_page(page).await?;
            let count = batch.len();
            products.extend(batch);
            if count < PER_PAGE as usize {
                return Ok(products);
            }
            page += 1;
        }
    }

    /// Create a product from a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is rejected.
    #[instrument(skip(self, payload))]
    pub async fn create_product(&self, payload: &Value) -> Result<WooProduct, WooError> {
        let response = self
            .request(reqwest::Method::POST, "products")
            .json(payload)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    /// Update a product from a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns `WooError::NotFound` if no such product exists.
    #[instrument(skip(self, payload))]
    pub async fn update_product(&self, id: i64, payload: &Value) -> Result<WooProduct, WooError> {
        let response = self
            .request(reqwest::Method::PUT, &format!("products/{id}"))
            .json(payload)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    /// Permanently delete a product (skips the trash).
    ///
    /// # Errors
    ///
    /// Returns `WooError::NotFound` if no such product exists.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i64) -> Result<(), WooError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("products/{id}"))
            .query(&[("force", "true")])
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }
}
