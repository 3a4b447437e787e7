//! Lookup resolution with caching.

use std::time::Duration;

use moka::future::Cache;
use stocklink_core::CurrencyCode;

use super::providers::ProviderChain;
use super::{LookupError, LookupItem, scrape};

/// How long resolved barcodes stay cached.
const CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Maximum number of cached lookups.
const CACHE_CAPACITY: u64 = 5_000;

/// Resolves barcodes through the provider chain and URLs through the
/// retailer scrapers, caching barcode results.
#[derive(Debug, Clone)]
pub struct LookupResolver {
    client: reqwest::Client,
    providers: ProviderChain,
    cache: Cache<String, Option<LookupItem>>,
}

impl LookupResolver {
    /// Create a resolver sharing the given HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client, providers: ProviderChain) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();
        Self {
            client,
            providers,
            cache,
        }
    }

    /// Resolve a barcode, consulting the cache first.
    ///
    /// Negative results are cached too, so a flood of scans of an unknown
    /// code doesn't hammer the providers.
    ///
    /// # Errors
    ///
    /// Returns an error only on unexpected transport failures.
    pub async fn resolve_barcode(
        &self,
        barcode: &str,
    ) -> Result<Option<LookupItem>, LookupError> {
        if let Some(cached) = self.cache.get(barcode).await {
            tracing::debug!(barcode, "Lookup cache hit");
            return Ok(cached);
        }

        let resolved = self.providers.resolve(barcode).await?;
        self.cache
            .insert(barcode.to_string(), resolved.clone())
            .await;
        Ok(resolved)
    }

    /// Enrich from a retailer product URL. Not cached; URLs are one-offs.
    ///
    /// # Errors
    ///
    /// Returns an error if the page fetch fails.
    pub async fn resolve_url(&self, url: &str) -> Result<Option<LookupItem>, LookupError> {
        scrape::enrich_from_url(&self.client, url).await
    }

    /// Resolve a barcode, falling back to URL enrichment.
    ///
    /// Mirrors client behavior: a scan may carry a barcode, a product URL
    /// from a QR code, or both.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failures from either path.
    pub async fn resolve(
        &self,
        barcode: Option<&str>,
        url: Option<&str>,
    ) -> Result<Option<LookupItem>, LookupError> {
        if let Some(barcode) = barcode
            && let Some(item) = self.resolve_barcode(barcode).await?
        {
            return Ok(Some(normalize(item, Some(barcode))));
        }
        if let Some(url) = url
            && let Some(item) = self.resolve_url(url).await?
        {
            return Ok(Some(normalize(item, barcode)));
        }
        Ok(None)
    }
}

/// Attach defaults the clients rely on.
fn normalize(mut item: LookupItem, barcode: Option<&str>) -> LookupItem {
    if item.currency.is_none() {
        item.currency = Some(CurrencyCode::USD);
    }
    if item.source.is_none() {
        item.source = Some("Internet".to_string());
    }
    if item.barcode.is_none() {
        item.barcode = barcode.map(ToString::to_string);
    }
    item
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use secrecy::SecretString;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver_for(server: &MockServer, config: ProviderConfig) -> LookupResolver {
        let client = reqwest::Client::new();
        let providers =
            ProviderChain::new(client.clone(), config).with_base_url(&server.uri());
        LookupResolver::new(client, providers)
    }

    #[tokio::test]
    async fn test_barcode_results_are_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/upcitemdb/lookup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{ "title": "Cached Widget" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = ProviderConfig {
            upcitemdb_api_key: Some(SecretString::from("testkey123")),
            ..ProviderConfig::default()
        };
        let resolver = resolver_for(&server, config);

        for _ in 0..3 {
            let item = resolver.resolve_barcode("012345678905").await.unwrap();
            assert_eq!(item.unwrap().name.as_deref(), Some("Cached Widget"));
        }
    }

    #[tokio::test]
    async fn test_negative_results_are_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/upcitemdb/lookup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = ProviderConfig {
            upcitemdb_api_key: Some(SecretString::from("testkey123")),
            ..ProviderConfig::default()
        };
        let resolver = resolver_for(&server, config);

        for _ in 0..3 {
            assert!(resolver.resolve_barcode("000000000000").await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_normalize_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/upcitemdb/lookup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{ "title": "Plain Widget" }]
            })))
            .mount(&server)
            .await;

        let config = ProviderConfig {
            upcitemdb_api_key: Some(SecretString::from("testkey123")),
            ..ProviderConfig::default()
        };
        let resolver = resolver_for(&server, config);

        let item = resolver
            .resolve(Some("012345678905"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.currency, Some(CurrencyCode::USD));
        assert_eq!(item.barcode.as_deref(), Some("012345678905"));
    }
}
