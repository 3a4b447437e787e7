//! Shared application state.

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::airtable::{AirtableClient, AirtableError};
use crate::config::ApiConfig;
use crate::lookup::LookupResolver;
use crate::lookup::providers::ProviderChain;
use crate::models::StatsResponse;
use crate::services::AuthService;

/// How long computed inventory statistics stay cached.
const STATS_CACHE_TTL: Duration = Duration::from_secs(60);

/// Shared application state, cheap to clone.
#[derive(Clone)]
pub struct AppState(Arc<Inner>);

pub struct Inner {
    pub config: ApiConfig,
    pub airtable: AirtableClient,
    pub lookup: LookupResolver,
    pub auth: AuthService,
    /// Cache for the stats endpoint, keyed by channel filter; the
    /// computation walks whole channel tables.
    pub stats_cache: Cache<Option<stocklink_core::Channel>, StatsResponse>,
}

impl AppState {
    /// Build the state from configuration, constructing all service clients.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client fails to build.
    pub fn new(config: ApiConfig) -> Result<Self, AirtableError> {
        let airtable = AirtableClient::new(&config.airtable, config.http_timeout)?;

        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        let providers = ProviderChain::new(http.clone(), config.providers.clone());
        let lookup = LookupResolver::new(http, providers);

        let auth = AuthService::new(
            &config.auth,
            airtable.clone(),
            config.airtable.users_table.clone(),
        );

        let stats_cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(STATS_CACHE_TTL)
            .build();

        Ok(Self(Arc::new(Inner {
            config,
            airtable,
            lookup,
            auth,
            stats_cache,
        })))
    }
}

impl Deref for AppState {
    type Target = Inner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
