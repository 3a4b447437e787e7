//! Shared application state for the sync service.

use std::ops::Deref;
use std::sync::Arc;
use std::time::Instant;

use crate::config::SyncConfig;
use crate::engine::{SyncEngine, SyncError};
use crate::queue::SyncQueues;
use crate::tracker::SyncTracker;
use crate::woocommerce::WooClient;

use stocklink_api::airtable::AirtableClient;

/// Shared application state, cheap to clone.
#[derive(Clone)]
pub struct AppState(Arc<Inner>);

pub struct Inner {
    pub config: SyncConfig,
    pub engine: Arc<SyncEngine>,
    pub queues: SyncQueues,
    pub started: Instant,
}

impl AppState {
    /// Build the state, constructing both platform clients and starting
    /// the queue workers.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client fails to build.
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        let airtable = AirtableClient::from_parts(
            &config.airtable.api_url,
            &config.airtable.api_key,
            &config.airtable.base_id,
            config.http_timeout,
        )?;
        let woo = WooClient::new(&config.woo, config.http_timeout)?;
        let tracker = Arc::new(SyncTracker::new(config.sync_ttl));

        let engine = Arc::new(SyncEngine::new(
            airtable,
            woo,
            config.airtable.table.clone(),
            tracker,
        ));
        let queues = SyncQueues::start(Arc::clone(&engine));

        Ok(Self(Arc::new(Inner {
            config,
            engine,
            queues,
            started: Instant::now(),
        })))
    }
}

impl Deref for AppState {
    type Target = Inner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
