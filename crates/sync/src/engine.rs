//! Bidirectional sync between the Airtable products table and WooCommerce.

use std::sync::Arc;

use serde_json::json;
use stocklink_core::SyncOrigin;
use stocklink_api::airtable::{AirtableClient, AirtableError, Record, field_equals};
use stocklink_api::models::ProductFields;
use thiserror::Error;

use crate::mapping::{map_airtable_to_woo, map_woo_to_airtable};
use crate::tracker::{SyncTracker, airtable_key, woo_key};
use crate::woocommerce::{META_AIRTABLE_ID, WooClient, WooError, WooProduct};

/// Errors from a single sync operation.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Airtable error: {0}")]
    Airtable(#[from] AirtableError),
    #[error("WooCommerce error: {0}")]
    Woo(#[from] WooError),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// What a sync operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    Updated,
    Deleted,
    /// Suppressed as a webhook echo.
    Skipped,
    /// Nothing on the other side to act on.
    NotFound,
}

/// Pushes individual changes across, consulting the tracker first.
pub struct SyncEngine {
    airtable: AirtableClient,
    woo: WooClient,
    table: String,
    tracker: Arc<SyncTracker>,
}

impl SyncEngine {
    /// Assemble the engine from its clients.
    #[must_use]
    pub fn new(
        airtable: AirtableClient,
        woo: WooClient,
        table: String,
        tracker: Arc<SyncTracker>,
    ) -> Self {
        Self {
            airtable,
            woo,
            table,
            tracker,
        }
    }

    /// The shared echo tracker.
    #[must_use]
    pub fn tracker(&self) -> &SyncTracker {
        &self.tracker
    }

    /// The Airtable client, for full-sync listing.
    #[must_use]
    pub const fn airtable(&self) -> &AirtableClient {
        &self.airtable
    }

    /// The WooCommerce client, for full-sync listing and manual fetches.
    #[must_use]
    pub const fn woo(&self) -> &WooClient {
        &self.woo
    }

    /// The synced Airtable table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Push an Airtable record (by ID) to WooCommerce.
    ///
    /// The matching product is found by SKU first, then by the
    /// `airtable_id` meta. A miss on both creates a new product.
    ///
    /// # Errors
    ///
    /// Returns an error if either platform rejects a request.
    pub async fn sync_airtable_record(&self, record_id: &str) -> Result<SyncOutcome, SyncError> {
        let key = airtable_key(record_id);
        if !self.tracker.should_sync(&key, SyncOrigin::Airtable) {
            tracing::info!(record_id, "Skipping sync, recently synced from WooCommerce");
            return Ok(SyncOutcome::Skipped);
        }

        let record = self.airtable.get_record(&self.table, record_id).await?;
        let fields: ProductFields = record
            .fields_as()
            .map_err(|e| SyncError::Parse(e.to_string()))?;
        let payload = map_airtable_to_woo(&record, &fields);

        let existing = match &fields.barcode {
            Some(sku) => match self.woo.find_by_sku(sku).await? {
                Some(product) => Some(product),
                None => self.woo.find_by_airtable_id(record_id).await?,
            },
            None => self.woo.find_by_airtable_id(record_id).await?,
        };

        let outcome = match existing {
            Some(product) => {
                self.woo.update_product(product.id, &payload).await?;
                SyncOutcome::Updated
            }
            None => {
                self.woo.create_product(&payload).await?;
                SyncOutcome::Created
            }
        };

        self.tracker.add_sync(&key, SyncOrigin::Airtable);
        tracing::info!(
            record_id,
            sku = fields.barcode.as_deref().unwrap_or(""),
            ?outcome,
            "Synced Airtable record to WooCommerce"
        );
        Ok(outcome)
    }

    /// Propagate an Airtable record deletion to WooCommerce.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog walk or the delete fails.
    pub async fn sync_airtable_delete(&self, record_id: &str) -> Result<SyncOutcome, SyncError> {
        match self.woo.find_by_airtable_id(record_id).await? {
            Some(product) => {
                self.woo.delete_product(product.id).await?;
                tracing::info!(record_id, product_id = product.id, "Deleted product from WooCommerce");
                Ok(SyncOutcome::Deleted)
            }
            None => {
                tracing::info!(record_id, "No WooCommerce product to delete");
                Ok(SyncOutcome::NotFound)
            }
        }
    }

    /// Push a WooCommerce product to Airtable.
    ///
    /// The target record comes from the product's `airtable_id` meta,
    /// falling back to a barcode lookup by SKU. A miss on both creates a
    /// new record flagged `Created From WooCommerce`, and the new record
    /// ID is written back into the product's meta.
    ///
    /// # Errors
    ///
    /// Returns an error if either platform rejects a request.
    pub async fn sync_woo_product(&self, product: &WooProduct) -> Result<SyncOutcome, SyncError> {
        let key = woo_key(product.id);
        if !self.tracker.should_sync(&key, SyncOrigin::WooCommerce) {
            tracing::info!(product_id = product.id, "Skipping sync, recently synced from Airtable");
            return Ok(SyncOutcome::Skipped);
        }

        let fields = map_woo_to_airtable(product);

        let record_id = match product.airtable_id() {
            Some(id) => Some(id.to_string()),
            None if !product.sku.is_empty() => self
                .find_record_by_sku(&product.sku)
                .await?
                .map(|record| record.id),
            None => None,
        };

        let outcome = match record_id {
            Some(record_id) => {
                self.airtable
                    .update_record(&self.table, &record_id, &fields)
                    .await?;
                SyncOutcome::Updated
            }
            None => {
                let fields = ProductFields {
                    created_from_woocommerce: Some(true),
                    ..fields
                };
                let created = self.airtable.create_record(&self.table, &fields).await?;
                // Tie the product to its new record for future webhooks
                let meta = json!({
                    "meta_data": [{ "key": META_AIRTABLE_ID, "value": created.id }]
                });
                self.woo.update_product(product.id, &meta).await?;
                SyncOutcome::Created
            }
        };

        self.tracker.add_sync(&key, SyncOrigin::WooCommerce);
        tracing::info!(
            product_id = product.id,
            sku = %product.sku,
            ?outcome,
            "Synced WooCommerce product to Airtable"
        );
        Ok(outcome)
    }

    async fn find_record_by_sku(&self, sku: &str) -> Result<Option<Record>, SyncError> {
        let formula = field_equals("Barcode", sku);
        Ok(self.airtable.find_first(&self.table, &formula).await?)
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}
