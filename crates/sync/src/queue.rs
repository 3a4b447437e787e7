//! Background sync queues.
//!
//! Webhook handlers only classify and enqueue; two worker tasks drain the
//! queues and drive the [`SyncEngine`]. A failed item is logged and dropped
//! rather than blocking the queue behind it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;

use crate::engine::SyncEngine;
use crate::woocommerce::WooProduct;

/// A queued change on the Airtable side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AirtableTask {
    /// Record was created or updated; fetch and push it.
    Upsert { record_id: String },
    /// Record was deleted; remove the matching product.
    Delete { record_id: String },
}

/// A queued change on the WooCommerce side, carrying the full product
/// payload from the webhook.
#[derive(Debug, Clone)]
pub struct WooTask {
    pub product: WooProduct,
}

/// Handles to both queues plus their depth counters.
#[derive(Clone)]
pub struct SyncQueues {
    airtable_tx: mpsc::UnboundedSender<AirtableTask>,
    woo_tx: mpsc::UnboundedSender<WooTask>,
    airtable_depth: Arc<AtomicUsize>,
    woo_depth: Arc<AtomicUsize>,
}

impl SyncQueues {
    /// Spawn both worker tasks and return the queue handles.
    #[must_use]
    pub fn start(engine: Arc<SyncEngine>) -> Self {
        let (airtable_tx, mut airtable_rx) = mpsc::unbounded_channel::<AirtableTask>();
        let (woo_tx, mut woo_rx) = mpsc::unbounded_channel::<WooTask>();
        let airtable_depth = Arc::new(AtomicUsize::new(0));
        let woo_depth = Arc::new(AtomicUsize::new(0));

        {
            let engine = Arc::clone(&engine);
            let depth = Arc::clone(&airtable_depth);
            tokio::spawn(async move {
                while let Some(task) = airtable_rx.recv().await {
                    let result = match &task {
                        AirtableTask::Upsert { record_id } => {
                            tracing::info!(record_id, "Processing Airtable upsert");
                            engine.sync_airtable_record(record_id).await
                        }
                        AirtableTask::Delete { record_id } => {
                            tracing::info!(record_id, "Processing Airtable delete");
                            engine.sync_airtable_delete(record_id).await
                        }
                    };
                    if let Err(err) = result {
                        tracing::error!(?task, error = %err, "Airtable sync task failed");
                    }
                    depth.fetch_sub(1, Ordering::SeqCst);
                }
            });
        }

        {
            let depth = Arc::clone(&woo_depth);
            tokio::spawn(async move {
                while let Some(task) = woo_rx.recv().await {
                    tracing::info!(product_id = task.product.id, "Processing WooCommerce update");
                    if let Err(err) = engine.sync_woo_product(&task.product).await {
                        tracing::error!(
                            product_id = task.product.id,
                            error = %err,
                            "WooCommerce sync task failed"
                        );
                    }
                    depth.fetch_sub(1, Ordering::SeqCst);
                }
            });
        }

        Self {
            airtable_tx,
            woo_tx,
            airtable_depth,
            woo_depth,
        }
    }

    /// Queue an Airtable-side change. Returns `false` if the worker is gone.
    pub fn enqueue_airtable(&self, task: AirtableTask) -> bool {
        self.airtable_depth.fetch_add(1, Ordering::SeqCst);
        let sent = self.airtable_tx.send(task).is_ok();
        if !sent {
            self.airtable_depth.fetch_sub(1, Ordering::SeqCst);
        }
        sent
    }

    /// Queue a WooCommerce-side change. Returns `false` if the worker is gone.
    pub fn enqueue_woo(&self, task: WooTask) -> bool {
        self.woo_depth.fetch_add(1, Ordering::SeqCst);
        let sent = self.woo_tx.send(task).is_ok();
        if !sent {
            self.woo_depth.fetch_sub(1, Ordering::SeqCst);
        }
        sent
    }

    /// Pending Airtable-side tasks.
    #[must_use]
    pub fn airtable_depth(&self) -> usize {
        self.airtable_depth.load(Ordering::SeqCst)
    }

    /// Pending WooCommerce-side tasks.
    #[must_use]
    pub fn woo_depth(&self) -> usize {
        self.woo_depth.load(Ordering::SeqCst)
    }
}
