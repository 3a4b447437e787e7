//! Echo suppression for bidirectional sync.
//!
//! Every push to one platform fires that platform's change webhook right
//! back at us. The tracker records which side a key was last synced from;
//! a change arriving from the opposite side within the TTL is treated as
//! that echo and dropped. Changes from the same side always pass, so two
//! quick edits in a row both propagate.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use stocklink_core::SyncOrigin;

#[derive(Debug, Clone, Copy)]
struct SyncEntry {
    origin: SyncOrigin,
    at: Instant,
}

/// Tracks recent syncs keyed by record identity.
#[derive(Debug)]
pub struct SyncTracker {
    entries: Mutex<HashMap<String, SyncEntry>>,
    ttl: Duration,
}

/// Key for a record on the Airtable side.
#[must_use]
pub fn airtable_key(record_id: &str) -> String {
    format!("{}_{record_id}", SyncOrigin::Airtable.key_prefix())
}

/// Key for a product on the WooCommerce side.
#[must_use]
pub fn woo_key(product_id: i64) -> String {
    format!("{}_{product_id}", SyncOrigin::WooCommerce.key_prefix())
}

impl SyncTracker {
    /// Create a tracker with the given suppression window.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Record that `key` was just synced from `origin`.
    pub fn add_sync(&self, key: &str, origin: SyncOrigin) {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(
            key.to_string(),
            SyncEntry {
                origin,
                at: Instant::now(),
            },
        );
        Self::sweep(&mut entries, self.ttl);
    }

    /// Whether a change to `key` arriving from `origin` should propagate.
    ///
    /// Returns `false` only when the key was synced from the opposite
    /// origin within the TTL.
    pub fn should_sync(&self, key: &str, origin: SyncOrigin) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Self::sweep(&mut entries, self.ttl);
        match entries.get(key) {
            Some(entry) if entry.origin != origin => entry.at.elapsed() >= self.ttl,
            _ => true,
        }
    }

    /// Number of live entries, for the status endpoint.
    pub fn len(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Self::sweep(&mut entries, self.ttl);
        entries.len()
    }

    /// Whether the tracker holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sweep(entries: &mut HashMap<String, SyncEntry>, ttl: Duration) {
        entries.retain(|_, entry| entry.at.elapsed() < ttl);
    }
}
