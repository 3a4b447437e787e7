//! Echo suppression across a simulated bidirectional sync cycle.
//!
//! A push to one platform fires that platform's change webhook straight
//! back; the tracker must swallow exactly that echo and nothing else.

use std::time::Duration;

use stocklink_core::SyncOrigin;
use stocklink_sync::tracker::{SyncTracker, airtable_key, woo_key};

#[test]
fn test_airtable_edit_cycle_suppresses_woo_echo() {
    let tracker = SyncTracker::new(Duration::from_secs(30));

    // An Airtable edit arrives and is pushed to WooCommerce.
    assert!(tracker.should_sync(&airtable_key("recK1"), SyncOrigin::Airtable));
    tracker.add_sync(&airtable_key("recK1"), SyncOrigin::Airtable);
    tracker.add_sync(&woo_key(42), SyncOrigin::Airtable);

    // The push fires Woo's product.updated webhook right back.
    assert!(!tracker.should_sync(&woo_key(42), SyncOrigin::WooCommerce));
}

#[test]
fn test_woo_edit_cycle_suppresses_airtable_echo() {
    let tracker = SyncTracker::new(Duration::from_secs(30));

    tracker.add_sync(&woo_key(42), SyncOrigin::WooCommerce);
    tracker.add_sync(&airtable_key("recK1"), SyncOrigin::WooCommerce);

    assert!(!tracker.should_sync(&airtable_key("recK1"), SyncOrigin::Airtable));
    // The same Woo product edited again still propagates.
    assert!(tracker.should_sync(&woo_key(42), SyncOrigin::WooCommerce));
}

#[test]
fn test_rapid_same_side_edits_all_propagate() {
    let tracker = SyncTracker::new(Duration::from_secs(30));

    for _ in 0..3 {
        assert!(tracker.should_sync(&airtable_key("recK2"), SyncOrigin::Airtable));
        tracker.add_sync(&airtable_key("recK2"), SyncOrigin::Airtable);
    }
}

#[test]
fn test_genuine_opposite_edit_passes_after_ttl() {
    let tracker = SyncTracker::new(Duration::from_millis(30));

    tracker.add_sync(&woo_key(7), SyncOrigin::Airtable);
    assert!(!tracker.should_sync(&woo_key(7), SyncOrigin::WooCommerce));

    std::thread::sleep(Duration::from_millis(40));
    assert!(tracker.should_sync(&woo_key(7), SyncOrigin::WooCommerce));
}

#[test]
fn test_keys_are_scoped_per_side() {
    // "recXYZ" on the Airtable side and product 0 on the Woo side must not
    // collide even with adversarial record IDs.
    assert_ne!(airtable_key("0"), woo_key(0));

    let tracker = SyncTracker::new(Duration::from_secs(30));
    tracker.add_sync(&airtable_key("9"), SyncOrigin::Airtable);
    assert!(tracker.should_sync(&woo_key(9), SyncOrigin::WooCommerce));
}

#[test]
fn test_expired_entries_are_swept() {
    let tracker = SyncTracker::new(Duration::from_millis(20));

    tracker.add_sync(&airtable_key("recK3"), SyncOrigin::Airtable);
    tracker.add_sync(&woo_key(3), SyncOrigin::Airtable);
    assert_eq!(tracker.len(), 2);

    std::thread::sleep(Duration::from_millis(30));
    assert!(tracker.is_empty());
}
