//! Key Space Tests
//!
//! These tests verify:
//! - Text reads and writes, counters, and list operations
//! - Type separation between text and list values
//! - TTL scheduling: proactive expiry, cancellation on rewrite and delete
//! - Range edge cases (clamping, empty windows, absent keys)
//!
//! TTL tests run on a paused tokio clock, so sleeping auto-advances virtual
//! time and expiry is exercised deterministically, without real waiting.

use std::sync::Arc;

use tempfile::TempDir;
use tokio::time::{sleep, Duration};

use covekv::store::{KeySpace, Stored};

// =============================================================================
// Helper Functions
// =============================================================================

fn temp_space() -> (TempDir, Arc<KeySpace>) {
    let temp = TempDir::new().unwrap();
    let space = Arc::new(KeySpace::open("test-peer", temp.path()));
    (temp, space)
}

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

/// The full list under `key`, via the widest possible range
fn list_of(space: &KeySpace, key: &str) -> Vec<String> {
    space.range(key, 0, i64::MAX).unwrap()
}

// =============================================================================
// Text Operations Tests
// =============================================================================

#[test]
fn test_set_and_get_text() {
    let (_temp, space) = temp_space();

    space.set_text("greeting", "hello");

    assert_eq!(
        space.get("greeting"),
        Some(Stored::Text("hello".to_string()))
    );
}

#[test]
fn test_get_absent_key() {
    let (_temp, space) = temp_space();

    assert_eq!(space.get("nothing"), None);
}

#[test]
fn test_set_overwrites_previous_value() {
    let (_temp, space) = temp_space();

    space.set_text("k", "first");
    space.set_text("k", "second");

    assert_eq!(space.get("k"), Some(Stored::Text("second".to_string())));
    assert_eq!(space.len(), 1);
}

#[test]
fn test_set_replaces_list_value() {
    let (_temp, space) = temp_space();

    space.push_back("k", &words(&["a", "b"])).unwrap();
    space.set_text("k", "plain");

    assert_eq!(space.get("k"), Some(Stored::Text("plain".to_string())));
}

#[test]
fn test_exists_counts_per_occurrence() {
    let (_temp, space) = temp_space();

    space.set_text("a", "1");
    space.set_text("b", "2");

    assert_eq!(space.exists(&words(&["a", "b", "missing", "a"])), 3);
    assert_eq!(space.exists(&words(&["missing"])), 0);
}

#[test]
fn test_del_removes_and_counts() {
    let (_temp, space) = temp_space();

    space.set_text("a", "1");
    space.set_text("b", "2");
    space.set_text("c", "3");

    assert_eq!(space.del(&words(&["a", "c", "missing"])), 2);
    assert_eq!(space.get("a"), None);
    assert_eq!(space.get("b"), Some(Stored::Text("2".to_string())));
    assert_eq!(space.len(), 1);
}

#[test]
fn test_open_reports_identity() {
    let (_temp, space) = temp_space();

    assert_eq!(space.identity(), "test-peer");
    assert!(space.is_empty());
    assert!(space
        .snapshot_path()
        .ends_with("space_test-peer.json"));
}

// =============================================================================
// Counter Tests
// =============================================================================

#[test]
fn test_adjust_counts_absent_key_from_zero() {
    let (_temp, space) = temp_space();

    assert_eq!(space.adjust("ups", 1), Some(1));
    assert_eq!(space.adjust("downs", -1), Some(-1));
}

#[test]
fn test_adjust_accumulates_and_stores_text() {
    let (_temp, space) = temp_space();

    space.set_text("counter", "41");

    assert_eq!(space.adjust("counter", 1), Some(42));
    assert_eq!(space.get("counter"), Some(Stored::Text("42".to_string())));
    assert_eq!(space.adjust("counter", -1), Some(41));
}

#[test]
fn test_adjust_non_numeric_value() {
    let (_temp, space) = temp_space();

    space.set_text("k", "not a number");

    assert_eq!(space.adjust("k", 1), None);
    // The failed adjustment must not disturb the stored value
    assert_eq!(
        space.get("k"),
        Some(Stored::Text("not a number".to_string()))
    );
}

#[test]
fn test_adjust_list_value() {
    let (_temp, space) = temp_space();

    space.push_back("l", &words(&["x"])).unwrap();

    assert_eq!(space.adjust("l", 1), None);
}

#[test]
fn test_adjust_overflow() {
    let (_temp, space) = temp_space();

    space.set_text("k", &i64::MAX.to_string());

    assert_eq!(space.adjust("k", 1), None);
}

// =============================================================================
// List Operations Tests
// =============================================================================

#[test]
fn test_push_front_inserts_each_value_at_head() {
    let (_temp, space) = temp_space();

    assert_eq!(space.push_front("l", &words(&["a", "b", "c"])), Ok(3));

    assert_eq!(list_of(&space, "l"), words(&["c", "b", "a"]));
}

#[test]
fn test_push_back_appends_in_argument_order() {
    let (_temp, space) = temp_space();

    assert_eq!(space.push_back("l", &words(&["a", "b", "c"])), Ok(3));

    assert_eq!(list_of(&space, "l"), words(&["a", "b", "c"]));
}

#[test]
fn test_push_accumulates_length() {
    let (_temp, space) = temp_space();

    space.push_back("l", &words(&["a", "b"])).unwrap();

    assert_eq!(space.push_front("l", &words(&["x"])), Ok(3));
    assert_eq!(list_of(&space, "l"), words(&["x", "a", "b"]));
}

#[test]
fn test_push_on_text_key_is_wrong_type() {
    let (_temp, space) = temp_space();

    space.set_text("k", "plain");

    assert!(space.push_front("k", &words(&["a"])).is_err());
    assert!(space.push_back("k", &words(&["a"])).is_err());
    // Value untouched by the rejected pushes
    assert_eq!(space.get("k"), Some(Stored::Text("plain".to_string())));
}

#[test]
fn test_range_clamps_end_past_tail() {
    let (_temp, space) = temp_space();

    space.push_back("l", &words(&["a", "b", "c"])).unwrap();

    assert_eq!(space.range("l", 0, 99), Ok(words(&["a", "b", "c"])));
}

#[test]
fn test_range_single_element_window() {
    let (_temp, space) = temp_space();

    space.push_back("l", &words(&["a", "b", "c"])).unwrap();

    assert_eq!(space.range("l", 1, 1), Ok(words(&["b"])));
}

#[test]
fn test_range_empty_windows() {
    let (_temp, space) = temp_space();

    space.push_back("l", &words(&["a", "b", "c"])).unwrap();

    // start past the tail
    assert_eq!(space.range("l", 3, 9), Ok(vec![]));
    // end before start
    assert_eq!(space.range("l", 2, 1), Ok(vec![]));
    // negative positions
    assert_eq!(space.range("l", -2, -1), Ok(vec![]));
}

#[test]
fn test_range_absent_key_reads_as_empty_list() {
    let (_temp, space) = temp_space();

    assert_eq!(space.range("nothing", 0, 9), Ok(vec![]));
}

#[test]
fn test_range_on_text_key_is_wrong_type() {
    let (_temp, space) = temp_space();

    space.set_text("k", "plain");

    assert!(space.range("k", 0, 1).is_err());
}

// =============================================================================
// TTL Tests (paused clock)
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_timed_key_expires_proactively() {
    let (_temp, space) = temp_space();

    Arc::clone(&space).set_text_with_ttl("k", "v", Duration::from_secs(5));

    assert_eq!(space.get("k"), Some(Stored::Text("v".to_string())));
    assert!(space.has_pending_expiry("k"));

    sleep(Duration::from_secs(4)).await;
    assert_eq!(space.get("k"), Some(Stored::Text("v".to_string())));

    sleep(Duration::from_secs(2)).await;
    assert_eq!(space.get("k"), None);
    assert!(!space.has_pending_expiry("k"));
    assert!(space.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rewrite_without_ttl_cancels_expiry() {
    let (_temp, space) = temp_space();

    Arc::clone(&space).set_text_with_ttl("k", "short-lived", Duration::from_secs(1));
    space.set_text("k", "permanent");

    assert!(!space.has_pending_expiry("k"));

    sleep(Duration::from_secs(5)).await;
    assert_eq!(space.get("k"), Some(Stored::Text("permanent".to_string())));
}

#[tokio::test(start_paused = true)]
async fn test_rewrite_with_ttl_replaces_deadline() {
    let (_temp, space) = temp_space();

    Arc::clone(&space).set_text_with_ttl("k", "v1", Duration::from_secs(1));
    Arc::clone(&space).set_text_with_ttl("k", "v2", Duration::from_secs(10));

    // Past the first deadline, before the second
    sleep(Duration::from_secs(2)).await;
    assert_eq!(space.get("k"), Some(Stored::Text("v2".to_string())));

    sleep(Duration::from_secs(9)).await;
    assert_eq!(space.get("k"), None);
}

#[tokio::test(start_paused = true)]
async fn test_delete_cancels_expiry() {
    let (_temp, space) = temp_space();

    Arc::clone(&space).set_text_with_ttl("k", "v", Duration::from_secs(1));
    space.del(&words(&["k"]));
    space.set_text("k", "fresh");

    sleep(Duration::from_secs(5)).await;
    assert_eq!(space.get("k"), Some(Stored::Text("fresh".to_string())));
}

#[tokio::test(start_paused = true)]
async fn test_adjust_keeps_pending_expiry() {
    let (_temp, space) = temp_space();

    Arc::clone(&space).set_text_with_ttl("n", "5", Duration::from_secs(1));

    assert_eq!(space.adjust("n", 1), Some(6));
    assert!(space.has_pending_expiry("n"));

    sleep(Duration::from_secs(2)).await;
    assert_eq!(space.get("n"), None);
}

#[tokio::test(start_paused = true)]
async fn test_expiry_touches_only_its_key() {
    let (_temp, space) = temp_space();

    space.set_text("stays", "here");
    Arc::clone(&space).set_text_with_ttl("goes", "away", Duration::from_secs(1));

    sleep(Duration::from_secs(2)).await;

    assert_eq!(space.get("goes"), None);
    assert_eq!(space.get("stays"), Some(Stored::Text("here".to_string())));
}

#[tokio::test(start_paused = true)]
async fn test_ttl_past_clock_range_schedules_without_fault() {
    let (_temp, space) = temp_space();

    // Larger than any instant the clock can represent; the deadline
    // saturates instead of overflowing.
    Arc::clone(&space).set_text_with_ttl("k", "v", Duration::from_secs(u64::MAX));

    sleep(Duration::from_secs(10)).await;
    assert_eq!(space.get("k"), Some(Stored::Text("v".to_string())));
    assert!(space.has_pending_expiry("k"));
}
