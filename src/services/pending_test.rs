use super::*;

const WINDOW: Duration = Duration::from_millis(100);

#[test]
fn keys_follow_documented_format() {
    assert_eq!(add_key("x", "c1"), "add-x-c1");
    assert_eq!(move_key("x", "c1", "c2"), "move-x-c1-c2");
}

#[test]
fn first_claim_succeeds_second_is_rejected() {
    let mut ops = PendingOperations::new(WINDOW);
    let now = Instant::now();
    assert!(ops.try_begin_at("add-x-c1", now));
    assert!(!ops.try_begin_at("add-x-c1", now + Duration::from_millis(10)));
    assert!(ops.is_pending_at("add-x-c1", now));
}

#[test]
fn distinct_keys_do_not_interfere() {
    let mut ops = PendingOperations::new(WINDOW);
    let now = Instant::now();
    assert!(ops.try_begin_at("add-x-c1", now));
    assert!(ops.try_begin_at("add-x-c2", now));
    assert_eq!(ops.keys_at(now), vec!["add-x-c1".to_owned(), "add-x-c2".to_owned()]);
}

#[test]
fn window_expiry_allows_reclaim() {
    let mut ops = PendingOperations::new(WINDOW);
    let start = Instant::now();
    assert!(ops.try_begin_at("k", start));
    assert!(!ops.try_begin_at("k", start + WINDOW - Duration::from_millis(1)));
    let after = start + WINDOW;
    assert!(!ops.is_pending_at("k", after));
    assert!(ops.try_begin_at("k", after));
}

#[test]
fn expired_keys_are_pruned_on_next_claim() {
    let mut ops = PendingOperations::new(WINDOW);
    let start = Instant::now();
    ops.try_begin_at("a", start);
    ops.try_begin_at("b", start);
    assert_eq!(ops.len(), 2);
    ops.try_begin_at("c", start + WINDOW * 2);
    assert_eq!(ops.len(), 1);
    assert!(ops.keys_at(start + WINDOW * 2).contains(&"c".to_owned()));
}

#[test]
fn keys_at_hides_expired_entries() {
    let mut ops = PendingOperations::new(WINDOW);
    let start = Instant::now();
    ops.try_begin_at("a", start);
    assert!(ops.keys_at(start + WINDOW).is_empty());
}

#[test]
fn clear_forgets_everything() {
    let mut ops = PendingOperations::new(WINDOW);
    ops.try_begin_at("a", Instant::now());
    ops.clear();
    assert!(ops.is_empty());
}
