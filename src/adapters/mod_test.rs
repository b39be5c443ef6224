use std::time::Duration;

use serde_json::json;

use super::*;
use crate::config::Config;
use crate::services::persistence::PersistedLayout;
use crate::state::{Canvas, CanvasComponent};

const WINDOW: Duration = Duration::from_secs(1);

#[derive(Default)]
struct Recorder {
    sent: Vec<(String, Value)>,
}

impl PropsSink for Recorder {
    fn update_props(&mut self, interactable_id: &str, props: Value) {
        self.sent.push((interactable_id.to_owned(), props));
    }
}

fn store() -> CanvasStore {
    let layout = PersistedLayout {
        canvases: vec![Canvas::new("a", "Alpha"), Canvas::new("b", "Beta")],
        active_canvas_id: Some("a".into()),
    };
    CanvasStore::from_layout(layout, &Config::default())
}

// =============================================================================
// SyncGuard
// =============================================================================

#[test]
fn guard_admits_only_changed_payloads() {
    let mut guard = SyncGuard::new();
    assert!(guard.admit(&json!({"n": 1})));
    assert!(!guard.admit(&json!({"n": 1})));
    assert!(guard.admit(&json!({"n": 2})));
    assert!(guard.admit(&json!({"n": 1})));
}

#[test]
fn guard_tracks_applying() {
    let mut guard = SyncGuard::new();
    assert!(!guard.is_applying());
    guard.begin_apply();
    assert!(guard.is_applying());
    guard.end_apply();
    assert!(!guard.is_applying());
}

// =============================================================================
// await_registration
// =============================================================================

#[tokio::test(start_paused = true)]
async fn registration_already_ready() {
    let (_tx, mut rx) = watch::channel(true);
    assert!(await_registration(&mut rx, WINDOW).await);
}

#[tokio::test(start_paused = true)]
async fn registration_arrives_within_window() {
    let (tx, mut rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        let _ = tx.send(true);
    });
    assert!(await_registration(&mut rx, WINDOW).await);
}

#[tokio::test(start_paused = true)]
async fn registration_times_out() {
    let (_tx, mut rx) = watch::channel(false);
    assert!(!await_registration(&mut rx, WINDOW).await);
}

#[tokio::test(start_paused = true)]
async fn registration_gives_up_when_signal_dropped() {
    let (tx, mut rx) = watch::channel(false);
    drop(tx);
    assert!(!await_registration(&mut rx, WINDOW).await);
}

// =============================================================================
// SyncAdapter
// =============================================================================

#[test]
fn sync_publishes_after_store_change() {
    let mut store = store();
    let mut adapter = TabsAdapter::new("tabs-1", Some("tabs".into()), &store);
    let mut sink = Recorder::default();

    assert!(!adapter.sync(&store, &mut sink));
    store.set_active_canvas(Some("b"));
    assert!(adapter.sync(&store, &mut sink));

    assert_eq!(sink.sent.len(), 1);
    let (id, props) = &sink.sent[0];
    assert_eq!(id, "tabs-1");
    assert_eq!(props["className"], json!("tabs"));
    assert_eq!(props["state"]["activeCanvasId"], json!("b"));
}

#[test]
fn sync_skips_unchanged_payload() {
    let mut store = store();
    let mut adapter = TabsAdapter::new("tabs-1", None, &store);
    let mut sink = Recorder::default();
    assert!(adapter.publish(&store, &mut sink));

    // touches components only; the tab payload is the same
    store.clear_canvas("a");
    store.add_component("a", CanvasComponent::new("Graph").with_id("g1"));
    assert!(!adapter.sync(&store, &mut sink));
    assert_eq!(sink.sent.len(), 1);
    assert!(sink.sent[0].1.get("className").is_none());
}

#[test]
fn inbound_apply_is_not_echoed() {
    let mut store = store();
    let mut adapter = TabsAdapter::new("tabs-1", None, &store);
    let mut sink = Recorder::default();

    let props = json!({"state": {"canvases": [{"id": "b", "name": "Beta"}], "activeCanvasId": "b"}});
    adapter.receive(&mut store, props).unwrap();
    assert_eq!(store.canvases().len(), 1);
    assert!(!adapter.sync(&store, &mut sink));
    assert!(sink.sent.is_empty());

    store.update_canvas("b", "Beta 2");
    assert!(adapter.sync(&store, &mut sink));
    assert_eq!(sink.sent[0].1["state"]["canvases"][0]["name"], json!("Beta 2"));
}

#[test]
fn inbound_apply_keeps_earlier_local_change_due() {
    let mut store = store();
    let mut adapter = TabsAdapter::new("tabs-1", None, &store);
    let mut sink = Recorder::default();

    store.update_canvas("a", "Alpha 2");
    let props = json!({"state": {"canvases": [{"id": "a", "name": "Alpha 2"}, {"id": "b", "name": "Agent"}], "activeCanvasId": "a"}});
    adapter.receive(&mut store, props).unwrap();

    assert!(adapter.sync(&store, &mut sink));
    assert_eq!(sink.sent.len(), 1);
    assert_eq!(sink.sent[0].1["state"]["canvases"][0]["name"], json!("Alpha 2"));
    assert_eq!(sink.sent[0].1["state"]["canvases"][1]["name"], json!("Agent"));
    assert!(!adapter.sync(&store, &mut sink));
}

#[test]
fn invalid_props_leave_store_untouched() {
    let mut store = store();
    let mut adapter = TabsAdapter::new("tabs-1", None, &store);
    let rev = store.revision();
    let err = adapter.receive(&mut store, json!({"state": {"canvases": "nope"}})).unwrap_err();
    assert!(err.to_string().contains("Tabs"));
    assert_eq!(store.revision(), rev);
    assert_eq!(store.canvases().len(), 2);
}

#[test]
fn props_without_state_only_update_class_name() {
    let mut store = store();
    let mut adapter = TabsAdapter::new("tabs-1", None, &store);
    let mut sink = Recorder::default();
    adapter.receive(&mut store, json!({"className": "wide"})).unwrap();
    assert_eq!(store.canvases().len(), 2);
    adapter.publish(&store, &mut sink);
    assert_eq!(sink.sent[0].1["className"], json!("wide"));
}

#[tokio::test(start_paused = true)]
async fn initial_publish_waits_for_registration() {
    let store = store();
    let mut adapter = TabsAdapter::new("tabs-1", None, &store);
    let mut sink = Recorder::default();
    let (tx, mut rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = tx.send(true);
    });

    assert!(adapter.publish_initial(&store, &mut sink, &mut rx, WINDOW).await);
    assert_eq!(sink.sent.len(), 1);
    assert_eq!(sink.sent[0].1["state"]["canvases"][1]["id"], json!("b"));

    // second call is a no-op
    assert!(adapter.publish_initial(&store, &mut sink, &mut rx, WINDOW).await);
    assert_eq!(sink.sent.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn initial_publish_gives_up_for_good() {
    let store = store();
    let mut adapter = TabsAdapter::new("tabs-1", None, &store);
    let mut sink = Recorder::default();
    let (tx, mut rx) = watch::channel(false);

    assert!(!adapter.publish_initial(&store, &mut sink, &mut rx, WINDOW).await);
    tx.send(true).unwrap();
    assert!(!adapter.publish_initial(&store, &mut sink, &mut rx, WINDOW).await);
    assert!(sink.sent.is_empty());
}

#[test]
fn closures_are_sinks() {
    let store = store();
    let mut adapter = TabsAdapter::new("tabs-1", None, &store);
    let mut ids = Vec::new();
    let mut sink = |id: &str, _props: Value| ids.push(id.to_owned());
    adapter.publish(&store, &mut sink);
    assert_eq!(ids, ["tabs-1"]);
}
