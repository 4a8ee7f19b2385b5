//! Sync-layer integration tests: one remote fetch replacing the local
//! collection, optimistic mutations propagating fire-and-forget, and
//! failures being swallowed without touching local state.

use std::sync::Arc;

use serde_json::json;

use taskpulse::cache::{LocalCache, MemoryCache};
use taskpulse::remote::MemoryRemote;
use taskpulse::store::{NewTask, SyncState, TaskStore, TASKS_CACHE_KEY};
use taskpulse::task::Category;
use taskpulse::Error;

/// Let spawned fire-and-forget writes run to completion. The in-memory
/// remote never awaits internally, so a handful of yields suffices on the
/// current-thread test runtime.
async fn drain_spawned() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

fn signed_out_store() -> (MemoryCache, Arc<MemoryRemote>, TaskStore<MemoryCache, MemoryRemote>) {
    let cache = MemoryCache::new();
    let remote = Arc::new(MemoryRemote::new());
    let mut store = TaskStore::new(cache.clone(), Arc::clone(&remote));
    store.load_local();
    (cache, remote, store)
}

#[tokio::test]
async fn signed_out_mutations_never_touch_the_remote() {
    let (cache, remote, mut store) = signed_out_store();

    let task = store
        .add_task(NewTask {
            text: "local only".to_string(),
            ..Default::default()
        })
        .unwrap();
    store.toggle_done(&task.id).unwrap();
    drain_spawned().await;

    assert_eq!(remote.task_count("anyone"), 0);
    // the cache snapshot still happens
    let raw = cache.read(TASKS_CACHE_KEY).expect("cache snapshot");
    assert!(raw.contains("local only"));
}

#[tokio::test]
async fn begin_session_replaces_local_collection() {
    let (_cache, remote, mut store) = signed_out_store();

    // a task created before sign-in is discarded by the fetch
    store
        .add_task(NewTask {
            text: "pre-session".to_string(),
            ..Default::default()
        })
        .unwrap();

    remote.seed_task(
        "u1",
        "t-old",
        json!({ "text": "older", "done": false, "createdAt": 100 }),
    );
    remote.seed_task(
        "u1",
        "t-new",
        json!({ "text": "newer", "done": true, "createdAt": 200 }),
    );

    let fetched = store.begin_session("u1").await.unwrap();
    assert_eq!(fetched, 2);
    assert_eq!(store.state(), SyncState::RemoteSynced);
    assert_eq!(store.session(), Some("u1"));

    let texts: Vec<&str> = store.tasks().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["newer", "older"]);
    assert!(store.tasks().iter().all(|t| t.text != "pre-session"));
}

#[tokio::test]
async fn begin_session_failure_keeps_local_data() {
    let (_cache, remote, mut store) = signed_out_store();
    store
        .add_task(NewTask {
            text: "kept".to_string(),
            ..Default::default()
        })
        .unwrap();

    remote.set_failing(true);
    let result = store.begin_session("u1").await;
    assert!(matches!(result, Err(Error::SyncFailed(_))));
    assert_eq!(store.state(), SyncState::SyncFailed);
    assert_eq!(store.session(), None);
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].text, "kept");
}

#[tokio::test]
async fn add_propagates_to_remote_when_signed_in() {
    let (_cache, remote, mut store) = signed_out_store();
    store.begin_session("u1").await.unwrap();

    let task = store
        .add_task(NewTask {
            text: "synced".to_string(),
            category: Category::Work,
            ..Default::default()
        })
        .unwrap();
    drain_spawned().await;

    let doc = remote.task_doc("u1", &task.id).expect("remote doc");
    assert_eq!(doc.get("text"), Some(&json!("synced")));
    assert_eq!(doc.get("category"), Some(&json!("work")));
    assert_eq!(doc.get("done"), Some(&json!(false)));
}

#[tokio::test]
async fn toggle_patches_done_fields_on_remote() {
    let (_cache, remote, mut store) = signed_out_store();
    store.begin_session("u1").await.unwrap();

    let task = store
        .add_task(NewTask {
            text: "flip me".to_string(),
            ..Default::default()
        })
        .unwrap();
    let done = store.toggle_done(&task.id).unwrap();
    drain_spawned().await;

    let doc = remote.task_doc("u1", &task.id).expect("remote doc");
    assert_eq!(doc.get("done"), Some(&json!(true)));
    assert_eq!(doc.get("doneDay"), Some(&json!(done.done_day.unwrap())));
    assert!(doc.get("doneAt").and_then(|v| v.as_i64()).is_some());

    store.toggle_done(&task.id).unwrap();
    drain_spawned().await;

    let doc = remote.task_doc("u1", &task.id).expect("remote doc");
    assert_eq!(doc.get("done"), Some(&json!(false)));
    assert_eq!(doc.get("doneAt"), Some(&json!(null)));
    assert_eq!(doc.get("doneDay"), Some(&json!(null)));
}

#[tokio::test]
async fn delete_and_clear_done_propagate() {
    let (_cache, remote, mut store) = signed_out_store();
    store.begin_session("u1").await.unwrap();

    let a = store
        .add_task(NewTask {
            text: "a".to_string(),
            ..Default::default()
        })
        .unwrap();
    let b = store
        .add_task(NewTask {
            text: "b".to_string(),
            ..Default::default()
        })
        .unwrap();
    drain_spawned().await;
    assert_eq!(remote.task_count("u1"), 2);

    store.delete_task(&a.id).unwrap();
    drain_spawned().await;
    assert_eq!(remote.task_count("u1"), 1);

    store.toggle_done(&b.id).unwrap();
    assert_eq!(store.clear_done(None), 1);
    drain_spawned().await;
    assert_eq!(remote.task_count("u1"), 0);
    assert!(store.tasks().is_empty());
}

#[tokio::test]
async fn end_session_stops_remote_propagation() {
    let (_cache, remote, mut store) = signed_out_store();
    store.begin_session("u1").await.unwrap();
    store.end_session();
    assert_eq!(store.session(), None);

    store
        .add_task(NewTask {
            text: "after sign-out".to_string(),
            ..Default::default()
        })
        .unwrap();
    drain_spawned().await;

    assert_eq!(remote.task_count("u1"), 0);
    assert_eq!(store.tasks().len(), 1);
}

#[tokio::test]
async fn remote_write_failure_keeps_local_state() {
    let (cache, remote, mut store) = signed_out_store();
    store.begin_session("u1").await.unwrap();

    remote.set_failing(true);
    let task = store
        .add_task(NewTask {
            text: "survives outage".to_string(),
            ..Default::default()
        })
        .unwrap();
    drain_spawned().await;

    // local apply and cache snapshot succeeded; the remote write was dropped
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(remote.task_count("u1"), 0);
    let raw = cache.read(TASKS_CACHE_KEY).expect("cache snapshot");
    assert!(raw.contains(&task.id));

    // no retry once the remote recovers
    remote.set_failing(false);
    drain_spawned().await;
    assert_eq!(remote.task_count("u1"), 0);
}

#[tokio::test]
async fn session_snapshot_survives_restart() {
    let cache = MemoryCache::new();
    let remote = Arc::new(MemoryRemote::new());
    remote.seed_task(
        "u1",
        "t1",
        json!({ "text": "fetched", "done": false, "createdAt": 42 }),
    );

    let mut store = TaskStore::new(cache.clone(), Arc::clone(&remote));
    store.load_local();
    store.begin_session("u1").await.unwrap();

    // a restarted signed-out store sees the synced snapshot from cache
    let mut reloaded = TaskStore::new(cache, remote);
    reloaded.load_local();
    assert_eq!(reloaded.tasks().len(), 1);
    assert_eq!(reloaded.tasks()[0].id, "t1");
    assert_eq!(reloaded.tasks()[0].text, "fetched");
}
