// End-to-end tests: always-durable persistence over the real SQLite store.
//
// The durable policy never buffers in memory, so every state the queue
// reaches is recoverable by dropping the service on the floor and opening
// a fresh one over the same database file.

mod common;

use common::*;
use relayq_core::domain::{Command, ProcessOutcome};
use relayq_core::port::queue_worker::mocks::ScriptedWorker;
use relayq_core::port::QueueStore;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::time::timeout;

#[tokio::test]
async fn test_pending_items_survive_an_unclean_restart() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir).await;
    let worker = Arc::new(ScriptedWorker::new("dur_restart").manual_resume());
    let service = durable_service(&pool, Arc::clone(&worker)).await;

    for p in ["x1", "x2", "x3"] {
        service.enqueue(p.to_string()).unwrap();
    }
    let store = open_store(&pool, "dur_restart").await;
    wait_for_count(&store, 3).await;

    // Simulated crash: no shutdown, just drop the handle.
    drop(service);

    let pool2 = file_pool(&dir).await;
    let worker2 = Arc::new(ScriptedWorker::new("dur_restart").manual_resume());
    let service2 = durable_service(&pool2, Arc::clone(&worker2)).await;
    service2.command(Command::Resume).unwrap();

    timeout(WAIT, worker2.wait_for_emptied(1)).await.unwrap();
    // No loss, no duplication.
    assert_eq!(worker2.processed(), vec!["x1", "x2", "x3"]);
    let store2 = open_store(&pool2, "dur_restart").await;
    assert_eq!(store2.count().await, 0);
}

#[tokio::test]
async fn test_pause_point_survives_a_restart() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir).await;
    let worker = Arc::new(ScriptedWorker::new("dur_pause").manual_resume());
    worker.script("b", ProcessOutcome::Pause);
    let service = durable_service(&pool, Arc::clone(&worker)).await;

    for p in ["a", "b", "c"] {
        service.enqueue(p.to_string()).unwrap();
    }
    let store = open_store(&pool, "dur_pause").await;
    wait_for_count(&store, 3).await;
    service.command(Command::Resume).unwrap();
    timeout(WAIT, worker.wait_for_paused(1)).await.unwrap();

    // "b" paused without being removed, so it is still the head on disk.
    wait_for_count(&store, 2).await;
    assert_eq!(stored_payloads(&store).await, vec!["b", "c"]);
    drop(service);

    let pool2 = file_pool(&dir).await;
    let worker2 = Arc::new(ScriptedWorker::new("dur_pause").manual_resume());
    let service2 = durable_service(&pool2, Arc::clone(&worker2)).await;
    service2.command(Command::Resume).unwrap();

    timeout(WAIT, worker2.wait_for_emptied(1)).await.unwrap();
    assert_eq!(worker2.processed(), vec!["b", "c"]);
}

#[tokio::test]
async fn test_undecodable_row_is_dropped_without_blocking_the_rest() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir).await;
    let worker = Arc::new(ScriptedWorker::new("dur_corrupt").manual_resume());
    worker.reject_decode("x");
    let service = durable_service(&pool, Arc::clone(&worker)).await;

    for p in ["a", "b", "x", "c"] {
        service.enqueue(p.to_string()).unwrap();
    }
    let store = open_store(&pool, "dur_corrupt").await;
    wait_for_count(&store, 4).await;

    service.command(Command::Resume).unwrap();
    timeout(WAIT, worker.wait_for_emptied(1)).await.unwrap();

    // Four in: three processed, one dropped, none left behind.
    assert_eq!(worker.processed(), vec!["a", "b", "c"]);
    assert_eq!(store.count().await, 0);
}

#[tokio::test]
async fn test_paused_head_is_only_removed_after_a_successful_run() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir).await;
    let worker = Arc::new(ScriptedWorker::new("dur_head"));
    worker.script("a", ProcessOutcome::Pause);
    let service = durable_service(&pool, Arc::clone(&worker)).await;

    service.enqueue("a".to_string()).unwrap();
    timeout(WAIT, worker.wait_for_paused(1)).await.unwrap();

    let store = open_store(&pool, "dur_head").await;
    assert_eq!(store.count().await, 1);

    service.command(Command::Resume).unwrap();
    timeout(WAIT, worker.wait_for_emptied(1)).await.unwrap();
    assert_eq!(worker.processed(), vec!["a", "a"]);
    assert_eq!(store.count().await, 0);
}
