// Shared fixtures for the end-to-end queue tests.
#![allow(dead_code)]

use relayq_core::application::{DurablePolicy, QueueService, SnapshotPolicy};
use relayq_core::domain::QueueState;
use relayq_core::port::queue_worker::mocks::ScriptedWorker;
use relayq_core::port::time_provider::SystemTimeProvider;
use relayq_core::port::{NoopWakeSource, QueueStore, QueueWorker, WakeSource};
use relayq_infra_sqlite::{create_pool, SqliteQueueStore};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

pub const WAIT: Duration = Duration::from_secs(5);

/// Opt-in log output: `RUST_LOG=debug cargo test`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// File-backed pool so restarts and concurrent connections see one database.
pub async fn file_pool(dir: &TempDir) -> SqlitePool {
    init_tracing();
    let path = dir.path().join("relayq.db");
    create_pool(&format!("sqlite://{}", path.display()))
        .await
        .unwrap()
}

pub async fn open_store(pool: &SqlitePool, queue: &str) -> SqliteQueueStore {
    SqliteQueueStore::open(pool.clone(), queue).await.unwrap()
}

pub async fn snapshot_service(
    pool: &SqlitePool,
    worker: Arc<ScriptedWorker>,
) -> QueueService<ScriptedWorker> {
    snapshot_service_with(pool, worker, Arc::new(NoopWakeSource)).await
}

pub async fn snapshot_service_with(
    pool: &SqlitePool,
    worker: Arc<ScriptedWorker>,
    wake: Arc<dyn WakeSource>,
) -> QueueService<ScriptedWorker> {
    let store = open_store(pool, worker.queue_name()).await;
    let policy = SnapshotPolicy::new(
        Arc::clone(&worker),
        Arc::new(store) as Arc<dyn QueueStore>,
        Arc::new(SystemTimeProvider),
    );
    QueueService::start(worker, policy, wake)
}

pub async fn durable_service(
    pool: &SqlitePool,
    worker: Arc<ScriptedWorker>,
) -> QueueService<ScriptedWorker> {
    let store = open_store(pool, worker.queue_name()).await;
    let policy = DurablePolicy::new(
        Arc::clone(&worker),
        Arc::new(store) as Arc<dyn QueueStore>,
        Arc::new(SystemTimeProvider),
    );
    QueueService::start(worker, policy, Arc::new(NoopWakeSource))
}

pub async fn wait_for_state(service: &QueueService<ScriptedWorker>, want: QueueState) {
    let mut rx = service.watch_state();
    timeout(WAIT, async {
        while *rx.borrow_and_update() != want {
            rx.changed().await.unwrap();
        }
    })
    .await
    .unwrap_or_else(|_| panic!("queue never reached state {}", want));
}

/// Poll until the store reports `want` rows.
pub async fn wait_for_count(store: &SqliteQueueStore, want: i64) {
    timeout(WAIT, async {
        while store.count().await != want {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("store never reached count {}", want));
}

pub async fn stored_payloads(store: &SqliteQueueStore) -> Vec<String> {
    store
        .ordered_scan()
        .await
        .into_iter()
        .map(|r| r.payload)
        .collect()
}
