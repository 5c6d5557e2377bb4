// Snapshot Policy - in-memory FIFO while running, persisted at run boundaries

use super::QueuePolicy;
use crate::port::{QueueStore, QueueWorker, TimeProvider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::warn;

/// Fast in-memory FIFO during active runs; the Durable Store holds the
/// queue only while no worker is running.
///
/// Invariant: at any instant the true queue lives in memory XOR in the
/// store - never split across both, never duplicated in both. `load`
/// drains the store into memory; `unload` drains memory back into the
/// store. Original insertion timestamps travel with the items so
/// re-persisted rows keep arrival order.
pub struct SnapshotPolicy<W: QueueWorker> {
    worker: Arc<W>,
    store: Arc<dyn QueueStore>,
    time: Arc<dyn TimeProvider>,
    buf: VecDeque<(i64, W::Item)>,
    active: bool,
}

impl<W: QueueWorker> SnapshotPolicy<W> {
    pub fn new(worker: Arc<W>, store: Arc<dyn QueueStore>, time: Arc<dyn TimeProvider>) -> Self {
        Self {
            worker,
            store,
            time,
            buf: VecDeque::new(),
            active: false,
        }
    }
}

#[async_trait]
impl<W: QueueWorker> QueuePolicy<W::Item> for SnapshotPolicy<W> {
    async fn load(&mut self) {
        for row in self.store.ordered_scan().await {
            match self.worker.deserialize(&row.payload) {
                Some(item) => self.buf.push_back((row.timestamp, item)),
                None => warn!(
                    queue = %self.worker.queue_name(),
                    row_id = row.id,
                    "dropping row with undecodable payload"
                ),
            }
        }
        // While running, the store holds nothing.
        self.store.clear().await;
        self.active = true;
    }

    async fn unload(&mut self) {
        for (timestamp, item) in self.buf.drain(..) {
            match self.worker.serialize(&item) {
                Some(payload) => self.store.insert(timestamp, &payload).await,
                None => warn!(
                    queue = %self.worker.queue_name(),
                    "dropping item that failed to encode"
                ),
            }
        }
        self.active = false;
    }

    async fn enqueue(&mut self, item: W::Item) {
        let timestamp = self.time.now_millis();
        if self.active {
            self.buf.push_back((timestamp, item));
        } else {
            // No worker run in progress: the store is the queue.
            match self.worker.serialize(&item) {
                Some(payload) => self.store.insert(timestamp, &payload).await,
                None => warn!(
                    queue = %self.worker.queue_name(),
                    "dropping item that failed to encode"
                ),
            }
        }
    }

    async fn peek(&mut self) -> Option<W::Item> {
        if self.active {
            return self.buf.front().map(|(_, item)| item.clone());
        }
        // Idle path: read through to the store, skipping corrupt heads.
        loop {
            let row = self.store.peek_oldest().await?;
            match self.worker.deserialize(&row.payload) {
                Some(item) => return Some(item),
                None => {
                    warn!(
                        queue = %self.worker.queue_name(),
                        row_id = row.id,
                        "dropping row with undecodable payload"
                    );
                    self.store.remove_oldest().await;
                }
            }
        }
    }

    async fn remove(&mut self) {
        if self.active {
            self.buf.pop_front();
        } else {
            self.store.remove_oldest().await;
        }
    }

    async fn count(&mut self) -> i64 {
        if self.active {
            self.buf.len() as i64
        } else {
            self.store.count().await
        }
    }

    async fn clear(&mut self) {
        if self.active {
            self.buf.clear();
        } else {
            self.store.clear().await;
        }
    }
}
