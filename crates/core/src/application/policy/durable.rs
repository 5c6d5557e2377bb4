// Always-Durable Policy - every operation round-trips through the store

use super::QueuePolicy;
use crate::port::{QueueStore, QueueWorker, TimeProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// No in-memory queue at all: each item costs a storage round trip on both
/// insertion and consumption, and in exchange the queue is immune to loss
/// from abrupt termination at any instant, including mid-item (the head
/// row is only deleted after its processing function reports success).
///
/// `count` always queries the store rather than caching between mutations;
/// the conservative behavior keeps the durability window at zero.
pub struct DurablePolicy<W: QueueWorker> {
    worker: Arc<W>,
    store: Arc<dyn QueueStore>,
    time: Arc<dyn TimeProvider>,
}

impl<W: QueueWorker> DurablePolicy<W> {
    pub fn new(worker: Arc<W>, store: Arc<dyn QueueStore>, time: Arc<dyn TimeProvider>) -> Self {
        Self {
            worker,
            store,
            time,
        }
    }
}

#[async_trait]
impl<W: QueueWorker> QueuePolicy<W::Item> for DurablePolicy<W> {
    async fn load(&mut self) {}

    async fn unload(&mut self) {}

    async fn enqueue(&mut self, item: W::Item) {
        match self.worker.serialize(&item) {
            Some(payload) => self.store.insert(self.time.now_millis(), &payload).await,
            None => warn!(
                queue = %self.worker.queue_name(),
                "dropping item that failed to encode"
            ),
        }
    }

    async fn peek(&mut self) -> Option<W::Item> {
        // A corrupt head row must not block the remainder of the queue.
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
        self.store.remove_oldest().await;
    }

    async fn count(&mut self) -> i64 {
        self.store.count().await
    }

    async fn clear(&mut self) {
        self.store.clear().await;
    }
}
