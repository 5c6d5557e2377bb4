// Durable Store Port (Interface)

use crate::domain::StoredEntry;
use async_trait::async_trait;

/// Thin interface over an embedded persistent table holding queued items.
///
/// Signatures are infallible by contract: an implementation must absorb
/// storage failures at this boundary (log them, return a benign default).
/// The queue favors availability over strict failure signaling for storage
/// hiccups.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Append a serialized payload with its insertion timestamp.
    async fn insert(&self, timestamp: i64, payload: &str);

    /// Current row count (0 on storage failure).
    async fn count(&self) -> i64;

    /// All rows, ascending `(timestamp, id)`. Used by the snapshot
    /// policy's load step.
    async fn ordered_scan(&self) -> Vec<StoredEntry>;

    /// Oldest row without removing it. Used by the always-durable policy.
    async fn peek_oldest(&self) -> Option<StoredEntry>;

    /// Delete the oldest row.
    async fn remove_oldest(&self);

    /// Delete all rows.
    async fn clear(&self);
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
    use std::sync::Mutex;
    use tracing::warn;

    /// In-memory store for core-level tests. Supports failure injection to
    /// exercise the absorb-and-default contract.
    pub struct MemoryQueueStore {
        rows: Mutex<Vec<StoredEntry>>,
        next_id: AtomicI64,
        failing: AtomicBool,
    }

    impl MemoryQueueStore {
        pub fn new() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                next_id: AtomicI64::new(1),
                failing: AtomicBool::new(false),
            }
        }

        /// Simulate a broken backing store: writes are dropped, reads
        /// return the benign defaults.
        pub fn inject_failure(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Raw snapshot of the rows, for invariant assertions.
        pub fn raw_rows(&self) -> Vec<StoredEntry> {
            let mut rows = self.rows.lock().unwrap().clone();
            rows.sort_by_key(|r| (r.timestamp, r.id));
            rows
        }

        fn is_failing(&self) -> bool {
            self.failing.load(Ordering::SeqCst)
        }
    }

    impl Default for MemoryQueueStore {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl QueueStore for MemoryQueueStore {
        async fn insert(&self, timestamp: i64, payload: &str) {
            if self.is_failing() {
                warn!("memory store insert dropped (injected failure)");
                return;
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.rows.lock().unwrap().push(StoredEntry {
                id,
                timestamp,
                payload: payload.to_string(),
            });
        }

        async fn count(&self) -> i64 {
            if self.is_failing() {
                return 0;
            }
            self.rows.lock().unwrap().len() as i64
        }

        async fn ordered_scan(&self) -> Vec<StoredEntry> {
            if self.is_failing() {
                return Vec::new();
            }
            self.raw_rows()
        }

        async fn peek_oldest(&self) -> Option<StoredEntry> {
            if self.is_failing() {
                return None;
            }
            self.raw_rows().into_iter().next()
        }

        async fn remove_oldest(&self) {
            if self.is_failing() {
                warn!("memory store remove dropped (injected failure)");
                return;
            }
            let mut rows = self.rows.lock().unwrap();
            if let Some(oldest) = rows
                .iter()
                .enumerate()
                .min_by_key(|(_, r)| (r.timestamp, r.id))
                .map(|(i, _)| i)
            {
                rows.remove(oldest);
            }
        }

        async fn clear(&self) {
            if self.is_failing() {
                warn!("memory store clear dropped (injected failure)");
                return;
            }
            self.rows.lock().unwrap().clear();
        }
    }

}
