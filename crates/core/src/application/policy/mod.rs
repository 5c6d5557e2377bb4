// Persistence Policies - how and when queued items touch the Durable Store

mod durable;
mod snapshot;

pub use durable::DurablePolicy;
pub use snapshot::SnapshotPolicy;

use async_trait::async_trait;

/// Persistence policy governing the queue contents.
///
/// The policy instance exclusively owns both the in-memory structure (if
/// any) and the Durable Store handle; the dispatcher and the worker loop
/// reach it only through a shared mutex, one operation at a time, so store
/// access around the pause/resume boundary never interleaves.
///
/// `load` and `unload` are the opposite bookends of a worker run: the
/// worker loop calls `load` before its first item and `unload` on every
/// exit path.
#[async_trait]
pub trait QueuePolicy<T: Send>: Send {
    /// Materialize state for a starting worker run.
    async fn load(&mut self);

    /// Persist remaining state as the worker run ends.
    async fn unload(&mut self);

    /// Append an item at the tail.
    async fn enqueue(&mut self, item: T);

    /// Oldest item, non-destructive. `None` when the queue is empty.
    async fn peek(&mut self) -> Option<T>;

    /// Remove the head item.
    async fn remove(&mut self);

    /// Number of queued items.
    async fn count(&mut self) -> i64;

    /// Discard everything.
    async fn clear(&mut self);
}
