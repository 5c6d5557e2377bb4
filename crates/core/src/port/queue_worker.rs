// Queue Worker Port (Interface)
// The strategy interface supplied by the owning application: payload codec,
// processing function, lifecycle hooks, and dispatch policy flags.

use crate::domain::ProcessOutcome;
use async_trait::async_trait;

/// Caller-supplied behavior for one queue instance.
///
/// The queue never interprets item content; it only moves opaque payloads
/// through the codec pair and hands decoded items to `process`. Persistence
/// is the queue's job alone - `process` must not manage it.
#[async_trait]
pub trait QueueWorker: Send + Sync + 'static {
    /// The unit of queued work.
    type Item: Clone + Send + 'static;

    /// Storage namespace identifier; must be unique per distinct queue
    /// in the host process.
    fn queue_name(&self) -> &str;

    /// Encode an item for storage. `None` drops the item with a log entry.
    fn serialize(&self, item: &Self::Item) -> Option<String>;

    /// Decode a stored payload. `None` silently drops the row from the queue.
    fn deserialize(&self, raw: &str) -> Option<Self::Item>;

    /// The unit of work. May block on I/O; runs on the worker task only.
    async fn process(&self, item: &Self::Item) -> ProcessOutcome;

    /// Whether arrival of new work while idle auto-starts the worker
    /// (vs. requiring an explicit `Resume`).
    fn resume_on_new_item(&self) -> bool {
        true
    }

    /// Gates `QueryCount` and the automatic post-item count reports.
    fn allows_count_reports(&self) -> bool {
        true
    }

    /// Called once per run, before the first item.
    async fn on_start(&self) {}

    /// Called after each successfully processed item with the remaining
    /// count. The count report itself is emitted by the worker loop when
    /// `allows_count_reports` is true.
    async fn on_item_processed(&self, _remaining: i64) {}

    /// Called when `process` returned `Pause`; the causing item is still
    /// at the head of the queue.
    async fn on_paused(&self, _item: &Self::Item) {}

    /// Called when the queue empties: `all_processed = true` on exhaustion,
    /// `false` on `Stop` or `Abort`.
    async fn on_emptied(&self, _all_processed: bool) {}
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Observable lifecycle event recorded by [`ScriptedWorker`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum WorkerEvent {
        Started,
        /// A `process` invocation, with the payload it saw.
        Processed(String),
        ItemProcessed(i64),
        PausedOn(String),
        Emptied(bool),
    }

    /// String-payload worker whose outcomes are scripted per payload.
    ///
    /// A scripted outcome applies to the next `process` call for that
    /// payload only, then falls back to `Continue` - so a `Pause` does not
    /// wedge the queue after a resume.
    pub struct ScriptedWorker {
        name: String,
        outcomes: Mutex<HashMap<String, ProcessOutcome>>,
        undecodable: Mutex<HashSet<String>>,
        unencodable: Mutex<HashSet<String>>,
        process_delay: Mutex<Option<Duration>>,
        auto_resume: bool,
        count_reports: bool,
        events: Mutex<Vec<WorkerEvent>>,
        notify: Notify,
    }

    impl ScriptedWorker {
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                outcomes: Mutex::new(HashMap::new()),
                undecodable: Mutex::new(HashSet::new()),
                unencodable: Mutex::new(HashSet::new()),
                process_delay: Mutex::new(None),
                auto_resume: true,
                count_reports: true,
                events: Mutex::new(Vec::new()),
                notify: Notify::new(),
            }
        }

        /// Disable auto-start on new items (explicit `Resume` required).
        pub fn manual_resume(mut self) -> Self {
            self.auto_resume = false;
            self
        }

        /// Disable count reports entirely.
        pub fn without_count_reports(mut self) -> Self {
            self.count_reports = false;
            self
        }

        /// Script the outcome of the next `process` call for `payload`.
        pub fn script(&self, payload: impl Into<String>, outcome: ProcessOutcome) {
            self.outcomes.lock().unwrap().insert(payload.into(), outcome);
        }

        /// Make `deserialize` reject this payload (simulates a corrupt row).
        pub fn reject_decode(&self, payload: impl Into<String>) {
            self.undecodable.lock().unwrap().insert(payload.into());
        }

        /// Make `serialize` fail for this payload.
        pub fn reject_encode(&self, payload: impl Into<String>) {
            self.unencodable.lock().unwrap().insert(payload.into());
        }

        /// Inject a delay into every `process` call (for command-rejection
        /// tests that need a long-running item).
        pub fn set_process_delay(&self, delay: Duration) {
            *self.process_delay.lock().unwrap() = Some(delay);
        }

        pub fn events(&self) -> Vec<WorkerEvent> {
            self.events.lock().unwrap().clone()
        }

        /// Payloads seen by `process`, in invocation order.
        pub fn processed(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    WorkerEvent::Processed(p) => Some(p),
                    _ => None,
                })
                .collect()
        }

        /// Wait until the recorded events satisfy `pred`.
        ///
        /// Callers should wrap this in `tokio::time::timeout`.
        pub async fn wait_until<F>(&self, pred: F)
        where
            F: Fn(&[WorkerEvent]) -> bool,
        {
            loop {
                if pred(&self.events.lock().unwrap()) {
                    return;
                }
                self.notify.notified().await;
            }
        }

        /// Wait for the n-th `Emptied` event.
        pub async fn wait_for_emptied(&self, occurrence: usize) {
            self.wait_until(|evs| {
                evs.iter()
                    .filter(|e| matches!(e, WorkerEvent::Emptied(_)))
                    .count()
                    >= occurrence
            })
            .await;
        }

        /// Wait for the n-th `PausedOn` event.
        pub async fn wait_for_paused(&self, occurrence: usize) {
            self.wait_until(|evs| {
                evs.iter()
                    .filter(|e| matches!(e, WorkerEvent::PausedOn(_)))
                    .count()
                    >= occurrence
            })
            .await;
        }

        fn record(&self, event: WorkerEvent) {
            self.events.lock().unwrap().push(event);
            self.notify.notify_one();
        }
    }

    #[async_trait]
    impl QueueWorker for ScriptedWorker {
        type Item = String;

        fn queue_name(&self) -> &str {
            &self.name
        }

        fn serialize(&self, item: &String) -> Option<String> {
            if self.unencodable.lock().unwrap().contains(item) {
                None
            } else {
                Some(item.clone())
            }
        }

        fn deserialize(&self, raw: &str) -> Option<String> {
            if self.undecodable.lock().unwrap().contains(raw) {
                None
            } else {
                Some(raw.to_string())
            }
        }

        async fn process(&self, item: &String) -> ProcessOutcome {
            let delay = *self.process_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let outcome = self
                .outcomes
                .lock()
                .unwrap()
                .remove(item)
                .unwrap_or(ProcessOutcome::Continue);
            self.record(WorkerEvent::Processed(item.clone()));
            outcome
        }

        fn resume_on_new_item(&self) -> bool {
            self.auto_resume
        }

        fn allows_count_reports(&self) -> bool {
            self.count_reports
        }

        async fn on_start(&self) {
            self.record(WorkerEvent::Started);
        }

        async fn on_item_processed(&self, remaining: i64) {
            self.record(WorkerEvent::ItemProcessed(remaining));
        }

        async fn on_paused(&self, item: &String) {
            self.record(WorkerEvent::PausedOn(item.clone()));
        }

        async fn on_emptied(&self, all_processed: bool) {
            self.record(WorkerEvent::Emptied(all_processed));
        }
    }
}
