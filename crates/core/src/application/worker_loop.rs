// Worker Loop - single background task draining the queue front-to-back

use crate::application::policy::QueuePolicy;
use crate::application::shutdown::ShutdownToken;
use crate::domain::{CountReport, ProcessOutcome, QueueState};
use crate::port::{QueueWorker, WakeSource};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info};

/// Everything a worker run (and the dispatcher) needs, bundled for spawning.
pub(crate) struct WorkerContext<W: QueueWorker> {
    pub worker: Arc<W>,
    pub policy: Arc<Mutex<dyn QueuePolicy<W::Item>>>,
    pub wake: Arc<dyn WakeSource>,
    pub state: Arc<watch::Sender<QueueState>>,
    pub counts: broadcast::Sender<CountReport>,
    pub shutdown: ShutdownToken,
}

// Manual Clone: deriving would demand W: Clone.
impl<W: QueueWorker> Clone for WorkerContext<W> {
    fn clone(&self) -> Self {
        Self {
            worker: Arc::clone(&self.worker),
            policy: Arc::clone(&self.policy),
            wake: Arc::clone(&self.wake),
            state: Arc::clone(&self.state),
            counts: self.counts.clone(),
            shutdown: self.shutdown.clone(),
        }
    }
}

enum Exit {
    Idle,
    Paused,
}

/// One worker run: load, drain, unload, report the final state.
///
/// Only one of these tasks exists at a time per queue instance; the
/// dispatcher sets the state to `Running` before spawning and refuses to
/// start a second while it stays there. Publishing the final state is the
/// last effect of the run, so once `Paused`/`Idle` is observable the
/// shared policy is no longer touched.
pub(crate) async fn run<W: QueueWorker>(ctx: WorkerContext<W>) {
    let queue = ctx.worker.queue_name().to_string();
    debug!(queue = %queue, "worker loop starting");

    // Keep-awake guard; dropped on every exit path below.
    let _wake = ctx.wake.acquire();

    ctx.policy.lock().await.load().await;
    ctx.worker.on_start().await;

    let final_state = loop {
        let exit = drain(&ctx, &queue).await;

        // Bookend of the run: persist whatever remains and hand the queue
        // back to storage ownership.
        ctx.policy.lock().await.unload().await;

        match exit {
            Exit::Paused => break QueueState::Paused,
            Exit::Idle => {
                // An item may have raced in between the last peek and the
                // unload; pick it up instead of stranding it until the
                // next enqueue.
                let remaining = { ctx.policy.lock().await.count().await };
                if remaining == 0 {
                    break QueueState::Idle;
                }
                debug!(
                    queue = %queue,
                    remaining,
                    "items arrived during wind-down; draining again"
                );
                ctx.policy.lock().await.load().await;
            }
        }
    };

    drop(_wake);
    ctx.state.send_replace(final_state);
    debug!(queue = %queue, state = %final_state, "worker loop stopped");
}

/// Drain items oldest-first until the queue empties, the processing
/// function pauses or stops, or shutdown is requested.
async fn drain<W: QueueWorker>(ctx: &WorkerContext<W>, queue: &str) -> Exit {
    loop {
        // Shutdown is only observed between items, never mid-item.
        if ctx.shutdown.is_shutdown() {
            info!(queue = %queue, "shutdown requested; suspending drain");
            return Exit::Paused;
        }

        // The policy lock is held per operation, never across process(),
        // so the dispatcher can keep enqueuing during a long item.
        let item = { ctx.policy.lock().await.peek().await };
        let Some(item) = item else {
            ctx.worker.on_emptied(true).await;
            return Exit::Idle;
        };

        match ctx.worker.process(&item).await {
            ProcessOutcome::Continue => {
                let remaining = {
                    let mut policy = ctx.policy.lock().await;
                    policy.remove().await;
                    policy.count().await
                };
                if ctx.worker.allows_count_reports() {
                    let _ = ctx.counts.send(CountReport {
                        queue: queue.to_string(),
                        count: remaining,
                    });
                }
                ctx.worker.on_item_processed(remaining).await;
            }
            ProcessOutcome::Pause => {
                info!(queue = %queue, "processing paused; item retained at head");
                ctx.worker.on_paused(&item).await;
                return Exit::Paused;
            }
            ProcessOutcome::Stop => {
                info!(queue = %queue, "processing stopped; discarding remaining items");
                ctx.worker.on_emptied(false).await;
                ctx.policy.lock().await.clear().await;
                return Exit::Idle;
            }
        }
    }
}
