// Queue Service - the ordered intake point for work items and commands

use crate::application::policy::QueuePolicy;
use crate::application::shutdown::{shutdown_channel, ShutdownSender};
use crate::application::worker_loop::{self, WorkerContext};
use crate::domain::{Command, CountReport, QueueState};
use crate::error::{QueueError, Result};
use crate::port::{QueueWorker, WakeSource};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Lagging count listeners drop old reports rather than blocking the worker.
const COUNT_CHANNEL_CAPACITY: usize = 16;

enum Request<T> {
    Item(T),
    Command(Command),
}

/// Public handle to one queue instance.
///
/// All intake funnels through a single dispatch task, so enqueues and
/// commands never race each other; the worker loop runs independently on
/// its own task and is the only place the processing function executes.
pub struct QueueService<W: QueueWorker> {
    tx: mpsc::UnboundedSender<Request<W::Item>>,
    state_rx: watch::Receiver<QueueState>,
    counts: broadcast::Sender<CountReport>,
    shutdown: ShutdownSender,
    dispatcher: JoinHandle<()>,
}

impl<W: QueueWorker> QueueService<W> {
    /// Spawn the dispatch task for `worker` over the given persistence
    /// policy and wake source.
    pub fn start<P>(worker: Arc<W>, policy: P, wake: Arc<dyn WakeSource>) -> Self
    where
        P: QueuePolicy<W::Item> + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(QueueState::Idle);
        let (counts, _) = broadcast::channel(COUNT_CHANNEL_CAPACITY);
        let (shutdown, token) = shutdown_channel();

        let policy: Arc<Mutex<dyn QueuePolicy<W::Item>>> = Arc::new(Mutex::new(policy));
        let ctx = WorkerContext {
            worker,
            policy,
            wake,
            state: Arc::new(state_tx),
            counts: counts.clone(),
            shutdown: token,
        };
        let dispatcher = tokio::spawn(dispatch_loop(rx, ctx));

        Self {
            tx,
            state_rx,
            counts,
            shutdown,
            dispatcher,
        }
    }

    /// Submit a work item. Processed in arrival order relative to every
    /// other item and command.
    pub fn enqueue(&self, item: W::Item) -> Result<()> {
        self.tx
            .send(Request::Item(item))
            .map_err(|_| QueueError::ChannelClosed)
    }

    /// Submit a control command. Executed only while the worker loop is
    /// not running; otherwise logged and dropped.
    pub fn command(&self, command: Command) -> Result<()> {
        self.tx
            .send(Request::Command(command))
            .map_err(|_| QueueError::ChannelClosed)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> QueueState {
        *self.state_rx.borrow()
    }

    /// Observe state transitions.
    pub fn watch_state(&self) -> watch::Receiver<QueueState> {
        self.state_rx.clone()
    }

    /// Subscribe to out-of-band count reports.
    pub fn subscribe_counts(&self) -> broadcast::Receiver<CountReport> {
        self.counts.subscribe()
    }

    /// Graceful shutdown: stop intake, let a running worker finish its
    /// current item and persist the remainder, then wait for both tasks.
    pub async fn shutdown(self) {
        self.shutdown.shutdown();
        drop(self.tx);
        let _ = self.dispatcher.await;
    }
}

async fn dispatch_loop<W: QueueWorker>(
    mut rx: mpsc::UnboundedReceiver<Request<W::Item>>,
    ctx: WorkerContext<W>,
) {
    let mut worker_handle: Option<JoinHandle<()>> = None;
    let queue = ctx.worker.queue_name().to_string();

    while let Some(request) = rx.recv().await {
        // The state watch is authoritative: the worker publishes its final
        // state as the last effect of its run. The handle check is a
        // fallback so a panicked worker does not wedge the queue.
        let worker_alive = worker_handle.as_ref().is_some_and(|h| !h.is_finished());
        let worker_running = worker_alive && *ctx.state.borrow() == QueueState::Running;

        match request {
            Request::Item(item) => {
                ctx.policy.lock().await.enqueue(item).await;
                if !worker_running
                    && ctx.worker.resume_on_new_item()
                    && !ctx.shutdown.is_shutdown()
                {
                    worker_handle = Some(spawn_worker(&ctx));
                }
            }
            Request::Command(command) => {
                if worker_running {
                    warn!(
                        queue = %queue,
                        command = %command,
                        "command ignored while worker is running"
                    );
                    continue;
                }
                match command {
                    Command::Resume => {
                        worker_handle = Some(spawn_worker(&ctx));
                    }
                    Command::ResumeSkipFirst => {
                        ctx.policy.lock().await.remove().await;
                        worker_handle = Some(spawn_worker(&ctx));
                    }
                    Command::Abort => {
                        let discarded = {
                            let mut policy = ctx.policy.lock().await;
                            let count = policy.count().await;
                            policy.clear().await;
                            count
                        };
                        let was_paused = *ctx.state.borrow() == QueueState::Paused;
                        // A second abort against an already-empty idle
                        // queue has no further effect.
                        if discarded > 0 || was_paused {
                            ctx.worker.on_emptied(false).await;
                        }
                        ctx.state.send_replace(QueueState::Idle);
                        debug!(queue = %queue, discarded, "queue aborted");
                    }
                    Command::QueryCount => {
                        if ctx.worker.allows_count_reports() {
                            let count = { ctx.policy.lock().await.count().await };
                            let _ = ctx.counts.send(CountReport {
                                queue: queue.clone(),
                                count,
                            });
                        } else {
                            debug!(queue = %queue, "count report suppressed by worker policy");
                        }
                    }
                }
            }
        }
    }

    // Intake closed (shutdown or handle dropped): wait for a running
    // worker to suspend between items.
    if let Some(handle) = worker_handle {
        let _ = handle.await;
    }
    debug!(queue = %queue, "dispatcher stopped");
}

fn spawn_worker<W: QueueWorker>(ctx: &WorkerContext<W>) -> JoinHandle<()> {
    // Published before the spawn so a command arriving next in the intake
    // order already sees the worker as running.
    ctx.state.send_replace(QueueState::Running);
    tokio::spawn(worker_loop::run(ctx.clone()))
}
