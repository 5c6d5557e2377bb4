// Application Layer - Dispatcher, Worker Loop, and Persistence Policies

pub mod policy;
pub mod service;
mod shutdown;
mod worker_loop;

// Re-exports
pub use policy::{DurablePolicy, QueuePolicy, SnapshotPolicy};
pub use service::QueueService;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
