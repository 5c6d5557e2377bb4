// Port Layer - Interfaces for external dependencies

pub mod queue_store;
pub mod queue_worker;
pub mod time_provider;
pub mod wake_source;

// Re-exports
pub use queue_store::QueueStore;
pub use queue_worker::QueueWorker;
pub use time_provider::{SystemTimeProvider, TimeProvider};
pub use wake_source::{NoopWakeSource, WakeGuard, WakeSource};
