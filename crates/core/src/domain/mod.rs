// Domain Layer - Pure queue state and protocol types

pub mod command;
pub mod entry;
pub mod state;

// Re-exports
pub use command::{Command, ProcessOutcome};
pub use entry::{CountReport, StoredEntry};
pub use state::QueueState;
