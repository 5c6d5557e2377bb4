// Control Protocol - commands and processing return codes

use serde::{Deserialize, Serialize};

/// Control-plane request, distinct from ordinary queued work.
///
/// Commands are only executed while the worker loop is NOT running;
/// a command arriving mid-drain is logged and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Start draining the queue from the head.
    Resume,
    /// Discard the head item, then start draining.
    ResumeSkipFirst,
    /// Discard the entire queue; the emptied hook fires with `all_processed = false`.
    Abort,
    /// Request an out-of-band count report.
    QueryCount,
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Resume => write!(f, "RESUME"),
            Command::ResumeSkipFirst => write!(f, "RESUME_SKIP_FIRST"),
            Command::Abort => write!(f, "ABORT"),
            Command::QueryCount => write!(f, "QUERY_COUNT"),
        }
    }
}

/// Return code of the caller-supplied processing function.
///
/// Application-level failure is not an error type; it is encoded here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Item handled; remove it and move to the next one.
    Continue,
    /// Retry this item later; stop processing for now. The item stays at the head.
    Pause,
    /// Abandon all remaining work permanently.
    Stop,
}
