// Durable Row and Count Report value objects

use serde::{Deserialize, Serialize};

/// On-disk representation of a queued work item.
///
/// Invariant: rows in the Durable Store are always a suffix of the true
/// queue in arrival order; scanning by ascending `(timestamp, id)`
/// reconstructs FIFO order exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    /// Auto-assigned, monotonic row id.
    pub id: i64,
    /// Insertion timestamp in epoch ms, used purely for ordering.
    pub timestamp: i64,
    /// Opaque serialized payload. The queue never inspects it.
    pub payload: String,
}

/// Out-of-band notification emitted after each processed item (when
/// enabled) and on an explicit `QueryCount` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountReport {
    pub queue: String,
    pub count: i64,
}
