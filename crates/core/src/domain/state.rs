// Queue State Machine

use serde::{Deserialize, Serialize};

/// Lifecycle state of a queue instance.
///
/// Transitions:
/// - `Idle -> Running` on enqueue (with auto-resume) or an explicit `Resume`
/// - `Running -> Paused` when the processing function returns `Pause`
/// - `Running -> Idle` on queue exhaustion or a `Stop` return code
/// - `Paused -> Running` only via an explicit `Resume` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueState {
    Idle,
    Running,
    Paused,
}

impl std::fmt::Display for QueueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueState::Idle => write!(f, "IDLE"),
            QueueState::Running => write!(f, "RUNNING"),
            QueueState::Paused => write!(f, "PAUSED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trip_with_serde() {
        for state in [QueueState::Idle, QueueState::Running, QueueState::Paused] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state));
        }
    }
}
