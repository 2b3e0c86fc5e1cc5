//! Per-request state machine.
//!
//! There is no session: every interaction walks the machine from the start.
//!
//! ```text
//! Idle -> AwaitingQuery -> Processing -> Done | Failed
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestPhase {
    /// No video supplied yet
    #[default]
    Idle,
    /// A video is present, waiting for a usable query
    AwaitingQuery,
    /// Upload, polling and model call in progress
    Processing,
    Done,
    Failed,
}

impl RequestPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestPhase::Idle => "idle",
            RequestPhase::AwaitingQuery => "awaiting_query",
            RequestPhase::Processing => "processing",
            RequestPhase::Done => "done",
            RequestPhase::Failed => "failed",
        }
    }

    /// Check whether moving to `next` is a legal transition.
    pub fn can_transition_to(&self, next: RequestPhase) -> bool {
        use RequestPhase::*;
        matches!(
            (self, next),
            (Idle, AwaitingQuery)
                | (AwaitingQuery, AwaitingQuery)
                | (AwaitingQuery, Processing)
                | (Processing, Done)
                | (Processing, Failed)
        )
    }
}

impl std::fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut phase = RequestPhase::Idle;
        for next in [
            RequestPhase::AwaitingQuery,
            RequestPhase::Processing,
            RequestPhase::Done,
        ] {
            assert!(phase.can_transition_to(next), "{} -> {}", phase, next);
            phase = next;
        }
        assert_eq!(phase, RequestPhase::Done);
    }

    #[test]
    fn test_cannot_skip_query() {
        assert!(!RequestPhase::Idle.can_transition_to(RequestPhase::Processing));
        assert!(!RequestPhase::Done.can_transition_to(RequestPhase::Processing));
    }
}
