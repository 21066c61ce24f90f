//! Session lifecycle states.

use serde::Serialize;
use std::fmt;

/// Lifecycle of one stream session.
///
/// `Idle -> Sending -> Streaming -> {Done, Failed, Cancelled}`. The three
/// terminal states are never left; a new submission starts a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created, request not yet issued
    Idle,
    /// Request issued, waiting for the response body
    Sending,
    /// Reading the response body
    Streaming,
    /// `done` received
    Done,
    /// Transport error, lost connection, or no `done` before end of data
    Failed,
    /// Aborted by the caller
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Done | SessionStatus::Failed | SessionStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Sending => "sending",
            SessionStatus::Streaming => "streaming",
            SessionStatus::Done => "done",
            SessionStatus::Failed => "failed",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
