use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a turn, unique within one transcript.
///
/// Assigned from the transcript's own sequence so that replaying the same
/// events into a fresh transcript yields identical ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(pub u64);

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "turn-{}", self.0)
    }
}

/// Author of a turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label used by the history API's `message_type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Map a `message_type` value from the history API
    pub fn from_message_type(message_type: &str) -> Option<Self> {
        match message_type {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// One message in a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: TurnId,
    pub role: Role,
    pub content: String,
    /// Still receiving content from an active stream (assistant turns only)
    #[serde(default)]
    pub open: bool,
}

impl Turn {
    /// Closed turn with fixed content
    pub fn closed(id: TurnId, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            open: false,
        }
    }

    /// Whether this is an assistant turn still growing
    pub fn is_open_assistant(&self) -> bool {
        self.open && self.role == Role::Assistant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_message_type() {
        assert_eq!(Role::from_message_type("user"), Some(Role::User));
        assert_eq!(Role::from_message_type("assistant"), Some(Role::Assistant));
        assert_eq!(Role::from_message_type("system"), None);
        assert_eq!(Role::from_message_type("User"), None);
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn test_turn_id_display() {
        assert_eq!(TurnId(3).to_string(), "turn-3");
    }

    #[test]
    fn test_closed_turn_is_not_open() {
        let turn = Turn::closed(TurnId(0), Role::Assistant, "hi");
        assert!(!turn.is_open_assistant());
    }
}
