use serde::{Deserialize, Serialize};
use tracing::warn;

use super::chat::HistoryMessage;
use super::turn::{Role, Turn, TurnId};

/// Ordered history of turns for one conversation.
///
/// Insertion order is conversation order. At most one turn is open at a time
/// and it is always the last one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
    next_id: u64,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a transcript from a finished history read.
    ///
    /// Every ingested turn is closed. Entries with an unrecognized
    /// `message_type` are skipped.
    pub fn from_history(messages: &[HistoryMessage]) -> Self {
        let mut transcript = Self::new();
        for message in messages {
            match Role::from_message_type(&message.message_type) {
                Some(role) => {
                    transcript.push_closed(role, message.content.clone());
                }
                None => {
                    warn!(
                        message_type = %message.message_type,
                        "Skipping history entry with unknown message type"
                    );
                }
            }
        }
        transcript
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The assistant turn currently receiving content, if any
    pub fn open_turn(&self) -> Option<&Turn> {
        self.turns.last().filter(|t| t.is_open_assistant())
    }

    /// Whether turns strictly alternate user, assistant, user, ...
    pub fn is_alternating(&self) -> bool {
        self.turns.iter().enumerate().all(|(i, turn)| {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            turn.role == expected
        })
    }

    /// Append a finished turn, closing any open one first.
    pub fn push_closed(&mut self, role: Role, content: impl Into<String>) -> TurnId {
        self.close_open();
        let id = self.allocate_id();
        self.turns.push(Turn::closed(id, role, content));
        id
    }

    /// Append a new open assistant turn seeded with `content`.
    pub(crate) fn push_open_assistant(&mut self, content: impl Into<String>) -> TurnId {
        self.close_open();
        let id = self.allocate_id();
        self.turns.push(Turn {
            id,
            role: Role::Assistant,
            content: content.into(),
            open: true,
        });
        id
    }

    /// Append text to the open assistant turn.
    ///
    /// Returns `false` without touching anything if no turn is open.
    pub(crate) fn append_to_open(&mut self, text: &str) -> bool {
        match self.turns.last_mut() {
            Some(turn) if turn.is_open_assistant() => {
                turn.content.push_str(text);
                true
            }
            _ => false,
        }
    }

    /// Freeze the open assistant turn. Returns whether one was open.
    pub fn close_open(&mut self) -> bool {
        match self.turns.last_mut() {
            Some(turn) if turn.open => {
                turn.open = false;
                true
            }
            _ => false,
        }
    }

    fn allocate_id(&mut self) -> TurnId {
        let id = TurnId(self.next_id);
        self.next_id += 1;
        id
    }
}
