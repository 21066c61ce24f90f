//! Folding stream events into a transcript.
//!
//! One `ConversationReducer` covers one submission. Turns are created lazily:
//! the user turn and the assistant turn appear together when the first
//! `content` event arrives, and later `content` events grow the assistant
//! turn in place.

use tracing::{debug, warn};

use crate::models::{Role, Transcript, TurnId};
use crate::stream::StreamEvent;

/// Effect of applying one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Text appended to the open assistant turn
    Appended,
    /// First content of the submission: user turn (if not yet present) and
    /// a new open assistant turn were appended
    TurnOpened(TurnId),
    /// Chat identifier learned from the stream
    ChatIdAssigned(String),
    /// `chat_created` arrived but an identifier was already set
    ChatIdKept,
    /// `done` processed, the assistant turn is frozen
    Completed,
    /// Event arrived after `done` and was dropped
    IgnoredAfterDone,
}

impl Applied {
    /// Whether observers need a fresh transcript snapshot
    pub fn mutated_transcript(&self) -> bool {
        matches!(
            self,
            Applied::Appended | Applied::TurnOpened(_) | Applied::Completed
        )
    }
}

/// Per-submission state machine over a transcript
#[derive(Debug, Clone)]
pub struct ConversationReducer {
    /// The message submitted by the user
    message: String,
    /// Whether the user turn for this submission is in the transcript
    user_recorded: bool,
    /// Assistant turn opened by this submission
    opened: Option<TurnId>,
    /// `done` seen (or the submission was abandoned)
    finished: bool,
    /// Conversation identifier, first write wins
    chat_id: Option<String>,
}

impl ConversationReducer {
    /// Start a submission of `message`, with the identifier known at submit time
    pub fn new(message: impl Into<String>, chat_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            user_recorded: false,
            opened: None,
            finished: false,
            chat_id,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Apply one event to `transcript`.
    pub fn apply(&mut self, transcript: &mut Transcript, event: StreamEvent) -> Applied {
        if self.finished {
            warn!(
                event_type = event.event_type(),
                "Dropping event received after done"
            );
            return Applied::IgnoredAfterDone;
        }

        match event {
            StreamEvent::Content { content } => self.apply_content(transcript, &content),
            StreamEvent::ChatCreated { chat_id } => self.apply_chat_created(chat_id),
            StreamEvent::Done => self.apply_done(transcript),
        }
    }

    /// Freeze whatever was streamed so far and stop accepting events.
    ///
    /// Used when the stream fails or is cancelled. Partial content is kept.
    /// Returns whether an open turn was closed.
    pub fn abandon(&mut self, transcript: &mut Transcript) -> bool {
        self.finished = true;
        match (self.opened, transcript.open_turn()) {
            (Some(opened), Some(open)) if open.id == opened => transcript.close_open(),
            _ => false,
        }
    }

    fn apply_content(&mut self, transcript: &mut Transcript, text: &str) -> Applied {
        let owns_open_turn = matches!(
            (self.opened, transcript.open_turn()),
            (Some(opened), Some(open)) if open.id == opened
        );

        if owns_open_turn && transcript.append_to_open(text) {
            return Applied::Appended;
        }

        self.record_user_turn(transcript);
        let id = transcript.push_open_assistant(text);
        self.opened = Some(id);
        debug!(turn = %id, "Opened assistant turn");
        Applied::TurnOpened(id)
    }

    fn apply_chat_created(&mut self, chat_id: String) -> Applied {
        match &self.chat_id {
            Some(existing) => {
                debug!(%existing, ignored = %chat_id, "Keeping existing chat id");
                Applied::ChatIdKept
            }
            None => {
                debug!(%chat_id, "Chat id assigned by server");
                self.chat_id = Some(chat_id.clone());
                Applied::ChatIdAssigned(chat_id)
            }
        }
    }

    fn apply_done(&mut self, transcript: &mut Transcript) -> Applied {
        self.finished = true;
        if self.opened.is_some() {
            transcript.close_open();
        } else {
            // Empty reply: keep the transcript alternating
            self.record_user_turn(transcript);
            transcript.push_closed(Role::Assistant, String::new());
        }
        Applied::Completed
    }

    /// Append the submitted message as a user turn, at most once per
    /// submission. Earlier turns with the same text belong to earlier
    /// submissions and do not count.
    fn record_user_turn(&mut self, transcript: &mut Transcript) {
        if self.user_recorded {
            return;
        }
        transcript.push_closed(Role::User, self.message.clone());
        self.user_recorded = true;
    }
}
