//! Conversation data model and chat API wire types

mod chat;
mod transcript;
mod turn;

pub use chat::{ChatDetail, ChatInfo, ChatSummary, HistoryMessage, SendMessageRequest};
pub use transcript::Transcript;
pub use turn::{Role, Turn, TurnId};
