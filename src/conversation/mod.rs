//! Conversation state: the reducer that folds stream events into a transcript

mod reducer;

pub use reducer::{Applied, ConversationReducer};
