//! Stream session controller
//!
//! A [`Conversation`] owns one transcript store and knows its chat id. Each
//! submission becomes a [`StreamSession`] that issues the request, decodes
//! the body line by line, folds events into the transcript through the
//! reducer, and publishes a snapshot after every change.
//!
//! ```text
//! idle -> sending -> streaming -> done
//!            |           |------> failed
//!            |           '------> cancelled
//!            '-> failed | cancelled
//! ```

mod abort;
mod controller;
mod status;

pub use abort::AbortHandle;
pub use controller::{Conversation, SessionOutcome, StreamSession};
pub use status::SessionStatus;
