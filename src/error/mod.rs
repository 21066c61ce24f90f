//! Error handling for chatline.
//!
//! - **Transport errors** (`HttpError`, in `crate::traits`): what the HTTP seam reports
//! - **Stream errors** (`StreamError`): why a submission ended without `done`
//! - **Unified error** (`ChatError`): everything a public operation can return
//! - **Result alias** (`ChatResult<T>`)
//!
//! | Failure | Session status | Transcript |
//! |---------|----------------|------------|
//! | Transport before streaming | failed | untouched |
//! | Connection lost mid-stream | failed | partial reply kept |
//! | Body ended without `done` | failed | partial reply kept |
//! | Cancelled by caller | cancelled | partial reply kept |
//! | Malformed line | (continues) | line dropped |

mod chat_error;
mod result;
mod stream;

pub use chat_error::ChatError;
pub use result::ChatResult;
pub use stream::StreamError;
