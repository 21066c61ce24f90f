//! Conversation handle and the per-submission stream session.

use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::abort::{AbortHandle, AbortSignal};
use super::status::SessionStatus;
use crate::client::ChatClient;
use crate::conversation::{Applied, ConversationReducer};
use crate::error::{ChatResult, StreamError};
use crate::models::Transcript;
use crate::store::{TranscriptLease, TranscriptStore};
use crate::stream::{parse_line, LineDecoder};
use crate::traits::{ByteStream, HttpClient};

/// Final report of one stream session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub status: SessionStatus,
    /// Conversation id known at the end of the session
    pub chat_id: Option<String>,
    /// Why the session did not reach `done`
    pub error: Option<StreamError>,
}

impl SessionOutcome {
    pub fn is_done(&self) -> bool {
        self.status == SessionStatus::Done
    }
}

/// One conversation: its transcript store, its id, and the client used to
/// talk to the server.
#[derive(Debug)]
pub struct Conversation<H> {
    client: Arc<ChatClient<H>>,
    store: TranscriptStore,
    chat_id: Option<String>,
    /// Client-generated id, used for every request until a chat id is known
    route_id: String,
}

impl<H: HttpClient> Conversation<H> {
    /// A new conversation with no id and an empty transcript.
    pub fn new(client: Arc<ChatClient<H>>) -> Self {
        Self {
            client,
            store: TranscriptStore::default(),
            chat_id: None,
            route_id: Uuid::new_v4().to_string(),
        }
    }

    /// Address an existing conversation without loading its history.
    pub fn with_chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    /// Load an existing conversation's history into a fresh transcript.
    pub async fn open(client: Arc<ChatClient<H>>, chat_id: &str) -> ChatResult<Self> {
        let history = client.fetch_history(chat_id).await?;
        let transcript = Transcript::from_history(&history);
        info!(%chat_id, turns = transcript.len(), "Loaded chat history");

        Ok(Self {
            client,
            store: TranscriptStore::new(transcript),
            chat_id: Some(chat_id.to_string()),
            route_id: chat_id.to_string(),
        })
    }

    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }

    pub fn client(&self) -> &Arc<ChatClient<H>> {
        &self.client
    }

    /// Id the next request will be addressed to.
    pub fn route_id(&self) -> &str {
        self.chat_id.as_deref().unwrap_or(&self.route_id)
    }

    /// Prepare a session for `message` without issuing the request.
    ///
    /// The message is sent and recorded exactly as given; whitespace only
    /// decides whether it is empty. The session takes the transcript lease
    /// immediately, so a second `start` on this conversation fails with
    /// `SessionBusy` until the first session has finished or been dropped.
    pub fn start(&self, message: &str) -> Result<StreamSession<H>, StreamError> {
        if message.trim().is_empty() {
            return Err(StreamError::EmptyMessage);
        }

        let lease = self.store.acquire()?;
        let route_id = self.route_id().to_string();
        let (abort, signal) = AbortHandle::new();
        let (status_tx, _) = watch::channel(SessionStatus::Idle);

        Ok(StreamSession {
            client: Arc::clone(&self.client),
            lease,
            reducer: ConversationReducer::new(message, self.chat_id.clone()),
            route_id,
            status_tx,
            abort,
            signal,
        })
    }

    /// Start a session, run it to a terminal state, and adopt the chat id it
    /// learned.
    ///
    /// Only rejections (`EmptyMessage`, `SessionBusy`) are returned as `Err`;
    /// failures of the exchange itself are reported in the outcome.
    pub async fn submit(&mut self, message: &str) -> Result<SessionOutcome, StreamError> {
        let session = self.start(message)?;
        let outcome = session.run().await;
        self.adopt(&outcome);
        Ok(outcome)
    }

    /// Take the chat id learned by a finished session if none is known yet.
    pub fn adopt(&mut self, outcome: &SessionOutcome) {
        if self.chat_id.is_none() {
            if let Some(id) = &outcome.chat_id {
                debug!(chat_id = %id, "Adopting chat id");
                self.chat_id = Some(id.clone());
            }
        }
    }
}

/// One submission: request, stream, and fold into the transcript.
///
/// Holds the conversation's transcript lease for its whole life.
#[derive(Debug)]
pub struct StreamSession<H> {
    client: Arc<ChatClient<H>>,
    lease: TranscriptLease,
    reducer: ConversationReducer,
    route_id: String,
    status_tx: watch::Sender<SessionStatus>,
    abort: AbortHandle,
    signal: AbortSignal,
}

impl<H: HttpClient> StreamSession<H> {
    pub fn status(&self) -> SessionStatus {
        *self.status_tx.borrow()
    }

    /// Subscribe to status transitions. The receiver keeps the terminal
    /// status after the session is gone.
    pub fn status_receiver(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Id the request is addressed to (known id, or the conversation's
    /// generated UUID for a new chat).
    pub fn route_id(&self) -> &str {
        &self.route_id
    }

    pub fn message(&self) -> &str {
        self.reducer.message()
    }

    /// Drive the session to a terminal state.
    ///
    /// The response body is dropped before this returns, whatever the outcome.
    pub async fn run(mut self) -> SessionOutcome {
        self.set_status(SessionStatus::Sending);
        info!(route_id = %self.route_id, "Sending message");

        let opened = tokio::select! {
            biased;
            _ = self.signal.aborted() => Err(StreamError::Cancelled),
            result = self.client.send_message(&self.route_id, self.reducer.message()) => {
                result.map_err(StreamError::Transport)
            }
        };

        let mut body = match opened {
            Ok(body) => body,
            Err(err) => return self.finish(Err(err)),
        };

        self.set_status(SessionStatus::Streaming);
        debug!(route_id = %self.route_id, "Response body open");

        let result = self.consume(&mut body).await;
        drop(body);
        self.finish(result)
    }

    async fn consume(&mut self, body: &mut ByteStream) -> Result<(), StreamError> {
        let mut decoder = LineDecoder::new();

        loop {
            let next = tokio::select! {
                biased;
                _ = self.signal.aborted() => return Err(StreamError::Cancelled),
                next = body.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    for line in decoder.feed(&chunk) {
                        self.handle_line(&line);
                    }
                    if self.reducer.is_finished() {
                        if decoder.has_pending() {
                            warn!("Discarding partial line after done");
                        }
                        return Ok(());
                    }
                }
                Some(Err(err)) => {
                    return Err(StreamError::ConnectionLost {
                        message: err.to_string(),
                    });
                }
                None => {
                    if let Some(line) = decoder.flush() {
                        self.handle_line(&line);
                    }
                    return if self.reducer.is_finished() {
                        Ok(())
                    } else {
                        Err(StreamError::MissingDone)
                    };
                }
            }
        }
    }

    fn handle_line(&mut self, line: &str) {
        let event = match parse_line(line) {
            Ok(event) => event,
            Err(failure) => {
                if failure.is_anomaly() {
                    warn!(%failure, line, "Dropping malformed stream line");
                }
                return;
            }
        };

        let event_type = event.event_type();
        let reducer = &mut self.reducer;
        let mut applied = None;
        self.lease.update(|transcript| {
            let outcome = reducer.apply(transcript, event);
            let mutated = outcome.mutated_transcript();
            applied = Some(outcome);
            mutated
        });

        match applied {
            Some(Applied::ChatIdAssigned(chat_id)) => info!(%chat_id, "Chat created"),
            Some(other) => debug!(event_type, applied = ?other, "Applied stream event"),
            None => {}
        }
    }

    fn set_status(&self, status: SessionStatus) {
        self.status_tx.send_if_modified(|current| {
            if *current == status || current.is_terminal() {
                return false;
            }
            debug!(from = %current, to = %status, "Session status");
            *current = status;
            true
        });
    }

    fn finish(self, result: Result<(), StreamError>) -> SessionOutcome {
        let StreamSession {
            lease,
            mut reducer,
            route_id,
            status_tx,
            ..
        } = self;

        if result.is_err() {
            lease.update(|transcript| reducer.abandon(transcript));
        }
        // Release the transcript before observers see the terminal state.
        drop(lease);

        let status = match &result {
            Ok(()) => SessionStatus::Done,
            Err(StreamError::Cancelled) => SessionStatus::Cancelled,
            Err(_) => SessionStatus::Failed,
        };
        let chat_id = reducer.chat_id().map(str::to_string);

        match &result {
            Ok(()) => info!(%route_id, chat_id = ?chat_id, "Response complete"),
            Err(StreamError::Cancelled) => info!(%route_id, "Response cancelled"),
            Err(err) => warn!(%route_id, code = err.error_code(), error = %err, "Response failed"),
        }

        status_tx.send_replace(status);

        SessionOutcome {
            status,
            chat_id,
            error: result.err(),
        }
    }
}
