//! Conversation state and the submit lifecycle
//!
//! A submission moves `Idle -> Sending -> Answered | Errored -> Idle`. Only one
//! request may be in flight; the transcript always reads as a user message
//! followed by exactly one answer or error.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::{ChatAnswer, ChatBackend};
use crate::error::{ChatError, ChatResult};
use crate::state::Message;

/// Placeholder shown by a display surface while the transcript is empty
pub const GREETING: &str = "Ask me about healthcare or fashion!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The draft was recorded and a request is now in flight
    Sent,
    /// The draft was blank; nothing happened
    Empty,
    /// A previous request has not finished yet; nothing happened
    Busy,
}

pub struct Conversation {
    backend: Arc<dyn ChatBackend>,
    transcript: Vec<Message>,
    draft: String,
    pending: Option<JoinHandle<ChatResult<ChatAnswer>>>,
}

impl Conversation {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            transcript: Vec::new(),
            draft: String::new(),
            pending: None,
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.draft.push(c);
    }

    pub fn pop_char(&mut self) {
        self.draft.pop();
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Send the current draft. Must be called from within a tokio runtime.
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.draft.trim().is_empty() {
            return SubmitOutcome::Empty;
        }
        if self.pending.is_some() {
            debug!("submit rejected, request already in flight");
            return SubmitOutcome::Busy;
        }

        let text = std::mem::take(&mut self.draft);
        self.append(Message::user(text.clone()));

        let backend = Arc::clone(&self.backend);
        self.pending = Some(tokio::spawn(async move { backend.send(&text).await }));

        SubmitOutcome::Sent
    }

    /// Record the response if the in-flight request has finished.
    /// Returns true when a message was appended.
    pub async fn poll_response(&mut self) -> bool {
        let finished = self.pending.as_ref().is_some_and(|handle| handle.is_finished());
        if !finished {
            return false;
        }
        self.wait_for_response().await
    }

    /// Wait for the in-flight request and record its outcome.
    /// Returns false when nothing was pending.
    ///
    /// Dropping this future before it resolves loses the response, so UI loops
    /// should use [`Conversation::poll_response`] instead.
    pub async fn wait_for_response(&mut self) -> bool {
        let Some(handle) = self.pending.take() else {
            return false;
        };

        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(ChatError::Interrupted(e.to_string())),
        };

        match result {
            Ok(answer) => self.append(Message::assistant(answer.answer)),
            Err(e) => {
                warn!(error = %e, "chat request failed");
                self.append(Message::error(e.to_string()));
            }
        }
        true
    }

    fn append(&mut self, message: Message) {
        debug!(role = message.role().as_str(), index = self.transcript.len(), "transcript append");
        self.transcript.push(message);
    }

    /// Drop every message. Refused while a request is in flight.
    pub fn clear(&mut self) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.transcript.clear();
        true
    }
}
