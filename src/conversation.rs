//! Conversation state machine behind the chat view.
//!
//! Two states: idle and awaiting a reply. `submit` moves idle → awaiting and
//! hands back the request to send; `settle` moves awaiting → idle and appends
//! the bot entry for whatever the request produced. The log is append-only.

use crate::types::{ChatRequest, Message};
use serde_json::Value;

/// Prefix of every bot entry produced by a failed turn.
pub const ERROR_PREFIX: &str = "Ошибка: ";

const NULL_PAYLOAD: &str = "response body is null";

/// How an outbound chat request settled.
#[derive(Clone, Debug, PartialEq)]
pub enum ReplyOutcome {
    /// 2xx response with a JSON body.
    Success(Value),
    /// Non-2xx response; `body` is the raw response text.
    HttpError { status: u16, body: String },
    /// Transport failure or an undecodable success body.
    NetworkError(String),
}

impl ReplyOutcome {
    /// Text of the bot entry this outcome produces.
    pub fn into_text(self) -> String {
        match self {
            ReplyOutcome::Success(Value::Null) => format!("{ERROR_PREFIX}{NULL_PAYLOAD}"),
            ReplyOutcome::Success(payload) => match payload.get("reply") {
                Some(Value::String(reply)) => reply.clone(),
                Some(Value::Null) | None => payload.to_string(),
                Some(other) => other.to_string(),
            },
            ReplyOutcome::HttpError { body, .. } => format!("{ERROR_PREFIX}{body}"),
            ReplyOutcome::NetworkError(description) => format!("{ERROR_PREFIX}{description}"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
    busy: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn can_submit(&self, input: &str) -> bool {
        !self.busy && !input.trim().is_empty()
    }

    /// Starts a turn. Returns `None` without touching the log when a request
    /// is already in flight or the trimmed input is empty.
    pub fn submit(&mut self, input: &str) -> Option<ChatRequest> {
        if !self.can_submit(input) {
            return None;
        }
        let text = input.trim().to_string();
        self.messages.push(Message::user(text.clone()));
        self.busy = true;
        Some(ChatRequest { message: text })
    }

    /// Finishes the outstanding turn. A settlement with nothing in flight is
    /// dropped.
    pub fn settle(&mut self, outcome: ReplyOutcome) {
        if !self.busy {
            tracing::warn!("reply settled with no request in flight; dropping it");
            return;
        }
        self.messages.push(Message::bot(outcome.into_text()));
        self.busy = false;
    }
}
