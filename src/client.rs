//! HTTP client the chat view uses to reach the relay.

use crate::config::ClientConfig;
use crate::conversation::ReplyOutcome;
use crate::types::ChatRequest;
use serde_json::Value;

/// Path of the relay route, relative to the relay origin.
pub const CHAT_PATH: &str = "/api/chat";

#[derive(Clone, Debug)]
pub struct RelayClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RelayClient {
    pub fn new(relay_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}{CHAT_PATH}", relay_url.trim_end_matches('/')),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.relay_url)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post one chat turn. Every failure is folded into the outcome.
    pub async fn send(&self, request: &ChatRequest) -> ReplyOutcome {
        let res = match self.http.post(&self.endpoint).json(request).send().await {
            Ok(res) => res,
            Err(err) => {
                tracing::warn!(error = %err, "relay request failed");
                return ReplyOutcome::NetworkError(err.to_string());
            }
        };

        let status = res.status();
        if !status.is_success() {
            let body = match res.text().await {
                Ok(body) => body,
                Err(err) => return ReplyOutcome::NetworkError(err.to_string()),
            };
            tracing::debug!(%status, "relay returned an error status");
            return ReplyOutcome::HttpError {
                status: status.as_u16(),
                body,
            };
        }

        match res.json::<Value>().await {
            Ok(payload) => ReplyOutcome::Success(payload),
            Err(err) => ReplyOutcome::NetworkError(err.to_string()),
        }
    }
}
