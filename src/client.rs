use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ChatError, ChatResult};

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatQuery {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub answer: String,
    // Not rendered anywhere yet, but kept so callers can use it.
    #[serde(default)]
    pub source: Option<String>,
}

/// Anything that can turn one user message into one answer.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, query: &str) -> ChatResult<ChatAnswer>;
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
}

impl ChatClient {
    /// Build a client that reuses an existing HTTP transport.
    pub fn with_http(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> ChatResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self::with_http(client, &config.endpoint_url))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn send(&self, query: &str) -> ChatResult<ChatAnswer> {
        let request = ChatQuery {
            query: query.to_string(),
        };

        debug!(endpoint = %self.endpoint, chars = query.chars().count(), "sending chat query");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, bytes = body.len(), "chat server rejected query");
            return Err(ChatError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        // Decode from raw bytes so invalid UTF-8 is rejected, not replaced
        let body = response.bytes().await?;
        let answer: ChatAnswer = serde_json::from_slice(&body)?;
        debug!(source = ?answer.source, "received chat answer");
        Ok(answer)
    }
}

/// Longest error body kept in a `ChatError::Status`, in chars
pub const MAX_ERROR_BODY_CHARS: usize = 500;

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn send(&self, query: &str) -> ChatResult<ChatAnswer> {
        ChatClient::send(self, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_wire_format() {
        let query = ChatQuery {
            query: "meaning?".to_string(),
        };
        assert_eq!(serde_json::to_string(&query).unwrap(), r#"{"query":"meaning?"}"#);
    }

    #[test]
    fn test_answer_source_null_or_absent() {
        let with_null: ChatAnswer =
            serde_json::from_str(r#"{"answer": "42", "source": null}"#).unwrap();
        let absent: ChatAnswer = serde_json::from_str(r#"{"answer": "42"}"#).unwrap();
        assert_eq!(with_null, absent);
        assert_eq!(with_null.source, None);
    }

    #[test]
    fn test_answer_keeps_source() {
        let answer: ChatAnswer =
            serde_json::from_str(r#"{"answer": "Drink water", "source": "Healthcare Documents"}"#)
                .unwrap();
        assert_eq!(answer.source.as_deref(), Some("Healthcare Documents"));
    }

    #[test]
    fn test_short_error_body_kept() {
        assert_eq!(truncate_body("  internal error\n"), "internal error");
    }

    #[test]
    fn test_long_error_body_truncated_on_char_boundary() {
        let body = "é".repeat(MAX_ERROR_BODY_CHARS + 10);
        let truncated = truncate_body(&body);
        assert_eq!(truncated.chars().count(), MAX_ERROR_BODY_CHARS + 1);
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn test_answer_missing_field_fails() {
        let result = serde_json::from_str::<ChatAnswer>(r#"{"reply": "42"}"#);
        assert!(result.is_err());
    }
}
