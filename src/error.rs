use reqwest::StatusCode;
use thiserror::Error;

/// Failures of a single exchange with the chat backend
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Could not reach the chat server: {0}")]
    Transport(String),

    #[error("The chat server did not answer in time")]
    Timeout,

    #[error("Chat server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Could not read the chat server's answer: {0}")]
    Decode(String),

    #[error("Request was interrupted: {0}")]
    Interrupted(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::Timeout
        } else if err.is_decode() {
            ChatError::Decode(err.to_string())
        } else {
            ChatError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Decode(err.to_string())
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
