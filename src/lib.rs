pub mod app;
pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod handler;
pub mod logging;
pub mod state;
pub mod tui;
pub mod ui;

// Re-export main types for convenience
pub use client::{ChatAnswer, ChatBackend, ChatClient, ChatQuery};
pub use config::Config;
pub use conversation::{Conversation, SubmitOutcome};
pub use error::{ChatError, ChatResult};
pub use state::{Message, Role};
