//! Chat backend boundary
//!
//! Everything that crosses the wire lives here: the request/response models,
//! the HTTP client and the `ChatBackend` trait the session talks through.
//!
//! Structure:
//! - `models.rs`: JSON request/response types
//! - `client.rs`: reqwest-based HTTP client
//! - `error.rs`: Error types

pub mod client;
pub mod error;
pub mod models;

pub use client::ChatClient;
pub use error::{ChatError, Result};
pub use models::{
    ChartConfig, ChatRequest, ChatResponse, ConversationMessage, ConversationSummary, DataSummary,
    HistoryPage, Row,
};

use async_trait::async_trait;

/// Anything that can answer a chat message with tabular data
///
/// Implementations:
/// - `ChatClient`: the real HTTP backend
/// - scripted in-memory backends in tests
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one message and wait for the structured answer
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse>;
}
