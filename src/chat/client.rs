use super::error::{ChatError, Result};
use super::models::{ChatRequest, ChatResponse, ConversationMessage, HistoryPage};
use super::ChatBackend;
use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, warn};

/// HTTP client for the data-chat backend
pub struct ChatClient {
    http: Client,
    message_url: String,
    history_url: String,
}

impl ChatClient {
    /// Create a client for the endpoints described by `config`
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ChatError::Config(e.to_string()))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChatError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(ChatClient {
            http,
            message_url: config.message_url(),
            history_url: config.history_url(),
        })
    }

    pub fn message_url(&self) -> &str {
        &self.message_url
    }

    /// Fetch one page of server-side conversation history
    ///
    /// # Arguments
    /// * `page` - Zero-based page index
    /// * `limit` - Page size (the backend defaults to 20)
    pub async fn fetch_history(&self, page: u32, limit: u32) -> Result<HistoryPage> {
        let response = self
            .http
            .get(&self.history_url)
            .query(&[("page", page), ("limit", limit)])
            .send()
            .await?;

        decode(response).await
    }

    /// Fetch the stored messages of one server-side conversation
    ///
    /// # Arguments
    /// * `conversation_id` - Id from a `HistoryPage` entry
    ///
    /// # Errors
    /// `ChatError::Config` if the id cannot form a URL, plus the usual
    /// transport, status and decode errors.
    pub async fn fetch_conversation(&self, conversation_id: &str) -> Result<Vec<ConversationMessage>> {
        let url = self.conversation_url(conversation_id)?;
        let response = self.http.get(url).send().await?;

        let messages: Vec<ConversationMessage> = decode(response).await?;
        debug!(conversation = conversation_id, messages = messages.len(), "Conversation fetched");
        Ok(messages)
    }

    /// `{history_url}/{id}` with the id percent-encoded as one path segment
    fn conversation_url(&self, conversation_id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.history_url)
            .map_err(|e| ChatError::Config(format!("Invalid history URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ChatError::Config(format!("Invalid history URL: {}", self.history_url)))?
            .pop_if_empty()
            .push(conversation_id);
        Ok(url)
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let start = Instant::now();

        let response = self
            .http
            .post(&self.message_url)
            .json(request)
            .send()
            .await?;

        let decoded: ChatResponse = decode(response).await?;

        debug!(
            url = %self.message_url,
            rows = decoded.rows().len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Chat message answered"
        );
        Ok(decoded)
    }
}

/// Check the status and decode the JSON body
///
/// The body is read as text first so malformed JSON surfaces as
/// `ChatError::Decode` rather than an opaque transport error.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        warn!(status = status.as_u16(), "Backend returned an error status");
        return Err(ChatError::Http {
            status: status.as_u16(),
            body,
        });
    }

    Ok(serde_json::from_str(&body)?)
}
