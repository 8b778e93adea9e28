//! Wire models for the chat endpoint
//!
//! The backend answers with a loosely-typed JSON document whose `data` rows have
//! no fixed schema: the column set depends on the question asked. Rows are kept
//! as ordered JSON objects so the first row's key order survives decoding.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One record of a tabular answer: column name → scalar value, in backend order
pub type Row = Map<String, Value>;

/// Body of `POST /api/v1/chat/message`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,

    /// Server-side conversation to continue (omitted for a fresh conversation)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: None,
        }
    }

    pub fn with_conversation(mut self, conversation_id: Option<String>) -> Self {
        self.conversation_id = conversation_id;
        self
    }
}

/// Answer to a chat message
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Requested rendering: "pie", "line", "bar" or anything else (table)
    #[serde(default)]
    pub visualization_type: Option<String>,

    #[serde(default)]
    pub data: Option<Vec<Row>>,

    #[serde(default)]
    pub chart_config: Option<ChartConfig>,

    /// Natural-language description of what the data shows
    #[serde(default)]
    pub explanation: Option<String>,

    #[serde(default)]
    pub summary: Option<DataSummary>,

    #[serde(default, alias = "valid")]
    pub is_valid: Option<bool>,

    /// Set when the backend could not answer; wins over any `data`
    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl ChatResponse {
    /// Rows of the answer, empty when the backend sent none
    pub fn rows(&self) -> &[Row] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Chart title, empty when no chart config was sent
    pub fn title(&self) -> &str {
        self.chart_config
            .as_ref()
            .and_then(|c| c.title.as_deref())
            .unwrap_or("")
    }
}

/// Presentation hints attached to an answer
///
/// Only `title` drives the adapter; the rest is passed to chart options.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub subtitle: Option<String>,

    #[serde(default, alias = "xaxisLabel")]
    pub x_axis_label: Option<String>,

    #[serde(default, alias = "yaxisLabel")]
    pub y_axis_label: Option<String>,

    #[serde(default)]
    pub legend_position: Option<String>,

    #[serde(default)]
    pub show_legend: Option<bool>,
}

/// Backend-computed statistics over the answer rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSummary {
    #[serde(default)]
    pub total_records: Option<u64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

/// One page of `GET /api/v1/chat/history`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    #[serde(default)]
    pub content: Vec<ConversationSummary>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    /// Zero-based page index
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub conversation_id: String,
    #[serde(default)]
    pub title: String,
}

/// One stored message of `GET /api/v1/chat/history/{id}`
///
/// Older backends send the message body as `content`, newer ones as `text`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    /// "USER", "ASSISTANT" or "SYSTEM"
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ConversationMessage {
    pub fn body(&self) -> &str {
        self.text
            .as_deref()
            .or(self.content.as_deref())
            .unwrap_or("")
    }

    pub fn is_user(&self) -> bool {
        self.message_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("user"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_omits_missing_conversation() {
        let body = serde_json::to_value(ChatRequest::new("premiums by city")).unwrap();
        assert_eq!(body, json!({ "message": "premiums by city" }));

        let body = serde_json::to_value(
            ChatRequest::new("and in 2021?").with_conversation(Some("c-1".to_string())),
        )
        .unwrap();
        assert_eq!(
            body,
            json!({ "message": "and in 2021?", "conversationId": "c-1" })
        );
    }

    #[test]
    fn test_response_keeps_column_order() {
        let raw = r#"{
            "visualizationType": "pie",
            "data": [{"premium": 120, "city": "Zagreb", "year": 2020}],
            "chartConfig": {"title": "Premiums"},
            "errorMessage": null
        }"#;
        let resp: ChatResponse = serde_json::from_str(raw).unwrap();

        let keys: Vec<&String> = resp.rows()[0].keys().collect();
        assert_eq!(keys, ["premium", "city", "year"]);
        assert_eq!(resp.title(), "Premiums");
        assert!(resp.error_message.is_none());
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let resp: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.rows().is_empty());
        assert_eq!(resp.title(), "");
        assert!(resp.visualization_type.is_none());
    }

    #[test]
    fn test_response_accepts_backend_field_spellings() {
        let raw = r#"{
            "valid": true,
            "chartConfig": {"title": "T", "xaxisLabel": "City", "yAxisLabel": "Premium"},
            "summary": {"totalRecords": 2, "total": 210.0}
        }"#;
        let resp: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.is_valid, Some(true));

        let config = resp.chart_config.unwrap();
        assert_eq!(config.x_axis_label.as_deref(), Some("City"));
        assert_eq!(config.y_axis_label.as_deref(), Some("Premium"));
        assert_eq!(resp.summary.unwrap().total_records, Some(2));
    }

    #[test]
    fn test_history_page_decodes() {
        let raw = r#"{
            "content": [{"conversationId": "a", "title": "cities"}],
            "totalElements": 1, "totalPages": 1, "number": 0, "size": 20
        }"#;
        let page: HistoryPage = serde_json::from_str(raw).unwrap();
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.content[0].conversation_id, "a");
        assert_eq!(page.size, 20);
    }

    #[test]
    fn test_conversation_messages_decode() {
        let raw = r#"[
            {"messageType": "USER", "text": "premiums by city", "metadata": {"messageType": "USER"}},
            {"messageType": "ASSISTANT", "content": "{\"visualizationType\":\"pie\"}"},
            {"media": []}
        ]"#;
        let messages: Vec<ConversationMessage> = serde_json::from_str(raw).unwrap();

        assert!(messages[0].is_user());
        assert_eq!(messages[0].body(), "premiums by city");
        assert!(!messages[1].is_user());
        assert_eq!(messages[1].body(), r#"{"visualizationType":"pie"}"#);
        assert_eq!(messages[2].body(), "");
    }
}
