//! Query session
//!
//! One session owns everything the user sees: the current chart or table,
//! the local history of distinct questions, and pending notifications.
//!
//! States: `Idle → Loading → {Rendered | Errored}`; "new session" returns to
//! `Idle`. Every request is tagged with a sequence number when it starts and
//! only the most recently started request may change the display, so a slow
//! answer can never overwrite a newer one.

use crate::chat::{ChatBackend, ChatError, ChatRequest, ChatResponse, DataSummary};
use crate::config::{ClientConfig, HistoryRetention};
use crate::pipeline::{self, RenderMode, View};
use crate::viz::{ColorGenerator, SeriesLabels};
use serde::Serialize;
use std::fmt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// History entries longer than this are shortened in listings
pub const HISTORY_LABEL_MAX_CHARS: usize = 50;

const INVALID_QUERY_TEXT: &str = "The question you entered could not be answered. :(";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Rendered(RenderMode),
    Errored,
}

/// Where a query came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOrigin {
    /// Typed by the user
    Fresh,
    /// Re-run from a history entry
    Replay,
}

/// A started request waiting for its answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    seq: u64,
    query: String,
    origin: QueryOrigin,
}

/// A distinct previously submitted question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub ordinal: u64,
    pub query: String,
}

impl HistoryEntry {
    /// Query text shortened to `HISTORY_LABEL_MAX_CHARS` characters
    pub fn label(&self) -> String {
        if self.query.chars().count() > HISTORY_LABEL_MAX_CHARS {
            let head: String = self.query.chars().take(HISTORY_LABEL_MAX_CHARS).collect();
            format!("{}...", head)
        } else {
            self.query.clone()
        }
    }
}

/// Transient user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The backend said the question could not be answered
    InvalidQuery { detail: String },
    /// The backend answered with data that cannot be drawn as requested
    MalformedResponse { detail: String },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::InvalidQuery { detail } if detail.is_empty() => {
                write!(f, "{}", INVALID_QUERY_TEXT)
            }
            Notification::InvalidQuery { detail } => {
                write!(f, "{} ({})", INVALID_QUERY_TEXT, detail)
            }
            Notification::MalformedResponse { detail } => {
                write!(f, "The answer could not be displayed: {}", detail)
            }
        }
    }
}

/// Result of applying one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The screen now shows a chart or table
    Rendered(RenderMode),
    /// Empty answer; display cleared
    NoContent,
    /// Backend error or undrawable answer; display cleared, notification queued
    Errored,
    /// Network or decode failure; display untouched
    TransportFailed,
    /// A newer request was started; this answer was dropped
    Stale,
    /// Nothing was sent (blank query or unknown history entry)
    Ignored,
}

/// Current chart/table content
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Screen {
    pub title: String,
    pub view: View,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DataSummary>,
}

impl Screen {
    pub fn clear(&mut self) {
        *self = Screen::default();
    }
}

/// Session settings taken from the client configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    pub history_retention: HistoryRetention,
    pub series_labels: SeriesLabels,
}

impl From<&ClientConfig> for SessionConfig {
    fn from(config: &ClientConfig) -> Self {
        SessionConfig {
            history_retention: config.history_retention,
            series_labels: config.series_labels,
        }
    }
}

pub struct QuerySession<B: ChatBackend> {
    backend: B,
    config: SessionConfig,
    colors: ColorGenerator,
    state: SessionState,
    screen: Screen,
    history: Vec<HistoryEntry>,
    /// Ordinal given to the next history entry; advances on every rendered
    /// fresh query, whether or not an entry was appended
    next_ordinal: u64,
    /// Sequence number of the most recently started request
    latest_seq: u64,
    conversation_id: Option<String>,
    notifications: Vec<Notification>,
    session_id: Uuid,
}

impl<B: ChatBackend> QuerySession<B> {
    pub fn new(backend: B, config: SessionConfig) -> Self {
        Self::with_colors(backend, config, ColorGenerator::new())
    }

    /// Session with an explicit color source
    pub fn with_colors(backend: B, config: SessionConfig, colors: ColorGenerator) -> Self {
        let session_id = Uuid::new_v4();
        info!(session = %session_id, "Session started");
        QuerySession {
            backend,
            config,
            colors,
            state: SessionState::Idle,
            screen: Screen::default(),
            history: Vec::new(),
            next_ordinal: 1,
            latest_seq: 0,
            conversation_id: None,
            notifications: Vec::new(),
            session_id,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Loading
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn next_ordinal(&self) -> u64 {
        self.next_ordinal
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Drain queued notifications
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Submit a typed question and apply its answer
    pub async fn submit(&mut self, query: &str) -> Outcome {
        match self.begin(query, QueryOrigin::Fresh) {
            Some(pending) => self.dispatch(pending).await,
            None => Outcome::Ignored,
        }
    }

    /// Re-run the history entry with `ordinal`
    ///
    /// Replays never add history entries and never advance the ordinal.
    pub async fn replay(&mut self, ordinal: u64) -> Outcome {
        let Some(query) = self
            .history
            .iter()
            .find(|e| e.ordinal == ordinal)
            .map(|e| e.query.clone())
        else {
            warn!(ordinal, "No history entry with this ordinal");
            return Outcome::Ignored;
        };

        match self.begin(&query, QueryOrigin::Replay) {
            Some(pending) => self.dispatch(pending).await,
            None => Outcome::Ignored,
        }
    }

    /// Start a request: trims `query`, returns None (and stays put) when blank
    pub fn begin(&mut self, query: &str, origin: QueryOrigin) -> Option<PendingQuery> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        self.latest_seq += 1;
        self.state = SessionState::Loading;

        debug!(seq = self.latest_seq, origin = ?origin, query, "Request started");
        Some(PendingQuery {
            seq: self.latest_seq,
            query: query.to_string(),
            origin,
        })
    }

    /// Build the wire request for a started query
    pub fn request_for(&self, pending: &PendingQuery) -> ChatRequest {
        ChatRequest::new(pending.query.clone()).with_conversation(self.conversation_id.clone())
    }

    /// Apply the answer (or failure) of a started request
    pub fn complete(
        &mut self,
        pending: PendingQuery,
        result: Result<ChatResponse, ChatError>,
    ) -> Outcome {
        if pending.seq != self.latest_seq {
            debug!(
                seq = pending.seq,
                latest = self.latest_seq,
                "Dropping answer to superseded request"
            );
            return Outcome::Stale;
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                error!(query = %pending.query, error = %e, "Error fetching data");
                self.state = self.resting_state();
                return Outcome::TransportFailed;
            }
        };

        if let Some(message) = response.error_message.as_ref() {
            info!(query = %pending.query, error = %message, "Backend rejected the question");
            self.screen.clear();
            self.notifications.push(Notification::InvalidQuery {
                detail: message.clone(),
            });
            self.state = SessionState::Errored;
            return Outcome::Errored;
        }

        if let Some(id) = response.conversation_id.as_ref() {
            self.conversation_id = Some(id.clone());
        }

        if response.is_valid == Some(false) {
            warn!(query = %pending.query, "Backend flagged the answer as not valid");
        }

        if response.rows().is_empty() {
            debug!(query = %pending.query, "Empty answer");
            self.screen.clear();
            self.state = SessionState::Idle;
            return Outcome::NoContent;
        }

        let labels = match pending.origin {
            QueryOrigin::Fresh => self.config.series_labels,
            QueryOrigin::Replay => SeriesLabels::Numbered,
        };

        let view = match pipeline::render(&response, labels, &mut self.colors) {
            Ok(view) => view,
            Err(e) => {
                warn!(query = %pending.query, error = %e, "Answer cannot be drawn");
                self.screen.clear();
                self.notifications.push(Notification::MalformedResponse {
                    detail: e.to_string(),
                });
                self.state = SessionState::Errored;
                return Outcome::Errored;
            }
        };

        let Some(mode) = view.mode() else {
            self.screen.clear();
            self.state = SessionState::Idle;
            return Outcome::NoContent;
        };

        self.screen = Screen {
            title: response.title().to_string(),
            view,
            explanation: response.explanation.clone(),
            summary: response.summary.clone(),
        };

        if pending.origin == QueryOrigin::Fresh {
            self.record_history(&pending.query);
        }

        info!(
            query = %pending.query,
            mode = ?mode,
            rows = response.rows().len(),
            "Answer rendered"
        );
        self.state = SessionState::Rendered(mode);
        Outcome::Rendered(mode)
    }

    /// Clear the display and start over
    ///
    /// Requests still in flight are superseded. History is kept or cleared
    /// according to `HistoryRetention`.
    pub fn new_session(&mut self) {
        self.latest_seq += 1;
        self.screen.clear();
        self.state = SessionState::Idle;
        self.conversation_id = None;
        self.session_id = Uuid::new_v4();

        if self.config.history_retention == HistoryRetention::Clear {
            self.history.clear();
        }

        info!(
            session = %self.session_id,
            history = self.history.len(),
            "New session"
        );
    }

    /// Continue a server-side conversation
    ///
    /// Later questions are sent with `conversation_id`. The screen is cleared
    /// and requests still in flight are superseded; local history is kept.
    /// A blank id is ignored and returns false.
    pub fn resume(&mut self, conversation_id: &str) -> bool {
        let conversation_id = conversation_id.trim();
        if conversation_id.is_empty() {
            return false;
        }

        self.latest_seq += 1;
        self.screen.clear();
        self.state = SessionState::Idle;
        self.conversation_id = Some(conversation_id.to_string());

        info!(session = %self.session_id, conversation = conversation_id, "Conversation resumed");
        true
    }

    async fn dispatch(&mut self, pending: PendingQuery) -> Outcome {
        let request = self.request_for(&pending);
        let result = self.backend.send_message(&request).await;
        self.complete(pending, result)
    }

    fn record_history(&mut self, query: &str) {
        if !self.history.iter().any(|e| e.query == query) {
            self.history.push(HistoryEntry {
                ordinal: self.next_ordinal,
                query: query.to_string(),
            });
        }
        self.next_ordinal += 1;
    }

    /// State implied by the current display, used when a request ends
    /// without changing it
    fn resting_state(&self) -> SessionState {
        match self.screen.view.mode() {
            Some(mode) => SessionState::Rendered(mode),
            None => SessionState::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Backend that answers from a script and records what it was asked
    #[derive(Default)]
    struct ScriptedBackend {
        answers: Mutex<VecDeque<Result<ChatResponse, ChatError>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedBackend {
        fn with(answers: Vec<Result<ChatResponse, ChatError>>) -> Self {
            ScriptedBackend {
                answers: Mutex::new(answers.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn send_message(&self, request: &ChatRequest) -> crate::chat::Result<ChatResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ChatResponse::default()))
        }
    }

    fn answer(value: serde_json::Value) -> Result<ChatResponse, ChatError> {
        Ok(serde_json::from_value(value).unwrap())
    }

    fn pie_answer() -> Result<ChatResponse, ChatError> {
        answer(json!({
            "visualizationType": "pie",
            "data": [
                {"city": "Zagreb", "year": 2020, "premium": 120},
                {"city": "Split", "year": 2020, "premium": 90}
            ],
            "chartConfig": {"title": "Premiums"},
            "errorMessage": null
        }))
    }

    fn line_answer() -> Result<ChatResponse, ChatError> {
        answer(json!({
            "visualizationType": "line",
            "data": [{"month": "Jan", "claims": 4}, {"month": "Feb", "claims": 6}],
            "chartConfig": {"title": "Claims"}
        }))
    }

    fn session(answers: Vec<Result<ChatResponse, ChatError>>) -> QuerySession<ScriptedBackend> {
        QuerySession::with_colors(
            ScriptedBackend::with(answers),
            SessionConfig::default(),
            ColorGenerator::with_seed(11),
        )
    }

    fn transport_error() -> ChatError {
        ChatError::Http {
            status: 502,
            body: "bad gateway".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_renders_and_records_history() {
        let mut s = session(vec![pie_answer()]);

        let outcome = s.submit("  premiums by city  ").await;

        assert_eq!(outcome, Outcome::Rendered(RenderMode::Pie));
        assert_eq!(s.state(), SessionState::Rendered(RenderMode::Pie));
        assert_eq!(s.screen().title, "Premiums");
        assert!(s.screen().view.has_content());
        assert_eq!(
            s.history(),
            [HistoryEntry {
                ordinal: 1,
                query: "premiums by city".to_string()
            }]
        );
        assert_eq!(s.next_ordinal(), 2);
        assert_eq!(s.backend().requests()[0].message, "premiums by city");
    }

    #[tokio::test]
    async fn test_blank_query_is_ignored() {
        let mut s = session(vec![]);
        assert_eq!(s.submit("   ").await, Outcome::Ignored);
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.backend().requests().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_query_adds_one_entry_but_advances_ordinal() {
        let mut s = session(vec![pie_answer(), pie_answer()]);

        s.submit("premiums by city").await;
        s.submit("premiums by city").await;

        assert_eq!(s.history().len(), 1);
        assert_eq!(s.next_ordinal(), 3);

        // Dedup is exact and case-sensitive
        let mut s = session(vec![pie_answer(), pie_answer()]);
        s.submit("premiums").await;
        s.submit("Premiums").await;
        let ordinals: Vec<u64> = s.history().iter().map(|e| e.ordinal).collect();
        assert_eq!(ordinals, [1, 2]);
    }

    #[tokio::test]
    async fn test_backend_error_clears_and_notifies() {
        let mut s = session(vec![
            pie_answer(),
            answer(json!({"errorMessage": "bad query", "data": [{"a": 1, "b": 2}]})),
        ]);

        s.submit("premiums by city").await;
        let outcome = s.submit("gibberish").await;

        assert_eq!(outcome, Outcome::Errored);
        assert_eq!(s.state(), SessionState::Errored);
        assert_eq!(s.screen(), &Screen::default());
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.next_ordinal(), 2);

        let notes = s.take_notifications();
        assert_eq!(
            notes,
            [Notification::InvalidQuery {
                detail: "bad query".to_string()
            }]
        );
        assert!(notes[0].to_string().contains("bad query"));
        assert!(s.take_notifications().is_empty());
    }

    #[tokio::test]
    async fn test_empty_answer_renders_nothing_and_skips_history() {
        let mut s = session(vec![
            pie_answer(),
            answer(json!({"visualizationType": "bar", "data": []})),
        ]);

        s.submit("premiums by city").await;
        let outcome = s.submit("claims in 1850").await;

        assert_eq!(outcome, Outcome::NoContent);
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.screen().view, View::Nothing);
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.next_ordinal(), 2);
        assert!(s.take_notifications().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_display() {
        let mut s = session(vec![pie_answer(), Err(transport_error())]);

        s.submit("premiums by city").await;
        let before = s.screen().clone();
        let outcome = s.submit("departments").await;

        assert_eq!(outcome, Outcome::TransportFailed);
        assert!(!s.is_loading());
        assert_eq!(s.state(), SessionState::Rendered(RenderMode::Pie));
        assert_eq!(s.screen(), &before);
        assert!(s.take_notifications().is_empty());
        assert_eq!(s.history().len(), 1);

        // The session stays usable
        let mut s = session(vec![Err(transport_error()), pie_answer()]);
        assert_eq!(s.submit("x").await, Outcome::TransportFailed);
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(
            s.submit("premiums").await,
            Outcome::Rendered(RenderMode::Pie)
        );
    }

    #[tokio::test]
    async fn test_single_column_pie_is_reported() {
        let mut s = session(vec![answer(json!({
            "visualizationType": "pie",
            "data": [{"city": "Zagreb"}]
        }))]);

        assert_eq!(s.submit("cities").await, Outcome::Errored);
        assert_eq!(s.state(), SessionState::Errored);
        assert!(s.history().is_empty());
        assert!(matches!(
            s.take_notifications()[..],
            [Notification::MalformedResponse { .. }]
        ));
    }

    #[tokio::test]
    async fn test_replay_uses_numbered_labels_without_new_history() {
        let mut s = session(vec![line_answer(), line_answer(), line_answer()]);

        s.submit("claims per month").await;
        let crate::pipeline::View::Chart(chart) = &s.screen().view else {
            panic!("expected chart");
        };
        assert_eq!(chart.data.labels, [" ", " "]);

        for _ in 0..2 {
            assert_eq!(s.replay(1).await, Outcome::Rendered(RenderMode::Line));
            let crate::pipeline::View::Chart(chart) = &s.screen().view else {
                panic!("expected chart");
            };
            assert_eq!(chart.data.labels, ["Item 1", "Item 2"]);
        }

        assert_eq!(s.history().len(), 1);
        assert_eq!(s.next_ordinal(), 2);
        assert_eq!(s.backend().requests().len(), 3);
        assert_eq!(s.backend().requests()[2].message, "claims per month");
    }

    #[tokio::test]
    async fn test_replay_unknown_ordinal() {
        let mut s = session(vec![]);
        assert_eq!(s.replay(7).await, Outcome::Ignored);
        assert!(s.backend().requests().is_empty());
    }

    #[test]
    fn test_only_latest_request_is_applied() {
        let mut s = session(vec![]);

        let older = s.begin("premiums by city", QueryOrigin::Fresh).unwrap();
        let newer = s.begin("claims per month", QueryOrigin::Fresh).unwrap();
        assert!(newer.seq > older.seq);

        // The newer answer arrives first
        assert_eq!(
            s.complete(newer, line_answer()),
            Outcome::Rendered(RenderMode::Line)
        );
        assert_eq!(s.complete(older, pie_answer()), Outcome::Stale);

        assert_eq!(s.state(), SessionState::Rendered(RenderMode::Line));
        assert_eq!(s.screen().title, "Claims");
        let queries: Vec<&str> = s.history().iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, ["claims per month"]);
    }

    #[tokio::test]
    async fn test_new_session_keeps_history_by_default() {
        let mut s = session(vec![pie_answer()]);
        s.submit("premiums by city").await;

        let first_id = s.session_id();
        s.new_session();

        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.screen(), &Screen::default());
        assert_eq!(s.history().len(), 1);
        assert_ne!(s.session_id(), first_id);
    }

    #[tokio::test]
    async fn test_new_session_can_clear_history() {
        let config = SessionConfig {
            history_retention: HistoryRetention::Clear,
            ..Default::default()
        };
        let mut s = QuerySession::with_colors(
            ScriptedBackend::with(vec![pie_answer()]),
            config,
            ColorGenerator::with_seed(1),
        );
        s.submit("premiums by city").await;
        s.new_session();

        assert!(s.history().is_empty());
        // Ordinals stay monotonic across sessions
        assert_eq!(s.next_ordinal(), 2);
    }

    #[test]
    fn test_new_session_supersedes_in_flight_request() {
        let mut s = session(vec![]);
        let pending = s.begin("premiums by city", QueryOrigin::Fresh).unwrap();
        s.new_session();

        assert_eq!(s.complete(pending, pie_answer()), Outcome::Stale);
        assert_eq!(s.screen().view, View::Nothing);
    }

    #[tokio::test]
    async fn test_conversation_id_is_carried_forward() {
        let mut s = session(vec![
            answer(json!({
                "visualizationType": "table",
                "data": [{"city": "Zagreb"}],
                "conversationId": "conv-1"
            })),
            pie_answer(),
        ]);

        s.submit("cities").await;
        s.submit("premiums by city").await;

        let requests = s.backend().requests();
        assert_eq!(requests[0].conversation_id, None);
        assert_eq!(requests[1].conversation_id.as_deref(), Some("conv-1"));

        s.new_session();
        assert_eq!(s.conversation_id(), None);
    }

    #[test]
    fn test_history_label_truncation() {
        let short = HistoryEntry {
            ordinal: 1,
            query: "premiums by city".to_string(),
        };
        assert_eq!(short.label(), "premiums by city");

        let long = HistoryEntry {
            ordinal: 2,
            query: "č".repeat(60),
        };
        assert_eq!(long.label(), format!("{}...", "č".repeat(50)));
    }

    #[tokio::test]
    async fn test_resume_continues_server_conversation() {
        let mut s = session(vec![pie_answer()]);
        let pending = s.begin("claims per month", QueryOrigin::Fresh).unwrap();

        assert!(!s.resume("   "));
        assert!(s.resume(" conv-7 "));
        assert_eq!(s.conversation_id(), Some("conv-7"));
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.complete(pending, line_answer()), Outcome::Stale);

        s.submit("premiums by city").await;
        assert_eq!(
            s.backend().requests()[0].conversation_id.as_deref(),
            Some("conv-7")
        );
        assert_eq!(s.history().len(), 1);
    }

    #[tokio::test]
    async fn test_answer_flagged_invalid_still_renders() {
        let mut s = session(vec![answer(json!({
            "visualizationType": "table",
            "data": [{"city": "Zagreb"}],
            "isValid": false
        }))]);

        assert_eq!(s.submit("cities").await, Outcome::Rendered(RenderMode::Table));
        assert!(s.take_notifications().is_empty());
    }
}
