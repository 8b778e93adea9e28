//! Client configuration from environment variables
//!
//! Every setting has an explicit default. Invalid values are reported with a
//! warning and replaced by the default, so a typo in the environment never
//! prevents the client from starting.
//!
//! | Variable                    | Default                 |
//! |-----------------------------|-------------------------|
//! | `CHATVIZ_API_URL`           | `http://localhost:8080` |
//! | `CHATVIZ_MESSAGE_PATH`      | `/api/v1/chat/message`  |
//! | `CHATVIZ_TIMEOUT_SECS`      | `30` (1-600)            |
//! | `CHATVIZ_HISTORY_RETENTION` | `keep` (`keep`/`clear`) |
//! | `CHATVIZ_SERIES_LABELS`     | `blank` (`blank`/`numbered`) |

use crate::viz::SeriesLabels;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Current chat endpoint
pub const MESSAGE_PATH: &str = "/api/v1/chat/message";

/// Endpoint used by earlier backend revisions
pub const LEGACY_MESSAGE_PATH: &str = "/api/v1/chat";

pub const HISTORY_PATH: &str = "/api/v1/chat/history";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("API URL must start with http:// or https://, got '{0}'")]
    InvalidUrl(String),

    #[error("Endpoint path must start with '/', got '{0}'")]
    InvalidPath(String),
}

/// What happens to the local query history when a new session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryRetention {
    /// History survives "new session"; only the display is reset
    #[default]
    Keep,
    /// "New session" also empties the history list
    Clear,
}

impl HistoryRetention {
    /// Parse from string value ("clear" or anything else → Keep)
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "clear" => Self::Clear,
            _ => Self::Keep,
        }
    }
}

/// Reads `CHATVIZ_*` settings with type-safe conversions and explicit defaults
pub struct EnvReader {
    values: HashMap<String, String>,
}

impl EnvReader {
    /// Snapshot the process environment
    pub fn from_env() -> Self {
        let values: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with("CHATVIZ_"))
            .collect();
        debug!(settings = values.len(), "Read CHATVIZ_* environment");
        Self { values }
    }

    /// Build from explicit key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Raw value (None if not set or empty)
    fn get_raw(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn get_string(&self, name: &str, default: &str) -> String {
        self.get_raw(name).unwrap_or(default).to_string()
    }

    /// Integer in `[min, max]`, default otherwise
    pub fn get_u64_in_range(&self, name: &str, default: u64, min: u64, max: u64) -> u64 {
        let Some(raw) = self.get_raw(name) else {
            return default;
        };
        match raw.parse::<u64>() {
            Ok(v) if (min..=max).contains(&v) => v,
            Ok(v) => {
                warn!(
                    setting = name,
                    value = v,
                    min,
                    max,
                    default,
                    "Value out of range, using default"
                );
                default
            }
            Err(_) => {
                warn!(setting = name, value = raw, default, "Invalid integer, using default");
                default
            }
        }
    }

    /// One of `allowed` (case-insensitive), default otherwise
    pub fn get_enum(&self, name: &str, allowed: &[&str], default: &str) -> String {
        match self.get_raw(name) {
            Some(v) if allowed.iter().any(|a| a.eq_ignore_ascii_case(v)) => v.to_lowercase(),
            Some(v) => {
                warn!(
                    setting = name,
                    value = v,
                    allowed = ?allowed,
                    default,
                    "Invalid value, using default"
                );
                default.to_string()
            }
            None => default.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `http://localhost:8080`
    pub api_url: String,

    /// Path of the chat endpoint, appended to `api_url`
    pub message_path: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Whether "new session" clears the local history
    pub history_retention: HistoryRetention,

    /// Category labels for line/bar charts on a fresh query
    /// (history replays always number their items)
    pub series_labels: SeriesLabels,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            message_path: MESSAGE_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            history_retention: HistoryRetention::Keep,
            series_labels: SeriesLabels::Blank,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_reader(&EnvReader::from_env())
    }

    pub fn from_reader(props: &EnvReader) -> Self {
        let api_url = props.get_string("CHATVIZ_API_URL", DEFAULT_API_URL);
        let message_path = props.get_string("CHATVIZ_MESSAGE_PATH", MESSAGE_PATH);

        let timeout_secs =
            props.get_u64_in_range("CHATVIZ_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS, 1, 600);

        let history_retention = HistoryRetention::parse(&props.get_enum(
            "CHATVIZ_HISTORY_RETENTION",
            &["keep", "clear"],
            "keep",
        ));

        let series_labels = SeriesLabels::parse(&props.get_enum(
            "CHATVIZ_SERIES_LABELS",
            &["blank", "numbered"],
            "blank",
        ));

        Self {
            api_url,
            message_path,
            timeout: Duration::from_secs(timeout_secs),
            history_retention,
            series_labels,
        }
    }

    /// Switch to the endpoint path of earlier backend revisions
    pub fn use_legacy_endpoint(mut self) -> Self {
        self.message_path = LEGACY_MESSAGE_PATH.to_string();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.api_url.clone()));
        }
        if !self.message_path.starts_with('/') {
            return Err(ConfigError::InvalidPath(self.message_path.clone()));
        }
        Ok(())
    }

    pub fn message_url(&self) -> String {
        join_url(&self.api_url, &self.message_path)
    }

    pub fn history_url(&self) -> String {
        join_url(&self.api_url, HISTORY_PATH)
    }
}

/// Join a base URL and an absolute path without doubling the slash
fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
