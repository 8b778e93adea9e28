//! chatviz library
//!
//! Client side of a natural-language data chat: the HTTP boundary to the
//! backend, the adapters that turn tabular answers into chart-ready
//! structures, and the query session that ties them together.
//!
//! Module organization:
//! - `chat`: request/response models and the HTTP client
//! - `viz`: column inventory, coercion, colors, pie/series/table adapters
//! - `pipeline`: response-to-view flow shared by both binaries
//! - `session`: query session state machine and local history
//! - `config`: client configuration

pub mod chat;
pub mod config;
pub mod pipeline;
pub mod session;
pub mod viz;
