//! Visualization selection
//!
//! The backend's visualization vocabulary is open-ended. Selection is total:
//! every (kind, rows) pair resolves to exactly one plan, and unknown kinds
//! degrade to a table instead of failing.

use crate::chat::Row;
use std::fmt;

/// Visualization requested by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualizationKind {
    Pie,
    Line,
    Bar,
    /// Any other tag, including "table", "scatter" and an absent tag
    Other(String),
}

impl VisualizationKind {
    /// Parse the backend tag (exact match; the backend emits lowercase)
    pub fn parse(tag: Option<&str>) -> Self {
        match tag {
            Some("pie") => Self::Pie,
            Some("line") => Self::Line,
            Some("bar") => Self::Bar,
            Some(other) => Self::Other(other.to_string()),
            None => Self::Other(String::new()),
        }
    }
}

impl fmt::Display for VisualizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pie => write!(f, "pie"),
            Self::Line => write!(f, "line"),
            Self::Bar => write!(f, "bar"),
            Self::Other(tag) if tag.is_empty() => write!(f, "<none>"),
            Self::Other(tag) => write!(f, "{}", tag),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Line,
    Bar,
}

/// Rendering mode resolved for one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPlan {
    /// Empty answer: render nothing, run no adapter
    NoContent,
    Pie,
    Series(SeriesKind),
    Table,
}

impl RenderPlan {
    /// Resolve the plan for `kind` and `rows`
    ///
    /// Empty rows short-circuit before any adapter can look at `rows[0]`.
    pub fn select(kind: &VisualizationKind, rows: &[Row]) -> Self {
        if rows.is_empty() {
            return RenderPlan::NoContent;
        }
        match kind {
            VisualizationKind::Pie => RenderPlan::Pie,
            VisualizationKind::Line => RenderPlan::Series(SeriesKind::Line),
            VisualizationKind::Bar => RenderPlan::Series(SeriesKind::Bar),
            VisualizationKind::Other(_) => RenderPlan::Table,
        }
    }
}
