//! Shared response-to-view pipeline
//!
//! This module contains the adapter flow that is shared between the
//! interactive client (session.rs) and the offline dev entry point.
//!
//! The pipeline:
//! 1. Parses the visualization tag and selects a render plan
//! 2. Derives the column inventory from the first row
//! 3. Runs the pie, series or table adapter
//! 4. Returns a view for the presentation layer

use crate::chat::ChatResponse;
use crate::viz::{
    adapt_pie, adapt_series, adapt_table, ChartData, ChartKind, ChartOptions, ColorGenerator,
    ColumnInventory, RenderPlan, SeriesLabels, TableView, VisualizationKind, VizError,
};
use serde::Serialize;
use tracing::debug;

/// Resolved rendering mode of a non-empty answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Pie,
    Line,
    Bar,
    Table,
}

impl From<ChartKind> for RenderMode {
    fn from(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Pie => RenderMode::Pie,
            ChartKind::Line => RenderMode::Line,
            ChartKind::Bar => RenderMode::Bar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: ChartOptions,
}

/// What the presentation layer should show for one answer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum View {
    /// Empty answer (or a cleared display)
    #[default]
    Nothing,
    Chart(ChartView),
    Table(TableView),
}

impl View {
    pub fn mode(&self) -> Option<RenderMode> {
        match self {
            View::Nothing => None,
            View::Chart(chart) => Some(chart.kind.into()),
            View::Table(_) => Some(RenderMode::Table),
        }
    }

    /// False when there is nothing to draw, including a line/bar chart
    /// without numeric series and an empty table
    pub fn has_content(&self) -> bool {
        match self {
            View::Nothing => false,
            View::Chart(chart) => !chart.data.is_empty(),
            View::Table(table) => !table.is_empty(),
        }
    }
}

/// Run the adapter for one answer
///
/// The error message of the answer is not looked at here; callers handle
/// backend-signalled errors before rendering.
///
/// # Arguments
/// * `response` - Decoded backend answer
/// * `labels` - Category label style for line/bar charts
/// * `colors` - Color source for pie segments and series
///
/// # Errors
/// `VizError::TooFewColumns` for a pie answer with fewer than two columns.
pub fn render(
    response: &ChatResponse,
    labels: SeriesLabels,
    colors: &mut ColorGenerator,
) -> Result<View, VizError> {
    let rows = response.rows();
    let kind = VisualizationKind::parse(response.visualization_type.as_deref());
    let plan = RenderPlan::select(&kind, rows);

    debug!(kind = %kind, plan = ?plan, rows = rows.len(), "Selected render plan");

    let chart_kind: ChartKind = match plan {
        RenderPlan::NoContent => return Ok(View::Nothing),
        RenderPlan::Table => return Ok(View::Table(adapt_table(rows))),
        RenderPlan::Pie => ChartKind::Pie,
        RenderPlan::Series(series) => series.into(),
    };

    let Some(columns) = ColumnInventory::from_rows(rows) else {
        return Ok(View::Nothing);
    };

    let data = match chart_kind {
        ChartKind::Pie => adapt_pie(rows, &columns, colors)?,
        ChartKind::Line | ChartKind::Bar => adapt_series(rows, &columns, labels, colors),
    };

    debug!(
        columns = columns.len(),
        datasets = data.datasets.len(),
        labels = data.labels.len(),
        "Chart data built"
    );

    let options = ChartOptions::for_chart(chart_kind, response.title(), response.chart_config.as_ref());

    Ok(View::Chart(ChartView {
        kind: chart_kind,
        data,
        options,
    }))
}
