//! Line/bar chart adapter
//!
//! Every column whose first-row value is numeric becomes one series. Rows
//! become synthetic category positions; categorical columns (usually the
//! label column) are left out because they are not numeric, not by name.

use super::chart::{ChartData, ChartDataset, ColorValue};
use super::classify::numeric_columns;
use super::coerce::to_number;
use super::colors::ColorGenerator;
use super::columns::ColumnInventory;
use crate::chat::Row;

/// Smoothing coefficient for line rendering
pub const LINE_TENSION: f64 = 0.3;

/// Category label used for every row in `SeriesLabels::Blank` mode
pub const BLANK_LABEL: &str = " ";

/// How rows are labelled on the category axis
///
/// One style applies to every label of an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeriesLabels {
    /// All labels blank
    #[default]
    Blank,
    /// "Item 1", "Item 2", ...
    Numbered,
}

impl SeriesLabels {
    /// Parse from string value ("numbered" or anything else → Blank)
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "numbered" => Self::Numbered,
            _ => Self::Blank,
        }
    }

    /// Label for the row at zero-based `index`
    pub fn label(&self, index: usize) -> String {
        match self {
            SeriesLabels::Blank => BLANK_LABEL.to_string(),
            SeriesLabels::Numbered => format!("Item {}", index + 1),
        }
    }
}

/// Build line/bar data: one series per numeric column
///
/// Each series gets its own background and border color (two colors per
/// series), `fill = false` and `tension = LINE_TENSION`. An answer without
/// numeric columns yields no datasets, which callers treat as nothing to draw.
pub fn adapt_series(
    rows: &[Row],
    columns: &ColumnInventory,
    labels: SeriesLabels,
    colors: &mut ColorGenerator,
) -> ChartData {
    let Some(first_row) = rows.first() else {
        return ChartData::default();
    };

    let datasets = numeric_columns(columns, first_row)
        .into_iter()
        .map(|column| ChartDataset {
            label: column.to_string(),
            data: rows.iter().map(|r| to_number(r.get(column))).collect(),
            background_color: Some(ColorValue::Single(colors.next_color())),
            border_color: Some(colors.next_color()),
            fill: Some(false),
            tension: Some(LINE_TENSION),
        })
        .collect();

    ChartData {
        labels: (0..rows.len()).map(|i| labels.label(i)).collect(),
        datasets,
    }
}
