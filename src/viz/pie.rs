//! Pie chart adapter
//!
//! Column roles are positional: the first column labels each slice, the value
//! comes from the third column when the row has a non-null one there and from
//! the second column otherwise.

use super::chart::{ChartData, ChartDataset, ColorValue};
use super::coerce::{to_label, to_number};
use super::colors::ColorGenerator;
use super::columns::ColumnInventory;
use super::error::{Result, VizError};
use crate::chat::Row;

/// Name of the single pie dataset
pub const PIE_DATASET_LABEL: &str = "Data";

/// Build pie data: one label, one value and one color per row
///
/// # Errors
/// `VizError::TooFewColumns` when the answer has fewer than two columns;
/// a single column cannot supply both a label and a value.
pub fn adapt_pie(
    rows: &[Row],
    columns: &ColumnInventory,
    colors: &mut ColorGenerator,
) -> Result<ChartData> {
    let (Some(label_col), Some(value_col)) = (columns.get(0), columns.get(1)) else {
        return Err(VizError::TooFewColumns {
            chart: "pie",
            needed: 2,
            found: columns.len(),
        });
    };
    let preferred_col = columns.get(2);

    let labels: Vec<String> = rows.iter().map(|r| to_label(r.get(label_col))).collect();

    let values: Vec<f64> = rows
        .iter()
        .map(|r| {
            let preferred = preferred_col
                .and_then(|c| r.get(c))
                .filter(|v| !v.is_null());
            to_number(preferred.or_else(|| r.get(value_col)))
        })
        .collect();

    let background = colors.colors(labels.len());

    Ok(ChartData {
        labels,
        datasets: vec![ChartDataset {
            label: PIE_DATASET_LABEL.to_string(),
            data: values,
            background_color: Some(ColorValue::PerLabel(background)),
            border_color: None,
            fill: None,
            tension: None,
        }],
    })
}
