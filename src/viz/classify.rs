//! Column type classification
//!
//! A column is numeric when its value in the *first* row is a JSON number.
//! Later rows are not re-checked: columns are assumed homogeneous.

use super::columns::ColumnInventory;
use crate::chat::Row;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Classify `column` by the runtime kind of its value in `first_row`
///
/// A column absent from the first row is categorical.
pub fn classify(column: &str, first_row: &Row) -> ColumnKind {
    match first_row.get(column) {
        Some(Value::Number(_)) => ColumnKind::Numeric,
        _ => ColumnKind::Categorical,
    }
}

/// Numeric columns in inventory order
pub fn numeric_columns<'a>(columns: &'a ColumnInventory, first_row: &Row) -> Vec<&'a str> {
    columns
        .iter()
        .filter(|c| classify(c, first_row) == ColumnKind::Numeric)
        .collect()
}
