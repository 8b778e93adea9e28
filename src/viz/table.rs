//! Table fallback
//!
//! Identity path for explicit table answers and for any visualization tag
//! the client does not recognise: rows pass through untouched, with the
//! column inventory for the header. No coercion, no colors.

use super::coerce::to_label;
use super::columns::ColumnInventory;
use crate::chat::Row;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableView {
    pub columns: ColumnInventory,
    pub rows: Vec<Row>,
}

impl TableView {
    /// Header names
    pub fn header(&self) -> &[String] {
        self.columns.as_slice()
    }

    /// Display text of every cell, row by row, in header order
    pub fn cells(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| self.columns.iter().map(|c| to_label(row.get(c))).collect())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Wrap `rows` for table rendering
pub fn adapt_table(rows: &[Row]) -> TableView {
    TableView {
        columns: ColumnInventory::from_rows(rows).unwrap_or_default(),
        rows: rows.to_vec(),
    }
}
