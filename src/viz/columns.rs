use crate::chat::Row;
use serde::Serialize;

/// Ordered field names of an answer, taken once from its first row
///
/// All rows of one answer share the same column set, so the inventory is
/// never re-derived per row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnInventory(Vec<String>);

impl ColumnInventory {
    /// Field names of `row`, in the order the row stores them
    pub fn from_row(row: &Row) -> Self {
        ColumnInventory(row.keys().cloned().collect())
    }

    /// Inventory of the first row, None for an empty answer
    pub fn from_rows(rows: &[Row]) -> Option<Self> {
        rows.first().map(Self::from_row)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}
