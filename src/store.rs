//! Worksheet store boundary
//!
//! One conceptual table per worksheet: header row at row 1, records below,
//! appended in insertion order. `SheetStore` is the seam between the
//! application and the remote spreadsheet; the in-memory implementation
//! backs tests with the same semantics.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::StoreError;

/// In-memory tabular snapshot of one worksheet's rows.
///
/// Rows map column name → cell value. Cells past the header width are
/// dropped; cells missing from short rows read as empty strings, matching
/// how the spreadsheet API reports them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    pub headers: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
}

impl RecordSet {
    /// Build from raw worksheet values (row 1 = headers).
    pub fn from_values(values: Vec<Vec<String>>) -> Self {
        let mut iter = values.into_iter();
        let headers: Vec<String> = iter.next().unwrap_or_default();

        let rows = iter
            .map(|row| {
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| (h.clone(), row.get(i).cloned().unwrap_or_default()))
                    .collect()
            })
            .collect();

        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column across all rows, empty string where absent.
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.rows
            .iter()
            .map(move |row| row.get(name).map(String::as_str).unwrap_or(""))
    }
}

/// Operations the backing worksheet store must support.
///
/// Mirrors the remote API surface: get header row, get all records, append
/// a row, update a single cell, create a worksheet with capacity.
#[async_trait]
pub trait SheetStore: Send + Sync {
    async fn worksheet_titles(&self) -> Result<Vec<String>, StoreError>;

    async fn header_row(&self, table: &str) -> Result<Vec<String>, StoreError>;

    async fn records(&self, table: &str) -> Result<RecordSet, StoreError>;

    async fn append_row(&self, table: &str, row: &[String]) -> Result<(), StoreError>;

    /// Update a single cell; row and column are 1-based.
    async fn update_cell(
        &self,
        table: &str,
        row: u32,
        col: u32,
        value: &str,
    ) -> Result<(), StoreError>;

    async fn create_worksheet(&self, table: &str, rows: u32, cols: u32)
        -> Result<(), StoreError>;
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;

    #[test]
    fn test_record_set_from_values() {
        let rs = RecordSet::from_values(vec![
            vec!["Name".into(), "Company".into()],
            vec!["Ada".into(), "Initech".into()],
            vec!["Grace".into()],
        ]);

        assert_eq!(rs.len(), 2);
        assert_eq!(rs.rows[0]["Name"], "Ada");
        assert_eq!(rs.rows[0]["Company"], "Initech");
        // Short rows read as empty strings
        assert_eq!(rs.rows[1]["Company"], "");
    }

    #[test]
    fn test_record_set_empty_worksheet() {
        let rs = RecordSet::from_values(vec![]);
        assert!(rs.is_empty());
        assert!(rs.headers.is_empty());
    }

    #[test]
    fn test_record_set_column() {
        let rs = RecordSet::from_values(vec![
            vec!["Amount".into()],
            vec!["$10.00".into()],
            vec!["20".into()],
        ]);
        let amounts: Vec<&str> = rs.column("Amount").collect();
        assert_eq!(amounts, vec!["$10.00", "20"]);
    }

    #[tokio::test]
    async fn test_memory_store_append_and_read() {
        let store = MemoryStore::new();
        store.seed("Expenses", vec![vec!["Category", "Amount"]]);

        store
            .append_row("Expenses", &["Travel".into(), "$10.00".into()])
            .await
            .unwrap();

        let rs = store.records("Expenses").await.unwrap();
        assert_eq!(rs.len(), 1);
        assert_eq!(rs.rows[0]["Category"], "Travel");
    }

    #[tokio::test]
    async fn test_memory_store_update_cell_extends_grid() {
        let store = MemoryStore::new();
        store.seed("Hours", vec![vec!["Employee", "Date"]]);

        store.update_cell("Hours", 1, 4, "Task").await.unwrap();

        let values = store.dump("Hours").unwrap();
        assert_eq!(values[0], vec!["Employee", "Date", "", "Task"]);
    }

    #[tokio::test]
    async fn test_memory_store_missing_worksheet() {
        let store = MemoryStore::new();
        let err = store.records("Nope").await.unwrap_err();
        assert!(matches!(err, StoreError::WorksheetNotFound(_)));
    }

    #[tokio::test]
    async fn test_memory_store_duplicate_worksheet_rejected() {
        let store = MemoryStore::new();
        store.create_worksheet("Hours", 100, 20).await.unwrap();
        assert!(store.create_worksheet("Hours", 100, 20).await.is_err());
    }
}
