//! Startup schema reconciliation
//!
//! Ensures every table's worksheet exists with at least its canonical
//! header row, and appends any missing headers as new columns. Existing
//! columns and data are never moved or removed, so running this twice in a
//! row changes nothing.

use crate::error::StoreError;
use crate::store::SheetStore;

/// Row/column capacity for newly created worksheets.
const NEW_SHEET_ROWS: u32 = 100;
const NEW_SHEET_COLS: u32 = 20;

pub const DIRECTORY: &str = "Directory";
pub const HOURS: &str = "Hours";
pub const EXPENSES: &str = "Expenses";
pub const MILEAGE: &str = "Mileage";
pub const PIPELINE: &str = "Pipeline";
pub const INVOICES: &str = "Invoices";

/// Canonical tables and their required headers, in column order.
pub fn canonical_tables() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        (DIRECTORY, vec!["Name", "Company", "Email", "Phone", "Address"]),
        (HOURS, vec!["Employee", "Date", "Hours", "Task"]),
        (EXPENSES, vec!["Category", "Amount", "Date", "Description"]),
        (
            MILEAGE,
            vec![
                "Date",
                "License",
                "Vehicle",
                "Vehicle Type",
                "Starting Odometer",
                "Ending Odometer",
                "Total Miles",
                "Reimbursement Amount",
            ],
        ),
        (
            PIPELINE,
            vec!["Date", "Contract Name", "Agency", "Stage", "Value", "Notes"],
        ),
        (
            INVOICES,
            vec![
                "Invoice #",
                "Contract Name",
                "Date Issued",
                "Due Date",
                "Amount",
                "Status",
            ],
        ),
    ]
}

/// Canonical headers for one table, if it is a known table.
pub fn headers_for(table: &str) -> Option<Vec<&'static str>> {
    canonical_tables()
        .into_iter()
        .find(|(name, _)| *name == table)
        .map(|(_, headers)| headers)
}

/// True for the table names the application serves.
pub fn is_known_table(table: &str) -> bool {
    canonical_tables().iter().any(|(name, _)| *name == table)
}

/// Ensure worksheets and headers exist for every canonical table.
///
/// Propagates the first store error; the caller treats any failure as
/// "skip reconciliation" and starts with whatever schema exists.
pub async fn reconcile(store: &dyn SheetStore) -> Result<(), StoreError> {
    let existing = store.worksheet_titles().await?;

    for (table, headers) in canonical_tables() {
        let canonical: Vec<String> = headers.iter().map(|h| h.to_string()).collect();

        if !existing.iter().any(|t| t == table) {
            store
                .create_worksheet(table, NEW_SHEET_ROWS, NEW_SHEET_COLS)
                .await?;
            store.append_row(table, &canonical).await?;
            log::info!("Created worksheet: {}", table);
            continue;
        }

        let current = store.header_row(table).await?;
        if current.is_empty() {
            store.append_row(table, &canonical).await?;
            log::info!("Wrote headers for empty worksheet: {}", table);
            continue;
        }

        // Case-sensitive compare; missing headers go to the next free column
        let mut next_col = current.len() as u32 + 1;
        for header in &canonical {
            if !current.iter().any(|h| h == header) {
                store.update_cell(table, 1, next_col, header).await?;
                log::info!("Added column '{}' to worksheet {}", header, table);
                next_col += 1;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{Failure, MemoryStore};

    #[tokio::test]
    async fn test_creates_missing_worksheets_with_headers() {
        let store = MemoryStore::new();
        reconcile(&store).await.unwrap();

        let hours = store.dump(HOURS).unwrap();
        assert_eq!(hours.len(), 1);
        assert_eq!(hours[0], vec!["Employee", "Date", "Hours", "Task"]);

        let titles: Vec<String> = canonical_tables()
            .iter()
            .map(|(n, _)| n.to_string())
            .collect();
        for title in titles {
            assert!(store.dump(&title).is_some());
        }
    }

    #[tokio::test]
    async fn test_idempotent() {
        let store = MemoryStore::new();
        reconcile(&store).await.unwrap();
        let first: Vec<_> = canonical_tables()
            .iter()
            .map(|(n, _)| store.dump(n).unwrap())
            .collect();

        reconcile(&store).await.unwrap();
        let second: Vec<_> = canonical_tables()
            .iter()
            .map(|(n, _)| store.dump(n).unwrap())
            .collect();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_header_row_gets_canonical_headers() {
        let store = MemoryStore::new();
        store.create_worksheet(EXPENSES, 100, 20).await.unwrap();

        reconcile(&store).await.unwrap();

        let expenses = store.dump(EXPENSES).unwrap();
        assert_eq!(
            expenses[0],
            vec!["Category", "Amount", "Date", "Description"]
        );
    }

    #[tokio::test]
    async fn test_missing_headers_appended_preserving_existing() {
        let store = MemoryStore::new();
        // Pre-existing sheet with reordered/custom columns and data
        store.seed(
            HOURS,
            vec![
                vec!["Date", "Employee", "Approved By"],
                vec!["2026-03-01", "Ada", "Grace"],
            ],
        );
        for (table, _) in canonical_tables() {
            if table != HOURS {
                store.create_worksheet(table, 100, 20).await.unwrap();
            }
        }

        reconcile(&store).await.unwrap();

        let hours = store.dump(HOURS).unwrap();
        // Existing columns untouched, canonical gaps appended at the end
        assert_eq!(
            hours[0],
            vec!["Date", "Employee", "Approved By", "Hours", "Task"]
        );
        assert_eq!(hours[1], vec!["2026-03-01", "Ada", "Grace"]);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = MemoryStore::new();
        store.set_failure(Some(Failure::RateLimited));
        assert!(reconcile(&store).await.is_err());
    }

    #[test]
    fn test_known_tables() {
        assert!(is_known_table("Mileage"));
        assert!(!is_known_table("Payroll"));
        assert_eq!(headers_for(DIRECTORY).unwrap().len(), 5);
    }
}
