//! Per-table submit and list operations
//!
//! Every submit is one appended row; records are never updated or deleted.
//! Lists go through the table cache, so a just-submitted row may take up to
//! the freshness window to appear; the manual refresh hook forces it.

use super::ServiceError;
use crate::cache::TableRead;
use crate::records::{
    Contact, ContactForm, Deal, DealForm, Expense, ExpenseForm, HoursEntry, HoursForm, Invoice,
    InvoiceForm, MileageEntry, MileageForm,
};
use crate::schema;
use crate::state::AppState;

pub async fn submit_contact(state: &AppState, form: ContactForm) -> Result<(), ServiceError> {
    let contact = Contact::from_form(form).map_err(ServiceError::Validation)?;
    state
        .store
        .append_row(schema::DIRECTORY, &contact.to_row())
        .await?;
    log::info!("Saved contact: {}", contact.name);
    Ok(())
}

pub async fn submit_hours(state: &AppState, form: HoursForm) -> Result<(), ServiceError> {
    let entry = HoursEntry::from_form(form).map_err(ServiceError::Validation)?;
    state.store.append_row(schema::HOURS, &entry.to_row()).await?;
    log::info!("Logged {} hours for {}", entry.hours, entry.employee);
    Ok(())
}

pub async fn submit_expense(state: &AppState, form: ExpenseForm) -> Result<(), ServiceError> {
    let expense = Expense::from_form(form).map_err(ServiceError::Validation)?;
    state
        .store
        .append_row(schema::EXPENSES, &expense.to_row())
        .await?;
    log::info!("Logged expense: {} {}", expense.category, expense.amount);
    Ok(())
}

/// Returns the derived entry so the caller can echo the reimbursement back.
pub async fn submit_mileage(
    state: &AppState,
    form: MileageForm,
) -> Result<MileageEntry, ServiceError> {
    let entry = MileageEntry::from_form(form, state.config.mileage_rate)
        .map_err(ServiceError::Validation)?;
    state
        .store
        .append_row(schema::MILEAGE, &entry.to_row())
        .await?;
    log::info!(
        "Logged mileage: {} miles, {}",
        entry.total_miles,
        entry.reimbursement
    );
    Ok(entry)
}

pub async fn submit_deal(state: &AppState, form: DealForm) -> Result<(), ServiceError> {
    let deal = Deal::from_form(form).map_err(ServiceError::Validation)?;
    state
        .store
        .append_row(schema::PIPELINE, &deal.to_row())
        .await?;
    log::info!("Saved deal: {} ({})", deal.contract_name, deal.stage);
    Ok(())
}

pub async fn submit_invoice(state: &AppState, form: InvoiceForm) -> Result<(), ServiceError> {
    let invoice = Invoice::from_form(form).map_err(ServiceError::Validation)?;
    state
        .store
        .append_row(schema::INVOICES, &invoice.to_row())
        .await?;
    log::info!("Saved invoice {}", invoice.invoice_number);
    Ok(())
}

/// Cached read of one canonical table.
pub async fn list_table(state: &AppState, table: &str) -> Result<TableRead, ServiceError> {
    if !schema::is_known_table(table) {
        return Err(ServiceError::UnknownTable(table.to_string()));
    }
    Ok(state.cache.read(state.store.as_ref(), table).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::store::memory::MemoryStore;

    fn test_state() -> (Arc<MemoryStore>, AppState) {
        let store = Arc::new(MemoryStore::new());
        crate::schema::canonical_tables()
            .iter()
            .for_each(|(name, headers)| store.seed(name, vec![headers.clone()]));
        let config = Config {
            spreadsheet_id: "test".to_string(),
            admin_password: "pw".to_string(),
            ..Config::default()
        };
        let state = AppState::with_store(config, store.clone());
        (store, state)
    }

    #[tokio::test]
    async fn test_submit_expense_appends_row() {
        let (store, state) = test_state();
        submit_expense(
            &state,
            ExpenseForm {
                category: "Travel".to_string(),
                amount: "$10.00".to_string(),
                date: "2026-03-01".to_string(),
                description: "Site visit".to_string(),
            },
        )
        .await
        .unwrap();

        let values = store.dump(schema::EXPENSES).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[1], vec!["Travel", "$10.00", "2026-03-01", "Site visit"]);
    }

    #[tokio::test]
    async fn test_submit_invalid_form_leaves_store_untouched() {
        let (store, state) = test_state();
        let err = submit_contact(
            &state,
            ContactForm {
                name: String::new(),
                company: "Initech".to_string(),
                email: String::new(),
                phone: String::new(),
                address: String::new(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(store.dump(schema::DIRECTORY).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_mileage_returns_derived_entry() {
        let (_, state) = test_state();
        let entry = submit_mileage(
            &state,
            MileageForm {
                date: "2026-03-01".to_string(),
                license: "ABC-123".to_string(),
                vehicle: "Van".to_string(),
                vehicle_type: "Cargo".to_string(),
                start_odo: "1000.0".to_string(),
                end_odo: "1120.5".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(entry.reimbursement, "$78.33");
    }

    #[tokio::test]
    async fn test_list_unknown_table_rejected() {
        let (_, state) = test_state();
        let err = list_table(&state, "Payroll").await.unwrap_err();
        assert!(matches!(err, ServiceError::UnknownTable(_)));
    }

    #[tokio::test]
    async fn test_list_returns_submitted_rows() {
        let (_, state) = test_state();
        submit_hours(
            &state,
            HoursForm {
                employee: "Ada".to_string(),
                date: "2026-03-01".to_string(),
                hours: "8".to_string(),
                task: "Estimates".to_string(),
            },
        )
        .await
        .unwrap();

        let read = list_table(&state, schema::HOURS).await.unwrap();
        assert_eq!(read.records.len(), 1);
        assert_eq!(read.records.rows[0]["Employee"], "Ada");
    }
}
