//! Dashboard assembly
//!
//! Figures are a pure function of the current table snapshots. Each table
//! read degrades independently: a rate-limited table contributes its stale
//! snapshot plus a warning, a failed table contributes zeros plus its
//! error, and the rest of the dashboard still renders.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::cache::TableRead;
use crate::metrics;
use crate::schema;
use crate::state::AppState;

/// Pipeline stage counted as a won deal.
const STAGE_WON: &str = "Won";
/// Invoice status counted as outstanding.
const STATUS_UNPAID: &str = "Unpaid";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub contact_count: usize,
    pub total_hours: f64,
    /// Payroll rollup: hours per employee.
    pub hours_by_employee: BTreeMap<String, f64>,
    pub total_expenses: f64,
    pub total_reimbursement: f64,
    pub deals_won: usize,
    pub unpaid_invoices: usize,
    /// Invoices whose due date falls after today.
    pub invoices_due: usize,
    pub next_invoice_due: Option<String>,
    /// Per-table degradation notices; empty when every read was clean.
    pub warnings: Vec<String>,
}

/// Build the dashboard for today.
pub async fn build_dashboard(state: &AppState) -> DashboardData {
    build_dashboard_at(state, chrono::Local::now().date_naive()).await
}

async fn build_dashboard_at(state: &AppState, today: NaiveDate) -> DashboardData {
    let mut warnings = Vec::new();

    let directory = read_table(state, schema::DIRECTORY, &mut warnings).await;
    let hours = read_table(state, schema::HOURS, &mut warnings).await;
    let expenses = read_table(state, schema::EXPENSES, &mut warnings).await;
    let mileage = read_table(state, schema::MILEAGE, &mut warnings).await;
    let pipeline = read_table(state, schema::PIPELINE, &mut warnings).await;
    let invoices = read_table(state, schema::INVOICES, &mut warnings).await;

    DashboardData {
        contact_count: directory.records.len(),
        total_hours: metrics::sum_numeric(&hours.records, "Hours"),
        hours_by_employee: metrics::sum_by(&hours.records, "Employee", "Hours"),
        total_expenses: metrics::sum_numeric(&expenses.records, "Amount"),
        total_reimbursement: metrics::sum_numeric(&mileage.records, "Reimbursement Amount"),
        deals_won: metrics::count_matching(&pipeline.records, "Stage", STAGE_WON),
        unpaid_invoices: metrics::count_matching(&invoices.records, "Status", STATUS_UNPAID),
        invoices_due: metrics::count_after(&invoices.records, "Due Date", today),
        next_invoice_due: metrics::min_date_after(&invoices.records, "Due Date", today)
            .map(|d| d.format("%Y-%m-%d").to_string()),
        warnings,
    }
}

async fn read_table(state: &AppState, table: &str, warnings: &mut Vec<String>) -> TableRead {
    let read = state.cache.read(state.store.as_ref(), table).await;
    if let Some(problem) = read.problem() {
        warnings.push(problem.to_string());
    }
    read
}
