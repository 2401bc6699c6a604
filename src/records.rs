//! Typed records, one struct per table
//!
//! Form payloads are converted into typed records at the store boundary;
//! `to_row` emits cells in canonical header order. Validation only checks
//! that required fields are non-empty. Relationships between tables, like
//! invoice to contract, stay string-matched as in the backing sheet.

use serde::Deserialize;

/// Dollar string as stored in the sheet, e.g. "$78.33".
pub fn format_money(value: f64) -> String {
    format!("${:.2}", value)
}

fn require(fields: &[(&str, &str)]) -> Result<(), String> {
    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(format!("Missing required field: {}", name));
        }
    }
    Ok(())
}

// ============================================================================
// Directory
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone)]
pub struct Contact {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl Contact {
    pub fn from_form(form: ContactForm) -> Result<Self, String> {
        require(&[("name", &form.name)])?;
        Ok(Self {
            name: form.name,
            company: form.company,
            email: form.email,
            phone: form.phone,
            address: form.address,
        })
    }

    /// Cells in `Directory` header order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.company.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.address.clone(),
        ]
    }
}

// ============================================================================
// Hours
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct HoursForm {
    #[serde(default)]
    pub employee: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub hours: String,
    #[serde(default)]
    pub task: String,
}

#[derive(Debug, Clone)]
pub struct HoursEntry {
    pub employee: String,
    pub date: String,
    pub hours: String,
    pub task: String,
}

impl HoursEntry {
    pub fn from_form(form: HoursForm) -> Result<Self, String> {
        require(&[
            ("employee", &form.employee),
            ("date", &form.date),
            ("hours", &form.hours),
        ])?;
        Ok(Self {
            employee: form.employee,
            date: form.date,
            hours: form.hours,
            task: form.task,
        })
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.employee.clone(),
            self.date.clone(),
            self.hours.clone(),
            self.task.clone(),
        ]
    }
}

// ============================================================================
// Expenses
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Expense {
    pub category: String,
    pub amount: String,
    pub date: String,
    pub description: String,
}

impl Expense {
    pub fn from_form(form: ExpenseForm) -> Result<Self, String> {
        require(&[
            ("category", &form.category),
            ("amount", &form.amount),
            ("date", &form.date),
        ])?;
        Ok(Self {
            category: form.category,
            amount: form.amount,
            date: form.date,
            description: form.description,
        })
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.category.clone(),
            self.amount.clone(),
            self.date.clone(),
            self.description.clone(),
        ]
    }
}

// ============================================================================
// Mileage
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct MileageForm {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub vehicle: String,
    #[serde(default)]
    pub vehicle_type: String,
    #[serde(default)]
    pub start_odo: String,
    #[serde(default)]
    pub end_odo: String,
}

#[derive(Debug, Clone)]
pub struct MileageEntry {
    pub date: String,
    pub license: String,
    pub vehicle: String,
    pub vehicle_type: String,
    pub start_odo: f64,
    pub end_odo: f64,
    pub total_miles: f64,
    pub reimbursement: String,
}

impl MileageEntry {
    /// Total miles and reimbursement are derived here, never taken from the
    /// form. Blank odometer readings count as 0.
    pub fn from_form(form: MileageForm, rate_per_mile: f64) -> Result<Self, String> {
        require(&[("date", &form.date)])?;

        let start_odo = form.start_odo.trim().parse::<f64>().unwrap_or(0.0);
        let end_odo = form.end_odo.trim().parse::<f64>().unwrap_or(0.0);
        let total_miles = end_odo - start_odo;
        let reimbursement = format_money(total_miles * rate_per_mile);

        Ok(Self {
            date: form.date,
            license: form.license,
            vehicle: form.vehicle,
            vehicle_type: form.vehicle_type,
            start_odo,
            end_odo,
            total_miles,
            reimbursement,
        })
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.clone(),
            self.license.clone(),
            self.vehicle.clone(),
            self.vehicle_type.clone(),
            self.start_odo.to_string(),
            self.end_odo.to_string(),
            self.total_miles.to_string(),
            self.reimbursement.clone(),
        ]
    }
}

// ============================================================================
// Pipeline
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct DealForm {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub contract_name: String,
    #[serde(default)]
    pub agency: String,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct Deal {
    pub date: String,
    pub contract_name: String,
    pub agency: String,
    pub stage: String,
    pub value: String,
    pub notes: String,
}

impl Deal {
    pub fn from_form(form: DealForm) -> Result<Self, String> {
        require(&[
            ("contract_name", &form.contract_name),
            ("stage", &form.stage),
        ])?;
        Ok(Self {
            date: form.date,
            contract_name: form.contract_name,
            agency: form.agency,
            stage: form.stage,
            value: form.value,
            notes: form.notes,
        })
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.clone(),
            self.contract_name.clone(),
            self.agency.clone(),
            self.stage.clone(),
            self.value.clone(),
            self.notes.clone(),
        ]
    }
}

// ============================================================================
// Invoices
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceForm {
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub contract_name: String,
    #[serde(default)]
    pub date_issued: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct Invoice {
    pub invoice_number: String,
    pub contract_name: String,
    pub date_issued: String,
    pub due_date: String,
    pub amount: String,
    pub status: String,
}

impl Invoice {
    pub fn from_form(form: InvoiceForm) -> Result<Self, String> {
        require(&[
            ("invoice_number", &form.invoice_number),
            ("contract_name", &form.contract_name),
            ("amount", &form.amount),
        ])?;
        let status = if form.status.trim().is_empty() {
            "Unpaid".to_string()
        } else {
            form.status
        };
        Ok(Self {
            invoice_number: form.invoice_number,
            contract_name: form.contract_name,
            date_issued: form.date_issued,
            due_date: form.due_date,
            amount: form.amount,
            status,
        })
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.invoice_number.clone(),
            self.contract_name.clone(),
            self.date_issued.clone(),
            self.due_date.clone(),
            self.amount.clone(),
            self.status.clone(),
        ]
    }
}
