//! Google Sheets API v4 worksheet value operations.
//!
//! Only the calls the application needs: read a range, append a row,
//! update one cell, add a worksheet, list worksheet titles. No retries;
//! rate-limit recovery happens at the cache layer.

use async_trait::async_trait;
use serde::Deserialize;

use super::SheetsAuth;
use crate::error::{classify_api_error, StoreError};
use crate::store::{RecordSet, SheetStore};

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    #[serde(default)]
    title: String,
}

/// Worksheet store backed by the Sheets API.
pub struct GoogleSheetStore {
    client: reqwest::Client,
    spreadsheet_id: String,
    auth: SheetsAuth,
}

impl GoogleSheetStore {
    pub fn new(spreadsheet_id: String, auth: SheetsAuth) -> Self {
        Self {
            client: reqwest::Client::new(),
            spreadsheet_id,
            auth,
        }
    }

    fn values_url(&self, range: &str) -> String {
        format!("{}/{}/values/{}", BASE_URL, self.spreadsheet_id, range)
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let token = self.auth.access_token().await?;
        let resp = self
            .client
            .get(self.values_url(range))
            .bearer_auth(token)
            .send()
            .await?;

        let resp = check_response(resp).await?;
        let body: ValueRange = resp.json().await?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }
}

async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(classify_api_error(status.as_u16(), &body))
}

/// Formatted values come back as strings, but unformatted cells can be
/// numbers or bools.
fn cell_to_string(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// 1-based column index to A1 letters (1 is A, 27 is AA).
pub fn col_letter(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = ((col - 1) % 26) as u8;
        letters.push(b'A' + rem);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

#[async_trait]
impl SheetStore for GoogleSheetStore {
    async fn worksheet_titles(&self) -> Result<Vec<String>, StoreError> {
        let token = self.auth.access_token().await?;
        let resp = self
            .client
            .get(format!("{}/{}", BASE_URL, self.spreadsheet_id))
            .query(&[("fields", "sheets.properties.title")])
            .bearer_auth(token)
            .send()
            .await?;

        let resp = check_response(resp).await?;
        let body: SpreadsheetMeta = resp.json().await?;
        Ok(body.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    async fn header_row(&self, table: &str) -> Result<Vec<String>, StoreError> {
        let mut values = self.get_values(&format!("{}!1:1", table)).await?;
        Ok(values.pop().unwrap_or_default())
    }

    async fn records(&self, table: &str) -> Result<RecordSet, StoreError> {
        let values = self.get_values(table).await?;
        Ok(RecordSet::from_values(values))
    }

    async fn append_row(&self, table: &str, row: &[String]) -> Result<(), StoreError> {
        let token = self.auth.access_token().await?;
        let resp = self
            .client
            .post(format!("{}:append", self.values_url(table)))
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(token)
            .json(&serde_json::json!({ "values": [row] }))
            .send()
            .await?;

        check_response(resp).await?;
        Ok(())
    }

    async fn update_cell(
        &self,
        table: &str,
        row: u32,
        col: u32,
        value: &str,
    ) -> Result<(), StoreError> {
        let token = self.auth.access_token().await?;
        let range = format!("{}!{}{}", table, col_letter(col), row);
        let resp = self
            .client
            .put(self.values_url(&range))
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(token)
            .json(&serde_json::json!({ "values": [[value]] }))
            .send()
            .await?;

        check_response(resp).await?;
        Ok(())
    }

    async fn create_worksheet(
        &self,
        table: &str,
        rows: u32,
        cols: u32,
    ) -> Result<(), StoreError> {
        let token = self.auth.access_token().await?;
        let body = serde_json::json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": table,
                        "gridProperties": { "rowCount": rows, "columnCount": cols }
                    }
                }
            }]
        });

        let resp = self
            .client
            .post(format!("{}/{}:batchUpdate", BASE_URL, self.spreadsheet_id))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        check_response(resp).await?;
        Ok(())
    }
}
