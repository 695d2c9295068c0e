use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::columns::CellRange;
use crate::error::SheetError;
use crate::service_account::{ServiceAccount, TokenSource};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Access to the member tab of a remote spreadsheet.
///
/// Cells come back as strings. Rows may be shorter than the requested range
/// when trailing cells are empty, and trailing empty rows may be missing.
#[async_trait]
pub trait SheetClient: Send + Sync {
    /// Read every value in `range`, row by row
    async fn read_range(&self, range: &CellRange) -> Result<Vec<Vec<String>>, SheetError>;

    /// Overwrite a single cell with a number
    async fn write_cell(&self, row: usize, col: usize, value: u64) -> Result<(), SheetError>;
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// `SheetClient` backed by the Google Sheets v4 REST API
pub struct GoogleSheets {
    client: Client,
    tokens: TokenSource,
    spreadsheet_id: String,
    sheet_name: String,
}

impl GoogleSheets {
    pub fn new(spreadsheet_id: &str, sheet_name: &str, account: ServiceAccount) -> Self {
        let client = Client::new();
        Self {
            tokens: TokenSource::new(account, client.clone()),
            client,
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet_name: sheet_name.to_string(),
        }
    }

    fn values_url(&self, range: &CellRange) -> String {
        format!(
            "{}/{}/values/{}",
            SHEETS_API,
            self.spreadsheet_id,
            urlencoding::encode(&range.to_a1(&self.sheet_name))
        )
    }

    fn write_url(&self, range: &CellRange) -> String {
        format!("{}?valueInputOption=RAW", self.values_url(range))
    }

    fn write_body(&self, range: &CellRange, value: u64) -> Value {
        json!({
            "range": range.to_a1(&self.sheet_name),
            "majorDimension": "ROWS",
            "values": [[value]],
        })
    }

    async fn check(&self, range: &CellRange, response: Response) -> Result<Response, SheetError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let a1 = range.to_a1(&self.sheet_name);
        let body = response.text().await.unwrap_or_default();
        let err = status_error(status, a1, body);
        if !matches!(err, SheetError::NotFound(_)) {
            error!("Sheets API error: {err}");
        }
        Err(err)
    }
}

/// Map a failed API status to an error; 404 means the spreadsheet or tab is gone.
fn status_error(status: StatusCode, a1: String, body: String) -> SheetError {
    if status == StatusCode::NOT_FOUND {
        return SheetError::NotFound(a1);
    }

    SheetError::Api {
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl SheetClient for GoogleSheets {
    async fn read_range(&self, range: &CellRange) -> Result<Vec<Vec<String>>, SheetError> {
        let token = self.tokens.token().await?;
        let response = self
            .client
            .get(self.values_url(range))
            .bearer_auth(token)
            .send()
            .await?;

        let body: ValueRange = self.check(range, response).await?.json().await?;
        debug!(
            "Read {} rows from {}",
            body.values.len(),
            range.to_a1(&self.sheet_name)
        );

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn write_cell(&self, row: usize, col: usize, value: u64) -> Result<(), SheetError> {
        let range = CellRange::Cell { row, col };
        let token = self.tokens.token().await?;
        let response = self
            .client
            .put(self.write_url(&range))
            .bearer_auth(token)
            .json(&self.write_body(&range, value))
            .send()
            .await?;

        self.check(&range, response).await?;
        Ok(())
    }
}

/// Render a JSON cell the way it is shown in the sheet.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
