//! Google Sheets v4 REST client.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sheetbase_core::a1::quote_sheet_name;
use sheetbase_core::{cell_text, RowDeletion, SheetStore, StoreError, StoreResult};

use crate::auth::TokenProvider;

/// Default API host.
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// How written values are interpreted by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueInputOption {
    /// Parsed as if typed into the UI (numbers, dates, formulas).
    #[default]
    UserEntered,
    /// Stored verbatim as strings.
    Raw,
}

impl ValueInputOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserEntered => "USER_ENTERED",
            Self::Raw => "RAW",
        }
    }
}

impl fmt::Display for ValueInputOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueInputOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "user-entered" => Ok(Self::UserEntered),
            "raw" => Ok(Self::Raw),
            other => Err(format!(
                "unknown value input option '{other}' (expected user-entered or raw)"
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<JsonValue>>,
}

#[derive(Debug, Serialize)]
struct ValuesBody<'a> {
    values: [&'a [String]; 1],
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
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdate {
    requests: Vec<DeleteDimensionRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteDimensionRequest {
    delete_dimension: DeleteDimension,
}

#[derive(Debug, Serialize)]
struct DeleteDimension {
    range: DimensionRange,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DimensionRange {
    sheet_id: i64,
    dimension: &'static str,
    start_index: usize,
    end_index: usize,
}

impl From<RowDeletion> for DeleteDimensionRequest {
    fn from(deletion: RowDeletion) -> Self {
        Self {
            delete_dimension: DeleteDimension {
                range: DimensionRange {
                    sheet_id: deletion.sheet_id,
                    dimension: "ROWS",
                    start_index: deletion.start_index,
                    end_index: deletion.end_index,
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// A spreadsheet reached through the Sheets REST API.
pub struct SheetsClient {
    client: Client,
    base_url: Url,
    spreadsheet_id: String,
    auth: Arc<dyn TokenProvider>,
    value_input: ValueInputOption,
}

impl SheetsClient {
    /// Client for `spreadsheet_id` against the public API host.
    pub fn new(
        client: Client,
        spreadsheet_id: impl Into<String>,
        auth: Arc<dyn TokenProvider>,
    ) -> StoreResult<Self> {
        Ok(Self {
            client,
            base_url: parse_base(SHEETS_API_BASE)?,
            spreadsheet_id: spreadsheet_id.into(),
            auth,
            value_input: ValueInputOption::default(),
        })
    }

    /// Point the client at another API host (e.g. a local mock).
    pub fn with_base_url(mut self, base_url: &str) -> StoreResult<Self> {
        self.base_url = parse_base(base_url)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_value_input(mut self, value_input: ValueInputOption) -> Self {
        self.value_input = value_input;
        self
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// `{base}/v4/spreadsheets/{tail...}` with each segment percent-encoded.
    fn url(&self, tail: &[&str]) -> StoreResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::Config(format!("invalid API base URL: {}", self.base_url)))?
            .pop_if_empty()
            .push("v4")
            .push("spreadsheets")
            .extend(tail);
        Ok(url)
    }

    fn values_url(&self, range: &str) -> StoreResult<Url> {
        self.url(&[self.spreadsheet_id.as_str(), "values", range])
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let token = self.auth.access_token().await?;
        request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| StoreError::upstream(format!("request failed: {e}")))
    }
}

fn parse_base(base_url: &str) -> StoreResult<Url> {
    Url::parse(base_url)
        .map_err(|e| StoreError::Config(format!("invalid API base URL '{base_url}': {e}")))
}

/// Turn a non-success response into an error, keeping the service's message.
async fn check(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = error_message(response).await;
    Err(StoreError::upstream(format!(
        "HTTP {} - {}",
        status.as_u16(),
        message
    )))
}

async fn error_message(response: Response) -> String {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Whether a 400 from a values read is the service's answer to a range
/// naming a sheet that does not exist.
fn is_unknown_range(message: &str) -> bool {
    message.starts_with("Unable to parse range")
}

#[async_trait]
impl SheetStore for SheetsClient {
    async fn get_values(&self, range: &str) -> StoreResult<Vec<Vec<String>>> {
        let url = self.values_url(range)?;
        let response = self.send(self.client.get(url)).await?;

        let status = response.status();
        if matches!(status, StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND) {
            let message = error_message(response).await;
            tracing::debug!(range, status = status.as_u16(), %message, "range lookup rejected");
            if status == StatusCode::NOT_FOUND || is_unknown_range(&message) {
                return Err(StoreError::RangeNotFound(range.to_string()));
            }
            return Err(StoreError::upstream(format!(
                "HTTP {} - {}",
                status.as_u16(),
                message
            )));
        }

        let body: ValueRange = check(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::upstream(format!("invalid values response: {e}")))?;

        tracing::debug!(range, rows = body.values.len(), "fetched values");
        Ok(body
            .values
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }

    async fn append_row(&self, sheet: &str, row: Vec<String>) -> StoreResult<()> {
        let target = format!("{}:append", quote_sheet_name(sheet));
        let url = self.url(&[self.spreadsheet_id.as_str(), "values", target.as_str()])?;
        let request = self
            .client
            .post(url)
            .query(&[
                ("valueInputOption", self.value_input.as_str()),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&ValuesBody { values: [row.as_slice()] });

        check(self.send(request).await?).await?;
        tracing::debug!(sheet, cells = row.len(), "appended row");
        Ok(())
    }

    async fn update_row(&self, range: &str, row: Vec<String>) -> StoreResult<()> {
        let url = self.values_url(range)?;
        let request = self
            .client
            .put(url)
            .query(&[("valueInputOption", self.value_input.as_str())])
            .json(&ValuesBody { values: [row.as_slice()] });

        check(self.send(request).await?).await?;
        tracing::debug!(range, "updated row");
        Ok(())
    }

    async fn sheet_id(&self, sheet: &str) -> StoreResult<i64> {
        let url = self.url(&[self.spreadsheet_id.as_str()])?;
        let request = self
            .client
            .get(url)
            .query(&[("fields", "sheets.properties(sheetId,title)")]);

        let meta: SpreadsheetMeta = check(self.send(request).await?)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::upstream(format!("invalid spreadsheet response: {e}")))?;

        meta.sheets
            .into_iter()
            .find(|s| s.properties.title == sheet)
            .map(|s| s.properties.sheet_id)
            .ok_or_else(|| StoreError::RangeNotFound(sheet.to_string()))
    }

    async fn delete_rows(&self, deletions: Vec<RowDeletion>) -> StoreResult<()> {
        if deletions.is_empty() {
            return Ok(());
        }
        let count = deletions.len();
        let target = format!("{}:batchUpdate", self.spreadsheet_id);
        let url = self.url(&[target.as_str()])?;
        let body = BatchUpdate {
            requests: deletions.into_iter().map(Into::into).collect(),
        };

        check(self.send(self.client.post(url).json(&body)).await?).await?;
        tracing::debug!(count, "batch deleted rows");
        Ok(())
    }
}
