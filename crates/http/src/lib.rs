//! # sheetbase-http
//!
//! HTTP side of sheetbase's storage:
//! - [`SheetsClient`]: a [`SheetStore`] backed by the Google Sheets v4 REST API
//! - [`ServiceAccountAuth`]: OAuth access tokens for a service account
//! - [`ScriptProxy`]: forwards requests to a Google Apps Script web app
//!
//! [`SheetStore`]: sheetbase_core::SheetStore

mod auth;
mod proxy;
mod sheets;

pub use auth::{
    ServiceAccount, ServiceAccountAuth, StaticToken, TokenProvider, GOOGLE_TOKEN_URI,
    SPREADSHEETS_SCOPE,
};
pub use proxy::{ProxyResponse, ScriptProxy};
pub use sheets::{SheetsClient, ValueInputOption, SHEETS_API_BASE};

use reqwest::Client;
use sheetbase_core::{StoreError, StoreResult};
use std::time::Duration;

/// Default per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Build the shared HTTP client with a per-request timeout.
///
/// # Errors
///
/// Returns `StoreError::Config` if building the underlying HTTP client fails.
///
/// # Examples
///
/// ```
/// let client = sheetbase_http::build_client(10).unwrap();
/// ```
pub fn build_client(timeout_secs: u64) -> StoreResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        // Disable system proxy lookup to avoid macOS system-configuration issues
        .no_proxy()
        .build()
        .map_err(|e| StoreError::Config(format!("failed to build HTTP client: {e}")))
}
