//! Forwarding to a Google Apps Script web app.
//!
//! GET requests keep their query string, POST requests keep their raw body,
//! and the script's status code and body are relayed back unchanged.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Url};
use sheetbase_core::{StoreError, StoreResult};

/// Status and body returned by the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResponse {
    pub status: u16,
    pub body: String,
}

/// Forwards requests to one Apps Script deployment.
#[derive(Debug, Clone)]
pub struct ScriptProxy {
    client: Client,
    url: Url,
}

impl ScriptProxy {
    pub fn new(client: Client, url: &str) -> StoreResult<Self> {
        let url = Url::parse(url)
            .map_err(|e| StoreError::Config(format!("invalid script URL '{url}': {e}")))?;
        Ok(Self { client, url })
    }

    /// Forward a request. Transport failures surface as upstream errors; any
    /// HTTP status from the script, including errors, is relayed as-is.
    pub async fn forward(
        &self,
        method: Method,
        query: Option<&str>,
        body: Option<String>,
    ) -> StoreResult<ProxyResponse> {
        let mut url = self.url.clone();
        if method == Method::GET {
            url.set_query(query.filter(|q| !q.is_empty()));
        }

        let mut request = self
            .client
            .request(method.clone(), url)
            .header(CONTENT_TYPE, "application/json");
        if method == Method::POST {
            if let Some(body) = body.filter(|b| !b.is_empty()) {
                request = request.body(body);
            }
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, "proxy request failed");
            StoreError::upstream(e.to_string())
        })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::upstream(e.to_string()))?;

        tracing::debug!(%method, status, "proxied request");
        Ok(ProxyResponse { status, body })
    }
}
