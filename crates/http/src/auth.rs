//! # Service-account authentication
//!
//! Exchanges a signed JWT assertion for an OAuth access token.
//!
//! ## Flow
//! 1. Sign an RS256 JWT with the account's private key (`iss`, `scope`, `aud`,
//!    `iat`, `exp`)
//! 2. POST it to the token endpoint with the jwt-bearer grant type
//! 3. Use the returned bearer token until shortly before it expires

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sheetbase_core::{StoreError, StoreResult};
use tokio::sync::Mutex;

/// Scope granting read/write access to spreadsheets.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Google's OAuth token endpoint.
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_TTL_SECS: i64 = 3600;
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Source of bearer tokens for the Sheets API.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> StoreResult<String>;
}

/// A fixed token, for tests and pre-authorized deployments.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> StoreResult<String> {
        Ok(self.0.clone())
    }
}

/// Service-account credentials.
#[derive(Debug, Clone)]
pub struct ServiceAccount {
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    pub scope: String,
    pub token_uri: String,
}

impl ServiceAccount {
    /// Credentials with the spreadsheets scope and Google's token endpoint.
    ///
    /// Keys stored in environment variables often carry literal `\n`
    /// sequences instead of line breaks; those are unescaped here.
    pub fn new(client_email: impl Into<String>, private_key: &str) -> Self {
        Self {
            client_email: client_email.into(),
            private_key: private_key.replace("\\n", "\n"),
            scope: SPREADSHEETS_SCOPE.to_string(),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    #[must_use]
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }
}

/// Claims of the JWT assertion sent to the token endpoint.
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_TTL_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: i64,
}

/// Access tokens for a service account, reused until shortly before expiry.
pub struct ServiceAccountAuth {
    account: ServiceAccount,
    client: Client,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// Parse the account's private key and prepare the token exchange.
    pub fn new(account: ServiceAccount, client: Client) -> StoreResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(|e| StoreError::Auth(format!("invalid private key: {e}")))?;

        Ok(Self {
            account,
            client,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    /// Build the signed assertion for the token exchange.
    fn assertion(&self, now: i64) -> StoreResult<String> {
        let claims = AssertionClaims {
            iss: &self.account.client_email,
            scope: &self.account.scope,
            aud: &self.account.token_uri,
            iat: now,
            exp: now + ASSERTION_TTL_SECS,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| StoreError::Auth(format!("failed to sign assertion: {e}")))
    }

    async fn exchange(&self, now: i64) -> StoreResult<CachedToken> {
        let assertion = self.assertion(now)?;
        let response = self
            .client
            .post(&self.account.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| StoreError::Auth(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Auth(format!("invalid token response: {e}")))?;

        tracing::debug!(
            account = %self.account.client_email,
            expires_in = token.expires_in,
            "obtained access token"
        );
        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + token.expires_in,
        })
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> StoreResult<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - EXPIRY_MARGIN_SECS > now {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.exchange(now).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}
