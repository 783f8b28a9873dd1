//! Service-account token exchange against a mock token endpoint.

use std::sync::Arc;

use serde_json::json;
use sheetbase_core::{SheetStore, StoreError};
use sheetbase_http::{ServiceAccount, ServiceAccountAuth, SheetsClient, TokenProvider};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &str = include_str!("fixtures/service_account_key.pem");

fn account(server: &MockServer) -> ServiceAccount {
    ServiceAccount::new("sheetbase@test-project.iam.gserviceaccount.com", TEST_KEY)
        .with_token_uri(format!("{}/token", server.uri()))
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.test",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_token_is_exchanged_once_and_reused() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    let auth = ServiceAccountAuth::new(account(&server), reqwest::Client::new()).unwrap();

    assert_eq!(auth.access_token().await.unwrap(), "ya29.test");
    assert_eq!(auth.access_token().await.unwrap(), "ya29.test");
}

#[tokio::test]
async fn test_escaped_key_is_accepted() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    let escaped = TEST_KEY.replace('\n', "\\n");
    let account = ServiceAccount::new("svc@test.iam.gserviceaccount.com", &escaped)
        .with_token_uri(format!("{}/token", server.uri()));
    let auth = ServiceAccountAuth::new(account, reqwest::Client::new()).unwrap();

    assert_eq!(auth.access_token().await.unwrap(), "ya29.test");
}

#[tokio::test]
async fn test_rejected_exchange_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
        )
        .mount(&server)
        .await;

    let auth = ServiceAccountAuth::new(account(&server), reqwest::Client::new()).unwrap();
    let err = auth.access_token().await.unwrap_err();

    assert!(matches!(err, StoreError::Auth(ref m) if m.contains("invalid_grant")));
    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_sheets_calls_carry_exchanged_token() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sid/values/vendas"))
        .and(header("authorization", "Bearer ya29.test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"values": [["Venda_ID"], ["v1"]]})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let auth = ServiceAccountAuth::new(account(&server), http.clone()).unwrap();
    let client = SheetsClient::new(http, "sid", Arc::new(auth))
        .unwrap()
        .with_base_url(&server.uri())
        .unwrap();

    assert_eq!(client.get_values("vendas").await.unwrap().len(), 2);
    assert_eq!(client.get_values("vendas").await.unwrap().len(), 2);
}
