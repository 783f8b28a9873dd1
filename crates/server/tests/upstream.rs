//! Router tests against mocked Google endpoints.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use sheetbase_http::{ScriptProxy, SheetsClient, StaticToken};
use sheetbase_server::{create_router, AppState, UPSTREAM_MESSAGE};
use sheetbase_table::Schema;
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sheets_state(server: &MockServer) -> AppState {
    let client = SheetsClient::new(
        reqwest::Client::new(),
        "sid",
        Arc::new(StaticToken("tok".to_string())),
    )
    .unwrap()
    .with_base_url(&server.uri())
    .unwrap();
    AppState::new(Arc::new(client), Schema::default())
}

async fn body_json_of(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_read_through_sheets_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sid/values/produtos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [["Produto_ID", "Nome", "Status"], ["p1", "Widget", "Ativo"], ["p2"]]
        })))
        .mount(&server)
        .await;

    let response = create_router(sheets_state(&server))
        .oneshot(
            Request::builder()
                .uri("/?sheet=produtos")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json_of(response).await,
        json!([
            {"Produto_ID": "p1", "Nome": "Widget", "Status": "Ativo"},
            {"Produto_ID": "p2"}
        ])
    );
}

#[tokio::test]
async fn test_delete_sale_through_sheets_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sheets": [
                {"properties": {"sheetId": 11, "title": "vendas"}},
                {"properties": {"sheetId": 22, "title": "itens_venda"}}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sid/values/vendas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [["Venda_ID"], ["v0"], ["v1"]]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sid/values/itens_venda"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [
                ["Item_ID", "Venda_Ref"],
                ["i1", "v1"],
                ["i2", "v0"],
                ["i3", "v1"]
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/sid:batchUpdate"))
        .and(body_json(json!({
            "requests": [
                {"deleteDimension": {"range": {"sheetId": 11, "dimension": "ROWS", "startIndex": 2, "endIndex": 3}}},
                {"deleteDimension": {"range": {"sheetId": 22, "dimension": "ROWS", "startIndex": 3, "endIndex": 4}}},
                {"deleteDimension": {"range": {"sheetId": 22, "dimension": "ROWS", "startIndex": 1, "endIndex": 2}}}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"replies": []})))
        .expect(1)
        .mount(&server)
        .await;

    let response = create_router(sheets_state(&server))
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/")
                .body(Body::from(
                    json!({"action": "deleteSale", "payload": {"saleId": "v1"}}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json_of(response).await;
    assert_eq!(body["deletion"]["itemsRemoved"], json!(2));
}

#[tokio::test]
async fn test_upstream_failure_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": 500, "message": "Internal error encountered.", "status": "INTERNAL"}
        })))
        .mount(&server)
        .await;

    let response = create_router(sheets_state(&server))
        .oneshot(
            Request::builder()
                .uri("/?sheet=produtos")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json_of(response).await;
    assert_eq!(body["error"], json!(UPSTREAM_MESSAGE));
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Internal error encountered."));
}

// ===== Apps Script proxy =====

fn proxy_app(server: &MockServer) -> axum::Router {
    let store = Arc::new(sheetbase_core::MemoryStore::new());
    let proxy = ScriptProxy::new(
        reqwest::Client::new(),
        &format!("{}/macros/s/deployment/exec", server.uri()),
    )
    .unwrap();
    create_router(AppState::new(store, Schema::default()).with_proxy(proxy))
}

#[tokio::test]
async fn test_proxy_forwards_get_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/macros/s/deployment/exec"))
        .and(query_param("sheet", "produtos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"Produto_ID": "p1"}])))
        .expect(1)
        .mount(&server)
        .await;

    let response = proxy_app(&server)
        .oneshot(
            Request::builder()
                .uri("/script?sheet=produtos")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(body_json_of(response).await, json!([{"Produto_ID": "p1"}]));
}

#[tokio::test]
async fn test_proxy_forwards_post_body_and_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/macros/s/deployment/exec"))
        .and(body_json(json!({"action": "saveSale", "payload": {}})))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"error": "bad"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = proxy_app(&server)
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/script")
                .body(Body::from(
                    json!({"action": "saveSale", "payload": {}}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json_of(response).await, json!({"error": "bad"}));
}

#[tokio::test]
async fn test_proxy_transport_failure() {
    let proxy = ScriptProxy::new(reqwest::Client::new(), "http://127.0.0.1:9/exec").unwrap();
    let app = create_router(
        AppState::new(Arc::new(sheetbase_core::MemoryStore::new()), Schema::default())
            .with_proxy(proxy),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/script")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json_of(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Proxy request failed: "));
}
