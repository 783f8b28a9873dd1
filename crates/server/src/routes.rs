//! Request routing: GET reads a sheet, POST runs an action, OPTIONS is the
//! CORS preflight, anything else is refused.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Query, RawQuery, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, MethodRouter};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sheetbase_core::{Record, SheetStore, StoreError, StoreResult};
use sheetbase_http::ScriptProxy;
use sheetbase_table::{dispatch, Action, ActionReply, ActionRequest, Schema, Tables};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{ApiError, ErrorBody};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    tables: Tables,
    schema: Arc<Schema>,
    strict_status: bool,
    proxy: Option<Arc<ScriptProxy>>,
}

impl AppState {
    pub fn new(store: Arc<dyn SheetStore>, schema: Schema) -> Self {
        Self {
            tables: Tables::new(store),
            schema: Arc::new(schema),
            strict_status: false,
            proxy: None,
        }
    }

    /// Build the state a configuration describes.
    pub fn from_config(config: &Config) -> StoreResult<Self> {
        let mut state = Self::new(config.build_store()?, config.schema())
            .with_strict_status(config.strict_status);
        if let Some(proxy) = config.script_proxy()? {
            state = state.with_proxy(proxy);
        }
        Ok(state)
    }

    #[must_use]
    pub fn with_strict_status(mut self, strict: bool) -> Self {
        self.strict_status = strict;
        self
    }

    #[must_use]
    pub fn with_proxy(mut self, proxy: ScriptProxy) -> Self {
        self.proxy = Some(Arc::new(proxy));
        self
    }

    fn fail(&self, error: StoreError) -> ApiError {
        ApiError::new(error, self.strict_status)
    }
}

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct Health {
    /// Server status ("ok" when healthy).
    pub status: String,
    /// Server version from Cargo.toml.
    pub version: String,
}

/// Health check endpoint handler.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Query string of a read request.
#[derive(Debug, Deserialize)]
pub struct ReadQuery {
    pub sheet: Option<String>,
}

/// `GET ?sheet=<name>`: the sheet's records as a JSON array.
async fn read_sheet(
    State(state): State<AppState>,
    Query(query): Query<ReadQuery>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let sheet = query
        .sheet
        .filter(|s| !s.is_empty())
        .ok_or_else(|| state.fail(StoreError::validation("Parâmetro 'sheet' é obrigatório.")))?;

    let records = state
        .tables
        .read_table(&sheet)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(records))
}

/// `POST {action, payload}`: validate the action, then run it.
async fn write_action(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ActionReply>, ApiError> {
    let request: ActionRequest = serde_json::from_slice(&body).map_err(|e| {
        state.fail(StoreError::validation(format!(
            "Corpo da requisição inválido: {e}"
        )))
    })?;
    let action = Action::parse(request, &state.schema).map_err(|e| state.fail(e))?;

    tracing::info!(action = action.name(), "dispatching action");
    let reply = dispatch(&state.tables, &state.schema, action)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(reply))
}

async fn method_not_allowed() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody::new("Método não permitido.")),
    )
}

/// Relay a request to the configured Apps Script web app.
async fn forward_script(
    State(state): State<AppState>,
    method: Method,
    RawQuery(query): RawQuery,
    body: String,
) -> Response {
    let Some(proxy) = state.proxy.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match proxy.forward(method, query.as_deref(), Some(body)).await {
        Ok(relayed) => (
            StatusCode::from_u16(relayed.status).unwrap_or(StatusCode::BAD_GATEWAY),
            [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            relayed.body,
        )
            .into_response(),
        Err(e) => {
            let reason = match e {
                StoreError::Upstream(message) => message,
                other => other.to_string(),
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new(format!("Proxy request failed: {reason}"))),
            )
                .into_response()
        }
    }
}

/// Allow any origin; preflights advertise GET, POST and OPTIONS with a
/// `Content-Type` header.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Create the application router.
///
/// This is separated from `main()` to allow testing.
pub fn create_router(state: AppState) -> Router {
    let sheets: MethodRouter<AppState> = get(read_sheet)
        .post(write_action)
        .fallback(method_not_allowed);

    let mut router = Router::new()
        .route("/health", get(health))
        .route("/", sheets.clone())
        .route("/sheets", sheets);
    if state.proxy.is_some() {
        router = router.route("/script", any(forward_script));
    }

    router
        .layer(cors())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state)
}
