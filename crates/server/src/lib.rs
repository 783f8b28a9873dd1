//! # sheetbase-server
//!
//! HTTP server exposing a Google spreadsheet as a sales/inventory store.

/// Flags and environment.
pub mod config;
/// Error responses.
pub mod error;
/// Router and handlers.
pub mod routes;

pub use config::Config;
pub use error::{ApiError, ErrorBody, UPSTREAM_MESSAGE};
pub use routes::{create_router, health, AppState, Health};
