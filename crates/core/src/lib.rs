//! # sheetbase-core
//!
//! Core types for treating a spreadsheet as a small relational store.
//!
//! This crate provides:
//! - Error types
//! - [`Record`], the header-keyed view over a row
//! - A1 range notation helpers
//! - The [`SheetStore`] storage trait and an in-memory implementation

/// A1 range notation.
pub mod a1;
/// Error types and result aliases.
pub mod error;
/// In-memory spreadsheet.
pub mod memory;
/// Header-keyed records.
pub mod record;
/// The storage trait.
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use record::{cell_text, Record};
pub use store::{RowDeletion, SheetStore};
