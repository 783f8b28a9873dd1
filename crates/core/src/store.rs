//! The storage seam: what the spreadsheet service has to offer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// One structural row deletion, addressed by internal sheet id.
///
/// Indices are zero-based and half-open: `[start_index, end_index)`. Row 1
/// of the sheet (the header) is index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowDeletion {
    pub sheet_id: i64,
    pub start_index: usize,
    pub end_index: usize,
}

impl RowDeletion {
    /// Deletion of a single row given its 1-based row number.
    pub fn row(sheet_id: i64, row_number: usize) -> Self {
        let start_index = row_number.saturating_sub(1);
        Self {
            sheet_id,
            start_index,
            end_index: start_index + 1,
        }
    }
}

/// A spreadsheet reachable by range-addressed reads and writes.
///
/// Every call goes straight to the backing service; implementations keep no
/// cache of sheet contents or metadata.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Read a range as rows of cell text. Trailing empty cells may be
    /// omitted, so rows can be shorter than the header.
    async fn get_values(&self, range: &str) -> StoreResult<Vec<Vec<String>>>;

    /// Append a row after the last row of `sheet`.
    async fn append_row(&self, sheet: &str, row: Vec<String>) -> StoreResult<()>;

    /// Overwrite the cells of `range` with `row`.
    async fn update_row(&self, range: &str, row: Vec<String>) -> StoreResult<()>;

    /// Resolve a sheet title to its internal numeric id.
    async fn sheet_id(&self, sheet: &str) -> StoreResult<i64>;

    /// Remove rows in one batch, applying the deletions in the given order.
    async fn delete_rows(&self, deletions: Vec<RowDeletion>) -> StoreResult<()>;
}
