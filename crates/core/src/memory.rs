//! In-process [`SheetStore`], used for local runs and tests.
//!
//! Mirrors the observable behaviour of the hosted service closely enough for
//! the adapter and helpers: trailing empty cells are not returned, appends go
//! after the last row, and a batch of deletions is applied in order and either
//! fully succeeds or leaves the sheets untouched.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::a1::SheetRange;
use crate::error::{StoreError, StoreResult};
use crate::store::{RowDeletion, SheetStore};

#[derive(Debug, Clone)]
struct MemorySheet {
    id: i64,
    rows: Vec<Vec<String>>,
}

/// A spreadsheet held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sheets: Mutex<IndexMap<String, MemorySheet>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemoryStore::add_sheet`].
    ///
    /// # Example
    /// ```
    /// use sheetbase_core::MemoryStore;
    ///
    /// let store = MemoryStore::new()
    ///     .with_sheet("produtos", [["Produto_ID", "Nome"], ["p1", "Widget"]]);
    /// assert_eq!(store.rows("produtos").unwrap().len(), 2);
    /// ```
    #[must_use]
    pub fn with_sheet<R, C, S>(self, name: &str, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_sheet(name, rows);
        self
    }

    /// Add (or replace) a sheet. Sheet ids are assigned in creation order
    /// starting at 0.
    pub fn add_sheet<R, C, S>(&self, name: &str, rows: R)
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        let mut sheets = self.sheets.lock().unwrap_or_else(|e| e.into_inner());
        let id = sheets
            .get(name)
            .map_or(sheets.len() as i64, |existing| existing.id);
        sheets.insert(name.to_string(), MemorySheet { id, rows });
    }

    /// Snapshot of a sheet's rows, exactly as stored.
    pub fn rows(&self, sheet: &str) -> Option<Vec<Vec<String>>> {
        let sheets = self.sheets.lock().unwrap_or_else(|e| e.into_inner());
        sheets.get(sheet).map(|s| s.rows.clone())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, IndexMap<String, MemorySheet>>> {
        self.sheets
            .lock()
            .map_err(|_| StoreError::Internal("memory store lock poisoned".to_string()))
    }
}

/// Drop trailing empty cells of each row and trailing empty rows.
fn trimmed(rows: impl Iterator<Item = Vec<String>>) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = rows
        .map(|mut row| {
            while row.last().is_some_and(String::is_empty) {
                row.pop();
            }
            row
        })
        .collect();
    while rows.last().is_some_and(Vec::is_empty) {
        rows.pop();
    }
    rows
}

#[async_trait]
impl SheetStore for MemoryStore {
    async fn get_values(&self, range: &str) -> StoreResult<Vec<Vec<String>>> {
        let parsed = SheetRange::parse(range)?;
        let sheets = self.lock()?;
        let sheet = sheets
            .get(&parsed.sheet)
            .ok_or_else(|| StoreError::RangeNotFound(range.to_string()))?;

        let values = match parsed.cells {
            None => trimmed(sheet.rows.iter().cloned()),
            Some(((start_row, start_col), (end_row, end_col))) => trimmed(
                sheet
                    .rows
                    .iter()
                    .skip(start_row)
                    .take(end_row - start_row + 1)
                    .map(|row| {
                        row.iter()
                            .skip(start_col)
                            .take(end_col - start_col + 1)
                            .cloned()
                            .collect()
                    }),
            ),
        };
        tracing::debug!(range, rows = values.len(), "memory get");
        Ok(values)
    }

    async fn append_row(&self, sheet: &str, row: Vec<String>) -> StoreResult<()> {
        let mut sheets = self.lock()?;
        let target = sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::RangeNotFound(sheet.to_string()))?;
        // Appends land after the last non-empty row, like the hosted API.
        let keep = target
            .rows
            .iter()
            .rposition(|r| r.iter().any(|c| !c.is_empty()))
            .map_or(0, |last| last + 1);
        target.rows.truncate(keep);
        target.rows.push(row);
        Ok(())
    }

    async fn update_row(&self, range: &str, row: Vec<String>) -> StoreResult<()> {
        let parsed = SheetRange::parse(range)?;
        let mut sheets = self.lock()?;
        let target = sheets
            .get_mut(&parsed.sheet)
            .ok_or_else(|| StoreError::RangeNotFound(range.to_string()))?;

        let (row_index, col_index) = parsed.cells.map_or((0, 0), |(start, _)| start);
        if target.rows.len() <= row_index {
            target.rows.resize(row_index + 1, Vec::new());
        }
        let cells = &mut target.rows[row_index];
        if cells.len() < col_index + row.len() {
            cells.resize(col_index + row.len(), String::new());
        }
        for (offset, value) in row.into_iter().enumerate() {
            cells[col_index + offset] = value;
        }
        Ok(())
    }

    async fn sheet_id(&self, sheet: &str) -> StoreResult<i64> {
        let sheets = self.lock()?;
        sheets
            .get(sheet)
            .map(|s| s.id)
            .ok_or_else(|| StoreError::RangeNotFound(sheet.to_string()))
    }

    async fn delete_rows(&self, deletions: Vec<RowDeletion>) -> StoreResult<()> {
        let mut sheets = self.lock()?;
        let mut staged = sheets.clone();

        for deletion in &deletions {
            let sheet = staged
                .values_mut()
                .find(|s| s.id == deletion.sheet_id)
                .ok_or_else(|| {
                    StoreError::upstream(format!("No grid with id: {}", deletion.sheet_id))
                })?;
            if deletion.start_index >= deletion.end_index || deletion.end_index > sheet.rows.len()
            {
                return Err(StoreError::upstream(format!(
                    "Invalid row range [{}, {}) for sheet {} with {} rows",
                    deletion.start_index,
                    deletion.end_index,
                    deletion.sheet_id,
                    sheet.rows.len()
                )));
            }
            sheet.rows.drain(deletion.start_index..deletion.end_index);
        }

        *sheets = staged;
        tracing::debug!(count = deletions.len(), "memory batch delete");
        Ok(())
    }
}
