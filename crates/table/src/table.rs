//! Row-oriented CRUD over a [`SheetStore`].
//!
//! The first row of a sheet names its columns. Reads zip every later row with
//! that header into a [`Record`]; writes project a record back onto a header
//! order. Rows are addressed by their 1-based row number (the header is row 1),
//! which is the only identity a sheet offers. A row number is only valid until
//! the next structural change to the sheet, so callers look it up right before
//! writing.

use std::sync::Arc;

use sheetbase_core::a1::row_range;
use sheetbase_core::{Record, SheetStore, StoreError, StoreResult};

use crate::cascade::DeletePlan;

/// A record located by [`Tables::find_record_by_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundRecord {
    /// 1-based row number; the first data row is 2.
    pub row_number: usize,
    /// The sheet's header row at the time of the lookup.
    pub headers: Vec<String>,
    /// The row's cells as read, possibly shorter than the header.
    pub cells: Vec<String>,
    pub record: Record,
}

/// Header-aware access to the sheets of one spreadsheet.
#[derive(Clone)]
pub struct Tables {
    store: Arc<dyn SheetStore>,
}

/// Header row and data rows of a sheet.
struct Grid {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Tables {
    pub fn new(store: Arc<dyn SheetStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &dyn SheetStore {
        self.store.as_ref()
    }

    async fn grid(&self, range: &str) -> StoreResult<Grid> {
        let mut rows = self.store.get_values(range).await?;
        if rows.is_empty() {
            return Ok(Grid {
                headers: Vec::new(),
                rows,
            });
        }
        let headers = rows.remove(0);
        Ok(Grid { headers, rows })
    }

    /// Read a sheet (or range) as records keyed by its first row.
    ///
    /// A sheet with no rows, or only a header row, yields no records.
    pub async fn read_table(&self, range: &str) -> StoreResult<Vec<Record>> {
        let grid = self.grid(range).await?;
        let records: Vec<Record> = grid
            .rows
            .iter()
            .map(|row| Record::from_row(&grid.headers, row))
            .collect();
        tracing::debug!(range, records = records.len(), "read table");
        Ok(records)
    }

    /// The header row of a sheet, in column order.
    pub async fn header_row(&self, sheet: &str) -> StoreResult<Vec<String>> {
        Ok(self.grid(sheet).await?.headers)
    }

    /// Append `record` as the new last row, projected onto `headers`.
    pub async fn append_record(
        &self,
        sheet: &str,
        record: &Record,
        headers: &[String],
    ) -> StoreResult<()> {
        if headers.is_empty() {
            return Err(missing_header(sheet));
        }
        self.store.append_row(sheet, record.to_row(headers)).await?;
        tracing::debug!(sheet, "appended record");
        Ok(())
    }

    /// Overwrite the full row at `row_number` with `record` projected onto
    /// `headers`.
    ///
    /// A stale row number silently overwrites whatever row now sits there.
    pub async fn update_record_at(
        &self,
        sheet: &str,
        row_number: usize,
        record: &Record,
        headers: &[String],
    ) -> StoreResult<()> {
        self.write_row(sheet, row_number, record.to_row(headers)).await
    }

    /// Overwrite a row found by [`Tables::find_record_by_id`] with `record`.
    ///
    /// Like [`Tables::update_record_at`], except that columns the record
    /// cannot address (empty or repeated headers) keep their current cells.
    pub async fn rewrite_found(
        &self,
        sheet: &str,
        found: &FoundRecord,
        record: &Record,
    ) -> StoreResult<()> {
        self.write_row(
            sheet,
            found.row_number,
            record.to_row_over(&found.headers, &found.cells),
        )
        .await
    }

    async fn write_row(&self, sheet: &str, row_number: usize, row: Vec<String>) -> StoreResult<()> {
        if row_number < 2 {
            return Err(StoreError::validation(format!(
                "Linha inválida para atualização: {row_number}"
            )));
        }
        if row.is_empty() {
            return Err(missing_header(sheet));
        }
        let range = row_range(sheet, row_number, row.len());
        self.store.update_row(&range, row).await?;
        tracing::debug!(sheet, row_number, "updated record");
        Ok(())
    }

    /// Find the first record whose cell in `id_column` equals `id`.
    pub async fn find_record_by_id(
        &self,
        sheet: &str,
        id: &str,
        id_column: usize,
    ) -> StoreResult<Option<FoundRecord>> {
        let grid = self.grid(sheet).await?;
        let found = grid
            .rows
            .iter()
            .position(|row| row.get(id_column).is_some_and(|cell| cell == id))
            .map(|index| FoundRecord {
                row_number: index + 2,
                record: Record::from_row(&grid.headers, &grid.rows[index]),
                headers: grid.headers.clone(),
                cells: grid.rows[index].clone(),
            });
        Ok(found)
    }

    /// Row numbers of every record whose `column` equals `value`.
    pub async fn find_rows_where(
        &self,
        sheet: &str,
        column: &str,
        value: &str,
    ) -> StoreResult<Vec<usize>> {
        let grid = self.grid(sheet).await?;
        let Some(col) = grid.headers.iter().position(|h| h == column) else {
            return Ok(Vec::new());
        };
        Ok(grid
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.get(col).is_some_and(|cell| cell == value))
            .map(|(index, _)| index + 2)
            .collect())
    }

    /// Structurally delete rows of one sheet in a single batch.
    ///
    /// Returns the number of rows removed. An empty list makes no call. Row
    /// numbers below 2 would remove the header and are refused.
    pub async fn delete_rows(&self, sheet: &str, row_numbers: &[usize]) -> StoreResult<usize> {
        if row_numbers.is_empty() {
            return Ok(0);
        }
        if let Some(&row_number) = row_numbers.iter().find(|&&n| n < 2) {
            return Err(StoreError::validation(format!(
                "Linha inválida para remoção: {row_number}"
            )));
        }
        let sheet_id = self.store.sheet_id(sheet).await?;
        let mut plan = DeletePlan::new();
        for &row_number in row_numbers {
            plan.add_row(sheet_id, row_number);
        }
        let deletions = plan.into_ordered();
        let count = deletions.len();
        self.store.delete_rows(deletions).await?;
        tracing::debug!(sheet, count, "deleted rows");
        Ok(count)
    }
}

fn missing_header(sheet: &str) -> StoreError {
    StoreError::validation(format!("A aba '{sheet}' não possui linha de cabeçalho."))
}
