//! Deleting a sale together with its line items.
//!
//! Structural deletes address rows by position, and removing a row shifts
//! every row below it up by one. All deletions therefore run bottom-up within
//! each sheet, so no pending deletion is moved by an earlier one.

use serde::Serialize;
use sheetbase_core::{RowDeletion, StoreError, StoreResult};

use crate::schema::Schema;
use crate::table::Tables;

/// A batch of row deletions that executes safely in a single call.
#[derive(Debug, Default, Clone)]
pub struct DeletePlan {
    deletions: Vec<RowDeletion>,
}

impl DeletePlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule removal of the row at 1-based `row_number`.
    pub fn add_row(&mut self, sheet_id: i64, row_number: usize) {
        self.deletions.push(RowDeletion::row(sheet_id, row_number));
    }

    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deletions.len()
    }

    /// Deletions grouped by sheet, each sheet's rows in descending order.
    /// Duplicate rows are scheduled once.
    ///
    /// # Example
    /// ```
    /// use sheetbase_table::DeletePlan;
    ///
    /// let mut plan = DeletePlan::new();
    /// plan.add_row(0, 2);
    /// plan.add_row(0, 5);
    /// let starts: Vec<_> = plan.into_ordered().iter().map(|d| d.start_index).collect();
    /// assert_eq!(starts, vec![4, 1]);
    /// ```
    pub fn into_ordered(mut self) -> Vec<RowDeletion> {
        self.deletions.sort_by(|a, b| {
            a.sheet_id
                .cmp(&b.sheet_id)
                .then(b.start_index.cmp(&a.start_index))
        });
        self.deletions.dedup();
        self.deletions
    }
}

/// What a sale deletion removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDeletion {
    /// Whether the sale row itself was still present.
    pub sale_found: bool,
    /// Line-item rows removed.
    pub items_removed: usize,
}

/// Delete sale `sale_id` and every line item referencing it, in one batch.
///
/// A missing sale row is not an error: the row may already be gone, and any
/// line items still pointing at it are removed anyway. Positions come from
/// reads made just before the batch; a concurrent edit in between can still
/// shift them.
pub async fn delete_sale(
    tables: &Tables,
    schema: &Schema,
    sale_id: &str,
) -> StoreResult<SaleDeletion> {
    if sale_id.trim().is_empty() {
        return Err(StoreError::validation("O identificador da venda é obrigatório."));
    }
    let store = tables.store();
    let sales_sheet_id = store.sheet_id(&schema.sales).await?;
    let items_sheet_id = store.sheet_id(&schema.items).await?;

    let sale = tables
        .find_record_by_id(&schema.sales, sale_id, schema.id_column)
        .await?;
    let item_rows = tables
        .find_rows_where(&schema.items, &schema.item_sale_ref, sale_id)
        .await?;

    let mut plan = DeletePlan::new();
    if let Some(found) = &sale {
        plan.add_row(sales_sheet_id, found.row_number);
    } else {
        tracing::warn!(sale_id, "sale row not found, removing line items only");
    }
    for &row_number in &item_rows {
        plan.add_row(items_sheet_id, row_number);
    }

    let outcome = SaleDeletion {
        sale_found: sale.is_some(),
        items_removed: item_rows.len(),
    };
    if plan.is_empty() {
        return Ok(outcome);
    }

    store.delete_rows(plan.into_ordered()).await?;
    tracing::info!(
        sale_id,
        sale_found = outcome.sale_found,
        items_removed = outcome.items_removed,
        "sale deleted"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_orders_descending_per_sheet() {
        let mut plan = DeletePlan::new();
        plan.add_row(1, 3);
        plan.add_row(0, 2);
        plan.add_row(1, 7);
        plan.add_row(0, 4);

        let ordered: Vec<_> = plan
            .into_ordered()
            .into_iter()
            .map(|d| (d.sheet_id, d.start_index))
            .collect();
        assert_eq!(ordered, vec![(0, 3), (0, 1), (1, 6), (1, 2)]);
    }

    #[test]
    fn test_plan_dedups_rows() {
        let mut plan = DeletePlan::new();
        plan.add_row(0, 2);
        plan.add_row(0, 2);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.into_ordered().len(), 1);
    }

    #[test]
    fn test_sale_deletion_serializes_camel_case() {
        let json = serde_json::to_value(SaleDeletion {
            sale_found: true,
            items_removed: 2,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"saleFound": true, "itemsRemoved": 2}));
    }
}
