//! Product deletion that never orphans sale history.
//!
//! Line items keep a reference to the product they sold. A product that any
//! line item references is soft-deleted by flipping its status column; only
//! products that were never sold are physically removed.

use serde::Serialize;
use sheetbase_core::{RowDeletion, StoreError, StoreResult};

use crate::schema::Schema;
use crate::table::Tables;

/// How a product was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductDeletion {
    /// The row was kept and its status set to the inactive marker.
    Soft,
    /// The row was structurally removed.
    Hard,
}

/// Whether any line item references `product_id`.
pub async fn is_product_sold(
    tables: &Tables,
    schema: &Schema,
    product_id: &str,
) -> StoreResult<bool> {
    let items = tables.read_table(&schema.items).await?;
    Ok(items
        .iter()
        .any(|item| item.get(&schema.item_product_ref) == Some(product_id)))
}

/// Delete a product, softly if it has been sold.
///
/// Fails with [`StoreError::NotFound`] when no product has this id.
pub async fn delete_product(
    tables: &Tables,
    schema: &Schema,
    product_id: &str,
) -> StoreResult<ProductDeletion> {
    if product_id.trim().is_empty() {
        return Err(StoreError::validation("O identificador do produto é obrigatório."));
    }
    let sold = is_product_sold(tables, schema, product_id).await?;

    let found = tables
        .find_record_by_id(&schema.products, product_id, schema.id_column)
        .await?
        .ok_or_else(|| StoreError::not_found("Produto", product_id))?;

    if sold {
        if !found.headers.iter().any(|h| h == &schema.status) {
            return Err(StoreError::validation(format!(
                "A aba '{}' não possui a coluna '{}'.",
                schema.products, schema.status
            )));
        }
        let mut record = found.record.clone();
        record.set(schema.status.clone(), schema.inactive.clone());
        tables.rewrite_found(&schema.products, &found, &record).await?;
        tracing::info!(product_id, row = found.row_number, "product soft-deleted");
        return Ok(ProductDeletion::Soft);
    }

    let sheet_id = tables.store().sheet_id(&schema.products).await?;
    tables
        .store()
        .delete_rows(vec![RowDeletion::row(sheet_id, found.row_number)])
        .await?;
    tracing::info!(product_id, row = found.row_number, "product deleted");
    Ok(ProductDeletion::Hard)
}
