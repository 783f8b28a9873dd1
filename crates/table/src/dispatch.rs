//! Executing validated write actions against the sheets.

use sheetbase_core::{Record, StoreError, StoreResult};

use crate::action::{Action, ActionReply, Deletion};
use crate::cascade::delete_sale;
use crate::integrity::{delete_product, ProductDeletion};
use crate::schema::Schema;
use crate::table::Tables;

/// Run `action`. Storage calls are made one after another; a failure part way
/// through leaves earlier writes in place.
pub async fn dispatch(tables: &Tables, schema: &Schema, action: Action) -> StoreResult<ActionReply> {
    let name = action.name();
    let reply = match action {
        Action::SaveSale { sale, items } => {
            let sale_id = sale.get(&schema.sale_id).unwrap_or_default().to_string();
            let headers = tables.header_row(&schema.sales).await?;
            tables.append_record(&schema.sales, &sale, &headers).await?;
            let count = append_items(tables, schema, &sale_id, &items).await?;
            tracing::info!(sale_id, items = count, "sale saved");
            ActionReply::ok("Venda salva com sucesso!")
        }
        Action::CreateProduct(product) => {
            let headers = tables.header_row(&schema.products).await?;
            tables
                .append_record(&schema.products, &product, &headers)
                .await?;
            tracing::info!(product_id = product.get(&schema.product_id), "product created");
            ActionReply::ok("Produto criado com sucesso!")
        }
        Action::UpdateProduct { id, product } => {
            let found = tables
                .find_record_by_id(&schema.products, &id, schema.id_column)
                .await?
                .ok_or_else(|| StoreError::not_found("Produto", &id))?;
            tables.rewrite_found(&schema.products, &found, &product).await?;
            tracing::info!(product_id = %id, row = found.row_number, "product updated");
            ActionReply::ok("Produto atualizado com sucesso!")
        }
        Action::UpdateSale { id, sale, items } => {
            let found = tables
                .find_record_by_id(&schema.sales, &id, schema.id_column)
                .await?
                .ok_or_else(|| StoreError::not_found("Venda", &id))?;
            tables.rewrite_found(&schema.sales, &found, &sale).await?;
            if let Some(items) = items {
                // Look the old items up again right before removing them.
                let old_rows = tables
                    .find_rows_where(&schema.items, &schema.item_sale_ref, &id)
                    .await?;
                let removed = tables.delete_rows(&schema.items, &old_rows).await?;
                let added = append_items(tables, schema, &id, &items).await?;
                tracing::info!(sale_id = %id, removed, added, "sale items replaced");
            }
            tracing::info!(sale_id = %id, row = found.row_number, "sale updated");
            ActionReply::ok("Venda atualizada com sucesso!")
        }
        Action::DeleteProduct { product_id } => {
            let mode = delete_product(tables, schema, &product_id).await?;
            let message = match mode {
                ProductDeletion::Soft => "Produto inativado, pois possui vendas associadas.",
                ProductDeletion::Hard => "Produto excluído com sucesso!",
            };
            ActionReply::ok(message).with_deletion(Deletion::Product { mode })
        }
        Action::DeleteSale { sale_id } => {
            let outcome = delete_sale(tables, schema, &sale_id).await?;
            ActionReply::ok("Venda e itens associados excluídos com sucesso!")
                .with_deletion(Deletion::Sale(outcome))
        }
    };
    tracing::debug!(action = name, "action completed");
    Ok(reply)
}

/// Append line items, filling in the sale reference where it is missing.
async fn append_items(
    tables: &Tables,
    schema: &Schema,
    sale_id: &str,
    items: &[Record],
) -> StoreResult<usize> {
    if items.is_empty() {
        return Ok(0);
    }
    let headers = tables.header_row(&schema.items).await?;
    for item in items {
        let mut item = item.clone();
        if !sale_id.is_empty() && item.get(&schema.item_sale_ref).unwrap_or_default().is_empty() {
            item.set(schema.item_sale_ref.clone(), sale_id);
        }
        tables.append_record(&schema.items, &item, &headers).await?;
    }
    Ok(items.len())
}
