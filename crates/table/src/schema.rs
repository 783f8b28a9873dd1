//! Names of the sheets and columns the application logic depends on.

/// Sheet and column names for the sales/inventory tables.
///
/// Records are identified by the value in the first column of their sheet;
/// the id column names here are used to read ids out of request payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub products: String,
    pub sales: String,
    pub items: String,
    /// Product id column (`Produto_ID`).
    pub product_id: String,
    /// Sale id column (`Venda_ID`).
    pub sale_id: String,
    /// Product status column used for soft deletes.
    pub status: String,
    /// Status value marking a soft-deleted product.
    pub inactive: String,
    /// Line-item column referencing a product.
    pub item_product_ref: String,
    /// Line-item column referencing a sale.
    pub item_sale_ref: String,
    /// 0-based column holding record ids in every sheet.
    pub id_column: usize,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            products: "produtos".to_string(),
            sales: "vendas".to_string(),
            items: "itens_venda".to_string(),
            product_id: "Produto_ID".to_string(),
            sale_id: "Venda_ID".to_string(),
            status: "Status".to_string(),
            inactive: "Inativo".to_string(),
            item_product_ref: "Produto_Ref".to_string(),
            item_sale_ref: "Venda_Ref".to_string(),
            id_column: 0,
        }
    }
}
