//! Write requests, validated at the boundary into a tagged union.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use sheetbase_core::{cell_text, Record, StoreError, StoreResult};

use crate::cascade::SaleDeletion;
use crate::integrity::ProductDeletion;
use crate::schema::Schema;

/// Message returned for an unrecognised action name.
pub const UNKNOWN_ACTION: &str = "Ação desconhecida.";

/// Raw `{action, payload}` body of a write request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub payload: Value,
}

/// A validated write request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Append a sale and its line items.
    SaveSale { sale: Record, items: Vec<Record> },
    /// Append a product.
    CreateProduct(Record),
    /// Overwrite a product, located by its id.
    UpdateProduct { id: String, product: Record },
    /// Overwrite a sale, optionally replacing its line items.
    UpdateSale {
        id: String,
        sale: Record,
        items: Option<Vec<Record>>,
    },
    /// Soft- or hard-delete a product.
    DeleteProduct { product_id: String },
    /// Delete a sale and its line items.
    DeleteSale { sale_id: String },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveSalePayload {
    nova_venda: Map<String, Value>,
    #[serde(default)]
    itens_carrinho: Vec<Map<String, Value>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductIdPayload {
    #[serde(deserialize_with = "id_text")]
    product_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaleIdPayload {
    #[serde(deserialize_with = "id_text")]
    sale_id: String,
}

/// Accept ids sent either as strings or as numbers. Blank ids are refused:
/// they would match every row with an empty id cell.
fn id_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(ref s) if s.trim().is_empty() => {
            Err(serde::de::Error::custom("id must not be empty"))
        }
        Value::String(_) | Value::Number(_) => Ok(cell_text(&value)),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}

impl Action {
    /// Validate a raw request into an action.
    ///
    /// # Example
    /// ```
    /// use sheetbase_table::{Action, ActionRequest, Schema};
    ///
    /// let request: ActionRequest =
    ///     serde_json::from_str(r#"{"action":"deleteSale","payload":{"saleId":"v1"}}"#).unwrap();
    /// let action = Action::parse(request, &Schema::default()).unwrap();
    /// assert_eq!(action, Action::DeleteSale { sale_id: "v1".into() });
    /// ```
    pub fn parse(request: ActionRequest, schema: &Schema) -> StoreResult<Self> {
        let name = request
            .action
            .filter(|a| !a.is_empty())
            .ok_or_else(|| StoreError::validation("Parâmetro 'action' é obrigatório."))?;
        let payload = request.payload;

        let action = match name.as_str() {
            "saveSale" => {
                let p: SaveSalePayload = decode(&name, payload)?;
                Self::SaveSale {
                    sale: Record::from_json(&p.nova_venda),
                    items: p.itens_carrinho.iter().map(Record::from_json).collect(),
                }
            }
            "createProduct" => Self::CreateProduct(Record::from_json(&object(&name, &payload)?)),
            "updateProduct" => {
                let product = Record::from_json(&object(&name, &payload)?);
                let id = required_id(&product, &schema.product_id)?;
                Self::UpdateProduct { id, product }
            }
            "updateSale" => {
                let mut fields = object(&name, &payload)?;
                let items = match fields.remove("itensCarrinho") {
                    None | Some(Value::Null) => None,
                    Some(value) => {
                        let items: Vec<Map<String, Value>> = decode(&name, value)?;
                        Some(items.iter().map(Record::from_json).collect())
                    }
                };
                let sale = Record::from_json(&fields);
                let id = required_id(&sale, &schema.sale_id)?;
                Self::UpdateSale { id, sale, items }
            }
            "deleteProduct" | "handleDeleteProduct" => {
                let p: ProductIdPayload = decode(&name, payload)?;
                Self::DeleteProduct {
                    product_id: p.product_id,
                }
            }
            "deleteSale" => {
                let p: SaleIdPayload = decode(&name, payload)?;
                Self::DeleteSale { sale_id: p.sale_id }
            }
            _ => return Err(StoreError::validation(UNKNOWN_ACTION)),
        };
        Ok(action)
    }

    /// The wire name of the action.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SaveSale { .. } => "saveSale",
            Self::CreateProduct(_) => "createProduct",
            Self::UpdateProduct { .. } => "updateProduct",
            Self::UpdateSale { .. } => "updateSale",
            Self::DeleteProduct { .. } => "deleteProduct",
            Self::DeleteSale { .. } => "deleteSale",
        }
    }
}

fn decode<T: DeserializeOwned>(action: &str, payload: Value) -> StoreResult<T> {
    serde_json::from_value(payload)
        .map_err(|e| StoreError::validation(format!("Payload inválido para '{action}': {e}")))
}

fn object(action: &str, payload: &Value) -> StoreResult<Map<String, Value>> {
    payload.as_object().cloned().ok_or_else(|| {
        StoreError::validation(format!("Payload inválido para '{action}': esperado um objeto."))
    })
}

fn required_id(record: &Record, column: &str) -> StoreResult<String> {
    match record.get(column) {
        Some(id) if !id.trim().is_empty() => Ok(id.to_string()),
        _ => Err(StoreError::validation(format!("O campo '{column}' é obrigatório."))),
    }
}

/// Detail of a completed deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Deletion {
    Product { mode: ProductDeletion },
    Sale(SaleDeletion),
}

/// JSON body returned for a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionReply {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion: Option<Deletion>,
}

impl ActionReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            deletion: None,
        }
    }

    #[must_use]
    pub fn with_deletion(mut self, deletion: Deletion) -> Self {
        self.deletion = Some(deletion);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> StoreResult<Action> {
        let request: ActionRequest = serde_json::from_value(body).unwrap();
        Action::parse(request, &Schema::default())
    }

    fn message(err: StoreError) -> String {
        match err {
            StoreError::Validation(message) => message,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_action() {
        let err = parse(json!({"action": "doesNotExist"})).unwrap_err();
        assert_eq!(message(err), "Ação desconhecida.");
    }

    #[test]
    fn test_missing_action() {
        let err = parse(json!({"payload": {}})).unwrap_err();
        assert_eq!(message(err), "Parâmetro 'action' é obrigatório.");
    }

    #[test]
    fn test_save_sale() {
        let action = parse(json!({
            "action": "saveSale",
            "payload": {
                "novaVenda": {"Venda_ID": "v1", "Total": 30},
                "itensCarrinho": [
                    {"Venda_Ref": "v1", "Produto_Ref": "p1", "Qtd": 2},
                    {"Venda_Ref": "v1", "Produto_Ref": "p2", "Qtd": 1}
                ]
            }
        }))
        .unwrap();

        let Action::SaveSale { sale, items } = action else {
            panic!("expected SaveSale");
        };
        assert_eq!(sale.get("Total"), Some("30"));
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].get("Produto_Ref"), Some("p2"));
    }

    #[test]
    fn test_save_sale_requires_nova_venda() {
        let err = parse(json!({"action": "saveSale", "payload": {"itensCarrinho": []}})).unwrap_err();
        assert!(message(err).starts_with("Payload inválido para 'saveSale'"));
    }

    #[test]
    fn test_update_product_requires_id() {
        let err = parse(json!({"action": "updateProduct", "payload": {"Nome": "x"}})).unwrap_err();
        assert_eq!(message(err), "O campo 'Produto_ID' é obrigatório.");
    }

    #[test]
    fn test_update_sale_with_items() {
        let action = parse(json!({
            "action": "updateSale",
            "payload": {"Venda_ID": 7, "Total": "10", "itensCarrinho": [{"Produto_Ref": "p1"}]}
        }))
        .unwrap();

        let Action::UpdateSale { id, sale, items } = action else {
            panic!("expected UpdateSale");
        };
        assert_eq!(id, "7");
        assert_eq!(sale.get("itensCarrinho"), None);
        assert_eq!(items.unwrap().len(), 1);
    }

    #[test]
    fn test_update_sale_without_items() {
        let action = parse(json!({"action": "updateSale", "payload": {"Venda_ID": "v1"}})).unwrap();
        assert!(matches!(action, Action::UpdateSale { items: None, .. }));
    }

    #[test]
    fn test_delete_product_aliases() {
        for name in ["deleteProduct", "handleDeleteProduct"] {
            let action = parse(json!({"action": name, "payload": {"productId": 12}})).unwrap();
            assert_eq!(
                action,
                Action::DeleteProduct {
                    product_id: "12".into()
                }
            );
        }
    }

    #[test]
    fn test_delete_sale_rejects_bad_id() {
        let err = parse(json!({"action": "deleteSale", "payload": {"saleId": [1]}})).unwrap_err();
        assert!(message(err).contains("deleteSale"));
    }

    #[test]
    fn test_delete_actions_reject_blank_ids() {
        for body in [
            json!({"action": "deleteSale", "payload": {"saleId": ""}}),
            json!({"action": "deleteSale", "payload": {"saleId": "  "}}),
            json!({"action": "deleteProduct", "payload": {"productId": ""}}),
            json!({"action": "handleDeleteProduct", "payload": {"productId": " "}}),
        ] {
            let err = parse(body).unwrap_err();
            assert!(message(err).contains("id must not be empty"));
        }
    }

    #[test]
    fn test_update_sale_rejects_blank_id() {
        let err = parse(json!({"action": "updateSale", "payload": {"Venda_ID": " "}})).unwrap_err();
        assert_eq!(message(err), "O campo 'Venda_ID' é obrigatório.");
    }

    #[test]
    fn test_reply_serialization() {
        let reply = ActionReply::ok("ok").with_deletion(Deletion::Product {
            mode: ProductDeletion::Soft,
        });
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"success": true, "message": "ok", "deletion": {"kind": "product", "mode": "soft"}})
        );
        assert_eq!(
            serde_json::to_value(ActionReply::ok("x")).unwrap(),
            json!({"success": true, "message": "x"})
        );
    }
}
