//! # sheetbase-table
//!
//! Treats the sheets of a spreadsheet as tables of [`Record`]s and layers the
//! sales/inventory rules on top:
//! - [`Tables`]: header-aware reads, appends, row updates and lookups
//! - [`delete_product`]: soft delete for products that appear in sales
//! - [`delete_sale`]: removes a sale and its line items in one batch
//! - [`Action`] and [`dispatch`]: the write requests the HTTP layer accepts
//!
//! [`Record`]: sheetbase_core::Record

mod action;
mod cascade;
mod dispatch;
mod integrity;
mod schema;
mod table;

pub use action::{Action, ActionReply, ActionRequest, Deletion, UNKNOWN_ACTION};
pub use cascade::{delete_sale, DeletePlan, SaleDeletion};
pub use dispatch::dispatch;
pub use integrity::{delete_product, is_product_sold, ProductDeletion};
pub use schema::Schema;
pub use table::{FoundRecord, Tables};
