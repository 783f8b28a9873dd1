//! Server configuration, read once at start-up from flags or environment.

use std::sync::Arc;

use clap::Parser;
use sheetbase_core::{MemoryStore, SheetStore, StoreError, StoreResult};
use sheetbase_http::{
    build_client, ScriptProxy, ServiceAccount, ServiceAccountAuth, SheetsClient,
    ValueInputOption, GOOGLE_TOKEN_URI, SHEETS_API_BASE, SPREADSHEETS_SCOPE,
};
use sheetbase_table::Schema;

/// sheetbase-server - a spreadsheet-backed store for sales and inventory
#[derive(Debug, Clone, Parser)]
#[command(name = "sheetbase-server")]
#[command(version, about = "Serves a Google spreadsheet as a small sales/inventory store", long_about = None)]
pub struct Config {
    /// Spreadsheet identifier (from the spreadsheet URL)
    #[arg(long, env = "SPREADSHEET_ID", required_unless_present = "memory")]
    pub spreadsheet_id: Option<String>,

    /// Service-account email
    #[arg(long, env = "GOOGLE_CLIENT_EMAIL", required_unless_present = "memory")]
    pub client_email: Option<String>,

    /// Service-account private key (PEM, `\n` escapes allowed)
    #[arg(
        long,
        env = "GOOGLE_PRIVATE_KEY",
        hide_env_values = true,
        required_unless_present = "memory"
    )]
    pub private_key: Option<String>,

    /// OAuth scope requested for the service account
    #[arg(long, env = "GOOGLE_SHEETS_SCOPE", default_value = SPREADSHEETS_SCOPE)]
    pub scope: String,

    /// OAuth token endpoint
    #[arg(long, env = "GOOGLE_TOKEN_URI", default_value = GOOGLE_TOKEN_URI)]
    pub token_uri: String,

    /// Sheets API base URL
    #[arg(long, env = "SHEETS_API_BASE", default_value = SHEETS_API_BASE)]
    pub api_base: String,

    /// How written values are interpreted (user-entered or raw)
    #[arg(long, env = "SHEETS_VALUE_INPUT", default_value = "user-entered")]
    pub value_input: ValueInputOption,

    /// Per-request timeout for storage calls, in seconds
    #[arg(long, env = "SHEETS_TIMEOUT_SECS", default_value_t = sheetbase_http::DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Address to listen on
    #[arg(long, env = "SHEETBASE_BIND", default_value = "0.0.0.0:3000")]
    pub bind: String,

    /// Google Apps Script web app to expose under /script
    #[arg(long, env = "GOOGLE_SCRIPT_URL")]
    pub script_url: Option<String>,

    /// Answer validation failures with 400 and lookups with 404 instead of 500
    #[arg(long, env = "SHEETBASE_STRICT_STATUS")]
    pub strict_status: bool,

    /// Serve from an in-memory spreadsheet instead of Google Sheets
    #[arg(long, env = "SHEETBASE_MEMORY")]
    pub memory: bool,

    /// Products sheet name
    #[arg(long, env = "SHEETBASE_PRODUCTS_SHEET", default_value = "produtos")]
    pub products_sheet: String,

    /// Sales sheet name
    #[arg(long, env = "SHEETBASE_SALES_SHEET", default_value = "vendas")]
    pub sales_sheet: String,

    /// Sale line-items sheet name
    #[arg(long, env = "SHEETBASE_ITEMS_SHEET", default_value = "itens_venda")]
    pub items_sheet: String,
}

impl Config {
    /// Sheet and column names, with the configured sheet names applied.
    pub fn schema(&self) -> Schema {
        Schema {
            products: self.products_sheet.clone(),
            sales: self.sales_sheet.clone(),
            items: self.items_sheet.clone(),
            ..Schema::default()
        }
    }

    /// Build the storage backend this configuration describes.
    pub fn build_store(&self) -> StoreResult<Arc<dyn SheetStore>> {
        if self.memory {
            return Ok(Arc::new(seeded_memory_store(&self.schema())));
        }

        let spreadsheet_id = required(self.spreadsheet_id.as_deref(), "SPREADSHEET_ID")?;
        let client_email = required(self.client_email.as_deref(), "GOOGLE_CLIENT_EMAIL")?;
        let private_key = required(self.private_key.as_deref(), "GOOGLE_PRIVATE_KEY")?;

        let client = build_client(self.timeout_secs)?;
        let account = ServiceAccount::new(client_email, private_key)
            .with_scope(&self.scope)
            .with_token_uri(&self.token_uri);
        let auth = ServiceAccountAuth::new(account, client.clone())?;

        let sheets = SheetsClient::new(client, spreadsheet_id, Arc::new(auth))?
            .with_base_url(&self.api_base)?
            .with_value_input(self.value_input);
        Ok(Arc::new(sheets))
    }

    /// The Apps Script forwarder, when a script URL is configured.
    pub fn script_proxy(&self) -> StoreResult<Option<ScriptProxy>> {
        self.script_url
            .as_deref()
            .map(|url| ScriptProxy::new(build_client(self.timeout_secs)?, url))
            .transpose()
    }
}

fn required<'a>(value: Option<&'a str>, name: &str) -> StoreResult<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StoreError::Config(format!("{name} is not set")))
}

/// An in-memory spreadsheet with header rows for the three sheets.
fn seeded_memory_store(schema: &Schema) -> MemoryStore {
    MemoryStore::new()
        .with_sheet(
            &schema.products,
            [[
                schema.product_id.as_str(),
                "Nome",
                "Preco",
                "Estoque",
                schema.status.as_str(),
            ]],
        )
        .with_sheet(
            &schema.sales,
            [[schema.sale_id.as_str(), "Data", "Cliente", "Total"]],
        )
        .with_sheet(
            &schema.items,
            [[
                "Item_ID",
                schema.item_sale_ref.as_str(),
                schema.item_product_ref.as_str(),
                "Quantidade",
                "Preco_Unitario",
            ]],
        )
}
