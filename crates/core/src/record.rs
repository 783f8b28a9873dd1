//! Records: header-keyed views over spreadsheet rows.
//!
//! A sheet stores every cell as text. The first row names the columns and each
//! later row becomes a [`Record`] by zipping it positionally with that header.
//! The write path goes the other way and projects a record back onto a header
//! order, filling unknown columns with empty strings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered mapping from column name to cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, String>);

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zip a data row with the header row.
    ///
    /// Cells past the end of `row` are absent from the record, and columns
    /// with an empty header are skipped. When a header repeats, the later
    /// column wins.
    ///
    /// # Example
    /// ```
    /// use sheetbase_core::Record;
    ///
    /// let headers = vec!["Produto_ID".to_string(), "Nome".to_string(), "Status".to_string()];
    /// let record = Record::from_row(&headers, &["p1".to_string(), "Widget".to_string()]);
    ///
    /// assert_eq!(record.get("Nome"), Some("Widget"));
    /// assert_eq!(record.get("Status"), None);
    /// ```
    pub fn from_row(headers: &[String], row: &[String]) -> Self {
        headers
            .iter()
            .zip(row)
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| (header.clone(), cell.clone()))
            .collect()
    }

    /// Build a record from a JSON object, rendering every value as cell text.
    pub fn from_json(object: &Map<String, Value>) -> Self {
        object
            .iter()
            .map(|(key, value)| (key.clone(), cell_text(value)))
            .collect()
    }

    /// Project the record onto `headers`; missing keys become empty strings.
    ///
    /// A repeated header receives the same value in every one of its columns.
    /// Use [`Record::to_row_over`] to rewrite an existing row without
    /// clobbering the columns a record cannot address.
    pub fn to_row(&self, headers: &[String]) -> Vec<String> {
        headers
            .iter()
            .map(|header| self.0.get(header).cloned().unwrap_or_default())
            .collect()
    }

    /// Project the record onto `headers` over an existing row.
    ///
    /// Only the columns [`Record::from_row`] reads from are written: a column
    /// with an empty header, or one shadowed by a later column of the same
    /// name, keeps its cell from `base`.
    pub fn to_row_over(&self, headers: &[String], base: &[String]) -> Vec<String> {
        headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                if header.is_empty() || headers[index + 1..].contains(header) {
                    base.get(index).cloned().unwrap_or_default()
                } else {
                    self.0.get(header).cloned().unwrap_or_default()
                }
            })
            .collect()
    }

    /// Get a cell by column name.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// Set a cell, keeping the column's position if it already exists.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    /// Number of populated columns.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no column is populated.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Render a JSON value the way it lands in a spreadsheet cell.
///
/// Strings are kept as-is, `null` becomes an empty cell, and everything else
/// uses its compact JSON text.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
