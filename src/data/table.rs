use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::error::{JatosError, JatosResult};

/// One row of experiment output, keyed by column name in file order.
pub type Record = IndexMap<String, Value>;

/// Row-oriented table of experiment records.
///
/// Rows may carry different keys; the column list is the union of all keys in
/// first-seen order, and missing cells read as `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    columns: IndexSet<String>,
    rows: Vec<Record>,
}

impl DataTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_rows(rows: Vec<Record>) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, row: Record) {
        for key in row.keys() {
            if !self.columns.contains(key) {
                self.columns.insert(key.clone());
            }
        }
        self.rows.push(row);
    }

    /// Removes and returns the first row. Columns are left untouched.
    pub fn remove_first_row(&mut self) -> Option<Record> {
        if self.rows.is_empty() {
            None
        } else {
            Some(self.rows.remove(0))
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    #[must_use]
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Cell at `row`/`column`; `None` when the row is out of range or lacks the key.
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|record| record.get(column))
    }

    /// Rows whose `column` holds the string `value`.
    pub fn rows_where<'a>(
        &'a self,
        column: &'a str,
        value: &'a str,
    ) -> impl Iterator<Item = &'a Record> + 'a {
        self.rows
            .iter()
            .filter(move |record| record.get(column).and_then(Value::as_str) == Some(value))
    }

    /// Rows with every column present, missing cells filled with `null`.
    #[must_use]
    pub fn dense_records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| {
                        let value = row.get(column).cloned().unwrap_or(Value::Null);
                        (column.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }

    pub fn to_json_records_pretty(&self) -> JatosResult<String> {
        serde_json::to_string_pretty(&self.dense_records())
            .map_err(|e| JatosError::InvalidData(format!("failed to serialize table: {e}")))
    }
}
