//! # Record Stores
//!
//! The sheet service persists through the [`RecordStore`] trait: an
//! append-only, spreadsheet-shaped table store. Rows go in and come out as
//! label-keyed maps ([`Row`]) but are held positionally against the table's
//! header list, the way a spreadsheet holds them.
//!
//! Stores enforce uniqueness of a table's key column on append. Writers that
//! race for the same sequence ID therefore get [`CostError::DuplicateKey`]
//! instead of a silent duplicate, and can retry with a fresh ID.
//!
//! ## Implementations
//!
//! - [`MemoryStore`] - in-process tables (tests, embedding)
//! - [`JsonFileStore`] - versioned JSON file with atomic saves and locking

pub mod memory;

#[cfg(not(target_arch = "wasm32"))]
pub mod file;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{CostError, CostResult};
use crate::schema::TableSchema;

pub use crate::record::Row;
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStore;

/// Append-only table storage.
pub trait RecordStore {
    /// Create the table if it does not exist. Existing tables are left as-is.
    fn ensure_table(&mut self, schema: &TableSchema) -> CostResult<()>;

    /// Every row of `table`, in insertion order.
    fn read_all_rows(&self, table: &str) -> CostResult<Vec<Row>>;

    /// Append one row.
    ///
    /// Fails with `DuplicateKey` if the key column value is already present
    /// and with `InvalidInput` if the row names a column the table lacks.
    fn append_row(&mut self, table: &str, row: Row) -> CostResult<()>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn ensure_table(&mut self, schema: &TableSchema) -> CostResult<()> {
        (**self).ensure_table(schema)
    }

    fn read_all_rows(&self, table: &str) -> CostResult<Vec<Row>> {
        (**self).read_all_rows(table)
    }

    fn append_row(&mut self, table: &str, row: Row) -> CostResult<()> {
        (**self).append_row(table, row)
    }
}

/// One table: a header row plus positional data rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_column: Option<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn from_schema(schema: &TableSchema) -> Self {
        Table {
            headers: schema.headers.clone(),
            key_column: schema.key_column.clone(),
            rows: Vec::new(),
        }
    }

    /// Label-keyed view of every row. Short rows read as null cells.
    pub fn rows(&self) -> Vec<Row> {
        self.rows
            .iter()
            .map(|cells| {
                self.headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| (h.clone(), cells.get(i).cloned().unwrap_or(Value::Null)))
                    .collect()
            })
            .collect()
    }

    /// Validate and append a row.
    pub fn append(&mut self, table: &str, mut row: Row) -> CostResult<()> {
        if let Some(unknown) = row.keys().find(|k| !self.headers.contains(k)) {
            return Err(CostError::invalid_input(
                unknown.clone(),
                table,
                "Column is not part of the table",
            ));
        }

        if let Some(key_column) = &self.key_column {
            let key = row.get(key_column).map(value_text).unwrap_or_default();
            if key.trim().is_empty() {
                return Err(CostError::missing_field(key_column.clone()));
            }
            let index = self.headers.iter().position(|h| h == key_column);
            let taken = index.is_some_and(|i| {
                self.rows
                    .iter()
                    .any(|cells| cells.get(i).map(value_text).as_deref() == Some(key.as_str()))
            });
            if taken {
                return Err(CostError::duplicate_key(table, key));
            }
        }

        let cells = self
            .headers
            .iter()
            .map(|h| row.remove(h).unwrap_or(Value::Null))
            .collect();
        self.rows.push(cells);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cell rendered as text for key comparison.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> TableSchema {
        TableSchema::new("People", &["ID", "Name"]).with_key("ID")
    }

    fn row(id: &str, name: &str) -> Row {
        let mut row = Row::new();
        row.insert("ID".into(), Value::from(id));
        row.insert("Name".into(), Value::from(name));
        row
    }

    #[test]
    fn test_append_keeps_header_order() {
        let mut table = Table::from_schema(&schema());
        table.append("People", row("P-1", "Asha")).unwrap();
        assert_eq!(table.rows[0], vec![Value::from("P-1"), Value::from("Asha")]);
        assert_eq!(table.rows()[0]["Name"], "Asha");
    }

    #[test]
    fn test_missing_cells_are_null() {
        let mut table = Table::from_schema(&schema());
        let mut partial = Row::new();
        partial.insert("ID".into(), Value::from("P-2"));
        table.append("People", partial).unwrap();
        assert_eq!(table.rows()[0]["Name"], Value::Null);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut table = Table::from_schema(&schema());
        table.append("People", row("P-1", "Asha")).unwrap();
        let err = table.append("People", row(" P-1 ", "Ravi")).unwrap_err();
        assert_eq!(err, CostError::duplicate_key("People", "P-1"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_unknown_column_rejected() {
        let mut table = Table::from_schema(&schema());
        let mut bad = row("P-1", "Asha");
        bad.insert("Age".into(), Value::from(31));
        assert!(matches!(
            table.append("People", bad),
            Err(CostError::InvalidInput { .. })
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut table = Table::from_schema(&schema());
        assert!(matches!(
            table.append("People", row("", "Asha")),
            Err(CostError::MissingField { .. })
        ));
    }
}
