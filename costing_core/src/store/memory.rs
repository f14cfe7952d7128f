//! In-process record store.

use std::collections::BTreeMap;

use crate::errors::{CostError, CostResult};
use crate::schema::TableSchema;

use super::{RecordStore, Row, Table};

/// Tables held in memory. Lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct access to a table, e.g. for assertions.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }
}

impl RecordStore for MemoryStore {
    fn ensure_table(&mut self, schema: &TableSchema) -> CostResult<()> {
        self.tables
            .entry(schema.name.clone())
            .or_insert_with(|| Table::from_schema(schema));
        Ok(())
    }

    fn read_all_rows(&self, table: &str) -> CostResult<Vec<Row>> {
        self.tables
            .get(table)
            .map(Table::rows)
            .ok_or_else(|| CostError::table_not_found(table))
    }

    fn append_row(&mut self, table: &str, row: Row) -> CostResult<()> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| CostError::table_not_found(table))?
            .append(table, row)
    }
}
