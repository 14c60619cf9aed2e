//! Row records keyed by column id
//!
//! The slot-creation service consumes rows as id → value maps. A record can
//! only hold keys the schema declares; anything else is rejected at the
//! boundary instead of being carried along silently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::column::ColumnSchema;
use super::grid::{Grid, Row};
use crate::error::{GridError, Result};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RowRecord {
    /// Source row in the grid
    pub row: usize,
    pub fields: BTreeMap<String, String>,
}

impl RowRecord {
    /// Build a record from key/value pairs, rejecting undeclared keys
    pub fn from_pairs<I, K, V>(schema: &ColumnSchema, row: usize, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields = BTreeMap::new();
        for (key, value) in pairs {
            let key = key.into();
            if schema.index_of(&key).is_none() {
                return Err(GridError::UnknownField(key));
            }
            fields.insert(key, value.into());
        }
        Ok(Self { row, fields })
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.fields.get(id).map(String::as_str)
    }

    /// Lay the record out in schema column order; absent keys become `""`
    pub fn to_row(&self, schema: &ColumnSchema) -> Row {
        schema
            .columns()
            .iter()
            .map(|c| self.fields.get(&c.id).cloned().unwrap_or_default())
            .collect()
    }
}

/// Records for every non-blank row of the grid
pub fn records_from_grid(grid: &Grid, schema: &ColumnSchema) -> Vec<RowRecord> {
    grid.rows()
        .enumerate()
        .filter(|(_, row)| row.iter().any(|v| !v.trim().is_empty()))
        .map(|(r, row)| RowRecord {
            row: r,
            fields: schema
                .columns()
                .iter()
                .zip(row.iter())
                .map(|(c, v)| (c.id.clone(), v.clone()))
                .collect(),
        })
        .collect()
}

/// Seed rows built from existing records, e.g. when bulk-editing slots
pub fn seed_from_records(records: &[RowRecord], schema: &ColumnSchema) -> Vec<Row> {
    records.iter().map(|r| r.to_row(schema)).collect()
}
