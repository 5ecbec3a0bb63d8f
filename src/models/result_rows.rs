use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use super::abap_type::AbapType;

/// A column in a query result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultField {
    /// Column name
    pub name: String,

    /// ABAP internal type reported by the read function module
    pub abap_type: AbapType,

    /// Column position (0-indexed) in the result rows
    pub index: usize,
}

/// An ordered table-read result set.
///
/// Rows are arrays of decoded values ordered by the schema's `index`,
/// accumulated across however many underlying RFC calls the query needed.
/// The row order is chunk-major, batch-minor: exactly what a single
/// unbounded call would have returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRows {
    /// Schema describing the columns in the result set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schema: Vec<ResultField>,

    /// The result rows as arrays of values (ordered by schema index)
    #[serde(default)]
    pub rows: Vec<Vec<JsonValue>>,
}

impl ResultRows {
    /// Number of rows in the result set
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the result set has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get column names from the schema
    pub fn column_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.schema.len());
        for field in &self.schema {
            names.push(field.name.clone());
        }
        names
    }

    /// Get a row as a HashMap by index (for convenience)
    pub fn row_as_map(&self, row_idx: usize) -> Option<HashMap<String, JsonValue>> {
        let row = self.rows.get(row_idx)?;
        let mut map = HashMap::with_capacity(self.schema.len());
        for field in &self.schema {
            if let Some(value) = row.get(field.index) {
                map.insert(field.name.clone(), value.clone());
            }
        }
        Some(map)
    }

    /// Get all rows as HashMaps (for convenience)
    pub fn rows_as_maps(&self) -> Vec<HashMap<String, JsonValue>> {
        let mut mapped = Vec::with_capacity(self.rows.len());
        for i in 0..self.rows.len() {
            if let Some(map) = self.row_as_map(i) {
                mapped.push(map);
            }
        }
        mapped
    }
}
