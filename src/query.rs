//! Query partitioning and execution.
//!
//! Splits one logical table read into the sequence of underlying RFC calls
//! needed to respect the server's two independent size limits: the output
//! row cap per call (`batch_rows`) and the filter input cap per call
//! (`chunk_rows`, counted in `IN` values). Calls are issued strictly
//! sequentially (the connection handle is non-reentrant) in chunk-major,
//! batch-minor order, and the rows are concatenated in that order, so the
//! reassembled result matches what a single unbounded call would return.

use log::debug;
use serde_json::{json, Value as JsonValue};
use std::collections::HashSet;

use crate::error::{Result, RfcLinkError};
use crate::filter::{render_conditions, wrap_options};
use crate::models::{AbapType, FieldInfo, ResultField, ResultRows, TableQuery, WhereCondition};
use crate::transport::{RfcParams, RfcTransport};
use crate::value::decode_value;

/// Executes one logical table read over a borrowed transport.
///
/// Holds no state between queries; a fresh executor is built per call.
pub(crate) struct QueryExecutor<'a, T: RfcTransport> {
    transport: &'a mut T,
    read_function: &'a str,
}

struct Page {
    schema: Vec<ResultField>,
    rows: Vec<Vec<JsonValue>>,
}

impl<'a, T: RfcTransport> QueryExecutor<'a, T> {
    pub(crate) fn new(transport: &'a mut T, read_function: &'a str) -> Self {
        Self {
            transport,
            read_function,
        }
    }

    /// Run the partitioned read and reassemble the rows.
    ///
    /// `catalog` is the resolved field catalog, or `None` when the query
    /// skips metadata. All validation happens before the first call.
    pub(crate) fn execute(
        &mut self,
        query: &TableQuery,
        catalog: Option<&FieldInfo>,
    ) -> Result<ResultRows> {
        validate_limits(query)?;
        validate_fields(query, catalog)?;

        let mut wheres = query.wheres.clone();
        if query.dedup_in_values {
            for condition in &mut wheres {
                match condition {
                    WhereCondition::In { values, .. } => {
                        *values = dedup_values(values);
                    }
                    WhereCondition::InTuples { rows, .. } => {
                        *rows = dedup_tuples(rows);
                    }
                    WhereCondition::Raw(_) => {}
                }
            }
        }

        let mut result = ResultRows::default();
        match find_chunk_target(&wheres, query.chunk_rows) {
            None => {
                let filter = render_conditions(&wheres, catalog)?;
                self.run_chunk(query, &filter, 0, &mut result)?;
            }
            Some((index, groups)) => {
                for (chunk_idx, group) in groups.into_iter().enumerate() {
                    let mut chunk_wheres = wheres.clone();
                    chunk_wheres[index] = group;
                    let filter = render_conditions(&chunk_wheres, catalog)?;
                    self.run_chunk(query, &filter, chunk_idx, &mut result)?;
                }
            }
        }
        Ok(result)
    }

    /// Read all pages of one chunk, appending rows to `out`.
    fn run_chunk(
        &mut self,
        query: &TableQuery,
        filter: &str,
        chunk_idx: usize,
        out: &mut ResultRows,
    ) -> Result<()> {
        let mut batch_idx = 0usize;
        let mut start = query.from_row;
        let mut fetched = 0u64;

        loop {
            // ROWCOUNT 0 means no limit
            let rowcount = match (query.batch_rows, query.max_rows) {
                (None, None) => 0,
                (None, Some(max)) => max,
                (Some(batch), None) => batch,
                (Some(batch), Some(max)) => batch.min(max.saturating_sub(fetched)),
            };

            let page = self.read_page(query, filter, rowcount, start, chunk_idx, batch_idx)?;
            if out.schema.is_empty() {
                out.schema = page.schema;
            }
            let page_len = page.rows.len() as u64;
            out.rows.extend(page.rows);
            fetched += page_len;

            if query.batch_rows.is_none() {
                break;
            }
            if page_len < rowcount {
                // Short page: end of data for this chunk
                break;
            }
            if let Some(max) = query.max_rows {
                if fetched >= max {
                    break;
                }
            }
            start += rowcount;
            batch_idx += 1;
        }
        Ok(())
    }

    fn read_page(
        &mut self,
        query: &TableQuery,
        filter: &str,
        rowcount: u64,
        start: u64,
        chunk_idx: usize,
        batch_idx: usize,
    ) -> Result<Page> {
        let mut params = RfcParams::new();
        params.insert("QUERY_TABLE".to_string(), json!(query.table));
        params.insert("DELIMITER".to_string(), json!(query.delimiter.to_string()));
        params.insert("ROWCOUNT".to_string(), json!(rowcount));
        params.insert("ROWSKIPS".to_string(), json!(start));
        if !query.fields.is_empty() {
            let fields: Vec<JsonValue> = query
                .fields
                .iter()
                .map(|f| json!({ "FIELDNAME": f }))
                .collect();
            params.insert("FIELDS".to_string(), JsonValue::Array(fields));
        }
        if !filter.is_empty() {
            let options: Vec<JsonValue> = wrap_options(filter)
                .into_iter()
                .map(|line| json!({ "TEXT": line }))
                .collect();
            params.insert("OPTIONS".to_string(), JsonValue::Array(options));
        }

        debug!(
            "[RFC_QUERY] calling {} for table {} (chunk {}, batch {}, rowcount {}, from row {})",
            self.read_function, query.table, chunk_idx, batch_idx, rowcount, start
        );
        let result = self
            .transport
            .call(self.read_function, &params)
            .map_err(|e| RfcLinkError::query_failure(chunk_idx, batch_idx, e.to_string()))?;

        let schema = parse_schema(&result)?;
        let rows = parse_rows(&result, &schema, query.delimiter)?;
        Ok(Page { schema, rows })
    }
}

fn validate_limits(query: &TableQuery) -> Result<()> {
    if query.batch_rows == Some(0) {
        return Err(RfcLinkError::invalid_configuration(
            "batch_rows must be positive; omit it to read each chunk in one call",
        ));
    }
    if query.chunk_rows == 0 {
        return Err(RfcLinkError::invalid_configuration(
            "chunk_rows must be positive",
        ));
    }
    if query.max_rows == Some(0) {
        return Err(RfcLinkError::invalid_configuration(
            "max_rows must be positive; omit it for no limit",
        ));
    }
    Ok(())
}

fn validate_fields(query: &TableQuery, catalog: Option<&FieldInfo>) -> Result<()> {
    let Some(catalog) = catalog else {
        return Ok(());
    };
    for field in &query.fields {
        if !catalog.contains(field) {
            return Err(RfcLinkError::invalid_configuration(format!(
                "unknown field '{}' for table {}",
                field, query.table
            )));
        }
    }
    Ok(())
}

/// First `IN` or tuple `IN` condition whose set exceeds the chunk size,
/// split into per-chunk replacement conditions.
///
/// Only non-negated sets are chunkable: an `IN` set is a disjunction, so
/// splitting its values (or tuples) partitions the matching rows without
/// changing the filter's meaning. A `NOT IN` set is a conjunction and
/// cannot be split.
fn find_chunk_target(
    wheres: &[WhereCondition],
    chunk_rows: u64,
) -> Option<(usize, Vec<WhereCondition>)> {
    let chunk = chunk_rows as usize;
    for (i, condition) in wheres.iter().enumerate() {
        match condition {
            WhereCondition::In {
                field,
                negated: false,
                values,
            } if values.len() > chunk => {
                let groups = values
                    .chunks(chunk)
                    .map(|group| WhereCondition::In {
                        field: field.clone(),
                        negated: false,
                        values: group.to_vec(),
                    })
                    .collect();
                return Some((i, groups));
            }
            WhereCondition::InTuples {
                fields,
                negated: false,
                rows,
            } if rows.len() > chunk => {
                let groups = rows
                    .chunks(chunk)
                    .map(|group| WhereCondition::InTuples {
                        fields: fields.clone(),
                        negated: false,
                        rows: group.to_vec(),
                    })
                    .collect();
                return Some((i, groups));
            }
            _ => {}
        }
    }
    None
}

/// Drop duplicate values, keeping the first occurrence of each.
///
/// Duplicate values in separate chunks would return the same rows twice,
/// breaking the reassembly invariant.
fn dedup_values(values: &[JsonValue]) -> Vec<JsonValue> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .iter()
        .filter(|v| seen.insert(v.to_string()))
        .cloned()
        .collect()
}

/// Tuple-set counterpart of [`dedup_values`]
fn dedup_tuples(rows: &[Vec<JsonValue>]) -> Vec<Vec<JsonValue>> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.iter()
        .filter(|row| seen.insert(JsonValue::Array((*row).clone()).to_string()))
        .cloned()
        .collect()
}

fn parse_schema(result: &JsonValue) -> Result<Vec<ResultField>> {
    let fields = result
        .get("FIELDS")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| RfcLinkError::protocol("read result missing FIELDS table"))?;

    let mut schema = Vec::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let name = field
            .get("FIELDNAME")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| RfcLinkError::protocol("FIELDS row missing FIELDNAME"))?;
        let code = field.get("TYPE").and_then(JsonValue::as_str).unwrap_or("");
        schema.push(ResultField {
            name: name.trim_end().to_string(),
            abap_type: AbapType::from_code(code),
            index,
        });
    }
    Ok(schema)
}

fn parse_rows(
    result: &JsonValue,
    schema: &[ResultField],
    delimiter: char,
) -> Result<Vec<Vec<JsonValue>>> {
    let data = result
        .get("DATA")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| RfcLinkError::protocol("read result missing DATA table"))?;

    let mut rows = Vec::with_capacity(data.len());
    for line in data {
        let wa = line
            .get("WA")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| RfcLinkError::protocol("DATA row missing WA"))?;
        let row = wa
            .trim()
            .split(delimiter)
            .enumerate()
            .map(|(i, cell)| {
                let abap_type = schema.get(i).map_or(AbapType::Unknown, |f| f.abap_type);
                decode_value(cell, abap_type)
            })
            .collect();
        rows.push(row);
    }
    Ok(rows)
}
