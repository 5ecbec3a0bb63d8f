//! Shared test fixtures: a scripted in-memory transport.
//!
//! `MockTransport` emulates the function modules the client talks to —
//! `STFC_CONNECTION` plus the `RFC_READ_TABLE` family — over registered
//! fixture tables, including paging (`ROWCOUNT`/`ROWSKIPS`), projection
//! (`FIELDS`), a small evaluator for the `OPTIONS` filter grammar the
//! crate renders, and injected call failures. Registered tables are also
//! self-described in the `DD03L`/`DD02T`/`DD04T` dictionary fixtures so
//! the metadata operations work against the same transport.

use serde_json::{json, Value as JsonValue};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use rfc_link::{ConnectionParams, Result, RfcConnect, RfcLinkError, RfcParams, RfcTransport};

/// One recorded read-table invocation
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub function: String,
    pub table: String,
    pub rowcount: u64,
    pub rowskips: u64,
    pub fields: Vec<String>,
    pub options: String,
}

#[derive(Debug, Clone)]
struct FixtureField {
    name: String,
    type_code: String,
    length: u32,
    rollname: String,
}

struct FixtureTable {
    fields: Vec<FixtureField>,
    rows: Vec<Vec<String>>,
}

pub struct MockTransport {
    tables: HashMap<String, FixtureTable>,
    calls: Rc<RefCell<Vec<CallRecord>>>,
    close_count: Rc<Cell<u32>>,
    /// Zero-based index of the read-table call to fail, if any
    pub fail_on_read_call: Option<usize>,
}

impl MockTransport {
    pub fn new() -> Self {
        let mut mock = Self {
            tables: HashMap::new(),
            calls: Rc::new(RefCell::new(Vec::new())),
            close_count: Rc::new(Cell::new(0)),
            fail_on_read_call: None,
        };
        mock.insert_raw(
            "DD02T",
            &[
                ("TABNAME", "C", 30, ""),
                ("DDLANGUAGE", "C", 1, ""),
                ("AS4LOCAL", "C", 1, ""),
                ("DDTEXT", "C", 60, ""),
            ],
        );
        mock.insert_raw(
            "DD03L",
            &[
                ("TABNAME", "C", 30, ""),
                ("FIELDNAME", "C", 30, ""),
                ("KEYFLAG", "C", 1, ""),
                ("ROLLNAME", "C", 30, ""),
                ("INTTYPE", "C", 1, ""),
                ("DATATYPE", "C", 10, ""),
                ("LENG", "N", 6, ""),
                ("POSITION", "N", 4, ""),
                ("AS4LOCAL", "C", 1, ""),
            ],
        );
        mock.insert_raw(
            "DD04T",
            &[
                ("ROLLNAME", "C", 30, ""),
                ("DDLANGUAGE", "C", 1, ""),
                ("AS4LOCAL", "C", 1, ""),
                ("DDTEXT", "C", 60, ""),
                ("REPTEXT", "C", 55, ""),
                ("SCRTEXT_S", "C", 10, ""),
                ("SCRTEXT_M", "C", 20, ""),
                ("SCRTEXT_L", "C", 40, ""),
            ],
        );
        for table in ["DD02T", "DD03L", "DD04T"] {
            mock.register_in_dictionary(table);
        }
        mock
    }

    /// Shared view of the recorded read-table calls
    pub fn calls_handle(&self) -> Rc<RefCell<Vec<CallRecord>>> {
        Rc::clone(&self.calls)
    }

    /// Shared counter of transport close() invocations
    pub fn close_count_handle(&self) -> Rc<Cell<u32>> {
        Rc::clone(&self.close_count)
    }

    /// Register a fixture table and describe it in the DD03L fixture.
    ///
    /// `fields` are (name, ABAP type code, length) triples.
    pub fn add_table(&mut self, name: &str, fields: &[(&str, &str, u32)], rows: Vec<Vec<String>>) {
        let with_rolls: Vec<(&str, &str, u32, &str)> = fields
            .iter()
            .map(|(n, t, l)| (*n, *t, *l, ""))
            .collect();
        self.insert_raw(name, &with_rolls);
        if let Some(table) = self.tables.get_mut(name) {
            table.rows = rows;
        }
        self.register_in_dictionary(name);
    }

    /// Like [`add_table`](Self::add_table), with a data element
    /// (rollname) per field for DD04T text lookups
    pub fn add_table_with_rollnames(
        &mut self,
        name: &str,
        fields: &[(&str, &str, u32, &str)],
        rows: Vec<Vec<String>>,
    ) {
        self.insert_raw(name, fields);
        if let Some(table) = self.tables.get_mut(name) {
            table.rows = rows;
        }
        self.register_in_dictionary(name);
    }

    /// Register a table description in the DD02T fixture
    pub fn add_description(&mut self, table: &str, language: &str, text: &str) {
        if let Some(dd02t) = self.tables.get_mut("DD02T") {
            dd02t.rows.push(vec![
                table.to_string(),
                language.to_string(),
                "A".to_string(),
                text.to_string(),
            ]);
        }
    }

    /// Register a data element text in the DD04T fixture.
    ///
    /// `labels` are the short/medium/long field labels.
    pub fn add_data_element_text(
        &mut self,
        rollname: &str,
        language: &str,
        ddtext: &str,
        reptext: &str,
        labels: [&str; 3],
    ) {
        if let Some(dd04t) = self.tables.get_mut("DD04T") {
            dd04t.rows.push(vec![
                rollname.to_string(),
                language.to_string(),
                "A".to_string(),
                ddtext.to_string(),
                reptext.to_string(),
                labels[0].to_string(),
                labels[1].to_string(),
                labels[2].to_string(),
            ]);
        }
    }

    fn insert_raw(&mut self, name: &str, fields: &[(&str, &str, u32, &str)]) {
        let fields = fields
            .iter()
            .map(|(n, t, l, r)| FixtureField {
                name: (*n).to_string(),
                type_code: (*t).to_string(),
                length: *l,
                rollname: (*r).to_string(),
            })
            .collect();
        self.tables.insert(
            name.to_string(),
            FixtureTable {
                fields,
                rows: Vec::new(),
            },
        );
    }

    fn register_in_dictionary(&mut self, name: &str) {
        let specs: Vec<FixtureField> = match self.tables.get(name) {
            Some(table) => table.fields.clone(),
            None => return,
        };
        if let Some(dd03l) = self.tables.get_mut("DD03L") {
            for (i, field) in specs.iter().enumerate() {
                dd03l.rows.push(vec![
                    name.to_string(),
                    field.name.clone(),
                    String::new(),
                    field.rollname.clone(),
                    field.type_code.clone(),
                    String::new(),
                    field.length.to_string(),
                    (i + 1).to_string(),
                    "A".to_string(),
                ]);
            }
        }
    }

    fn read_table(&mut self, function: &str, params: &RfcParams) -> Result<JsonValue> {
        let table_name = params
            .get("QUERY_TABLE")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| RfcLinkError::transport("QUERY_TABLE missing"))?
            .to_string();
        let delimiter = params
            .get("DELIMITER")
            .and_then(JsonValue::as_str)
            .unwrap_or("⁂")
            .to_string();
        let rowcount = params
            .get("ROWCOUNT")
            .and_then(JsonValue::as_u64)
            .unwrap_or(0);
        let rowskips = params
            .get("ROWSKIPS")
            .and_then(JsonValue::as_u64)
            .unwrap_or(0);
        let requested: Vec<String> = params
            .get("FIELDS")
            .and_then(JsonValue::as_array)
            .map(|rows| {
                rows.iter()
                    .filter_map(|r| r.get("FIELDNAME").and_then(JsonValue::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let options: String = params
            .get("OPTIONS")
            .and_then(JsonValue::as_array)
            .map(|rows| {
                rows.iter()
                    .filter_map(|r| r.get("TEXT").and_then(JsonValue::as_str))
                    .collect()
            })
            .unwrap_or_default();

        let index = self.calls.borrow().len();
        self.calls.borrow_mut().push(CallRecord {
            function: function.to_string(),
            table: table_name.clone(),
            rowcount,
            rowskips,
            fields: requested.clone(),
            options: options.clone(),
        });
        if self.fail_on_read_call == Some(index) {
            return Err(RfcLinkError::transport("simulated RFC failure"));
        }

        let table = self
            .tables
            .get(&table_name)
            .ok_or_else(|| RfcLinkError::transport(format!("TABLE_NOT_AVAILABLE: {}", table_name)))?;

        let selected: Vec<usize> = if requested.is_empty() {
            (0..table.fields.len()).collect()
        } else {
            requested
                .iter()
                .map(|name| {
                    table
                        .fields
                        .iter()
                        .position(|f| &f.name == name)
                        .ok_or_else(|| {
                            RfcLinkError::transport(format!("FIELD_NOT_VALID: {}", name))
                        })
                })
                .collect::<Result<Vec<usize>>>()?
        };

        let matching: Vec<&Vec<String>> = table
            .rows
            .iter()
            .filter(|row| {
                if options.is_empty() {
                    true
                } else {
                    let by_name: HashMap<&str, &str> = table
                        .fields
                        .iter()
                        .zip(row.iter())
                        .map(|(f, cell)| (f.name.as_str(), cell.as_str()))
                        .collect();
                    eval_expr(&options, &by_name)
                }
            })
            .collect();

        let take = if rowcount == 0 {
            usize::MAX
        } else {
            rowcount as usize
        };
        let page: Vec<JsonValue> = matching
            .iter()
            .skip(rowskips as usize)
            .take(take)
            .map(|row| {
                let cells: Vec<&str> = selected.iter().map(|&i| row[i].as_str()).collect();
                json!({ "WA": cells.join(&delimiter) })
            })
            .collect();

        let fields_out: Vec<JsonValue> = selected
            .iter()
            .map(|&i| {
                let f = &table.fields[i];
                json!({
                    "FIELDNAME": f.name,
                    "TYPE": f.type_code,
                    "LENGTH": format!("{:06}", f.length),
                })
            })
            .collect();

        Ok(json!({ "FIELDS": fields_out, "DATA": page }))
    }
}

impl RfcTransport for MockTransport {
    fn call(&mut self, function: &str, params: &RfcParams) -> Result<JsonValue> {
        match function {
            "STFC_CONNECTION" => {
                let text = params
                    .get("REQUTEXT")
                    .and_then(JsonValue::as_str)
                    .unwrap_or("");
                Ok(json!({ "ECHOTEXT": text, "RESPTEXT": "mock system" }))
            }
            "RFC_READ_TABLE" | "BBP_RFC_READ_TABLE" => self.read_table(function, params),
            other => Err(RfcLinkError::transport(format!("FU_NOT_FOUND: {}", other))),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.close_count.set(self.close_count.get() + 1);
        Ok(())
    }
}

impl RfcConnect for MockTransport {
    fn connect(_params: &ConnectionParams) -> Result<Self> {
        Ok(Self::new())
    }
}

// ---- OPTIONS filter evaluation ----
//
// Understands the grammar the crate renders: comparisons joined by
// AND/OR with parentheses, values single-quoted, LIKE with % wildcards.

fn eval_expr(expr: &str, row: &HashMap<&str, &str>) -> bool {
    let expr = expr.trim();
    if let Some(inner) = strip_outer_parens(expr) {
        return eval_expr(inner, row);
    }
    let or_parts = split_top_level(expr, " OR ");
    if or_parts.len() > 1 {
        return or_parts.into_iter().any(|part| eval_expr(part, row));
    }
    let and_parts = split_top_level(expr, " AND ");
    if and_parts.len() > 1 {
        return and_parts.into_iter().all(|part| eval_expr(part, row));
    }
    eval_comparison(expr, row)
}

fn strip_outer_parens(expr: &str) -> Option<&str> {
    if !expr.starts_with('(') || !expr.ends_with(')') {
        return None;
    }
    let mut depth = 0i32;
    for (i, ch) in expr.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 && i != expr.len() - 1 {
                    return None;
                }
            }
            _ => {}
        }
    }
    (depth == 0).then(|| &expr[1..expr.len() - 1])
}

fn split_top_level<'a>(expr: &'a str, sep: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_quote = false;
    let mut start = 0;
    let mut i = 0;
    while i < expr.len() {
        if !expr.is_char_boundary(i) {
            i += 1;
            continue;
        }
        let ch = expr[i..].chars().next().unwrap_or(' ');
        if in_quote {
            if ch == '\'' {
                in_quote = false;
            }
            i += ch.len_utf8();
            continue;
        }
        match ch {
            '\'' => {
                in_quote = true;
                i += 1;
            }
            '(' => {
                depth += 1;
                i += 1;
            }
            ')' => {
                depth -= 1;
                i += 1;
            }
            _ => {
                if depth == 0 && expr[i..].starts_with(sep) {
                    parts.push(&expr[start..i]);
                    i += sep.len();
                    start = i;
                } else {
                    i += ch.len_utf8();
                }
            }
        }
    }
    parts.push(&expr[start..]);
    parts
}

fn eval_comparison(expr: &str, row: &HashMap<&str, &str>) -> bool {
    let operators = [
        (" <> ", "<>"),
        (" >= ", ">="),
        (" <= ", "<="),
        (" LIKE ", "LIKE"),
        (" = ", "="),
        (" > ", ">"),
        (" < ", "<"),
    ];
    for (pattern, op) in operators {
        if let Some(pos) = expr.find(pattern) {
            let field = expr[..pos].trim();
            let value = unquote(expr[pos + pattern.len()..].trim());
            let cell = row.get(field).copied().unwrap_or("").trim_end();
            return match op {
                "=" => cell == value,
                "<>" => cell != value,
                "LIKE" => like_match(value, cell),
                ">=" => cell >= value,
                "<=" => cell <= value,
                ">" => cell > value,
                "<" => cell < value,
                _ => false,
            };
        }
    }
    false
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(text)
}

fn like_match(pattern: &str, text: &str) -> bool {
    if !pattern.contains('%') {
        return pattern == text;
    }
    let segments: Vec<&str> = pattern.split('%').collect();
    let first = segments[0];
    if !text.starts_with(first) {
        return false;
    }
    let mut pos = first.len();
    for segment in &segments[1..segments.len() - 1] {
        if segment.is_empty() {
            continue;
        }
        match text[pos..].find(segment) {
            Some(found) => pos = pos + found + segment.len(),
            None => return false,
        }
    }
    let last = segments[segments.len() - 1];
    last.is_empty() || text[pos..].ends_with(last)
}
