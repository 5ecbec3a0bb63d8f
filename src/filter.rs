//! Rendering of where-conditions into SAP filter-expression text.
//!
//! `RFC_READ_TABLE` takes its filter as the `OPTIONS` table parameter:
//! free-form ABAP `WHERE` text, transported as rows of at most 72
//! characters that the server concatenates back together. This module
//! renders a condition list into that text form and wraps it into
//! transport lines.

use log::warn;
use serde_json::Value as JsonValue;

use crate::error::{Result, RfcLinkError};
use crate::models::{AbapType, FieldInfo, FieldMeta, WhereCondition};

/// Width of one `OPTIONS` row (`RFC_DB_OPT.TEXT` is `CHAR 72`)
pub const OPTIONS_LINE_WIDTH: usize = 72;

/// Render a condition list into a single filter expression.
///
/// Conditions are joined with ` AND `. Raw conditions pass through
/// verbatim; `IN` conditions become parenthesized `=`/`OR` chains
/// (`<>`/`AND` when negated); tuple `IN` conditions become AND-of-equals
/// groups joined with `OR` (inverted when negated). Structured conditions
/// need the field catalog for value formatting, and one with an empty
/// value set is ignored with a warning. Returns an empty string when
/// nothing remains to filter on.
pub fn render_conditions(
    wheres: &[WhereCondition],
    catalog: Option<&FieldInfo>,
) -> Result<String> {
    let mut options = String::new();
    for condition in wheres {
        let rendered = match condition {
            WhereCondition::Raw(text) => Some(text.clone()),
            WhereCondition::In {
                field,
                negated,
                values,
            } => {
                if values.is_empty() {
                    warn!("[RFC_FILTER] ignoring IN condition on '{}' with empty value set", field);
                    None
                } else {
                    let meta = lookup_field(catalog, field)?;
                    Some(render_in(field, *negated, values, meta))
                }
            }
            WhereCondition::InTuples {
                fields,
                negated,
                rows,
            } => {
                if rows.is_empty() {
                    warn!(
                        "[RFC_FILTER] ignoring tuple IN condition on {:?} with empty tuple set",
                        fields
                    );
                    None
                } else {
                    Some(render_in_tuples(fields, *negated, rows, catalog)?)
                }
            }
        };
        if let Some(text) = rendered {
            if !options.is_empty() {
                options.push_str(" AND ");
            }
            options.push_str(&text);
        }
    }
    Ok(options)
}

/// Wrap a filter expression into `OPTIONS` transport lines.
///
/// Wraps at whitespace boundaries where possible, hard-splitting tokens
/// longer than one line. Whitespace is never dropped: concatenating the
/// returned lines reproduces the input exactly, which is what the server
/// does with the `OPTIONS` rows.
pub fn wrap_options(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for token in tokens(text) {
        let token_len = token.chars().count();
        if current_len + token_len <= OPTIONS_LINE_WIDTH {
            current.push_str(token);
            current_len += token_len;
        } else if token_len <= OPTIONS_LINE_WIDTH {
            lines.push(std::mem::take(&mut current));
            current = token.to_string();
            current_len = token_len;
        } else {
            // Token longer than a line: fill char by char
            for ch in token.chars() {
                if current_len == OPTIONS_LINE_WIDTH {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                current.push(ch);
                current_len += 1;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn lookup_field<'a>(catalog: Option<&'a FieldInfo>, field: &str) -> Result<&'a FieldMeta> {
    let catalog = catalog.ok_or_else(|| {
        RfcLinkError::invalid_configuration(format!(
            "field catalog required to render IN condition on '{}'",
            field
        ))
    })?;
    catalog.get(field).ok_or_else(|| {
        RfcLinkError::invalid_configuration(format!("unknown field '{}' in IN condition", field))
    })
}

fn render_in(field: &str, negated: bool, values: &[JsonValue], meta: &FieldMeta) -> String {
    let (op, join) = if negated {
        ("<>", " AND ")
    } else {
        ("=", " OR ")
    };
    let mut out = String::from("(");
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(join);
        }
        out.push_str(field);
        out.push(' ');
        out.push_str(op);
        out.push(' ');
        out.push_str(&format_value(value, meta));
    }
    out.push(')');
    out
}

/// Render a tuple membership test as nested comparison groups.
///
/// `IN`: each tuple is an AND-of-equals group, groups joined with `OR`.
/// `NOT IN`: each tuple is an OR-of-not-equals group, joined with `AND`.
fn render_in_tuples(
    fields: &[String],
    negated: bool,
    rows: &[Vec<JsonValue>],
    catalog: Option<&FieldInfo>,
) -> Result<String> {
    if fields.is_empty() {
        return Err(RfcLinkError::invalid_configuration(
            "tuple IN condition needs at least one field",
        ));
    }
    let metas = fields
        .iter()
        .map(|field| lookup_field(catalog, field))
        .collect::<Result<Vec<_>>>()?;

    let (op, inner_join, outer_join) = if negated {
        ("<>", " OR ", " AND ")
    } else {
        ("=", " AND ", " OR ")
    };
    let mut out = String::from("(");
    for (i, row) in rows.iter().enumerate() {
        if row.len() != fields.len() {
            return Err(RfcLinkError::invalid_configuration(format!(
                "tuple IN condition on {:?} expects {} values per tuple, got {}",
                fields,
                fields.len(),
                row.len()
            )));
        }
        if i > 0 {
            out.push_str(outer_join);
        }
        out.push('(');
        for (j, value) in row.iter().enumerate() {
            if j > 0 {
                out.push_str(inner_join);
            }
            out.push_str(&fields[j]);
            out.push(' ');
            out.push_str(op);
            out.push(' ');
            out.push_str(&format_value(value, metas[j]));
        }
        out.push(')');
    }
    out.push(')');
    Ok(out)
}

/// Format a filter value for the SAP expression grammar.
///
/// Character fields holding numeric-looking keys are stored zero-padded to
/// the field length (material numbers, document numbers), so such values
/// are left-padded with zeros before quoting. Everything is single-quoted.
fn format_value(value: &JsonValue, meta: &FieldMeta) -> String {
    let text = match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    };

    let padded = if meta.abap_type == AbapType::Char {
        numeric_repr(&text).map_or(text, |repr| zero_pad(&repr, meta.length as usize))
    } else {
        text
    };

    format!("'{}'", padded)
}

/// Canonical numeric text of a value, if it looks numeric
fn numeric_repr(text: &str) -> Option<String> {
    if let Ok(n) = text.parse::<i64>() {
        return Some(n.to_string());
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite()).map(|n| n.to_string())
}

fn zero_pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        let mut out = "0".repeat(width - len);
        out.push_str(text);
        out
    }
}

/// Split text into alternating runs of non-whitespace and whitespace
fn tokens(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (i, ch) in text.char_indices() {
        let is_space = ch == ' ';
        match in_space {
            Some(prev) if prev != is_space => {
                out.push(&text[start..i]);
                start = i;
                in_space = Some(is_space);
            }
            None => in_space = Some(is_space),
            _ => {}
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}
