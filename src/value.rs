//! Decoding of raw `RFC_READ_TABLE` cell text into typed values.
//!
//! The read function modules transfer every row as one delimited text line
//! (`DATA[].WA`); cell typing comes from the `FIELDS` result table. Decoding
//! is deliberately forgiving: a cell that does not parse as its declared
//! type is returned as trimmed text rather than failing the whole query.

use serde_json::Value as JsonValue;

use crate::models::AbapType;

/// Decode one delimited cell into a typed value.
///
/// - Integers parse to JSON numbers.
/// - Floats and packed decimals parse to JSON numbers, falling back to the
///   raw text for values outside `f64` range (huge `DEC` fields).
/// - Character-like cells are right-trimmed only: ABAP pads them with
///   trailing blanks in transport, while leading characters (including the
///   zeros of `NUMC` keys) are significant.
pub fn decode_value(raw: &str, abap_type: AbapType) -> JsonValue {
    match abap_type {
        AbapType::Integer => match raw.trim().parse::<i64>() {
            Ok(n) => JsonValue::from(n),
            Err(_) => JsonValue::String(raw.trim_end().to_string()),
        },
        AbapType::Float | AbapType::Packed => {
            let trimmed = raw.trim();
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => {
                    serde_json::Number::from_f64(n).map_or_else(
                        || JsonValue::String(trimmed.to_string()),
                        JsonValue::Number,
                    )
                }
                _ => JsonValue::String(trimmed.to_string()),
            }
        }
        _ => JsonValue::String(raw.trim_end().to_string()),
    }
}
