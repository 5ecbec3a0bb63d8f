use serde::{Deserialize, Serialize};

/// ABAP internal data type of a table field.
///
/// Parsed from the single-character type codes SAP reports in the data
/// dictionary (`DD03L.INTTYPE`) and in the `FIELDS` table of
/// `RFC_READ_TABLE` results. Drives result-value decoding and the
/// formatting of filter values.
///
/// # Example JSON
///
/// ```json
/// "Char"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbapType {
    /// Character string (`C`), right-padded with blanks in transport
    Char,
    /// Numeric text (`N`), zero-padded digits
    Numeric,
    /// Date (`D`), `YYYYMMDD`
    Date,
    /// Time (`T`), `HHMMSS`
    Time,
    /// Integer (`I`, plus the short forms `b`, `s` and `8`)
    Integer,
    /// Binary floating point (`F`)
    Float,
    /// Packed decimal (`P`)
    Packed,
    /// Raw bytes (`X`, `y`), transported as hex text
    Raw,
    /// Variable-length string (`g`)
    Text,
    /// Any code this crate does not interpret; treated as plain text
    Unknown,
}

impl AbapType {
    /// Parse a dictionary / RFC result type code.
    ///
    /// Unrecognized codes map to [`AbapType::Unknown`] rather than failing:
    /// SAP keeps adding codes and an uninterpreted column should still be
    /// readable as text.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "C" => Self::Char,
            "N" => Self::Numeric,
            "D" => Self::Date,
            "T" => Self::Time,
            "I" | "b" | "s" | "8" => Self::Integer,
            "F" => Self::Float,
            "P" => Self::Packed,
            "X" | "y" => Self::Raw,
            "g" => Self::Text,
            _ => Self::Unknown,
        }
    }
}

impl Default for AbapType {
    fn default() -> Self {
        Self::Char
    }
}
