use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A single filter condition of a table query.
///
/// Conditions in a query's list are implicitly combined with `AND`, matching
/// the grouping rules of the `OPTIONS` filter text consumed by
/// `RFC_READ_TABLE`. Two shapes are supported:
///
/// - [`Raw`](Self::Raw) carries filter text verbatim; the caller supplies
///   its own operators (`MATNR = '000000000000000023'`,
///   `ERDAT >= '20240101'`, ...).
/// - [`In`](Self::In) is a structured membership test against a value set,
///   rendered as a parenthesized `=`/`OR` chain (or `<>`/`AND` when
///   negated). Value sets larger than the query's chunk size are split
///   across several underlying calls.
/// - [`InTuples`](Self::InTuples) tests a field *combination* against a set
///   of value tuples, for filtering on composite keys. Each tuple renders as
///   an AND-of-equals group, the groups joined with `OR` (inverted when
///   negated). Tuple sets are chunked like plain value sets.
///
/// # Example
///
/// ```rust
/// use rfc_link::WhereCondition;
/// use serde_json::json;
///
/// let raw = WhereCondition::raw("ERDAT >= '20240101'");
/// let set = WhereCondition::in_set("MATNR", vec![json!("23"), json!("42")]);
/// let excl = WhereCondition::not_in_set("WERKS", vec![json!("1000")]);
/// let combo = WhereCondition::in_tuples(
///     ["MATNR", "WERKS"],
///     vec![vec![json!("23"), json!("1000")], vec![json!("42"), json!("2000")]],
/// );
/// # let _ = (raw, set, excl, combo);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WhereCondition {
    /// Filter text passed through to the server verbatim
    Raw(String),

    /// Membership test of a field against a value set
    In {
        /// Field the values are compared against
        field: String,
        /// `true` renders `NOT IN` semantics (`<>` joined by `AND`)
        #[serde(default)]
        negated: bool,
        /// The value set; order is preserved through rendering and chunking
        values: Vec<JsonValue>,
    },

    /// Membership test of a field combination against a set of value tuples
    InTuples {
        /// Fields the tuples are compared against, in tuple order
        fields: Vec<String>,
        /// `true` renders `NOT IN` semantics (negated groups joined by `AND`)
        #[serde(default)]
        negated: bool,
        /// The tuple set; every row must have one value per field
        rows: Vec<Vec<JsonValue>>,
    },
}

impl WhereCondition {
    /// Create a raw filter-text condition
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw(text.into())
    }

    /// Create an `IN` condition: the field must equal one of the values
    pub fn in_set(field: impl Into<String>, values: Vec<JsonValue>) -> Self {
        Self::In {
            field: field.into(),
            negated: false,
            values,
        }
    }

    /// Create a `NOT IN` condition: the field must equal none of the values
    pub fn not_in_set(field: impl Into<String>, values: Vec<JsonValue>) -> Self {
        Self::In {
            field: field.into(),
            negated: true,
            values,
        }
    }

    /// Create a tuple `IN` condition: the field combination must equal one
    /// of the value tuples
    pub fn in_tuples<I, S>(fields: I, rows: Vec<Vec<JsonValue>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::InTuples {
            fields: fields.into_iter().map(Into::into).collect(),
            negated: false,
            rows,
        }
    }

    /// Create a tuple `NOT IN` condition: the field combination must equal
    /// none of the value tuples
    pub fn not_in_tuples<I, S>(fields: I, rows: Vec<Vec<JsonValue>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::InTuples {
            fields: fields.into_iter().map(Into::into).collect(),
            negated: true,
            rows,
        }
    }
}
