use serde::{Deserialize, Serialize};

use super::field_info::FieldInfo;
use super::where_condition::WhereCondition;

/// Default chunk size for oversized `IN` value sets
pub const DEFAULT_CHUNK_ROWS: u64 = 10_000;

/// Default cell delimiter for `RFC_READ_TABLE` data transfers.
///
/// The asterism is vanishingly unlikely to appear in table data, unlike
/// the `|` or `;` characters commonly suggested for `DELIMITER`.
pub const DEFAULT_DELIMITER: char = '⁂';

/// Where the field catalog for a query comes from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum FieldInfoSource {
    /// Fetch the catalog from the data dictionary, once, before querying
    #[default]
    Fetch,
    /// Issue no metadata call; requested fields are not validated and
    /// structured `IN` conditions cannot be rendered
    Skip,
    /// Reuse a catalog the caller fetched earlier
    Provided(FieldInfo),
}

/// A logical table-read request.
///
/// Immutable once constructed; one instance per logical query. The client
/// splits a `TableQuery` into however many underlying RFC calls are needed
/// to respect the server's input and output size limits, then reassembles
/// the rows in issuance order.
///
/// # Example
///
/// ```rust
/// use rfc_link::{TableQuery, WhereCondition};
/// use serde_json::json;
///
/// let query = TableQuery::new("MSEG")
///     .with_fields(["MATNR", "MENGE"])
///     .with_where(WhereCondition::in_set(
///         "MATNR",
///         vec![json!("23"), json!("42")],
///     ))
///     .with_batch_rows(50_000)
///     .with_chunk_rows(1_000);
/// # let _ = query;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableQuery {
    /// Table to read
    pub table: String,

    /// Fields to return; empty means all fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,

    /// Filter conditions, implicitly combined with `AND`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wheres: Vec<WhereCondition>,

    /// Maximum number of rows to return per chunk; `None` for no limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<u64>,

    /// Row offset to start reading from
    #[serde(default)]
    pub from_row: u64,

    /// Page size for row batching; `None` reads each chunk in one call.
    /// Must be positive when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_rows: Option<u64>,

    /// Maximum `IN` values per underlying call; larger sets are split
    /// into consecutive value groups of at most this size
    #[serde(default = "default_chunk_rows")]
    pub chunk_rows: u64,

    /// Cell delimiter used in data transfer
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Drop duplicate `IN` values (first occurrence wins) before chunking,
    /// so chunk unions cannot return duplicate rows. Default: true.
    #[serde(default = "default_dedup")]
    pub dedup_in_values: bool,

    /// Field catalog source for validation and filter rendering
    #[serde(default)]
    pub field_info: FieldInfoSource,
}

fn default_chunk_rows() -> u64 {
    DEFAULT_CHUNK_ROWS
}

fn default_delimiter() -> char {
    DEFAULT_DELIMITER
}

fn default_dedup() -> bool {
    true
}

impl TableQuery {
    /// Create a query reading all fields and rows of a table
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
            wheres: Vec::new(),
            max_rows: None,
            from_row: 0,
            batch_rows: None,
            chunk_rows: DEFAULT_CHUNK_ROWS,
            delimiter: DEFAULT_DELIMITER,
            dedup_in_values: true,
            field_info: FieldInfoSource::Fetch,
        }
    }

    /// Set the fields to return
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Add a filter condition (conditions are combined with `AND`)
    pub fn with_where(mut self, condition: WhereCondition) -> Self {
        self.wheres.push(condition);
        self
    }

    /// Replace the filter condition list
    pub fn with_wheres(mut self, wheres: Vec<WhereCondition>) -> Self {
        self.wheres = wheres;
        self
    }

    /// Cap the number of rows returned per chunk
    pub fn with_max_rows(mut self, max_rows: u64) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// Start reading at this row offset
    pub fn with_from_row(mut self, from_row: u64) -> Self {
        self.from_row = from_row;
        self
    }

    /// Read rows in pages of this size
    pub fn with_batch_rows(mut self, batch_rows: u64) -> Self {
        self.batch_rows = Some(batch_rows);
        self
    }

    /// Split oversized `IN` value sets into groups of this size
    pub fn with_chunk_rows(mut self, chunk_rows: u64) -> Self {
        self.chunk_rows = chunk_rows;
        self
    }

    /// Use a different cell delimiter for the data transfer
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Control `IN` value de-duplication
    pub fn with_dedup_in_values(mut self, dedup: bool) -> Self {
        self.dedup_in_values = dedup;
        self
    }

    /// Reuse a field catalog fetched earlier instead of querying it again
    pub fn with_field_info(mut self, field_info: FieldInfo) -> Self {
        self.field_info = FieldInfoSource::Provided(field_info);
        self
    }

    /// Skip the field-catalog fetch entirely.
    ///
    /// Requested field names are then not validated and structured `IN`
    /// conditions fail to render. Used internally for reads against the
    /// data-dictionary tables themselves.
    pub fn without_field_info(mut self) -> Self {
        self.field_info = FieldInfoSource::Skip;
        self
    }
}
