//! Main rfc-link client.
//!
//! Wraps an [`RfcTransport`] connection handle and exposes the table-read
//! surface: echo, entry counting, table/field metadata, description search
//! and partitioned row queries. The client owns the handle exclusively for
//! the connection's lifetime and releases it on every exit path.

use log::{debug, warn};
use serde_json::{json, Value as JsonValue};

use crate::error::{Result, RfcLinkError};
use crate::models::{
    AbapType, ConnectionParams, FieldInfo, FieldInfoSource, FieldMeta, ResultRows, TableMatch,
    TableQuery, WhereCondition,
};
use crate::query::QueryExecutor;
use crate::transport::{RfcConnect, RfcParams, RfcTransport};

/// Default read function module.
///
/// `BBP_RFC_READ_TABLE` is the common alternative on systems where the
/// standard module is locked down; select it with
/// [`RfcLinkClient::with_read_function`].
pub const DEFAULT_READ_FUNCTION: &str = "RFC_READ_TABLE";

/// Language key used for internal data-dictionary lookups
const DEFAULT_LANGUAGE: &str = "E";

/// A client for reading table data from one SAP R/3 system.
///
/// Generic over the transport so that a real NetWeaver RFC SDK binding and
/// test doubles plug in the same way. All calls are blocking and issued
/// one at a time.
///
/// The connection is scoped to the client value: [`close`](Self::close)
/// releases it explicitly, and dropping the client releases it on any
/// other exit path, including failures.
///
/// # Example
///
/// ```rust,no_run
/// use rfc_link::{ConnectionParams, RfcLinkClient, TableQuery};
/// # use rfc_link::{RfcConnect, RfcParams, RfcTransport, Result};
/// # struct SdkConnection;
/// # impl RfcTransport for SdkConnection {
/// #     fn call(&mut self, _: &str, _: &RfcParams) -> Result<serde_json::Value> {
/// #         unimplemented!()
/// #     }
/// #     fn close(&mut self) -> Result<()> { Ok(()) }
/// # }
/// # impl RfcConnect for SdkConnection {
/// #     fn connect(_: &ConnectionParams) -> Result<Self> { Ok(SdkConnection) }
/// # }
/// # fn main() -> rfc_link::Result<()> {
/// let params = ConnectionParams::new()
///     .with_ashost("sap.example.com")
///     .with_sysnr("00")
///     .with_client("100")
///     .with_user("READER")
///     .with_passwd("secret");
///
/// let mut client = RfcLinkClient::<SdkConnection>::connect(&params)?;
/// let rows = client.query(&TableQuery::new("MARA").with_fields(["MATNR"]))?;
/// println!("read {} rows", rows.len());
/// client.close()?;
/// # Ok(())
/// # }
/// ```
pub struct RfcLinkClient<T: RfcTransport> {
    transport: T,
    read_function: String,
    closed: bool,
}

impl<T: RfcTransport> RfcLinkClient<T> {
    /// Wrap an already-established connection handle
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            read_function: DEFAULT_READ_FUNCTION.to_string(),
            closed: false,
        }
    }

    /// Open a connection with the given logon parameters
    pub fn connect(params: &ConnectionParams) -> Result<Self>
    where
        T: RfcConnect,
    {
        Ok(Self::new(T::connect(params)?))
    }

    /// Use a different read function module (e.g. `BBP_RFC_READ_TABLE`)
    pub fn with_read_function(mut self, function: impl Into<String>) -> Self {
        self.read_function = function.into();
        self
    }

    /// Open a connection, run `f`, and release the connection on both the
    /// success and the failure path.
    pub fn scoped<R, F>(params: &ConnectionParams, f: F) -> Result<R>
    where
        T: RfcConnect,
        F: FnOnce(&mut Self) -> Result<R>,
    {
        let mut client = Self::connect(params)?;
        let outcome = f(&mut client);
        let released = client.close();
        match outcome {
            Ok(value) => {
                released?;
                Ok(value)
            }
            Err(err) => {
                if let Err(close_err) = released {
                    warn!("[RFC_LINK] close after failure also failed: {}", close_err);
                }
                Err(err)
            }
        }
    }

    /// Release the underlying connection. Safe to call more than once.
    pub fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.transport.close()?;
        }
        Ok(())
    }

    /// Echo a message through the system (`STFC_CONNECTION`).
    ///
    /// The cheapest way to verify that logon and RFC dispatch work.
    pub fn echo(&mut self, message: &str) -> Result<String> {
        let mut params = RfcParams::new();
        params.insert("REQUTEXT".to_string(), json!(message));
        debug!("[RFC_LINK] calling STFC_CONNECTION");
        let result = self.transport.call("STFC_CONNECTION", &params)?;
        result
            .get("ECHOTEXT")
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .ok_or_else(|| RfcLinkError::protocol("STFC_CONNECTION response missing ECHOTEXT"))
    }

    /// Count the entries of a table.
    ///
    /// Reads the shortest column of the table without a row limit and
    /// counts the rows client-side. The counting function modules are no
    /// real alternative: `RFC_GET_TABLE_ENTRIES` reads the whole table
    /// into memory server-side and `EM_GET_NUMBER_OF_ENTRIES` is usually
    /// locked down.
    pub fn count_entries(&mut self, table: &str) -> Result<u64> {
        let info = self.field_info(table, false, DEFAULT_LANGUAGE)?;
        let shortest = info
            .shortest_field()
            .ok_or_else(|| RfcLinkError::protocol(format!("table {} has no fields", table)))?
            .name
            .clone();
        let query = TableQuery::new(table)
            .with_fields([shortest])
            .with_field_info(info);
        let rows = self.query(&query)?;
        Ok(rows.len() as u64)
    }

    /// Get a table's short description in the given language, if any
    pub fn describe_table(&mut self, table: &str, language: &str) -> Result<Option<String>> {
        let query = TableQuery::new("DD02T")
            .with_fields(["DDTEXT"])
            .with_where(WhereCondition::raw(format!("TABNAME = '{}'", table)))
            .with_where(WhereCondition::raw(format!("DDLANGUAGE = '{}'", language)))
            .with_where(WhereCondition::raw("AS4LOCAL = 'A'"))
            .without_field_info();
        let rows = self.query(&query)?;
        Ok(rows
            .rows
            .last()
            .map(|row| cell_text(row, 0))
            .filter(|text| !text.is_empty()))
    }

    /// Find tables whose description matches a pattern (`%` as wildcard)
    pub fn find_tables(&mut self, description: &str, language: &str) -> Result<Vec<TableMatch>> {
        let query = TableQuery::new("DD02T")
            .with_fields(["TABNAME", "DDTEXT"])
            .with_where(WhereCondition::raw(format!(
                "DDTEXT LIKE '{}'",
                description
            )))
            .with_where(WhereCondition::raw(format!("DDLANGUAGE = '{}'", language)))
            .with_where(WhereCondition::raw("AS4LOCAL = 'A'"))
            .without_field_info();
        let rows = self.query(&query)?;
        Ok(rows
            .rows
            .iter()
            .map(|row| TableMatch {
                name: cell_text(row, 0),
                description: cell_text(row, 1),
            })
            .collect())
    }

    /// Get the field catalog of a table from the data dictionary.
    ///
    /// With `descriptions` the catalog is enriched with the short text,
    /// column heading and field labels of each field's data element (one
    /// extra read against `DD04T`).
    pub fn field_info(
        &mut self,
        table: &str,
        descriptions: bool,
        language: &str,
    ) -> Result<FieldInfo> {
        let query = TableQuery::new("DD03L")
            .with_fields([
                "FIELDNAME", "KEYFLAG", "ROLLNAME", "INTTYPE", "DATATYPE", "LENG", "POSITION",
            ])
            .with_where(WhereCondition::raw(format!("TABNAME = '{}'", table)))
            .with_where(WhereCondition::raw("AS4LOCAL = 'A'"))
            .with_where(WhereCondition::raw("INTTYPE <> ''"))
            .without_field_info();
        let rows = self.query(&query)?;

        let mut fields = Vec::with_capacity(rows.len());
        for row in &rows.rows {
            fields.push(FieldMeta {
                name: cell_text(row, 0),
                key: cell_text(row, 1) == "X",
                rollname: cell_text(row, 2),
                abap_type: AbapType::from_code(&cell_text(row, 3)),
                data_type: cell_text(row, 4),
                length: cell_text(row, 5).parse().unwrap_or(0),
                position: cell_text(row, 6).parse().unwrap_or(0),
                description: None,
                heading: None,
                label_short: None,
                label_medium: None,
                label_long: None,
            });
        }
        let mut info = FieldInfo::new(fields);

        if descriptions {
            self.merge_descriptions(&mut info, language)?;
        }
        Ok(info)
    }

    /// Execute a partitioned table read.
    ///
    /// Splits the query into underlying calls that respect the chunk and
    /// batch limits and returns the reassembled rows. Any underlying
    /// failure aborts the whole read; rows gathered so far are discarded.
    pub fn query(&mut self, query: &TableQuery) -> Result<ResultRows> {
        let fetched = match &query.field_info {
            FieldInfoSource::Fetch => {
                Some(self.field_info(&query.table, false, DEFAULT_LANGUAGE)?)
            }
            _ => None,
        };
        let catalog = match &query.field_info {
            FieldInfoSource::Provided(info) => Some(info),
            FieldInfoSource::Skip => None,
            FieldInfoSource::Fetch => fetched.as_ref(),
        };
        QueryExecutor::new(&mut self.transport, &self.read_function).execute(query, catalog)
    }

    /// Enrich a field catalog with data-element texts and labels from
    /// `DD04T`
    fn merge_descriptions(&mut self, info: &mut FieldInfo, language: &str) -> Result<()> {
        let mut rollnames: Vec<JsonValue> = Vec::new();
        for meta in info.iter() {
            if !meta.rollname.is_empty() {
                let value = json!(meta.rollname);
                if !rollnames.contains(&value) {
                    rollnames.push(value);
                }
            }
        }
        if rollnames.is_empty() {
            return Ok(());
        }

        // DD04T's own catalog, just enough to render the ROLLNAME filter
        // and pass field validation
        let dd04t_catalog = FieldInfo::new(vec![
            FieldMeta::new("ROLLNAME", AbapType::Char, 30),
            FieldMeta::new("DDTEXT", AbapType::Char, 60),
            FieldMeta::new("REPTEXT", AbapType::Char, 55),
            FieldMeta::new("SCRTEXT_S", AbapType::Char, 10),
            FieldMeta::new("SCRTEXT_M", AbapType::Char, 20),
            FieldMeta::new("SCRTEXT_L", AbapType::Char, 40),
        ]);
        let query = TableQuery::new("DD04T")
            .with_fields([
                "ROLLNAME",
                "DDTEXT",
                "REPTEXT",
                "SCRTEXT_S",
                "SCRTEXT_M",
                "SCRTEXT_L",
            ])
            .with_where(WhereCondition::in_set("ROLLNAME", rollnames))
            .with_where(WhereCondition::raw(format!("DDLANGUAGE = '{}'", language)))
            .with_where(WhereCondition::raw("AS4LOCAL = 'A'"))
            .with_field_info(dd04t_catalog);
        let rows = self.query(&query)?;

        for row in &rows.rows {
            let rollname = cell_text(row, 0);
            let texts: Vec<Option<String>> = (1..6)
                .map(|i| Some(cell_text(row, i)).filter(|text| !text.is_empty()))
                .collect();
            let names: Vec<String> = info
                .iter()
                .filter(|meta| meta.rollname == rollname)
                .map(|meta| meta.name.clone())
                .collect();
            for name in names {
                if let Some(meta) = info.get_mut(&name) {
                    for (slot, text) in [
                        &mut meta.description,
                        &mut meta.heading,
                        &mut meta.label_short,
                        &mut meta.label_medium,
                        &mut meta.label_long,
                    ]
                    .into_iter()
                    .zip(&texts)
                    {
                        if text.is_some() {
                            *slot = text.clone();
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl<T: RfcTransport> Drop for RfcLinkClient<T> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(err) = self.transport.close() {
                warn!("[RFC_LINK] failed to release connection on drop: {}", err);
            }
        }
    }
}

fn cell_text(row: &[JsonValue], index: usize) -> String {
    match row.get(index) {
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
