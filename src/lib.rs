//! # rfc-link: SAP R/3 table-read client library
//!
//! A blocking client library for querying table data from SAP R/3 systems
//! through the SAP NetWeaver RFC SDK. The SDK does the heavy lifting (wire
//! protocol, type marshaling, session handling); this crate provides a
//! typed call surface on top of its function-module interface.
//!
//! ## Features
//!
//! - **Partitioned table reads**: one logical query is split into calls
//!   that respect the server's row-output limit (`batch_rows`) and
//!   filter-input limit (`chunk_rows`), then reassembled in order
//! - **Typed filters**: raw filter text, `IN`/`NOT IN` value sets, and
//!   tuple sets over field combinations, rendered to the SAP
//!   filter-expression grammar
//! - **Dictionary metadata**: field catalogs, table descriptions and
//!   description search via `DD02T`/`DD03L`/`DD04T`
//! - **Scoped connections**: the connection handle is released on every
//!   exit path, including failures
//! - **Pluggable transport**: the SDK sits behind the [`RfcTransport`]
//!   trait, so real bindings and test doubles plug in the same way
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rfc_link::{ConnectionParams, RfcLinkClient, TableQuery, WhereCondition};
//! use serde_json::json;
//! # use rfc_link::{RfcConnect, RfcParams, RfcTransport, Result};
//! # struct SdkConnection;
//! # impl RfcTransport for SdkConnection {
//! #     fn call(&mut self, _: &str, _: &RfcParams) -> Result<serde_json::Value> {
//! #         unimplemented!()
//! #     }
//! #     fn close(&mut self) -> Result<()> { Ok(()) }
//! # }
//! # impl RfcConnect for SdkConnection {
//! #     fn connect(_: &ConnectionParams) -> Result<Self> { Ok(SdkConnection) }
//! # }
//!
//! fn main() -> rfc_link::Result<()> {
//!     let params = ConnectionParams::new()
//!         .with_ashost("sap.example.com")
//!         .with_sysnr("00")
//!         .with_client("100")
//!         .with_user("READER")
//!         .with_passwd("secret");
//!
//!     RfcLinkClient::<SdkConnection>::scoped(&params, |client| {
//!         // Reuse the field catalog across queries against the same table
//!         let info = client.field_info("MSEG", false, "E")?;
//!
//!         let query = TableQuery::new("MSEG")
//!             .with_fields(["MATNR", "MENGE"])
//!             .with_where(WhereCondition::in_set(
//!                 "MATNR",
//!                 vec![json!("23"), json!("42")],
//!             ))
//!             .with_batch_rows(50_000)
//!             .with_field_info(info);
//!
//!         let rows = client.query(&query)?;
//!         println!("read {} rows", rows.len());
//!         Ok(())
//!     })
//! }
//! ```

pub mod client;
pub mod error;
pub mod filter;
pub mod models;
pub mod transport;
pub mod value;

mod query;

// Re-export main types for convenience
pub use client::{RfcLinkClient, DEFAULT_READ_FUNCTION};
pub use error::{Result, RfcLinkError};
pub use models::{
    AbapType, ConnectionParams, FieldInfo, FieldInfoSource, FieldMeta, ResultField, ResultRows,
    TableMatch, TableQuery, WhereCondition, DEFAULT_CHUNK_ROWS, DEFAULT_DELIMITER,
};
pub use transport::{RfcConnect, RfcParams, RfcTransport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
