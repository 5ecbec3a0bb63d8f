//! Data models for the rfc-link client library.
//!
//! Defines the request and response structures for table reads plus the
//! connection parameter struct handed to transport implementations.

pub mod abap_type;
pub mod connection_params;
pub mod field_info;
pub mod result_rows;
pub mod table_match;
pub mod table_query;
pub mod where_condition;


pub use abap_type::AbapType;
pub use connection_params::ConnectionParams;
pub use field_info::{FieldInfo, FieldMeta};
pub use result_rows::{ResultField, ResultRows};
pub use table_match::TableMatch;
pub use table_query::{FieldInfoSource, TableQuery, DEFAULT_CHUNK_ROWS, DEFAULT_DELIMITER};
pub use where_condition::WhereCondition;
