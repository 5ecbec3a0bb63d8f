//! Transport seam over the SAP NetWeaver RFC SDK.
//!
//! The RFC wire protocol, SAP type marshaling and session handling all live
//! inside the closed-source NW RFC SDK. This crate only issues logical
//! function-module calls, so the SDK is abstracted behind [`RfcTransport`]:
//! a real binding wraps an SDK connection handle, tests use a scripted
//! in-memory implementation.
//!
//! Parameters and results are passed as JSON maps, mirroring the SDK's
//! dictionary-shaped function-module interface: importing parameters are
//! scalar values, table parameters are arrays of row objects.

use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::models::ConnectionParams;

/// Parameter map for a function-module invocation.
///
/// Keys are the function module's parameter names (e.g. `QUERY_TABLE`),
/// values are scalars or arrays of row objects for table parameters.
pub type RfcParams = serde_json::Map<String, JsonValue>;

/// A blocking connection handle to an SAP system.
///
/// The handle is assumed non-reentrant: calls are issued one at a time and
/// awaited to completion, so all methods take `&mut self`. The handle is
/// owned exclusively by the [`RfcLinkClient`](crate::client::RfcLinkClient)
/// for the connection's lifetime.
pub trait RfcTransport {
    /// Invoke a remote function module and return its result parameters.
    fn call(&mut self, function: &str, params: &RfcParams) -> Result<JsonValue>;

    /// Release the underlying connection handle.
    ///
    /// Called once when the owning client closes or is dropped; further
    /// calls after close are a contract violation.
    fn close(&mut self) -> Result<()>;
}

/// A transport that can establish its own connection from logon parameters.
///
/// Real SDK bindings implement this so that
/// [`RfcLinkClient::connect`](crate::client::RfcLinkClient::connect) can
/// acquire and scope the connection; test transports usually skip it and
/// are handed to the client pre-built.
pub trait RfcConnect: RfcTransport + Sized {
    /// Open a connection to the system described by `params`.
    fn connect(params: &ConnectionParams) -> Result<Self>;
}
