use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Logon parameters for an SAP R/3 connection.
///
/// The common NetWeaver RFC SDK parameters get fixed, typed, optional
/// fields; anything vendor- or landscape-specific goes into the
/// [`extensions`](Self::extensions) map and is passed to the SDK verbatim.
/// Typed fields always win over an extension with the same name.
///
/// # Example
///
/// ```rust
/// use rfc_link::ConnectionParams;
///
/// let params = ConnectionParams::new()
///     .with_ashost("sap.example.com")
///     .with_sysnr("00")
///     .with_client("100")
///     .with_user("READER")
///     .with_passwd("secret")
///     .with_extension("USE_TLS", "1");
/// # let _ = params;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Application server host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ashost: Option<String>,

    /// System number (two digits, e.g. `"00"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sysnr: Option<String>,

    /// Client number (three digits, e.g. `"100"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,

    /// Logon user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Logon password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passwd: Option<String>,

    /// Logon language (e.g. `"EN"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// SAProuter string for connections through a router
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saprouter: Option<String>,

    /// Message server host, for load-balanced logon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mshost: Option<String>,

    /// Message server service or port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msserv: Option<String>,

    /// Logon group for load-balanced logon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// System ID (three characters, e.g. `"PRD"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sysid: Option<String>,

    /// SDK trace level (`"0"`..`"3"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,

    /// Additional SDK parameters passed through verbatim
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, String>,
}

impl ConnectionParams {
    /// Create empty connection parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application server host
    pub fn with_ashost(mut self, ashost: impl Into<String>) -> Self {
        self.ashost = Some(ashost.into());
        self
    }

    /// Set the system number
    pub fn with_sysnr(mut self, sysnr: impl Into<String>) -> Self {
        self.sysnr = Some(sysnr.into());
        self
    }

    /// Set the client number
    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    /// Set the logon user
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the logon password
    pub fn with_passwd(mut self, passwd: impl Into<String>) -> Self {
        self.passwd = Some(passwd.into());
        self
    }

    /// Set the logon language
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Set the SAProuter string
    pub fn with_saprouter(mut self, saprouter: impl Into<String>) -> Self {
        self.saprouter = Some(saprouter.into());
        self
    }

    /// Set the message server host
    pub fn with_mshost(mut self, mshost: impl Into<String>) -> Self {
        self.mshost = Some(mshost.into());
        self
    }

    /// Set the message server service or port
    pub fn with_msserv(mut self, msserv: impl Into<String>) -> Self {
        self.msserv = Some(msserv.into());
        self
    }

    /// Set the logon group
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the system ID
    pub fn with_sysid(mut self, sysid: impl Into<String>) -> Self {
        self.sysid = Some(sysid.into());
        self
    }

    /// Set the SDK trace level
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    /// Add a vendor-specific SDK parameter.
    ///
    /// The key is uppercased to match the SDK's parameter naming.
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extensions
            .insert(key.into().to_uppercase(), value.into());
        self
    }

    /// Flatten into the key/value list the SDK consumes.
    ///
    /// Typed fields come first under their uppercase SDK names; extensions
    /// follow, except where a typed field with the same name is set.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let typed: [(&str, &Option<String>); 12] = [
            ("ASHOST", &self.ashost),
            ("SYSNR", &self.sysnr),
            ("CLIENT", &self.client),
            ("USER", &self.user),
            ("PASSWD", &self.passwd),
            ("LANG", &self.lang),
            ("SAPROUTER", &self.saprouter),
            ("MSHOST", &self.mshost),
            ("MSSERV", &self.msserv),
            ("GROUP", &self.group),
            ("SYSID", &self.sysid),
            ("TRACE", &self.trace),
        ];

        let mut pairs = Vec::new();
        for (key, value) in &typed {
            if let Some(value) = value {
                pairs.push(((*key).to_string(), value.clone()));
            }
        }
        for (key, value) in &self.extensions {
            let shadowed = typed
                .iter()
                .any(|(name, field)| name == key && field.is_some());
            if !shadowed {
                pairs.push((key.clone(), value.clone()));
            }
        }
        pairs
    }
}
