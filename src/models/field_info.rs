use serde::{Deserialize, Serialize};

use super::abap_type::AbapType;

/// Metadata for a single table column.
///
/// Fetched from the SAP data dictionary (`DD03L`, optionally enriched from
/// `DD04T`). Used to validate requested field names and to format filter
/// values with the correct type and length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    /// Field name as defined in the dictionary
    pub name: String,

    /// Whether the field is part of the table key
    #[serde(default)]
    pub key: bool,

    /// Data element name (`ROLLNAME`), links the field to its texts
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rollname: String,

    /// ABAP internal type
    pub abap_type: AbapType,

    /// Dictionary data type name (e.g. `CHAR`, `NUMC`, `DEC`)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data_type: String,

    /// Field length in the dictionary definition
    pub length: u32,

    /// Position of the field within the table
    #[serde(default)]
    pub position: u32,

    /// Short description from the data element texts, if fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Column heading from the data element texts, if fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,

    /// Short field label (`SCRTEXT_S`), if fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_short: Option<String>,

    /// Medium field label (`SCRTEXT_M`), if fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_medium: Option<String>,

    /// Long field label (`SCRTEXT_L`), if fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_long: Option<String>,
}

impl FieldMeta {
    /// Create a minimal field description (no key flag, texts or position)
    pub fn new(name: impl Into<String>, abap_type: AbapType, length: u32) -> Self {
        Self {
            name: name.into(),
            key: false,
            rollname: String::new(),
            abap_type,
            data_type: String::new(),
            length,
            position: 0,
            description: None,
            heading: None,
            label_short: None,
            label_medium: None,
            label_long: None,
        }
    }
}

/// Per-table column metadata, in dictionary order.
///
/// Fetched once per table and reusable across queries against the same
/// table; treat it as a read-only cache value owned by the caller.
///
/// # Example
///
/// ```rust
/// use rfc_link::{AbapType, FieldInfo, FieldMeta};
///
/// let info = FieldInfo::new(vec![
///     FieldMeta::new("MATNR", AbapType::Char, 18),
///     FieldMeta::new("MENGE", AbapType::Packed, 13),
/// ]);
///
/// assert!(info.contains("MATNR"));
/// assert_eq!(info.get("MENGE").unwrap().length, 13);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    fields: Vec<FieldMeta>,
}

impl FieldInfo {
    /// Create field info from a list of field descriptions
    pub fn new(fields: Vec<FieldMeta>) -> Self {
        Self { fields }
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether a field with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over the fields in dictionary order
    pub fn iter(&self) -> impl Iterator<Item = &FieldMeta> {
        self.fields.iter()
    }

    /// Field names in dictionary order
    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// The field with the smallest dictionary length.
    ///
    /// Used for counting table entries: reading the shortest column keeps
    /// the transferred payload minimal.
    pub fn shortest_field(&self) -> Option<&FieldMeta> {
        self.fields.iter().min_by_key(|f| f.length)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the table has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut FieldMeta> {
        self.fields.iter_mut().find(|f| f.name == name)
    }
}
