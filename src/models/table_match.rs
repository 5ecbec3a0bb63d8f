use serde::{Deserialize, Serialize};

/// A table found by a description search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMatch {
    /// Table name
    pub name: String,

    /// Short description in the requested language
    pub description: String,
}
