use std::collections::BTreeMap;

use serde::Serialize;

/// Attribute key: file path, or `<stream>` for in-memory readers and writers
pub const PATH: &str = "path";
/// Attribute key: format version from the file tag
pub const VERSION_NUMBER: &str = "versionNumber";
/// Attribute key: `lsbf` or `msbf`
pub const BYTE_ORDER: &str = "byteOrder";
/// Attribute key: `float` or `double`
pub const DATA_TYPE: &str = "dataType";
/// Attribute key: always `binary` for this codec
pub const NUMBER_FORMAT: &str = "numberFormat";
/// Attribute key: events stored in the file
pub const NUMBER_OF_EVENTS: &str = "numberOfEvents";
/// Attribute key: parameters stored in the file
pub const NUMBER_OF_PARAMETERS: &str = "numberOfParameters";

/// Metadata describing the most recently loaded or saved file.
///
/// Rebuilt from scratch on every codec call; nothing here is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FileAttributes {
    values: BTreeMap<String, String>,
}

impl FileAttributes {
    /// Create an empty attribute map
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an attribute
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set an attribute, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.values.insert(key.into(), value.to_string());
    }

    /// Remove every attribute
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no attribute is set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over (key, value) pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
