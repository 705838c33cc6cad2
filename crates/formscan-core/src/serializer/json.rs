//! JSON serialization for document tables
//!
//! Records are written as an array of `{"label": ..., "value": ...}` objects.

use serde_json::{to_string, to_string_pretty};

use crate::error::Result;
use crate::types::DocumentTable;

/// Options for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JsonOptions {
    /// Pretty-print with indentation (default: true)
    pub pretty: bool,
}

impl Default for JsonOptions {
    #[inline]
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// JSON serializer for document tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct JsonSerializer {
    options: JsonOptions,
}

impl JsonSerializer {
    /// Create a new JSON serializer with default options (pretty-printed)
    #[inline]
    #[must_use = "creates serializer with default options"]
    pub fn new() -> Self {
        Self {
            options: JsonOptions::default(),
        }
    }

    #[inline]
    #[must_use = "creates serializer with custom options"]
    pub const fn with_options(options: JsonOptions) -> Self {
        Self { options }
    }

    /// Serialize the table's records to JSON
    ///
    /// # Errors
    /// Returns error if serialization fails
    #[must_use = "this function returns serialized JSON that should be used"]
    pub fn serialize_table(&self, table: &DocumentTable) -> Result<String> {
        let records = table.records();
        let json = if self.options.pretty {
            to_string_pretty(records)?
        } else {
            to_string(records)?
        };
        Ok(json)
    }
}
