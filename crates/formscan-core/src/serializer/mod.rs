//! Record serialization
//!
//! Serializers for writing a [`DocumentTable`](crate::types::DocumentTable) out
//! as CSV (the primary output) or JSON.

pub mod csv;
pub mod json;

pub use self::csv::{CsvOptions, CsvSerializer, LineTerminator};
pub use self::json::{JsonOptions, JsonSerializer};
