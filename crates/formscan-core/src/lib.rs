//! # Formscan Core - Form Layout Reconstruction
//!
//! Turns the flat output of an OCR engine (text fragments with bounding
//! boxes) back into the row and field structure of a scanned form, and
//! writes the result as a two-column `label,value` table.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use formscan_core::{CsvSerializer, FragmentReader, LayoutPipeline, Result};
//!
//! fn main() -> Result<()> {
//!     let json = std::fs::read_to_string("scan.json")?;
//!     let pages = FragmentReader::new().read_document(&json)?;
//!
//!     let table = LayoutPipeline::new().process_document(pages);
//!     print!("{}", CsvSerializer::new().serialize_table(&table)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline Stages
//!
//! ### Stage 1: Row Grouping ([`RowGrouper`])
//! - **Input:** OCR fragments of one page, in provider order
//! - **Process:** Buckets fragments whose vertical centers lie within
//!   `y_tolerance` of a row's center (first match wins), then orders each row
//!   left to right
//! - **Output:** Rows in creation order
//!
//! ### Stage 2: Structure Reconstruction ([`StructureReconstructor`])
//! - **Input:** Rows of one page
//! - **Process:** Classifies each row as section header, `label: value`
//!   pair, continuation of a pending label, or a new pending label
//! - **Output:** `(label, value)` records, with blank separators between
//!   sections
//!
//! ### Merge ([`merge()`])
//! - Concatenates per-page records in page order. Pages never share state.
//!
//! [`LayoutPipeline`] runs both stages per page (on the rayon pool when
//! `parallel` is set) and merges the results.
//!
//! ## Output
//!
//! - [`CsvSerializer`]: 2-column CSV, CRLF by default
//! - [`JsonSerializer`]: array of `{label, value}` objects

pub mod error;
pub mod headers;
pub mod input;
pub mod merge;
pub mod pipeline;
pub mod serializer;
pub mod stage01_row_grouper;
pub mod stage02_structure;
pub mod types;

pub use error::{FormscanError, Result};
pub use headers::{HeaderDetector, HeaderRule, NumberedHeading, UppercaseHeading};
pub use input::{fragment_from_value, FragmentReader, InvalidFragmentPolicy};
pub use merge::merge;
pub use pipeline::{LayoutPipeline, PipelineConfig};
pub use serializer::{
    CsvOptions, CsvSerializer, JsonOptions, JsonSerializer, LineTerminator,
};
pub use stage01_row_grouper::{group, RowGrouper, RowGrouperConfig, DEFAULT_Y_TOLERANCE};
pub use stage02_structure::{reconstruct, RowKind, StructureReconstructor};
pub use types::{
    BoundingBox, DocumentTable, Fragment, Point, Record, Row, RowFragment, BBOX_CORNERS,
};
