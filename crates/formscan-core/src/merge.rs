//! Page merge: concatenate per-page records into one document table.
//!
//! No cross-page deduplication or regrouping happens here, so a label whose
//! value wrapped onto the next page stays split.

use crate::types::{DocumentTable, Record};

/// Concatenate page outputs in page order
#[must_use = "merged table is returned but not used"]
pub fn merge<I>(per_page_records: I) -> DocumentTable
where
    I: IntoIterator<Item = Vec<Record>>,
{
    let mut table = DocumentTable::new();
    for page in per_page_records {
        table.extend_page(page);
    }
    table
}
