/// Stage 2: Structure Reconstruction
///
/// Walks the rows of one page and turns them into `(label, value)` records.
///
/// Each row's combined text is classified, in priority order:
/// 1. Section header (any header rule matches): blank separator first unless
///    this is the page's first section, then `(text, "")`; drops the pending label
/// 2. Label:value pair (contains `:`): split on the first colon, trim both
///    sides; a pending label is flushed as `(pending, "")` first
/// 3. Continuation (a pending label exists): `(pending, text)`
/// 4. New pending label: remember `text`, replacing any older pending label
///
/// A pending label left over after the last row is flushed as `(pending, "")`.
///
/// A pending label takes the very next non-header, colon-free line as its
/// value, whatever that line is. Two labels stacked without values pair up:
/// `"Address"`, `"Phone"` yields `("Address", "Phone")`.
use crate::headers::HeaderDetector;
use crate::types::{Record, Row};

/// How a row was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    SectionHeader,
    LabelValue,
    Continuation,
    PendingLabel,
}

/// Stage 2: Structure Reconstructor
///
/// Input: rows of one page, in order
/// Output: `Vec<Record>` for that page
#[derive(Debug, Default)]
pub struct StructureReconstructor {
    headers: HeaderDetector,
}

impl StructureReconstructor {
    /// Create a reconstructor with the default header rules
    #[inline]
    #[must_use = "structure reconstructor stage is created but not used"]
    pub fn new() -> Self {
        Self {
            headers: HeaderDetector::new(),
        }
    }

    /// Create a reconstructor with custom header rules
    #[inline]
    #[must_use = "structure reconstructor stage is created but not used"]
    pub const fn with_headers(headers: HeaderDetector) -> Self {
        Self { headers }
    }

    #[inline]
    #[must_use]
    pub const fn headers(&self) -> &HeaderDetector {
        &self.headers
    }

    /// Reconstruct the records of one page
    #[must_use = "reconstructed records are returned but not used"]
    pub fn process(&self, rows: &[Row]) -> Vec<Record> {
        let mut state = PageState::default();
        for row in rows {
            let kind = state.push_row(&self.headers, &row.combined_text());
            log::trace!("row y={:.1} classified as {kind:?}", row.y_center);
        }
        state.finish()
    }

    /// Classify a single line of text given whether a label is pending
    #[must_use]
    pub fn classify(&self, text: &str, has_pending_label: bool) -> RowKind {
        if self.headers.is_header(text) {
            RowKind::SectionHeader
        } else if text.contains(':') {
            RowKind::LabelValue
        } else if has_pending_label {
            RowKind::Continuation
        } else {
            RowKind::PendingLabel
        }
    }
}

/// Reconstruct records with the default header rules
#[must_use = "reconstructed records are returned but not used"]
pub fn reconstruct(rows: &[Row]) -> Vec<Record> {
    StructureReconstructor::new().process(rows)
}

/// Per-page state machine
#[derive(Debug)]
struct PageState {
    records: Vec<Record>,
    pending_label: Option<String>,
    is_first_section: bool,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            pending_label: None,
            is_first_section: true,
        }
    }
}

impl PageState {
    fn push_row(&mut self, headers: &HeaderDetector, text: &str) -> RowKind {
        if headers.is_header(text) {
            if !self.is_first_section {
                self.records.push(Record::separator());
            }
            self.is_first_section = false;
            self.records.push(Record::label_only(text));
            self.pending_label = None;
            return RowKind::SectionHeader;
        }

        if let Some((label, value)) = text.split_once(':') {
            self.flush_pending();
            self.records.push(Record::new(label.trim(), value.trim()));
            return RowKind::LabelValue;
        }

        if let Some(label) = self.pending_label.take() {
            self.records.push(Record::new(label, text));
            return RowKind::Continuation;
        }

        // A blank row never becomes a label
        if !text.is_empty() {
            self.pending_label = Some(text.to_string());
        }
        RowKind::PendingLabel
    }

    fn flush_pending(&mut self) {
        if let Some(label) = self.pending_label.take() {
            self.records.push(Record::label_only(label));
        }
    }

    fn finish(mut self) -> Vec<Record> {
        self.flush_pending();
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RowFragment;

    fn row(text: &str) -> Row {
        Row {
            y_center: 0.0,
            fragments: vec![RowFragment::new(0.0, text)],
        }
    }

    fn rows(texts: &[&str]) -> Vec<Row> {
        texts.iter().map(|t| row(t)).collect()
    }

    fn pairs(records: &[Record]) -> Vec<(&str, &str)> {
        records
            .iter()
            .map(|r| (r.label.as_str(), r.value.as_str()))
            .collect()
    }

    #[test]
    fn test_same_line_label_value() {
        let records = reconstruct(&[Row {
            y_center: 5.0,
            fragments: vec![RowFragment::new(0.0, "NAME:"), RowFragment::new(20.0, "John")],
        }]);
        assert_eq!(pairs(&records), vec![("NAME", "John")]);
    }

    #[test]
    fn test_first_header_has_no_separator() {
        let records = reconstruct(&rows(&["TOTALS", "Amount: 100"]));
        assert_eq!(pairs(&records), vec![("TOTALS", ""), ("Amount", "100")]);
    }

    #[test]
    fn test_continuation_resolves_pending_label() {
        let records = reconstruct(&rows(&["Address", "123 Main St"]));
        assert_eq!(pairs(&records), vec![("Address", "123 Main St")]);
    }

    #[test]
    fn test_next_line_is_consumed_as_value() {
        let records = reconstruct(&rows(&["Address", "Phone"]));
        // "Phone" is taken as the value of "Address", never a new label
        assert_eq!(pairs(&records), vec![("Address", "Phone")]);
    }

    #[test]
    fn test_label_after_continuation_is_pending_again() {
        let records = reconstruct(&rows(&["Address", "Phone", "Email", "a@b.c"]));
        assert_eq!(
            pairs(&records),
            vec![("Address", "Phone"), ("Email", "a@b.c")]
        );
    }

    #[test]
    fn test_separator_between_sections() {
        let records = reconstruct(&rows(&[
            "1. Applicant",
            "Name: Jane",
            "2. Employer",
            "Company: Acme",
            "TOTALS",
        ]));
        assert_eq!(
            pairs(&records),
            vec![
                ("1. Applicant", ""),
                ("Name", "Jane"),
                ("", ""),
                ("2. Employer", ""),
                ("Company", "Acme"),
                ("", ""),
                ("TOTALS", ""),
            ]
        );
    }

    #[test]
    fn test_split_on_first_colon_only() {
        let records = reconstruct(&rows(&["Time:  10:30 am "]));
        assert_eq!(pairs(&records), vec![("Time", "10:30 am")]);
    }

    #[test]
    fn test_label_value_flushes_pending_label() {
        let records = reconstruct(&rows(&["Signature", "Date: 2024-01-01"]));
        assert_eq!(
            pairs(&records),
            vec![("Signature", ""), ("Date", "2024-01-01")]
        );
    }

    #[test]
    fn test_header_drops_pending_label() {
        let records = reconstruct(&rows(&["Notes", "SUMMARY"]));
        assert_eq!(pairs(&records), vec![("SUMMARY", "")]);
    }

    #[test]
    fn test_trailing_pending_label_flushed_once() {
        let records = reconstruct(&rows(&["Amount: 5", "Remarks"]));
        assert_eq!(pairs(&records), vec![("Amount", "5"), ("Remarks", "")]);
    }

    #[test]
    fn test_uppercase_with_colon_is_header() {
        // Header check wins over the colon split
        let records = reconstruct(&rows(&["NAME:", "John"]));
        assert_eq!(pairs(&records), vec![("NAME:", ""), ("John", "")]);
    }

    #[test]
    fn test_colon_only_row() {
        let records = reconstruct(&rows(&[":"]));
        assert_eq!(pairs(&records), vec![("", "")]);
    }

    #[test]
    fn test_blank_row_without_pending_is_ignored() {
        let records = reconstruct(&rows(&["  ", "Amount: 1"]));
        assert_eq!(pairs(&records), vec![("Amount", "1")]);
    }

    #[test]
    fn test_blank_row_resolves_pending_with_empty_value() {
        let records = reconstruct(&rows(&["Comments", "", "Amount: 1"]));
        assert_eq!(pairs(&records), vec![("Comments", ""), ("Amount", "1")]);
    }

    #[test]
    fn test_empty_page() {
        assert!(reconstruct(&[]).is_empty());
    }

    #[test]
    fn test_custom_header_rules() {
        let reconstructor = StructureReconstructor::with_headers(HeaderDetector::empty());
        let records = reconstructor.process(&rows(&["TOTALS", "100"]));
        // Without rules "TOTALS" is just a label
        assert_eq!(pairs(&records), vec![("TOTALS", "100")]);
    }

    #[test]
    fn test_classify() {
        let reconstructor = StructureReconstructor::new();
        assert_eq!(reconstructor.classify("TOTALS", false), RowKind::SectionHeader);
        assert_eq!(reconstructor.classify("Amount: 1", true), RowKind::LabelValue);
        assert_eq!(reconstructor.classify("Main St", true), RowKind::Continuation);
        assert_eq!(reconstructor.classify("Main St", false), RowKind::PendingLabel);
    }
}
