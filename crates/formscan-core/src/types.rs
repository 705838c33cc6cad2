/// Shared types for the layout reconstruction stages
///
/// Fragments come from the OCR provider, rows are built by the row grouper,
/// records are emitted by the structure reconstructor and collected into a
/// [`DocumentTable`]. All types serialize with serde so page state can be
/// dumped for debugging.
use serde::{Deserialize, Serialize};

use crate::error::{FormscanError, Result};

/// Number of corner points in an OCR bounding box
pub const BBOX_CORNERS: usize = 4;

/// A point in the OCR provider's pixel space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    #[must_use = "returns a new Point instance"]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Four-corner bounding box as returned by the OCR provider
///
/// Corner 0 is top-left and corner 2 is bottom-right. The other two corners are
/// carried along but never read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub corners: [Point; BBOX_CORNERS],
}

impl BoundingBox {
    /// Build a bounding box from provider corner points.
    ///
    /// # Errors
    ///
    /// Returns [`FormscanError::InvalidFragment`] unless there are exactly four
    /// corners and every coordinate is finite.
    pub fn from_corners(corners: &[(f64, f64)]) -> Result<Self> {
        if corners.len() != BBOX_CORNERS {
            return Err(FormscanError::invalid_fragment(format!(
                "expected {BBOX_CORNERS} corner points, got {}",
                corners.len()
            )));
        }

        let mut points = [Point::default(); BBOX_CORNERS];
        for (slot, (i, &(x, y))) in points.iter_mut().zip(corners.iter().enumerate()) {
            if !x.is_finite() || !y.is_finite() {
                return Err(FormscanError::invalid_fragment(format!(
                    "corner {i} has non-finite coordinates ({x}, {y})"
                )));
            }
            *slot = Point::new(x, y);
        }

        Ok(Self { corners: points })
    }

    /// Axis-aligned box with corners listed clockwise from top-left.
    #[inline]
    #[must_use = "returns a new BoundingBox instance"]
    pub const fn from_ltrb(l: f64, t: f64, r: f64, b: f64) -> Self {
        Self {
            corners: [
                Point::new(l, t),
                Point::new(r, t),
                Point::new(r, b),
                Point::new(l, b),
            ],
        }
    }

    #[inline]
    #[must_use]
    pub const fn top_left(&self) -> Point {
        self.corners[0]
    }

    #[inline]
    #[must_use]
    pub const fn bottom_right(&self) -> Point {
        self.corners[2]
    }

    /// Vertical center: mean of the top-left and bottom-right Y coordinates
    #[inline]
    #[must_use = "returns the vertical center"]
    pub fn y_center(&self) -> f64 {
        (self.top_left().y + self.bottom_right().y) / 2.0
    }

    /// Left edge used for in-row ordering: the top-left X coordinate
    #[inline]
    #[must_use = "returns the row sort key"]
    pub const fn x_start(&self) -> f64 {
        self.top_left().x
    }
}

/// One OCR-recognized text token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub bbox: BoundingBox,
    pub text: String,
}

impl Fragment {
    #[inline]
    #[must_use = "returns a new Fragment instance"]
    pub fn new(bbox: BoundingBox, text: impl Into<String>) -> Self {
        Self {
            bbox,
            text: text.into(),
        }
    }

    /// Build a fragment from raw provider corners.
    ///
    /// # Errors
    ///
    /// See [`BoundingBox::from_corners`].
    pub fn from_corners(corners: &[(f64, f64)], text: impl Into<String>) -> Result<Self> {
        Ok(Self::new(BoundingBox::from_corners(corners)?, text))
    }
}

/// A fragment placed in a row: only its left edge and text survive grouping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFragment {
    pub x_start: f64,
    pub text: String,
}

impl RowFragment {
    #[inline]
    #[must_use = "returns a new RowFragment instance"]
    pub fn new(x_start: f64, text: impl Into<String>) -> Self {
        Self {
            x_start,
            text: text.into(),
        }
    }
}

/// Fragments judged to lie on the same horizontal text line
///
/// `y_center` is the center of the fragment that opened the row and does not
/// move as further fragments join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub y_center: f64,
    pub fragments: Vec<RowFragment>,
}

impl Row {
    #[inline]
    #[must_use = "returns a new Row instance"]
    pub const fn new(y_center: f64) -> Self {
        Self {
            y_center,
            fragments: Vec::new(),
        }
    }

    /// Fragment texts joined by single spaces, then trimmed
    #[must_use = "returns the row text"]
    pub fn combined_text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// One output line: a label (or section header) and its value
///
/// An empty `value` marks either a section header or a label whose value was
/// never found. `("", "")` is the blank separator between sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub label: String,
    pub value: String,
}

impl Record {
    #[inline]
    #[must_use = "returns a new Record instance"]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Section header or unresolved label: text with an empty value
    #[inline]
    #[must_use = "returns a new Record instance"]
    pub fn label_only(label: impl Into<String>) -> Self {
        Self::new(label, String::new())
    }

    /// Blank separator inserted between sections
    #[inline]
    #[must_use = "returns a new Record instance"]
    pub const fn separator() -> Self {
        Self {
            label: String::new(),
            value: String::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_separator(&self) -> bool {
        self.label.is_empty() && self.value.is_empty()
    }
}

/// Ordered records of a whole document, pages concatenated in page order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTable {
    pub records: Vec<Record>,
}

impl DocumentTable {
    #[inline]
    #[must_use = "returns a new DocumentTable instance"]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append one page's records after everything already in the table
    #[inline]
    pub fn extend_page(&mut self, page: Vec<Record>) {
        self.records.extend(page);
    }

    #[inline]
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[inline]
    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a DocumentTable {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
