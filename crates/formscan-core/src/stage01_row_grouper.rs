/// Stage 1: Row Grouping
///
/// Clusters OCR fragments into horizontal text rows.
///
/// Algorithm:
/// 1. For each fragment (in provider order) compute `y_center` and `x_start`
/// 2. Append it to the FIRST open row whose `y_center` is within `y_tolerance`
///    (first-match, not nearest-match); otherwise open a new row at its `y_center`
/// 3. Stable-sort each row's fragments by `x_start`
/// 4. Return rows in creation order (optionally stable-sorted by `y_center`)
///
/// Key detail: assignment depends on provider arrival order. A fragment that
/// is within tolerance of two rows always joins the older one, and rows come
/// out top-to-bottom only if the provider returns fragments roughly in
/// reading order. This is the accepted approximation, not a bug.
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{FormscanError, Result};
use crate::types::{Fragment, Row, RowFragment};

/// Default vertical tolerance in provider pixel units
pub const DEFAULT_Y_TOLERANCE: f64 = 10.0;

/// Configuration for Stage 1 (Row Grouping)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowGrouperConfig {
    /// Maximum vertical-center distance for two fragments to share a row (default 10.0)
    pub y_tolerance: f64,
    /// Stable-sort rows by `y_center` after grouping (default false: creation order)
    pub sort_rows_by_y: bool,
}

impl Default for RowGrouperConfig {
    #[inline]
    fn default() -> Self {
        Self {
            y_tolerance: DEFAULT_Y_TOLERANCE,
            sort_rows_by_y: false,
        }
    }
}

impl RowGrouperConfig {
    /// Check that the tolerance is usable.
    ///
    /// # Errors
    ///
    /// Returns [`FormscanError::ConfigError`] for a negative or non-finite tolerance.
    pub fn validate(&self) -> Result<()> {
        if !self.y_tolerance.is_finite() {
            return Err(FormscanError::ConfigError {
                reason: format!("y_tolerance must be finite, got {}", self.y_tolerance),
            });
        }
        if self.y_tolerance < 0.0 {
            return Err(FormscanError::ConfigError {
                reason: format!("y_tolerance must be >= 0, got {}", self.y_tolerance),
            });
        }
        Ok(())
    }
}

/// Stage 1: Row Grouper
///
/// Input: fragments of one page, in provider order
/// Output: `Vec<Row>` with left-to-right fragments
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RowGrouper {
    config: RowGrouperConfig,
}

impl RowGrouper {
    /// Create a new `RowGrouper` with default configuration
    #[inline]
    #[must_use = "row grouper stage is created but not used"]
    pub fn new() -> Self {
        Self {
            config: RowGrouperConfig::default(),
        }
    }

    /// Create a new `RowGrouper` with custom configuration
    #[inline]
    #[must_use = "row grouper stage is created but not used"]
    pub const fn with_config(config: RowGrouperConfig) -> Self {
        Self { config }
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &RowGrouperConfig {
        &self.config
    }

    /// Group one page of fragments into rows
    #[must_use = "grouped rows are returned but not used"]
    pub fn process(&self, fragments: Vec<Fragment>) -> Vec<Row> {
        let mut rows = group(fragments, self.config.y_tolerance);

        if self.config.sort_rows_by_y {
            rows.sort_by(|a, b| {
                a.y_center
                    .partial_cmp(&b.y_center)
                    .unwrap_or(Ordering::Equal)
            });
        }

        log::trace!(
            "row grouper: {} rows (tolerance {})",
            rows.len(),
            self.config.y_tolerance
        );
        rows
    }
}

/// Group fragments into rows with first-match tolerance buckets.
///
/// Every input fragment lands in exactly one row. Rows come back in creation
/// order; fragments within a row are sorted by `x_start`, ties keeping
/// arrival order.
#[must_use = "grouped rows are returned but not used"]
pub fn group(fragments: Vec<Fragment>, y_tolerance: f64) -> Vec<Row> {
    let mut rows: Vec<Row> = Vec::new();

    for fragment in fragments {
        let y_center = fragment.bbox.y_center();
        let entry = RowFragment::new(fragment.bbox.x_start(), fragment.text);

        match rows
            .iter_mut()
            .find(|row| (row.y_center - y_center).abs() <= y_tolerance)
        {
            Some(row) => row.fragments.push(entry),
            None => {
                let mut row = Row::new(y_center);
                row.fragments.push(entry);
                rows.push(row);
            }
        }
    }

    for row in &mut rows {
        // sort_by is stable; -0.0 and 0.0 compare equal and keep arrival order
        row.fragments.sort_by(|a, b| {
            a.x_start
                .partial_cmp(&b.x_start)
                .unwrap_or(Ordering::Equal)
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn frag(l: f64, t: f64, r: f64, b: f64, text: &str) -> Fragment {
        Fragment::new(BoundingBox::from_ltrb(l, t, r, b), text)
    }

    fn texts(row: &Row) -> Vec<&str> {
        row.fragments.iter().map(|f| f.text.as_str()).collect()
    }

    #[test]
    fn test_same_line_fragments_share_a_row() {
        let rows = group(
            vec![frag(0.0, 0.0, 10.0, 10.0, "NAME:"), frag(20.0, 0.0, 30.0, 10.0, "John")],
            DEFAULT_Y_TOLERANCE,
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].y_center, 5.0);
        assert_eq!(rows[0].fragments[0], RowFragment::new(0.0, "NAME:"));
        assert_eq!(rows[0].fragments[1], RowFragment::new(20.0, "John"));
    }

    #[test]
    fn test_fragments_sorted_left_to_right() {
        let rows = group(
            vec![
                frag(50.0, 0.0, 60.0, 10.0, "c"),
                frag(0.0, 0.0, 10.0, 10.0, "a"),
                frag(25.0, 2.0, 35.0, 12.0, "b"),
            ],
            DEFAULT_Y_TOLERANCE,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(texts(&rows[0]), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_equal_x_keeps_arrival_order() {
        let rows = group(
            vec![frag(5.0, 0.0, 10.0, 10.0, "first"), frag(5.0, 1.0, 10.0, 11.0, "second")],
            DEFAULT_Y_TOLERANCE,
        );
        assert_eq!(texts(&rows[0]), vec!["first", "second"]);
    }

    #[test]
    fn test_signed_zero_x_is_a_tie() {
        let rows = group(
            vec![frag(0.0, 0.0, 10.0, 10.0, "b"), frag(-0.0, 0.0, 10.0, 10.0, "a")],
            DEFAULT_Y_TOLERANCE,
        );
        assert_eq!(texts(&rows[0]), vec!["b", "a"]);
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        // centers 5.0 and 15.0: exactly 10 apart
        let rows = group(
            vec![frag(0.0, 0.0, 10.0, 10.0, "a"), frag(20.0, 10.0, 30.0, 20.0, "b")],
            10.0,
        );
        assert_eq!(rows.len(), 1);

        let rows = group(
            vec![frag(0.0, 0.0, 10.0, 10.0, "a"), frag(20.0, 10.0, 30.0, 20.0, "b")],
            9.99,
        );
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_first_match_not_nearest_match() {
        // Rows at y=0 and y=12; a fragment at y=9 is nearer the second row but
        // within tolerance of the first, so it joins the first.
        let rows = group(
            vec![
                frag(0.0, -5.0, 10.0, 5.0, "top"),
                frag(0.0, 7.0, 10.0, 17.0, "lower"),
                frag(20.0, 4.0, 30.0, 14.0, "between"),
            ],
            10.0,
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(texts(&rows[0]), vec!["top", "between"]);
        assert_eq!(texts(&rows[1]), vec!["lower"]);
    }

    #[test]
    fn test_row_center_does_not_drift() {
        // Each fragment is 8px below the previous; only the seed center counts.
        let rows = group(
            vec![
                frag(0.0, 0.0, 10.0, 10.0, "a"),
                frag(10.0, 8.0, 20.0, 18.0, "b"),
                frag(20.0, 16.0, 30.0, 26.0, "c"),
            ],
            10.0,
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].y_center, 5.0);
        assert_eq!(texts(&rows[0]), vec!["a", "b"]);
        assert_eq!(texts(&rows[1]), vec!["c"]);
    }

    #[test]
    fn test_rows_in_creation_order() {
        let rows = group(
            vec![frag(0.0, 100.0, 10.0, 110.0, "bottom"), frag(0.0, 0.0, 10.0, 10.0, "top")],
            DEFAULT_Y_TOLERANCE,
        );
        assert_eq!(texts(&rows[0]), vec!["bottom"]);
        assert_eq!(texts(&rows[1]), vec!["top"]);
    }

    #[test]
    fn test_sort_rows_by_y_option() {
        let grouper = RowGrouper::with_config(RowGrouperConfig {
            sort_rows_by_y: true,
            ..Default::default()
        });
        let rows = grouper.process(vec![
            frag(0.0, 100.0, 10.0, 110.0, "bottom"),
            frag(0.0, 0.0, 10.0, 10.0, "top"),
        ]);
        assert_eq!(texts(&rows[0]), vec!["top"]);
        assert_eq!(texts(&rows[1]), vec!["bottom"]);
    }

    #[test]
    fn test_empty_page() {
        assert!(RowGrouper::new().process(Vec::new()).is_empty());
    }

    #[test]
    fn test_config_validation() {
        assert!(RowGrouperConfig::default().validate().is_ok());
        assert!(RowGrouperConfig {
            y_tolerance: 0.0,
            ..Default::default()
        }
        .validate()
        .is_ok());

        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let err = RowGrouperConfig {
                y_tolerance: bad,
                ..Default::default()
            }
            .validate()
            .unwrap_err();
            assert!(err.is_config_error(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: RowGrouperConfig = serde_json::from_str(r#"{"sort_rows_by_y": true}"#).unwrap();
        assert_eq!(config.y_tolerance, DEFAULT_Y_TOLERANCE);
        assert!(config.sort_rows_by_y);
    }
}
