//! Error types for layout reconstruction.
//!
//! Only the input boundary can fail: row grouping and structure reconstruction
//! accept every well-formed fragment. Serialization errors are wrapped so
//! callers see a single error type.

use thiserror::Error;

/// Errors that can occur while building or serializing a document table.
///
/// # Examples
///
/// ```rust,ignore
/// use formscan_core::{Fragment, FormscanError};
///
/// match Fragment::from_corners(&[(0.0, 0.0), (10.0, 0.0)], "NAME:") {
///     Err(FormscanError::InvalidFragment { reason, .. }) => eprintln!("dropped: {reason}"),
///     Err(e) => eprintln!("other error: {e}"),
///     Ok(fragment) => println!("{}", fragment.text),
/// }
/// ```
#[derive(Error, Debug)]
pub enum FormscanError {
    /// A fragment's bounding box or text could not be interpreted.
    ///
    /// Raised for bounding boxes without exactly four corners, non-numeric or
    /// non-finite coordinates, and missing text. `page` and `index` locate the
    /// fragment when it came from a parsed document.
    #[error("Invalid fragment{}: {reason}", location(.page, .index))]
    InvalidFragment {
        /// Zero-based page number, when known
        page: Option<usize>,
        /// Zero-based position of the fragment on its page, when known
        index: Option<usize>,
        /// What was wrong with the fragment
        reason: String,
    },

    /// Invalid configuration (negative tolerance, NaN, ...)
    #[error("Invalid configuration: {reason}")]
    ConfigError {
        /// Description of what is invalid in the configuration
        reason: String,
    },

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error while writing serialized output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn location(page: &Option<usize>, index: &Option<usize>) -> String {
    match (*page, *index) {
        (Some(page), Some(index)) => format!(" (page {page}, fragment {index})"),
        (None, Some(index)) => format!(" (fragment {index})"),
        (Some(page), None) => format!(" (page {page})"),
        (None, None) => String::new(),
    }
}

impl FormscanError {
    /// Create an `InvalidFragment` error with no location attached.
    #[inline]
    pub fn invalid_fragment(reason: impl Into<String>) -> Self {
        Self::InvalidFragment {
            page: None,
            index: None,
            reason: reason.into(),
        }
    }

    /// Attach a page/fragment location to an `InvalidFragment` error.
    ///
    /// Locations already set are kept; other variants pass through unchanged.
    #[must_use = "returns the located error"]
    pub fn at(self, page_no: Option<usize>, fragment_index: usize) -> Self {
        match self {
            Self::InvalidFragment {
                page,
                index,
                reason,
            } => Self::InvalidFragment {
                page: page.or(page_no),
                index: index.or(Some(fragment_index)),
                reason,
            },
            other => other,
        }
    }

    /// Returns true if this error came from a malformed fragment
    #[inline]
    #[must_use = "this method returns a boolean, not modifying the error"]
    pub const fn is_invalid_fragment(&self) -> bool {
        matches!(self, Self::InvalidFragment { .. })
    }

    /// Returns true if this error is a configuration error (user-fixable)
    #[inline]
    #[must_use = "this method returns a boolean, not modifying the error"]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }
}

/// Type alias for [`Result<T, FormscanError>`].
pub type Result<T> = std::result::Result<T, FormscanError>;
