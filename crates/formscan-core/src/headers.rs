//! Section header detection
//!
//! A row is a section header when any registered [`HeaderRule`] accepts its
//! combined text. The default detector knows two conventions: numbered
//! headings (`"2. Payment details"`) and all-caps banners (`"TOTALS"`).
//! Extra conventions plug in through [`HeaderDetector::with_rule`] without
//! touching the structure reconstructor.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// `^\d+\.\s+.*` anchored at the start of the row text
static NUMBERED_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+\.\s+.*").expect("numbered heading pattern is a valid regex")
});

/// A predicate deciding whether a row's text is a section header
pub trait HeaderRule: Send + Sync {
    /// Short name used in debug output
    fn name(&self) -> &str;

    fn is_header(&self, text: &str) -> bool;
}

/// Numbered headings such as `"1. General"` or `"12.  Totals"`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NumberedHeading;

impl HeaderRule for NumberedHeading {
    fn name(&self) -> &str {
        "numbered"
    }

    #[inline]
    fn is_header(&self, text: &str) -> bool {
        NUMBERED_HEADING.is_match(text)
    }
}

/// All-caps banners such as `"TOTALS"` or `"SECTION B: INCOME"`
///
/// Text counts as upper-case when it has at least one cased character and no
/// lower-case ones, so digits and punctuation alone (`"2024"`) never match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UppercaseHeading;

impl HeaderRule for UppercaseHeading {
    fn name(&self) -> &str {
        "uppercase"
    }

    #[inline]
    fn is_header(&self, text: &str) -> bool {
        is_all_uppercase(text)
    }
}

/// True if `text` has an upper-case letter and no lower-case or title-case letter
#[must_use]
pub fn is_all_uppercase(text: &str) -> bool {
    let mut has_upper = false;
    for c in text.chars() {
        if c.is_lowercase() || is_titlecase(c) {
            return false;
        }
        has_upper |= c.is_uppercase();
    }
    has_upper
}

/// Digraphs such as `ǅ` are cased but neither upper nor lower case
fn is_titlecase(c: char) -> bool {
    !c.is_uppercase()
        && !c.is_lowercase()
        && c.to_uppercase().ne(std::iter::once(c))
        && c.to_lowercase().ne(std::iter::once(c))
}

/// Ordered set of header rules combined with logical OR
pub struct HeaderDetector {
    rules: Vec<Box<dyn HeaderRule>>,
}

impl HeaderDetector {
    /// Detector with the numbered-heading and all-caps rules
    #[must_use = "header detector is created but not used"]
    pub fn new() -> Self {
        Self {
            rules: vec![Box::new(NumberedHeading), Box::new(UppercaseHeading)],
        }
    }

    /// Detector with no rules: nothing is ever a header
    #[must_use = "header detector is created but not used"]
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule after the existing ones
    #[must_use = "returns the detector with the added rule"]
    pub fn with_rule(mut self, rule: impl HeaderRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    #[inline]
    #[must_use]
    pub fn is_header(&self, text: &str) -> bool {
        self.rules.iter().any(|rule| rule.is_header(text))
    }

    /// Names of the registered rules, in evaluation order
    #[must_use]
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }
}

impl Default for HeaderDetector {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HeaderDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderDetector")
            .field("rules", &self.rule_names())
            .finish()
    }
}
