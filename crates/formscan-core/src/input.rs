//! OCR provider input adapter
//!
//! Turns provider JSON into [`Fragment`]s. Two entry shapes are accepted on a
//! page, and may be mixed:
//!
//! ```text
//! [[[x,y],[x,y],[x,y],[x,y]], "text", 0.93]          tuple, confidence optional
//! {"bbox": [[x,y],[x,y],[x,y],[x,y]], "text": "text"} object, "confidence" optional
//! ```
//!
//! A document is either an array of pages or `{"pages": [...]}`. Confidence
//! values are accepted and ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FormscanError, Result};
use crate::types::{Fragment, BBOX_CORNERS};

/// What to do with a fragment that cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidFragmentPolicy {
    /// Fail the whole document (default)
    #[default]
    Abort,
    /// Drop the fragment with a warning and keep going
    Skip,
}

impl std::fmt::Display for InvalidFragmentPolicy {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

impl std::str::FromStr for InvalidFragmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" | "fail" => Ok(Self::Abort),
            "skip" | "drop" => Ok(Self::Skip),
            _ => Err(format!(
                "Unknown invalid-fragment policy '{s}'. Expected: abort, skip"
            )),
        }
    }
}

/// Parser for provider JSON
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FragmentReader {
    policy: InvalidFragmentPolicy,
}

impl FragmentReader {
    #[inline]
    #[must_use = "reader is created but not used"]
    pub const fn new() -> Self {
        Self {
            policy: InvalidFragmentPolicy::Abort,
        }
    }

    #[inline]
    #[must_use = "reader is created but not used"]
    pub const fn with_policy(policy: InvalidFragmentPolicy) -> Self {
        Self { policy }
    }

    /// Parse a whole document: an array of pages or `{"pages": [...]}`.
    ///
    /// # Errors
    ///
    /// Malformed JSON, a non-array page list, or (under `Abort`) any invalid fragment.
    pub fn read_document(&self, json: &str) -> Result<Vec<Vec<Fragment>>> {
        let value: Value = serde_json::from_str(json)?;
        let pages = match value {
            Value::Array(pages) => pages,
            Value::Object(mut map) => match map.remove("pages") {
                Some(Value::Array(pages)) => pages,
                _ => {
                    return Err(FormscanError::invalid_fragment(
                        "document object must have a \"pages\" array",
                    ))
                }
            },
            _ => {
                return Err(FormscanError::invalid_fragment(
                    "document must be an array of pages or an object with \"pages\"",
                ))
            }
        };

        pages
            .iter()
            .enumerate()
            .map(|(page_no, page)| self.page_from_value(page, Some(page_no)))
            .collect()
    }

    /// Parse a single page: an array of fragment entries.
    ///
    /// # Errors
    ///
    /// Malformed JSON, a non-array page, or (under `Abort`) any invalid fragment.
    pub fn read_page(&self, json: &str) -> Result<Vec<Fragment>> {
        let value: Value = serde_json::from_str(json)?;
        self.page_from_value(&value, None)
    }

    fn page_from_value(&self, page: &Value, page_no: Option<usize>) -> Result<Vec<Fragment>> {
        let Value::Array(entries) = page else {
            return Err(FormscanError::InvalidFragment {
                page: page_no,
                index: None,
                reason: "page must be an array of fragments".to_string(),
            });
        };

        let mut fragments = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            match fragment_from_value(entry) {
                Ok(fragment) => fragments.push(fragment),
                Err(e) => {
                    let e = e.at(page_no, index);
                    match self.policy {
                        InvalidFragmentPolicy::Abort => return Err(e),
                        InvalidFragmentPolicy::Skip => log::warn!("Skipping fragment: {e}"),
                    }
                }
            }
        }
        Ok(fragments)
    }
}

/// Parse one fragment entry (tuple or object form)
///
/// # Errors
///
/// Returns [`FormscanError::InvalidFragment`] describing the first problem found.
pub fn fragment_from_value(entry: &Value) -> Result<Fragment> {
    let (bbox, text) = match entry {
        Value::Array(items) => {
            if items.len() < 2 {
                return Err(FormscanError::invalid_fragment(format!(
                    "expected [bbox, text] or [bbox, text, confidence], got {} items",
                    items.len()
                )));
            }
            (&items[0], &items[1])
        }
        Value::Object(map) => {
            let bbox = map
                .get("bbox")
                .or_else(|| map.get("bounding_box"))
                .ok_or_else(|| FormscanError::invalid_fragment("missing \"bbox\""))?;
            let text = map
                .get("text")
                .ok_or_else(|| FormscanError::invalid_fragment("missing \"text\""))?;
            (bbox, text)
        }
        other => {
            return Err(FormscanError::invalid_fragment(format!(
                "fragment must be an array or object, got {}",
                type_name(other)
            )))
        }
    };

    let Value::String(text) = text else {
        return Err(FormscanError::invalid_fragment(format!(
            "text must be a string, got {}",
            type_name(text)
        )));
    };

    let corners = corners_from_value(bbox)?;
    Fragment::from_corners(&corners, text.as_str())
}

fn corners_from_value(bbox: &Value) -> Result<Vec<(f64, f64)>> {
    let Value::Array(points) = bbox else {
        return Err(FormscanError::invalid_fragment(format!(
            "bbox must be an array of {BBOX_CORNERS} [x, y] points, got {}",
            type_name(bbox)
        )));
    };

    points
        .iter()
        .enumerate()
        .map(|(i, point)| match point {
            Value::Array(xy) if xy.len() == 2 => {
                let x = xy[0].as_f64();
                let y = xy[1].as_f64();
                match (x, y) {
                    (Some(x), Some(y)) => Ok((x, y)),
                    _ => Err(FormscanError::invalid_fragment(format!(
                        "corner {i} has non-numeric coordinates"
                    ))),
                }
            }
            _ => Err(FormscanError::invalid_fragment(format!(
                "corner {i} must be an [x, y] pair"
            ))),
        })
        .collect()
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOX: &str = "[[0,0],[10,0],[10,10],[0,10]]";

    #[test]
    fn test_tuple_entry_with_confidence() {
        let page = FragmentReader::new()
            .read_page(&format!(r#"[[{BOX}, "NAME:", 0.98], [[[20,0],[30,0],[30,10],[20,10]], "John"]]"#))
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].text, "NAME:");
        assert_eq!(page[1].bbox.x_start(), 20.0);
        assert_eq!(page[1].bbox.y_center(), 5.0);
    }

    #[test]
    fn test_object_entry() {
        let page = FragmentReader::new()
            .read_page(&format!(r#"[{{"bbox": {BOX}, "text": "Total", "confidence": 0.5}}]"#))
            .unwrap();
        assert_eq!(page[0].text, "Total");
    }

    #[test]
    fn test_float_coordinates() {
        let page = FragmentReader::new()
            .read_page(r#"[[[[1.5,2.25],[9,2.25],[9,7.75],[1.5,7.75]], "x"]]"#)
            .unwrap();
        assert_eq!(page[0].bbox.y_center(), 5.0);
        assert_eq!(page[0].bbox.x_start(), 1.5);
    }

    #[test]
    fn test_document_array_and_object_forms() {
        let reader = FragmentReader::new();
        let as_array = reader
            .read_document(&format!(r#"[[[{BOX}, "a"]], []]"#))
            .unwrap();
        let as_object = reader
            .read_document(&format!(r#"{{"pages": [[[{BOX}, "a"]], []]}}"#))
            .unwrap();
        assert_eq!(as_array, as_object);
        assert_eq!(as_array.len(), 2);
        assert!(as_array[1].is_empty());
    }

    #[test]
    fn test_three_corners_rejected_with_location() {
        let err = FragmentReader::new()
            .read_document(&format!(
                r#"[[], [[{BOX}, "ok"], [[[0,0],[1,0],[1,1]], "bad"]]]"#
            ))
            .unwrap_err();
        match err {
            FormscanError::InvalidFragment {
                page,
                index,
                reason,
            } => {
                assert_eq!(page, Some(1));
                assert_eq!(index, Some(1));
                assert!(reason.contains("got 3"), "{reason}");
            }
            other => panic!("Expected InvalidFragment, got {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_coordinate_rejected() {
        let err = FragmentReader::new()
            .read_page(r#"[[[["a",0],[10,0],[10,10],[0,10]], "x"]]"#)
            .unwrap_err();
        assert!(err.is_invalid_fragment());
        assert!(err.to_string().contains("non-numeric"));
    }

    #[test]
    fn test_skip_policy_drops_bad_fragments() {
        let page = FragmentReader::with_policy(InvalidFragmentPolicy::Skip)
            .read_page(&format!(
                r#"[[{BOX}, "keep"], [[[0,0]], "drop"], {{"text": "no box"}}, [{BOX}, 42], [{BOX}, "also kept"]]"#
            ))
            .unwrap();
        let texts: Vec<&str> = page.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["keep", "also kept"]);
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let err = FragmentReader::new().read_page("[[").unwrap_err();
        assert!(matches!(err, FormscanError::Json(_)));
    }

    #[test]
    fn test_page_must_be_array() {
        let err = FragmentReader::new().read_page(r#"{"text": "x"}"#).unwrap_err();
        assert!(err.is_invalid_fragment());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("skip".parse::<InvalidFragmentPolicy>(), Ok(InvalidFragmentPolicy::Skip));
        assert_eq!("ABORT".parse::<InvalidFragmentPolicy>(), Ok(InvalidFragmentPolicy::Abort));
        assert!("maybe".parse::<InvalidFragmentPolicy>().is_err());
        assert_eq!(InvalidFragmentPolicy::Skip.to_string(), "skip");
    }
}
