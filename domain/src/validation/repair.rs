//! Deterministic repairs applied once before a response is rejected.

use std::borrow::Cow;

/// Append the closing braces a truncated structured response is missing.
///
/// ```
/// use filing_domain::validation::repair::close_braces;
///
/// assert_eq!(close_braces(r#"{"a": {"b": 1}"#), r#"{"a": {"b": 1}}"#);
/// assert_eq!(close_braces("{}"), "{}");
/// ```
pub fn close_braces(text: &str) -> Cow<'_, str> {
    let opening = text.matches('{').count();
    let closing = text.matches('}').count();
    if opening > closing {
        let mut repaired = text.trim_end().to_string();
        repaired.push_str(&"}".repeat(opening - closing));
        Cow::Owned(repaired)
    } else {
        Cow::Borrowed(text)
    }
}

/// Repair an end marker that was not found verbatim.
///
/// Dangling unmatched closing braces are stripped first; if there are none,
/// the trailing partial token is dropped. Returns `None` when neither applies.
pub fn repair_end_marker(marker: &str) -> Option<String> {
    let trimmed = marker.trim_end();

    let mut stripped = trimmed;
    while stripped.ends_with('}') && stripped.matches('}').count() > stripped.matches('{').count()
    {
        stripped = stripped[..stripped.len() - 1].trim_end();
    }
    if stripped.len() != trimmed.len() {
        return (!stripped.trim().is_empty()).then(|| stripped.to_string());
    }

    let cut = trimmed.rfind(char::is_whitespace)?;
    let prefix = trimmed[..cut].trim_end();
    (!prefix.trim().is_empty()).then(|| prefix.to_string())
}
