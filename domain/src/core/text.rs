//! Text helpers shared by validation and table handling.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let end = floor_char_boundary(s, max_len.saturating_sub(3));
        format!("{}...", &s[..end])
    }
}

/// Largest char boundary that is `<= index`.
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut end = index.min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    end
}

/// Lower-case a row label and replace hyphens with spaces.
///
/// ```
/// use filing_domain::core::text::normalize_label;
///
/// assert_eq!(normalize_label("Non-Current Liabilities"), "non current liabilities");
/// ```
pub fn normalize_label(label: &str) -> String {
    label.to_lowercase().replace('-', " ")
}
