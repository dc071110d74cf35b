//! Slicing of the raw table block around the structured body.

use crate::core::text::floor_char_boundary;

/// Text preceding the first case-insensitive `assets` in the block.
///
/// ```
/// use filing_domain::table::pre_table_text;
///
/// let block = "In thousands, except per share data\nASSETS\nCash 10";
/// assert_eq!(pre_table_text(block), Some("In thousands, except per share data\n"));
/// assert_eq!(pre_table_text("no balance here"), None);
/// ```
pub fn pre_table_text(block: &str) -> Option<&str> {
    // ASCII lower-casing keeps byte offsets aligned with `block`.
    let lowered = block.to_ascii_lowercase();
    lowered.find("assets").map(|pos| &block[..pos])
}

/// Part of the block after the pre-table text, where the end marker is searched.
pub fn table_tail<'a>(block: &'a str, pre_table: &str) -> &'a str {
    match block.strip_prefix(pre_table) {
        Some(rest) => rest,
        None => block,
    }
}

/// Byte offset from which an end marker may match.
pub fn marker_search_offset(text: &str, ratio: f64) -> usize {
    let ratio = ratio.clamp(0.0, 1.0);
    floor_char_boundary(text, (text.len() as f64 * ratio) as usize)
}

/// Position of `marker` in `text` at or after `search_from`.
pub fn find_marker(text: &str, marker: &str, search_from: usize) -> Option<usize> {
    let start = floor_char_boundary(text, search_from);
    text[start..].find(marker).map(|pos| start + pos)
}

/// Table body: everything in `tail` before the end marker.
pub fn crop_table<'a>(tail: &'a str, marker: &str, search_from: usize) -> Option<&'a str> {
    find_marker(tail, marker, search_from).map(|pos| &tail[..pos])
}
