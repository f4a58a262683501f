// src/checker/anchor.rs
// =============================================================================
// Matching "#fragment" links against the places a document can be linked to.
//
// Links and headings rarely spell an anchor the same way:
//   heading:  ## Getting Started
//   link:     [go](#getting-started)   or   [go](#Getting%20Started)
// so both sides are normalized first: hyphens become spaces and everything
// is lowercased.
//
// Lookup order, first match wins:
// 1. id/name anchors in the rendered HTML of the document
// 2. the text of the document's top-level headings
// =============================================================================

use percent_encoding::percent_decode_str;

use crate::document::Document;

/// Normalizes a link fragment for comparison
///
/// Example:
///   "#My%20Heading" -> "my heading"
///   "my-heading"    -> "my heading"
pub fn normalize_anchor(anchor: &str) -> String {
    let anchor = anchor.strip_prefix('#').unwrap_or(anchor);
    normalize_text(&percent_decode_str(anchor).decode_utf8_lossy())
}

/// Normalizes heading text or an HTML id: hyphen and space are the same
/// character, case does not matter
pub fn normalize_text(text: &str) -> String {
    text.replace('-', " ").to_lowercase()
}

/// Whether `anchor` (with or without its leading '#') names a location in
/// `document`
pub fn has_anchor(document: &Document, anchor: &str) -> bool {
    let target = normalize_anchor(anchor);

    let in_html = document
        .html_anchors()
        .iter()
        .any(|candidate| normalize_text(candidate) == target);
    if in_html {
        return true;
    }

    document
        .headings()
        .any(|heading| normalize_text(&document.heading_text(heading)) == target)
}
