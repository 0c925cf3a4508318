//! # Utilities Module
//!
//! ## Purpose
//! Small text helpers shared by the query compiler and result formatting:
//! diacritic-insensitive normalization of free text and url/key handling.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Strip diacritics by NFD-decomposing and dropping combining marks
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Normalize free search text: diacritics removed, surrounding whitespace
/// trimmed. `"Montre à gousset "` becomes `"Montre a gousset"`.
pub fn format_search_text(text: &str) -> String {
    strip_diacritics(text).trim().to_string()
}

/// Last path segment of a URL or object key; image keys in the index are
/// matched against stored image URLs this way.
pub fn filename_key(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
