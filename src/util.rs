//! Small string helpers used by the matcher and the specificity comparator.

/// Splits `text` on every occurrence of `separator`, optionally trimming
/// whitespace from each piece and omitting pieces that end up empty.
///
/// Empty input yields an empty sequence.
pub fn tokenize(text: &str, separator: &str, trim: bool, omit_empty: bool) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut tokens = Vec::new();
    for piece in text.split(separator) {
        let piece = if trim { piece.trim() } else { piece };
        if omit_empty && piece.is_empty() {
            continue;
        }
        tokens.push(piece.to_string());
    }
    tokens
}

/// Counts non-overlapping occurrences of `needle` in `haystack`.
///
/// An empty needle occurs zero times.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}
