//! Ordering patterns by how specifically they match a concrete path.

use crate::util;
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

static VARIABLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^/]+?\}").unwrap());

/// Compares pattern strings by specificity relative to one concrete path,
/// most specific first. Obtained from
/// [`PathMatcher::pattern_comparator`](crate::PathMatcher::pattern_comparator).
#[derive(Debug, Clone)]
pub struct PatternComparator {
    path: String,
    separator: String,
}

impl PatternComparator {
    pub(crate) fn new(path: &str, separator: &str) -> Self {
        Self {
            path: path.to_string(),
            separator: separator.to_string(),
        }
    }

    /// Suitable for `sort_by`: `Less` means `pattern1` is more specific for
    /// this comparator's path.
    pub fn compare(&self, pattern1: &str, pattern2: &str) -> Ordering {
        let info1 = PatternInfo::new(pattern1, &self.separator);
        let info2 = PatternInfo::new(pattern2, &self.separator);

        // The match-everything pattern always sorts last.
        if info1.least_specific && info2.least_specific {
            return Ordering::Equal;
        }
        if info1.least_specific {
            return Ordering::Greater;
        }
        if info2.least_specific {
            return Ordering::Less;
        }

        // A pattern textually identical to the path beats everything else.
        let pattern1_equals_path = pattern1 == self.path;
        let pattern2_equals_path = pattern2 == self.path;
        if pattern1_equals_path && pattern2_equals_path {
            return Ordering::Equal;
        }
        if pattern1_equals_path {
            return Ordering::Less;
        }
        if pattern2_equals_path {
            return Ordering::Greater;
        }

        // Namespace prefixes (ending in separator + "**") sort between
        // concrete patterns and the universal pattern.
        if info1.prefix_pattern && info2.prefix_pattern {
            return info2.length.cmp(&info1.length);
        }
        if info1.prefix_pattern && info2.double_wildcards == 0 {
            return Ordering::Greater;
        }
        if info2.prefix_pattern && info1.double_wildcards == 0 {
            return Ordering::Less;
        }

        if info1.total_count() != info2.total_count() {
            return info1.total_count().cmp(&info2.total_count());
        }
        if info1.length != info2.length {
            return info2.length.cmp(&info1.length);
        }
        if info1.single_wildcards != info2.single_wildcards {
            return info1.single_wildcards.cmp(&info2.single_wildcards);
        }
        info1.uri_vars.cmp(&info2.uri_vars)
    }
}

/// Per-pattern counters backing the comparison.
#[derive(Debug)]
struct PatternInfo {
    uri_vars: usize,
    single_wildcards: usize,
    double_wildcards: usize,
    prefix_pattern: bool,
    least_specific: bool,
    length: usize,
}

impl PatternInfo {
    fn new(pattern: &str, separator: &str) -> Self {
        let universal = format!("{separator}**");
        let catch_all = pattern == universal;
        let prefix_pattern = !catch_all && pattern.ends_with(&universal);
        let least_specific = pattern.is_empty() || catch_all;

        let uri_vars = util::count_occurrences(pattern, "{");
        let mut single_wildcards = 0;
        let mut double_wildcards = 0;
        let bytes = pattern.as_bytes();
        let mut pos = 0;
        while pos < bytes.len() {
            match bytes[pos] {
                b'?' => {
                    single_wildcards += 1;
                    pos += 1;
                }
                b'*' => {
                    if pos + 1 < bytes.len() && bytes[pos + 1] == b'*' {
                        double_wildcards += 1;
                        pos += 2;
                    } else {
                        // A trailing ".*" extension catch-all is not counted.
                        let trailing_ext = pos + 1 == bytes.len() && pos > 0 && bytes[pos - 1] == b'.';
                        if pos > 0 && !trailing_ext {
                            single_wildcards += 1;
                        }
                        pos += 1;
                    }
                }
                _ => pos += 1,
            }
        }

        // Normalized length: each {...} template weighs one character.
        let length = if uri_vars == 0 {
            pattern.len()
        } else {
            VARIABLE_PATTERN.replace_all(pattern, "#").len()
        };

        Self {
            uri_vars,
            single_wildcards,
            double_wildcards,
            prefix_pattern,
            least_specific,
            length,
        }
    }

    fn total_count(&self) -> usize {
        self.uri_vars + self.single_wildcards + 2 * self.double_wildcards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparator(path: &str) -> PatternComparator {
        PatternComparator::new(path, "/")
    }

    #[test]
    fn test_exact_pattern_sorts_first() {
        let c = comparator("/hotels/new");
        assert_eq!(c.compare("/hotels/new", "/hotels/*"), Ordering::Less);
        assert_eq!(c.compare("/hotels/*", "/hotels/new"), Ordering::Greater);
        assert_eq!(c.compare("/hotels/new", "/hotels/new"), Ordering::Equal);
    }

    #[test]
    fn test_universal_pattern_sorts_last() {
        let c = comparator("/hotels/new");
        assert_eq!(c.compare("/**", "/hotels/*"), Ordering::Greater);
        assert_eq!(c.compare("/hotels/{hotel}", "/**"), Ordering::Less);
        assert_eq!(c.compare("/**", "/**"), Ordering::Equal);
        assert_eq!(c.compare("", ""), Ordering::Equal);
        assert_eq!(c.compare("", "/hotels/*"), Ordering::Greater);
    }

    #[test]
    fn test_fewer_wildcards_is_more_specific() {
        let c = comparator("/hotels/new/list");
        assert_eq!(c.compare("/hotels/new/*", "/hotels/*/*"), Ordering::Less);
        assert_eq!(c.compare("/hotels/*/*", "/hotels/new/*"), Ordering::Greater);
    }

    #[test]
    fn test_variable_beats_star_on_tie() {
        // Same total, same normalized length, fewer raw wildcards wins.
        let c = comparator("/hotels/new");
        assert_eq!(c.compare("/hotels/{hotel}", "/hotels/*"), Ordering::Less);
        assert_eq!(c.compare("/hotels/*", "/hotels/{hotel}"), Ordering::Greater);
    }

    #[test]
    fn test_longer_normalized_pattern_is_more_specific() {
        let c = comparator("/hotels/new/list");
        assert_eq!(c.compare("/hotels/new/*", "/hotels/*"), Ordering::Less);
    }

    #[test]
    fn test_prefix_pattern_sorts_after_concrete_patterns() {
        let c = comparator("/hotels/new");
        assert_eq!(c.compare("/hotels/**", "/hotels/*"), Ordering::Greater);
        assert_eq!(c.compare("/hotels/*", "/hotels/**"), Ordering::Less);
        // Longer prefix pattern wins between two prefix patterns.
        assert_eq!(c.compare("/hotels/new/**", "/hotels/**"), Ordering::Less);
    }

    #[test]
    fn test_double_wildcard_counts_double() {
        let c = comparator("/hotels/new/list");
        assert_eq!(c.compare("/hotels/*/*", "/**/list"), Ordering::Less);
    }

    #[test]
    fn test_trailing_extension_star_not_counted() {
        let c = comparator("/hotels/rates");
        assert_eq!(c.compare("/hotels/rates.*", "/hotels/?ates"), Ordering::Less);
    }

    #[test]
    fn test_sort_orders_most_specific_first() {
        let c = comparator("/hotels/new");
        let mut patterns = vec!["/**", "/hotels/*", "/hotels/new", "/hotels/{hotel}"];
        patterns.sort_by(|a, b| c.compare(a, b));
        assert_eq!(
            patterns,
            ["/hotels/new", "/hotels/{hotel}", "/hotels/*", "/**"]
        );
    }
}
