//! Combining two route-fragment patterns into one.

use crate::matcher::PathMatcher;
use crate::{PatternError, Result};

/// Joins two route fragments, e.g. a controller-level prefix and a
/// method-level pattern. First matching rule wins; see the tests for the
/// full decision table.
pub(crate) fn combine(matcher: &PathMatcher, pattern1: &str, pattern2: &str) -> Result<String> {
    let blank1 = pattern1.trim().is_empty();
    let blank2 = pattern2.trim().is_empty();
    if blank1 && blank2 {
        return Ok(String::new());
    }
    if blank1 {
        return Ok(pattern2.to_string());
    }
    if blank2 {
        return Ok(pattern1.to_string());
    }

    let separator = matcher.path_separator();
    let pattern1_contains_var = pattern1.contains('{');
    if pattern1 != pattern2 && !pattern1_contains_var && matcher.matches(pattern1, pattern2)? {
        // /* + /hotel -> /hotel
        return Ok(pattern2.to_string());
    }

    let ends_on_wildcard = format!("{separator}*");
    if pattern1.ends_with(&ends_on_wildcard) {
        // /hotels/* + /booking -> /hotels/booking
        let base = &pattern1[..pattern1.len() - ends_on_wildcard.len()];
        return Ok(concat(base, pattern2, separator));
    }
    let ends_on_double_wildcard = format!("{separator}**");
    if pattern1.ends_with(&ends_on_double_wildcard) {
        // /hotels/** + /booking -> /hotels/**/booking
        return Ok(concat(pattern1, pattern2, separator));
    }

    let star_dot = pattern1.find("*.");
    let (star_dot_pos, extension_combine) = match star_dot {
        Some(pos) if !pattern1_contains_var && separator != "." => (pos, true),
        _ => (0, false),
    };
    if !extension_combine {
        return Ok(concat(pattern1, pattern2, separator));
    }

    // *.ext file-extension combine: keep pattern2's filename, pick whichever
    // extension is concrete.
    let ext1 = &pattern1[star_dot_pos + 1..];
    let (file2, ext2) = match pattern2.find('.') {
        Some(dot) => pattern2.split_at(dot),
        None => (pattern2, ""),
    };
    let ext1_all = ext1 == ".*" || ext1.is_empty();
    let ext2_all = ext2 == ".*" || ext2.is_empty();
    if !ext1_all && !ext2_all {
        return Err(PatternError::CannotCombine {
            pattern1: pattern1.to_string(),
            pattern2: pattern2.to_string(),
        });
    }
    let ext = if ext1_all { ext2 } else { ext1 };
    Ok(format!("{file2}{ext}"))
}

/// Joins two paths without duplicating the separator between them.
fn concat(path1: &str, path2: &str, separator: &str) -> String {
    let path1_ends_with_separator = path1.ends_with(separator);
    let path2_starts_with_separator = path2.starts_with(separator);
    if path1_ends_with_separator && path2_starts_with_separator {
        format!("{}{}", path1, &path2[separator.len()..])
    } else if path1_ends_with_separator || path2_starts_with_separator {
        format!("{path1}{path2}")
    } else {
        format!("{path1}{separator}{path2}")
    }
}
