//! Path pattern matching against tokenized segments.

use crate::cache::{CachePolicy, PatternCache};
use crate::combine;
use crate::compare::PatternComparator;
use crate::util;
use crate::{PatternError, Result};

pub const DEFAULT_PATH_SEPARATOR: &str = "/";

/// Extracted URI template variables, in binding order.
///
/// Later inserts of an already-bound name replace the value without moving
/// it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriVariables {
    entries: Vec<(String, String)>,
}

impl UriVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for UriVariables {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Matches slash-delimited paths against Ant-style patterns.
///
/// Owns its compiled-pattern cache, so two matchers never share state.
/// All matching runs over `&self`; the matcher is safe to share across
/// threads.
///
/// # Example
///
/// ```
/// use pathmatch::PathMatcher;
///
/// let matcher = PathMatcher::new();
/// assert!(matcher.matches("/hotels/{hotel}", "/hotels/ritz").unwrap());
/// assert!(matcher.match_start("/hotels/**", "/hotels").unwrap());
/// ```
#[derive(Debug)]
pub struct PathMatcher {
    separator: String,
    trim_tokens: bool,
    cache: PatternCache,
}

impl Default for PathMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PathMatcher {
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_PATH_SEPARATOR)
    }

    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            trim_tokens: true,
            cache: PatternCache::new(),
        }
    }

    pub fn path_separator(&self) -> &str {
        &self.separator
    }

    /// Whether to trim whitespace from tokenized segments. Defaults to true.
    ///
    /// Cached tokenizations depend on this setting, so changing it drops
    /// the cache.
    pub fn set_trim_tokens(&mut self, trim: bool) {
        if self.trim_tokens != trim {
            self.trim_tokens = trim;
            self.cache.clear();
        }
    }

    pub fn cache_policy(&self) -> CachePolicy {
        self.cache.policy()
    }

    /// Overrides the adaptive caching behavior; an explicit policy is never
    /// auto-reverted.
    pub fn set_cache_policy(&self, policy: CachePolicy) {
        self.cache.set_policy(policy);
    }

    /// True if `path` contains pattern syntax (`*`, `?`, or a `{...}` pair)
    /// rather than being a plain literal path.
    pub fn is_pattern(&self, path: &str) -> bool {
        let mut uri_var = false;
        for c in path.chars() {
            match c {
                '*' | '?' => return true,
                '{' => uri_var = true,
                '}' if uri_var => return true,
                _ => {}
            }
        }
        false
    }

    /// Tests whether `pattern` matches the entire `path`.
    pub fn matches(&self, pattern: &str, path: &str) -> Result<bool> {
        self.do_match(pattern, path, true, None)
    }

    /// Tests whether `pattern` matches a leading portion of `path`, i.e.
    /// whether a longer path could still fall inside this pattern's
    /// namespace.
    pub fn match_start(&self, pattern: &str, path: &str) -> Result<bool> {
        self.do_match(pattern, path, false, None)
    }

    /// Matches `pattern` against `path` and returns the template variables
    /// bound along the way.
    ///
    /// The pair is required to match; a non-matching pair is a caller error
    /// and yields [`PatternError::NoMatchForExtraction`].
    pub fn extract_uri_template_variables(&self, pattern: &str, path: &str) -> Result<UriVariables> {
        let mut vars = UriVariables::new();
        if !self.do_match(pattern, path, true, Some(&mut vars))? {
            return Err(PatternError::NoMatchForExtraction {
                pattern: pattern.to_string(),
                path: path.to_string(),
            });
        }
        Ok(vars)
    }

    /// Returns the portion of `path` covered by the wildcarded part of
    /// `pattern`: pattern segments containing `*` or `?` contribute the
    /// aligned path segment, and path segments beyond the pattern's length
    /// are appended verbatim.
    ///
    /// Assumes the pair matches; this is not re-verified here.
    pub fn extract_path_within_pattern(&self, pattern: &str, path: &str) -> String {
        let patt_dirs = util::tokenize(pattern, &self.separator, self.trim_tokens, true);
        let path_dirs = util::tokenize(path, &self.separator, self.trim_tokens, true);

        let mut kept: Vec<&str> = Vec::new();
        for (i, patt_dir) in patt_dirs.iter().enumerate() {
            if (patt_dir.contains('*') || patt_dir.contains('?')) && i < path_dirs.len() {
                kept.push(&path_dirs[i]);
            }
        }
        for overflow in path_dirs.iter().skip(patt_dirs.len()) {
            kept.push(overflow);
        }
        kept.join(&self.separator)
    }

    /// Combines two route-fragment patterns, e.g. `/hotels/*` + `/bookings`
    /// becomes `/hotels/bookings`. See [`crate::PatternError::CannotCombine`]
    /// for the one non-combinable case.
    pub fn combine(&self, pattern1: &str, pattern2: &str) -> Result<String> {
        combine::combine(self, pattern1, pattern2)
    }

    /// Returns a comparator ordering patterns by specificity for `path`,
    /// most specific first.
    pub fn pattern_comparator(&self, path: &str) -> PatternComparator {
        PatternComparator::new(path, &self.separator)
    }

    fn do_match(
        &self,
        pattern: &str,
        path: &str,
        full_match: bool,
        mut vars: Option<&mut UriVariables>,
    ) -> Result<bool> {
        // Pattern and path must agree on whether they are rooted at the
        // separator.
        if path.starts_with(&self.separator) != pattern.starts_with(&self.separator) {
            return Ok(false);
        }

        let patt_dirs = self.cache.tokenized(pattern, &self.separator, self.trim_tokens);
        let path_dirs = util::tokenize(path, &self.separator, self.trim_tokens, true);

        // Exclusive-end cursors into both segment sequences.
        let mut patt_start = 0;
        let mut patt_end = patt_dirs.len();
        let mut path_start = 0;
        let mut path_end = path_dirs.len();

        // Forward phase: literal segments up to the first `**`.
        while patt_start < patt_end && path_start < path_end {
            let patt_dir = patt_dirs[patt_start].as_str();
            if patt_dir == "**" {
                break;
            }
            if !self.match_segment(patt_dir, &path_dirs[path_start], vars.as_deref_mut())? {
                return Ok(false);
            }
            patt_start += 1;
            path_start += 1;
        }

        if path_start >= path_end {
            // Path exhausted. Only `**` segments (or a lone trailing `*`
            // against a separator-terminated path) may remain.
            if patt_start >= patt_end {
                return Ok(pattern.ends_with(&self.separator) == path.ends_with(&self.separator));
            }
            if !full_match {
                return Ok(true);
            }
            if patt_start + 1 == patt_end
                && patt_dirs[patt_start] == "*"
                && path.ends_with(&self.separator)
            {
                return Ok(true);
            }
            return Ok(all_double_wildcards(&patt_dirs[patt_start..patt_end]));
        }
        if patt_start >= patt_end {
            // Pattern exhausted with path segments left over.
            return Ok(false);
        }
        if !full_match && patt_dirs[patt_start].as_str() == "**" {
            // A leading `**` absorbs whatever the path continues with.
            return Ok(true);
        }

        // Backward phase: literal segments back to the last `**`.
        while patt_start < patt_end && path_start < path_end {
            let patt_dir = patt_dirs[patt_end - 1].as_str();
            if patt_dir == "**" {
                break;
            }
            if !self.match_segment(patt_dir, &path_dirs[path_end - 1], vars.as_deref_mut())? {
                return Ok(false);
            }
            patt_end -= 1;
            path_end -= 1;
        }
        if path_start >= path_end {
            return Ok(all_double_wildcards(&patt_dirs[patt_start..patt_end]));
        }

        // Middle resolution: patt_start sits on a `**`; align each window of
        // literal segments between consecutive `**` anchors at the first
        // feasible path offset.
        while patt_start + 1 != patt_end && path_start < path_end {
            let Some(offset) = patt_dirs[patt_start + 1..patt_end]
                .iter()
                .position(|d| d == "**")
            else {
                break;
            };
            let patt_next = patt_start + 1 + offset;
            if patt_next == patt_start + 1 {
                // `**/**` collapses to one `**`.
                patt_start += 1;
                continue;
            }

            let window = patt_next - patt_start - 1;
            let span = path_end - path_start;
            if window > span {
                return Ok(false);
            }
            let mut found = None;
            'offsets: for i in 0..=span - window {
                for j in 0..window {
                    if !self.match_segment(
                        &patt_dirs[patt_start + 1 + j],
                        &path_dirs[path_start + i + j],
                        vars.as_deref_mut(),
                    )? {
                        continue 'offsets;
                    }
                }
                found = Some(path_start + i);
                break;
            }
            let Some(found) = found else {
                return Ok(false);
            };
            patt_start = patt_next;
            path_start = found + window;
        }

        Ok(all_double_wildcards(&patt_dirs[patt_start..patt_end]))
    }

    fn match_segment(
        &self,
        pattern: &str,
        segment: &str,
        vars: Option<&mut UriVariables>,
    ) -> Result<bool> {
        let matcher = self.cache.matcher(pattern)?;
        Ok(matcher.matches(segment, vars))
    }
}

fn all_double_wildcards(segments: &[String]) -> bool {
    segments.iter().all(|s| s == "**")
}
