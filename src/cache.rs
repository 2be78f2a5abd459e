//! Adaptive memoization of tokenized patterns and compiled segment matchers.

use crate::segment::SegmentMatcher;
use crate::util;
use crate::Result;
use dashmap::DashMap;
use log::debug;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Number of distinct compiled segments past which caching shuts itself off
/// while the policy is [`CachePolicy::Unset`]. Guards against unbounded
/// growth when patterns are generated at runtime rather than configured.
pub const CACHE_TURNOFF_THRESHOLD: usize = 65_536;

/// Caching policy for compiled patterns.
///
/// `Unset` behaves like `Enabled` until the adaptive threshold fires.
/// Explicitly setting `Enabled` or `Disabled` is never auto-reverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    Unset,
    Enabled,
    Disabled,
}

impl CachePolicy {
    fn as_u8(self) -> u8 {
        match self {
            CachePolicy::Unset => 0,
            CachePolicy::Enabled => 1,
            CachePolicy::Disabled => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => CachePolicy::Unset,
            1 => CachePolicy::Enabled,
            _ => CachePolicy::Disabled,
        }
    }
}

/// Instance-owned cache over tokenized patterns and compiled segment
/// matchers. Safe for concurrent use; the maps are sharded and the policy
/// flag is a single atomic, so threshold/insert races at worst let the cache
/// overshoot slightly or trigger disablement twice, both of which are
/// harmless because clearing is idempotent.
#[derive(Debug)]
pub(crate) struct PatternCache {
    tokenized: DashMap<String, Arc<Vec<String>>>,
    matchers: DashMap<String, Arc<SegmentMatcher>>,
    policy: AtomicU8,
    threshold: usize,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::with_threshold(CACHE_TURNOFF_THRESHOLD)
    }

    fn with_threshold(threshold: usize) -> Self {
        Self {
            tokenized: DashMap::new(),
            matchers: DashMap::new(),
            policy: AtomicU8::new(CachePolicy::Unset.as_u8()),
            threshold,
        }
    }

    pub fn policy(&self) -> CachePolicy {
        CachePolicy::from_u8(self.policy.load(Ordering::Relaxed))
    }

    pub fn set_policy(&self, policy: CachePolicy) {
        self.policy.store(policy.as_u8(), Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.tokenized.clear();
        self.matchers.clear();
    }

    /// Returns the segments of `pattern`, cached per distinct pattern string.
    ///
    /// Subject to the same adaptive turnoff as [`Self::matcher`]: the
    /// insertion that would push the map past the threshold while the
    /// policy is still `Unset` disables caching instead. Distinct patterns
    /// can vastly outnumber distinct segments, so both maps are guarded.
    pub fn tokenized(&self, pattern: &str, separator: &str, trim: bool) -> Arc<Vec<String>> {
        let policy = self.policy();
        if policy != CachePolicy::Disabled {
            if let Some(hit) = self.tokenized.get(pattern) {
                return Arc::clone(&hit);
            }
        }
        let tokens = Arc::new(util::tokenize(pattern, separator, trim, true));
        match policy {
            CachePolicy::Disabled => {}
            CachePolicy::Unset if self.tokenized.len() >= self.threshold => {
                debug!(
                    "tokenized pattern cache reached {} entries, disabling pattern caching",
                    self.threshold
                );
                self.set_policy(CachePolicy::Disabled);
                self.clear();
            }
            _ => {
                self.tokenized.insert(pattern.to_string(), Arc::clone(&tokens));
            }
        }
        tokens
    }

    /// Returns the compiled matcher for one pattern segment, cached per
    /// distinct segment string.
    ///
    /// The insertion that would push the matcher map past the threshold
    /// while the policy is still `Unset` instead disables caching, clears
    /// both maps and returns the freshly compiled matcher uncached.
    pub fn matcher(&self, segment: &str) -> Result<Arc<SegmentMatcher>> {
        let policy = self.policy();
        if policy != CachePolicy::Disabled {
            if let Some(hit) = self.matchers.get(segment) {
                return Ok(Arc::clone(&hit));
            }
        }
        let matcher = Arc::new(SegmentMatcher::compile(segment)?);
        match policy {
            CachePolicy::Disabled => {}
            CachePolicy::Unset if self.matchers.len() >= self.threshold => {
                debug!(
                    "compiled segment cache reached {} entries, disabling pattern caching",
                    self.threshold
                );
                self.set_policy(CachePolicy::Disabled);
                self.clear();
            }
            _ => {
                self.matchers.insert(segment.to_string(), Arc::clone(&matcher));
            }
        }
        Ok(matcher)
    }

    #[cfg(test)]
    pub fn matcher_count(&self) -> usize {
        self.matchers.len()
    }

    #[cfg(test)]
    pub fn tokenized_count(&self) -> usize {
        self.tokenized.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_returns_same_compiled_matcher() {
        let cache = PatternCache::new();
        let first = cache.matcher("*.jsp").unwrap();
        let second = cache.matcher("*.jsp").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.matcher_count(), 1);
    }

    #[test]
    fn test_tokenized_is_cached() {
        let cache = PatternCache::new();
        let first = cache.tokenized("/a/b", "/", true);
        let second = cache.tokenized("/a/b", "/", true);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, ["a", "b"]);
    }

    #[test]
    fn test_disabled_policy_never_stores() {
        let cache = PatternCache::new();
        cache.set_policy(CachePolicy::Disabled);
        let first = cache.matcher("*.jsp").unwrap();
        let second = cache.matcher("*.jsp").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cache.matcher_count(), 0);
        assert_eq!(cache.tokenized("/a", "/", true).len(), 1);
        assert_eq!(cache.tokenized_count(), 0);
    }

    #[test]
    fn test_adaptive_disablement_clears_both_maps() {
        let cache = PatternCache::with_threshold(4);
        for i in 0..4 {
            cache.matcher(&format!("seg{i}")).unwrap();
        }
        cache.tokenized("/a/b", "/", true);
        assert_eq!(cache.matcher_count(), 4);
        assert_eq!(cache.policy(), CachePolicy::Unset);

        // The threshold-crossing insertion flips the policy and empties
        // both maps; the compiled result is still returned.
        let overflow = cache.matcher("seg4").unwrap();
        assert!(overflow.matches("seg4", None));
        assert_eq!(cache.policy(), CachePolicy::Disabled);
        assert_eq!(cache.matcher_count(), 0);
        assert_eq!(cache.tokenized_count(), 0);

        // Still disabled afterwards.
        cache.matcher("seg5").unwrap();
        assert_eq!(cache.matcher_count(), 0);
    }

    #[test]
    fn test_adaptive_disablement_by_distinct_patterns() {
        // Distinct patterns can outnumber distinct segments by far, so the
        // pattern-keyed map trips the threshold on its own.
        let cache = PatternCache::with_threshold(4);
        for i in 0..4 {
            cache.tokenized(&format!("/a/b{}", i % 2), "/", true);
            cache.tokenized(&format!("/c/d{}", i % 2), "/", true);
        }
        cache.matcher("a").unwrap();
        assert_eq!(cache.tokenized_count(), 4);
        assert_eq!(cache.policy(), CachePolicy::Unset);

        let overflow = cache.tokenized("/e/f", "/", true);
        assert_eq!(*overflow, ["e", "f"]);
        assert_eq!(cache.policy(), CachePolicy::Disabled);
        assert_eq!(cache.tokenized_count(), 0);
        assert_eq!(cache.matcher_count(), 0);

        cache.tokenized("/g/h", "/", true);
        assert_eq!(cache.tokenized_count(), 0);
    }

    #[test]
    fn test_explicit_enabled_ignores_threshold() {
        let cache = PatternCache::with_threshold(2);
        cache.set_policy(CachePolicy::Enabled);
        for i in 0..5 {
            cache.matcher(&format!("seg{i}")).unwrap();
        }
        assert_eq!(cache.policy(), CachePolicy::Enabled);
        assert_eq!(cache.matcher_count(), 5);
    }

    #[test]
    fn test_compile_error_propagates() {
        let cache = PatternCache::new();
        assert!(cache.matcher("{id:[}").is_err());
        assert_eq!(cache.matcher_count(), 0);
    }
}
