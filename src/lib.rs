//! Ant-style path pattern matching with URI template variables.
//!
//! Matches slash-delimited paths against hierarchical glob patterns:
//! `?` matches exactly one character within a segment, `*` matches zero or
//! more characters within a segment, `**` matches zero or more whole
//! segments, and `{name}` / `{name:regex}` capture named URI template
//! variables.
//!
//! # Example
//!
//! ```
//! use pathmatch::PathMatcher;
//!
//! let matcher = PathMatcher::new();
//!
//! assert!(matcher.matches("/hotels/*.html", "/hotels/rates.html").unwrap());
//! assert!(matcher.matches("/docs/**/index.html", "/docs/a/b/index.html").unwrap());
//! assert!(!matcher.matches("/hotels/*.html", "/hotels/city/rates.html").unwrap());
//!
//! let vars = matcher
//!     .extract_uri_template_variables("/users/{id}", "/users/42")
//!     .unwrap();
//! assert_eq!(vars.get("id"), Some("42"));
//! ```

mod cache;
mod combine;
mod compare;
mod matcher;
mod segment;
mod util;

pub use cache::{CachePolicy, CACHE_TURNOFF_THRESHOLD};
pub use compare::PatternComparator;
pub use matcher::{PathMatcher, UriVariables, DEFAULT_PATH_SEPARATOR};
pub use segment::SegmentMatcher;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("failed to build segment regex: {0}")]
    RegexBuild(#[from] regex::Error),

    #[error(
        "segment '{pattern}' compiled to {groups} capturing groups but declares \
         {variables} variables; a {{name:regex}} regex must not contain capturing groups"
    )]
    CaptureGroupMismatch {
        pattern: String,
        groups: usize,
        variables: usize,
    },

    #[error("pattern '{pattern}' does not match path '{path}'")]
    NoMatchForExtraction { pattern: String, path: String },

    #[error("cannot combine patterns '{pattern1}' and '{pattern2}'")]
    CannotCombine { pattern1: String, pattern2: String },
}

pub type Result<T> = std::result::Result<T, PatternError>;
