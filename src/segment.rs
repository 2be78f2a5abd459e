//! Per-segment glob and template compilation.

use crate::matcher::UriVariables;
use crate::{PatternError, Result};
use regex::Regex;

/// A single pattern segment compiled to a regex.
///
/// Translates `?` to "exactly one character", `*` to "zero or more
/// characters", `{name}` to an anonymous capture, `{name:regex}` to a
/// capture using the supplied regex, and escapes everything else so regex
/// metacharacters are taken literally. Capture-group order follows the
/// left-to-right position of each template, so extracted values line up
/// with the declared variable names.
#[derive(Debug)]
pub struct SegmentMatcher {
    regex: Regex,
    variable_names: Vec<String>,
}

const DEFAULT_VARIABLE_PATTERN: &str = "(.*)";

impl SegmentMatcher {
    pub fn compile(segment: &str) -> Result<Self> {
        let mut regex_str = String::new();
        let mut literal = String::new();
        let mut variable_names = Vec::new();

        let chars: Vec<char> = segment.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            match chars[i] {
                '?' => {
                    flush_literal(&mut regex_str, &mut literal);
                    regex_str.push('.');
                    i += 1;
                }
                '*' => {
                    flush_literal(&mut regex_str, &mut literal);
                    regex_str.push_str(".*");
                    i += 1;
                }
                '{' => {
                    // Find the matching close brace; templates like
                    // {id:\d{2}} nest braces inside the regex part.
                    let mut depth = 1;
                    let mut j = i + 1;
                    while j < chars.len() && depth > 0 {
                        match chars[j] {
                            '{' => depth += 1,
                            '}' => depth -= 1,
                            _ => {}
                        }
                        j += 1;
                    }
                    if depth != 0 {
                        // Unbalanced brace, treat it as a literal.
                        literal.push('{');
                        i += 1;
                        continue;
                    }
                    flush_literal(&mut regex_str, &mut literal);
                    let body: String = chars[i + 1..j - 1].iter().collect();
                    match body.find(':') {
                        Some(colon) => {
                            variable_names.push(body[..colon].to_string());
                            regex_str.push('(');
                            regex_str.push_str(&body[colon + 1..]);
                            regex_str.push(')');
                        }
                        None => {
                            variable_names.push(body);
                            regex_str.push_str(DEFAULT_VARIABLE_PATTERN);
                        }
                    }
                    i = j;
                }
                c => {
                    literal.push(c);
                    i += 1;
                }
            }
        }
        flush_literal(&mut regex_str, &mut literal);

        let regex = Regex::new(&format!("(?s)^{regex_str}$"))?;
        let groups = regex.captures_len() - 1;
        if groups != variable_names.len() {
            return Err(PatternError::CaptureGroupMismatch {
                pattern: segment.to_string(),
                groups,
                variables: variable_names.len(),
            });
        }

        Ok(Self {
            regex,
            variable_names,
        })
    }

    /// Tests one literal path segment against this compiled segment.
    ///
    /// On success, binds every declared variable into `vars` in declaration
    /// order.
    pub fn matches(&self, segment: &str, vars: Option<&mut UriVariables>) -> bool {
        let Some(caps) = self.regex.captures(segment) else {
            return false;
        };
        if let Some(vars) = vars {
            for (i, name) in self.variable_names.iter().enumerate() {
                let value = caps.get(i + 1).map(|m| m.as_str()).unwrap_or("");
                vars.insert(name, value);
            }
        }
        true
    }

    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }
}

fn flush_literal(regex_str: &mut String, literal: &mut String) {
    if !literal.is_empty() {
        regex_str.push_str(&regex::escape(literal));
        literal.clear();
    }
}
