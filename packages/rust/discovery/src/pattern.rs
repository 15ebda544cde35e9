//! Glob pattern compilation.
//!
//! Supported syntax:
//! - `*` any run of characters inside one path segment
//! - `?` exactly one character inside one path segment
//! - `**` zero or more whole segments
//! - `[abc]`, `[a-z]`, `[!a]` character classes
//! - `{js,mjs}` brace alternation (not nested)
//!
//! The leading segments without any of those characters form the walk base,
//! so `src/**/*.js` only ever walks `src/`.
//!
//! Wildcards never match dotfiles or dot-directories: `src/*.js` skips
//! `src/.eslintrc.js` and `src/**/*.js` skips `src/.cache/a.js`. A pattern
//! with a segment that itself starts with `.` (e.g. `src/.*.js`) opts back in.

use std::path::{Path, PathBuf};

use regex::Regex;

use doxbook_shared::{DoxbookError, Result};

/// Characters that make a segment a pattern rather than a literal.
const META_CHARS: [char; 4] = ['*', '?', '[', '{'];

// ---------------------------------------------------------------------------
// GlobPattern
// ---------------------------------------------------------------------------

/// A compiled glob: a literal base directory plus a matcher for paths below it.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    raw: String,
    base: PathBuf,
    matcher: Regex,
    max_depth: Option<usize>,
    dotfiles: bool,
}

impl GlobPattern {
    /// Compile a glob pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.trim().is_empty() {
            return Err(DoxbookError::glob("pattern is empty"));
        }

        let segments: Vec<&str> = pattern.split('/').collect();
        let split_at = segments
            .iter()
            .position(|segment| segment.contains(META_CHARS))
            .unwrap_or(segments.len() - 1);

        let (base_segments, rest) = segments.split_at(split_at);
        let rest: Vec<&str> = rest.iter().copied().filter(|s| !s.is_empty()).collect();
        if rest.is_empty() {
            return Err(DoxbookError::glob(format!(
                "pattern '{pattern}' does not name any files"
            )));
        }

        let base = match base_segments.join("/") {
            joined if !joined.is_empty() => PathBuf::from(joined),
            _ if pattern.starts_with('/') => PathBuf::from("/"),
            _ => PathBuf::from("."),
        };

        let mut expr = String::from("^");
        for (i, segment) in rest.iter().enumerate() {
            let last = i + 1 == rest.len();
            if *segment == "**" {
                expr.push_str(if last { ".*" } else { "(?:[^/]+/)*" });
                continue;
            }
            expr.push_str(&translate_segment(segment, true, pattern)?);
            if !last {
                expr.push('/');
            }
        }
        expr.push('$');

        let matcher = Regex::new(&expr)
            .map_err(|e| DoxbookError::glob(format!("pattern '{pattern}': {e}")))?;

        let max_depth = if rest.contains(&"**") {
            None
        } else {
            Some(rest.len())
        };

        let dotfiles = rest.iter().any(|segment| segment.starts_with('.'));

        Ok(Self {
            raw: pattern.to_string(),
            base,
            matcher,
            max_depth,
            dotfiles,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Literal directory the walk starts from.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Deepest walk level that can still match, `None` when `**` is present.
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Whether a `/`-separated path relative to [`GlobPattern::base`] matches.
    pub fn matches(&self, relative: &str) -> bool {
        if !self.dotfiles && relative.split('/').any(|segment| segment.starts_with('.')) {
            return false;
        }
        self.matcher.is_match(relative)
    }
}

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

/// Translate one path segment into a regex fragment.
fn translate_segment(segment: &str, allow_braces: bool, pattern: &str) -> Result<String> {
    let chars: Vec<char> = segment.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                while i + 1 < chars.len() && chars[i + 1] == '*' {
                    i += 1;
                }
                out.push_str("[^/]*");
            }
            '?' => out.push_str("[^/]"),
            '[' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|offset| i + 1 + offset)
                    .ok_or_else(|| {
                        DoxbookError::glob(format!("unclosed '[' in pattern '{pattern}'"))
                    })?;
                out.push_str(&translate_class(&chars[i + 1..end], pattern)?);
                i = end;
            }
            '{' if allow_braces => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&c| c == '}')
                    .map(|offset| i + 1 + offset)
                    .ok_or_else(|| {
                        DoxbookError::glob(format!("unclosed '{{' in pattern '{pattern}'"))
                    })?;
                let body: String = chars[i + 1..end].iter().collect();
                if body.contains('{') {
                    return Err(DoxbookError::glob(format!(
                        "nested braces are not supported in pattern '{pattern}'"
                    )));
                }
                let alternatives = body
                    .split(',')
                    .map(|alt| translate_segment(alt, false, pattern))
                    .collect::<Result<Vec<_>>>()?;
                out.push_str("(?:");
                out.push_str(&alternatives.join("|"));
                out.push(')');
                i = end;
            }
            c => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
        i += 1;
    }

    Ok(out)
}

/// Translate the inside of a `[...]` class.
fn translate_class(body: &[char], pattern: &str) -> Result<String> {
    let (negated, body) = match body.first() {
        Some('!') | Some('^') => (true, &body[1..]),
        _ => (false, body),
    };
    if body.is_empty() {
        return Err(DoxbookError::glob(format!(
            "empty character class in pattern '{pattern}'"
        )));
    }

    let mut out = String::from(if negated { "[^/" } else { "[" });
    for (i, &c) in body.iter().enumerate() {
        let inner = i > 0 && i + 1 < body.len();
        if (c == '-' && inner) || c.is_alphanumeric() || c == '<' || c == '>' || !c.is_ascii() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out.push(']');
    Ok(out)
}
