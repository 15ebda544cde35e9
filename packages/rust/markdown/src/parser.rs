//! Doc-comment parser.
//!
//! Recognizes `/** ... */` blocks:
//! - Leading `*` gutters are stripped
//! - Text before the first tag is the description (first paragraph = summary)
//! - `@tag` lines start a tag; following lines continue it
//! - The first code line after the block names what is documented

use std::sync::LazyLock;

use regex::Regex;

use doxbook_shared::{DoxbookError, Result};

use crate::comment::{Comment, Context, ContextKind, Param, Tag};

// ---------------------------------------------------------------------------
// Declaration patterns (compiled once)
// ---------------------------------------------------------------------------

/// `Widget.prototype.draw = function (ctx) {`
static PROTO_METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\w$.]+)\.prototype\.([\w$]+)\s*=\s*(?:async\s+)?function\b[^(]*\(([^)]*)\)")
        .expect("prototype method regex")
});

/// `Widget.prototype.size = 3;`
static PROTO_PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\w$.]+)\.prototype\.([\w$]+)\s*=").expect("prototype property regex")
});

/// `exports.parse = function (input) {`
static EXPORTS_FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:module\.)?exports\.([\w$]+)\s*=\s*(?:async\s+)?function\b[^(]*\(([^)]*)\)")
        .expect("exports function regex")
});

/// `exports.version = '1.0';`
static EXPORTS_PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:module\.)?exports\.([\w$]+)\s*=").expect("exports property regex")
});

/// `function parse(input) {`
static FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([\w$]+)\s*\(([^)]*)\)")
        .expect("function regex")
});

/// `class Widget extends Base {`
static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:export\s+)?(?:default\s+)?class\s+([\w$]+)").expect("class regex")
});

/// `const parse = function (input) {` / `const parse = (input) =>`
static BOUND_FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:export\s+)?(?:const|let|var)\s+([\w$]+)\s*=\s*(?:async\s+)?(?:function\b[^(]*\(([^)]*)\)|\(([^)]*)\)\s*=>|([\w$]+)\s*=>)",
    )
    .expect("bound function regex")
});

/// `const limit = 10;`
static DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:export\s+)?(?:const|let|var)\s+([\w$]+)").expect("declaration regex")
});

/// `draw: function (ctx) {` inside an object literal.
static LITERAL_METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\w$]+)\s*:\s*(?:async\s+)?function\b[^(]*\(([^)]*)\)")
        .expect("literal method regex")
});

/// `async draw(ctx) {` inside a class body.
static CLASS_METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:static\s+)?(?:async\s+)?(?:get\s+|set\s+)?([\w$]+)\s*\(([^)]*)\)\s*\{")
        .expect("class method regex")
});

/// Control-flow keywords that look like `name(...) {` but are not methods.
const KEYWORDS: [&str; 6] = ["if", "for", "while", "switch", "catch", "function"];

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse every doc comment in `source`.
pub(crate) fn parse_comments(source: &str) -> Result<Vec<Comment>> {
    let mut comments = Vec::new();
    let mut offset = 0;

    while let Some(found) = source[offset..].find("/**") {
        let open = offset + found;

        // `/**/` is an empty plain comment.
        if source[open..].starts_with("/**/") {
            offset = open + 4;
            continue;
        }

        let body_start = open + 3;
        let line = line_at(source, open);
        let close = source[body_start..].find("*/").ok_or_else(|| {
            DoxbookError::parse(format!("unterminated doc comment starting at line {line}"))
        })?;

        let after = body_start + close + 2;
        let mut comment = parse_block(&source[body_start..body_start + close], line)?;
        comment.context = next_code_line(&source[after..]).and_then(parse_context);
        comments.push(comment);

        offset = after;
    }

    Ok(comments)
}

/// 1-based line number of a byte offset.
fn line_at(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

/// Parse the inside of one comment block.
fn parse_block(raw: &str, line: usize) -> Result<Comment> {
    let lines: Vec<&str> = raw.lines().map(strip_gutter).collect();

    let mut description: Vec<&str> = Vec::new();
    let mut tag_chunks: Vec<(usize, Vec<&str>)> = Vec::new();

    for (i, text) in lines.iter().enumerate() {
        if text.trim_start().starts_with('@') {
            tag_chunks.push((line + i, vec![text.trim_start()]));
        } else if let Some((_, chunk)) = tag_chunks.last_mut() {
            chunk.push(text);
        } else {
            description.push(text);
        }
    }

    let description = description.join("\n");
    let description = description.trim();
    let (summary, body) = match description.split_once("\n\n") {
        Some((summary, body)) => (summary.trim(), body.trim()),
        None => (description, ""),
    };

    let tags = tag_chunks
        .into_iter()
        .map(|(tag_line, chunk)| parse_tag(&chunk.join("\n"), tag_line))
        .collect::<Result<Vec<_>>>()?;

    Ok(Comment {
        summary: summary.to_string(),
        body: body.to_string(),
        tags,
        context: None,
        line,
    })
}

/// Remove leading whitespace, one `*`, and one following space.
fn strip_gutter(line: &str) -> &str {
    let trimmed = line.trim_start();
    match trimmed.strip_prefix('*') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => trimmed,
    }
    .trim_end()
}

/// Parse one `@tag ...` chunk (may span several lines).
fn parse_tag(text: &str, line: usize) -> Result<Tag> {
    let text = text.trim_start_matches('@');
    let (name, rest) = match text.find(char::is_whitespace) {
        Some(at) => (&text[..at], text[at..].trim()),
        None => (text, ""),
    };

    if name.is_empty() {
        return Err(DoxbookError::parse(format!("empty tag name at line {line}")));
    }

    let tag = match name {
        "param" | "arg" | "argument" => {
            let (types, rest) = split_types(rest, line)?;
            let (raw_name, description) = match rest.find(char::is_whitespace) {
                Some(at) => (&rest[..at], rest[at..].trim()),
                None => (rest, ""),
            };
            if raw_name.is_empty() {
                return Err(DoxbookError::parse(format!(
                    "@{name} without a parameter name at line {line}"
                )));
            }

            let (param_name, optional) = match raw_name
                .strip_prefix('[')
                .and_then(|inner| inner.strip_suffix(']'))
            {
                Some(inner) => (inner.split('=').next().unwrap_or(inner), true),
                None => (raw_name, false),
            };

            Tag::Param(Param {
                name: param_name.to_string(),
                types,
                description: description.trim_start_matches("- ").to_string(),
                optional,
            })
        }
        "return" | "returns" => {
            let (types, description) = split_types(rest, line)?;
            Tag::Return {
                types,
                description: description.to_string(),
            }
        }
        "api" => Tag::Api {
            visibility: rest.split_whitespace().next().unwrap_or("public").to_string(),
        },
        "example" => Tag::Example {
            code: example_code(&text[name.len()..]),
        },
        "deprecated" => Tag::Deprecated {
            note: rest.to_string(),
        },
        "see" => Tag::See {
            target: rest.to_string(),
        },
        other => Tag::Other {
            name: other.to_string(),
            value: rest.to_string(),
        },
    };

    Ok(tag)
}

/// Example code keeps its indentation; text on the `@example` line itself is trimmed.
fn example_code(after_name: &str) -> String {
    let mut lines = after_name.lines();
    let first = lines.next().unwrap_or("").trim();

    let mut code: Vec<&str> = Vec::new();
    if !first.is_empty() {
        code.push(first);
    }
    for line in lines {
        if code.is_empty() && line.trim().is_empty() {
            continue;
        }
        code.push(line);
    }

    code.join("\n").trim_end().to_string()
}

/// Split a leading `{A|B}` type expression off `text`.
fn split_types(text: &str, line: usize) -> Result<(Vec<String>, &str)> {
    if !text.starts_with('{') {
        return Ok((Vec::new(), text));
    }

    let mut depth = 0usize;
    for (at, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let types = text[1..at]
                        .split('|')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect();
                    return Ok((types, text[at + 1..].trim()));
                }
            }
            _ => {}
        }
    }

    Err(DoxbookError::parse(format!(
        "unbalanced '{{' in type expression at line {line}"
    )))
}

/// First non-blank line after a comment, if it is not another comment.
fn next_code_line(rest: &str) -> Option<&str> {
    let line = rest.lines().map(str::trim).find(|l| !l.is_empty())?;
    if line.starts_with("/*") || line.starts_with("//") {
        return None;
    }
    Some(line)
}

/// Recognize the declaration shape of a code line.
fn parse_context(line: &str) -> Option<Context> {
    let callable = |kind, name: &str, receiver: Option<&str>, params: &str| Context {
        kind,
        name: name.to_string(),
        receiver: receiver.map(String::from),
        params: Some(normalize_params(params)),
    };
    let plain = |kind, name: &str, receiver: Option<&str>| Context {
        kind,
        name: name.to_string(),
        receiver: receiver.map(String::from),
        params: None,
    };

    if let Some(caps) = PROTO_METHOD_RE.captures(line) {
        return Some(callable(ContextKind::Method, &caps[2], Some(&caps[1]), &caps[3]));
    }
    if let Some(caps) = PROTO_PROPERTY_RE.captures(line) {
        return Some(plain(ContextKind::Property, &caps[2], Some(&caps[1])));
    }
    if let Some(caps) = EXPORTS_FUNCTION_RE.captures(line) {
        return Some(callable(ContextKind::Function, &caps[1], None, &caps[2]));
    }
    if let Some(caps) = EXPORTS_PROPERTY_RE.captures(line) {
        return Some(plain(ContextKind::Property, &caps[1], Some("exports")));
    }
    if let Some(caps) = FUNCTION_RE.captures(line) {
        return Some(callable(ContextKind::Function, &caps[1], None, &caps[2]));
    }
    if let Some(caps) = CLASS_RE.captures(line) {
        return Some(plain(ContextKind::Class, &caps[1], None));
    }
    if let Some(caps) = BOUND_FUNCTION_RE.captures(line) {
        let params = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        return Some(callable(ContextKind::Function, &caps[1], None, params));
    }
    if let Some(caps) = DECLARATION_RE.captures(line) {
        return Some(plain(ContextKind::Declaration, &caps[1], None));
    }
    if let Some(caps) = LITERAL_METHOD_RE.captures(line) {
        return Some(callable(ContextKind::Method, &caps[1], None, &caps[2]));
    }
    if let Some(caps) = CLASS_METHOD_RE.captures(line) {
        if !KEYWORDS.contains(&&caps[1]) {
            return Some(callable(ContextKind::Method, &caps[1], None, &caps[2]));
        }
    }

    None
}

/// Collapse whitespace inside a parameter list.
fn normalize_params(params: &str) -> String {
    params
        .split(',')
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
