//! Markdown escaping helpers for rendered tables and code blocks.

/// Make text safe for a single table cell: pipes escaped, line breaks folded.
pub(crate) fn escape_table_cell(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        match c {
            '\n' | '\r' => pending_space = !out.is_empty(),
            '|' => {
                flush_space(&mut out, &mut pending_space);
                out.push_str("\\|");
            }
            _ => {
                flush_space(&mut out, &mut pending_space);
                out.push(c);
            }
        }
    }

    out
}

fn flush_space(out: &mut String, pending: &mut bool) {
    if *pending && !out.ends_with(' ') {
        out.push(' ');
    }
    *pending = false;
}

/// Smallest backtick fence (at least 3) that no run in `content` can close.
pub(crate) fn fence_length(content: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;

    for c in content.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }

    (longest + 1).max(3)
}
