//! Comment records → Markdown.
//!
//! Pure string building, no I/O. Layout per public comment:
//! heading (signature), description, parameter table, return value,
//! deprecation notice, examples, see-also links.

use std::fmt::Write as _;

use crate::comment::{Comment, Tag};
use crate::escape::{escape_table_cell, fence_length};

/// Render a document titled `title` from `comments`.
pub(crate) fn render_document(title: &str, comments: &[Comment], code_language: &str) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# {title}");

    for comment in comments.iter().filter(|c| !c.is_private()) {
        md.push('\n');
        render_comment(&mut md, comment, code_language);
    }

    md
}

fn render_comment(md: &mut String, comment: &Comment, code_language: &str) {
    if let Some(context) = &comment.context {
        let _ = writeln!(md, "## `{}`\n", context.signature());
    }

    if !comment.summary.is_empty() {
        let _ = writeln!(md, "{}\n", comment.summary);
    }
    if !comment.body.is_empty() {
        let _ = writeln!(md, "{}\n", comment.body);
    }

    render_params(md, comment);

    if let Some((types, description)) = comment.returns() {
        md.push_str("**Returns**");
        if !types.is_empty() {
            let _ = write!(md, " {}", format_types(types));
        }
        if !description.is_empty() {
            let _ = write!(md, " {description}");
        }
        md.push_str("\n\n");
    }

    for tag in &comment.tags {
        match tag {
            Tag::Deprecated { note } if note.is_empty() => {
                md.push_str("> **Deprecated**\n\n");
            }
            Tag::Deprecated { note } => {
                let _ = writeln!(md, "> **Deprecated** {note}\n");
            }
            Tag::Example { code } => {
                let fence = "`".repeat(fence_length(code));
                let _ = writeln!(md, "**Example**\n\n{fence}{code_language}\n{code}\n{fence}\n");
            }
            Tag::See { target } => {
                let _ = writeln!(md, "See: {target}\n");
            }
            _ => {}
        }
    }

    // Keep exactly one blank line between sections.
    while md.ends_with("\n\n") {
        md.pop();
    }
}

fn render_params(md: &mut String, comment: &Comment) {
    let mut params = comment.params().peekable();
    if params.peek().is_none() {
        return;
    }

    md.push_str("| Name | Type | Description |\n");
    md.push_str("| --- | --- | --- |\n");
    for param in params {
        let name = if param.optional {
            format!("`[{}]`", param.name)
        } else {
            format!("`{}`", param.name)
        };
        let _ = writeln!(
            md,
            "| {name} | {} | {} |",
            escape_table_cell(&format_types(&param.types)),
            escape_table_cell(&param.description),
        );
    }
    md.push('\n');
}

/// `` `A` \| `B` `` style type list.
fn format_types(types: &[String]) -> String {
    types
        .iter()
        .map(|t| format!("`{t}`"))
        .collect::<Vec<_>>()
        .join(" | ")
}
