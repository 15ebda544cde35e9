//! Doc-comment parsing and Markdown rendering.
//!
//! The pipeline only sees the [`CommentParser`] and [`Renderer`] traits, so
//! either side can be swapped. [`DoxParser`] and [`MarkdownRenderer`] are the
//! built-in implementations.

mod comment;
mod escape;
mod parser;
mod render;

use tracing::{debug, instrument};

use doxbook_shared::Result;

pub use comment::{Comment, Context, ContextKind, Param, Tag};

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Turns source text into structured comment records.
pub trait CommentParser: Send + Sync {
    /// Parse every doc comment in `source`. Malformed comments are errors.
    fn parse(&self, source: &str) -> Result<Vec<Comment>>;
}

/// Turns comment records into a formatted document.
pub trait Renderer: Send + Sync {
    /// Render one document titled `title`.
    fn render(&self, title: &str, comments: &[Comment]) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Built-in implementations
// ---------------------------------------------------------------------------

/// Parser for `/** ... */` comments with `@param`/`@return`-style tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoxParser;

impl CommentParser for DoxParser {
    #[instrument(skip_all, fields(len = source.len()))]
    fn parse(&self, source: &str) -> Result<Vec<Comment>> {
        let comments = parser::parse_comments(source)?;
        debug!(comments = comments.len(), "parsed doc comments");
        Ok(comments)
    }
}

/// Markdown renderer with fenced examples in a fixed language.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    /// Info string put on example code fences.
    pub code_language: String,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self {
            code_language: "js".into(),
        }
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, title: &str, comments: &[Comment]) -> Result<String> {
        Ok(render::render_document(title, comments, &self.code_language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_then_render() {
        let source = r#"
/**
 * Add two numbers.
 *
 * @param {Number} a
 * @param {Number} b
 * @return {Number} the sum
 */
exports.add = function (a, b) {
  return a + b;
};
"#;
        let comments = DoxParser.parse(source).unwrap();
        let md = MarkdownRenderer::default().render("math", &comments).unwrap();

        assert!(md.starts_with("# math\n"));
        assert!(md.contains("## `add(a, b)`"));
        assert!(md.contains("| `a` | `Number` |  |"));
        assert!(md.contains("**Returns** `Number` the sum"));
    }

    #[test]
    fn traits_are_object_safe() {
        let parser: &dyn CommentParser = &DoxParser;
        let renderer: &dyn Renderer = &MarkdownRenderer::default();
        let comments = parser.parse("/** Hi. */").unwrap();
        assert_eq!(renderer.render("t", &comments).unwrap(), "# t\n\nHi.\n");
    }

    #[test]
    fn malformed_source_is_an_error() {
        assert!(DoxParser.parse("/** never closed").is_err());
    }
}
