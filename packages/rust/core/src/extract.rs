//! Record extraction: source bytes → comment records → rendered markdown.
//!
//! A file that fails any step is reported and dropped; the batch never fails.

use std::path::Path;

use tracing::{debug, instrument, warn};

use doxbook_markdown::{CommentParser, Renderer};
use doxbook_shared::{DoxbookError, ExtractedDocument, Result, SourceFile};

use crate::pipeline::ProgressReporter;

/// Extract every file that parses and renders cleanly, in input order.
#[instrument(skip_all, fields(files = files.len()))]
pub fn extract(
    parser: &dyn CommentParser,
    renderer: &dyn Renderer,
    progress: &dyn ProgressReporter,
    files: &[SourceFile],
) -> Vec<ExtractedDocument> {
    let total = files.len();
    let mut documents = Vec::with_capacity(total);

    for (i, file) in files.iter().enumerate() {
        match extract_one(parser, renderer, file) {
            Ok(doc) => {
                debug!(path = %file.path.display(), bytes = doc.contents.len(), "extracted");
                progress.file_extracted(&file.path, i + 1, total);
                documents.push(doc);
            }
            Err(e) => {
                let reason = e.to_string();
                warn!(path = %file.path.display(), error = %reason, "extraction failed, skipping file");
                progress.file_skipped(&file.path, &reason);
            }
        }
    }

    documents
}

fn extract_one(
    parser: &dyn CommentParser,
    renderer: &dyn Renderer,
    file: &SourceFile,
) -> Result<ExtractedDocument> {
    let source = std::str::from_utf8(&file.contents)
        .map_err(|e| DoxbookError::parse(format!("source is not valid UTF-8: {e}")))?;
    let comments = parser.parse(source)?;
    let markdown = renderer.render(&document_title(&file.path), &comments)?;

    Ok(ExtractedDocument {
        contents: markdown.into_bytes(),
        path: file.path.clone(),
    })
}

/// File stem of `path`, used as the document and article title.
pub(crate) fn document_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use doxbook_markdown::{Comment, DoxParser, MarkdownRenderer};

    use super::*;
    use crate::pipeline::{RunReport, Stage};

    #[derive(Default)]
    struct Recorder {
        skipped: Mutex<Vec<(PathBuf, String)>>,
    }

    impl ProgressReporter for Recorder {
        fn stage(&self, _stage: Stage, _detail: &str) {}
        fn stage_done(&self, _stage: Stage) {}
        fn file_extracted(&self, _path: &Path, _current: usize, _total: usize) {}
        fn file_skipped(&self, path: &Path, reason: &str) {
            self.skipped
                .lock()
                .unwrap()
                .push((path.to_path_buf(), reason.to_string()));
        }
        fn failed(&self, _stage: Stage, _message: &str) {}
        fn done(&self, _report: &RunReport) {}
    }

    struct FailingRenderer;

    impl Renderer for FailingRenderer {
        fn render(&self, _title: &str, _comments: &[Comment]) -> Result<String> {
            Err(DoxbookError::Render("renderer offline".into()))
        }
    }

    fn source(path: &str, text: &[u8]) -> SourceFile {
        SourceFile {
            contents: text.to_vec(),
            path: PathBuf::from(path),
        }
    }

    #[test]
    fn failures_are_isolated() {
        let files = vec![
            source("src/a.js", b"/** First. */\nfunction a() {}"),
            source("src/bad.js", b"/** never closed"),
            source("src/b.js", b"/** Second. */\nfunction b() {}"),
            source("src/binary.js", &[0xff, 0xfe, 0x00]),
            source("src/c.js", b"// no doc comments at all"),
        ];
        let progress = Recorder::default();

        let docs = extract(&DoxParser, &MarkdownRenderer::default(), &progress, &files);

        let paths: Vec<_> = docs.iter().map(|d| d.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("src/a.js"),
                PathBuf::from("src/b.js"),
                PathBuf::from("src/c.js"),
            ]
        );

        let skipped = progress.skipped.lock().unwrap();
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].0, PathBuf::from("src/bad.js"));
        assert!(skipped[0].1.contains("unterminated"));
        assert_eq!(skipped[1].0, PathBuf::from("src/binary.js"));
        assert!(skipped[1].1.contains("UTF-8"));
    }

    #[test]
    fn renders_with_stem_title() {
        let files = vec![source("lib/widget.js", b"/** Makes widgets. */")];
        let docs = extract(&DoxParser, &MarkdownRenderer::default(), &Recorder::default(), &files);

        assert_eq!(docs.len(), 1);
        let text = String::from_utf8(docs[0].contents.clone()).unwrap();
        assert_eq!(text, "# widget\n\nMakes widgets.\n");
    }

    #[test]
    fn render_failures_are_skipped() {
        let files = vec![source("a.js", b"/** Fine. */")];
        let progress = Recorder::default();

        let docs = extract(&DoxParser, &FailingRenderer, &progress, &files);

        assert!(docs.is_empty());
        let skipped = progress.skipped.lock().unwrap();
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].1.contains("renderer offline"));
    }

    #[test]
    fn empty_batch() {
        let docs = extract(&DoxParser, &MarkdownRenderer::default(), &Recorder::default(), &[]);
        assert!(docs.is_empty());
    }

    #[test]
    fn title_is_file_stem() {
        assert_eq!(document_title(Path::new("a/b/widget.foo")), "widget");
        assert_eq!(document_title(Path::new("README")), "README");
    }
}
