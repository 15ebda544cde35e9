//! End-to-end runs against a scratch book directory.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use doxbook_core::{PipelineOutcome, ProgressReporter, RunReport, Stage, generate_docs};
use doxbook_shared::{AppConfig, Book, BuildConfig, Chapter, Summary, SummaryPolicy};

#[derive(Default)]
struct Skips(Mutex<Vec<PathBuf>>);

impl ProgressReporter for Skips {
    fn stage(&self, _stage: Stage, _detail: &str) {}
    fn stage_done(&self, _stage: Stage) {}
    fn file_extracted(&self, _path: &Path, _current: usize, _total: usize) {}
    fn file_skipped(&self, path: &Path, _reason: &str) {
        self.0.lock().unwrap().push(path.to_path_buf());
    }
    fn failed(&self, _stage: Stage, _message: &str) {}
    fn done(&self, _report: &RunReport) {}
}

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, text).unwrap();
}

fn two_chapter_book() -> Book {
    Book {
        title: Some("Widgets".into()),
        summary: Summary {
            chapters: vec![Chapter::new("1", "Guide"), Chapter::new("2", "API")],
        },
        ..Book::default()
    }
}

fn expect_done(outcome: PipelineOutcome) -> RunReport {
    match outcome {
        PipelineOutcome::Done(report) => report,
        PipelineOutcome::Failed { stage, message } => panic!("failed at {stage}: {message}"),
    }
}

#[tokio::test]
async fn valid_and_malformed_sources() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "src/a.js",
        "/**\n * Say hello.\n *\n * @param {String} name\n */\nexports.hello = function (name) {};\n",
    );
    write(root, "src/b.js", "/**\n * @param {String\n */\nfunction b() {}\n");
    write(root, "dox/stale.md", "left over from a previous run");

    let config = BuildConfig::new(root, &AppConfig::default());
    let mut book = two_chapter_book();
    let skips = Skips::default();

    let report = expect_done(generate_docs(&config, &mut book, &skips).await);

    assert!(root.join("dox/a.md").is_file());
    assert!(!root.join("dox/b.md").exists());
    assert!(!root.join("dox/stale.md").exists());
    let page = std::fs::read_to_string(root.join("dox/a.md")).unwrap();
    assert!(page.starts_with("# a\n"));
    assert!(page.contains("## `hello(name)`"));

    assert_eq!(*skips.0.lock().unwrap(), vec![root.join("src/b.js")]);
    assert_eq!(report.files_skipped, 1);

    let api = &book.summary.chapters[1];
    assert_eq!(api.articles.len(), 1);
    assert_eq!(api.articles[0].level, "2.1");
    assert_eq!(api.articles[0].title, "a");
    assert_eq!(api.articles[0].path, "dox/a.md");
    assert!(book.summary.chapters[0].articles.is_empty());

    assert_eq!(book.navigation.len(), 1);
    let segment = book.navigation.get("dox/a.md").unwrap();
    assert_eq!(segment.index, 1);
    assert_eq!(segment.prev, None);
    assert_eq!(segment.next, None);

    let json = serde_json::to_string(&book).unwrap();
    let restored: Book = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, book);
}

#[tokio::test]
async fn empty_batch_leaves_empty_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "src/readme.txt", "not a source");

    let config = BuildConfig::new(root, &AppConfig::default());
    let mut book = two_chapter_book();
    book.summary.chapters[1]
        .articles
        .push(doxbook_shared::Article::generated("dox/old.md", "2.1", "old"));

    let report = expect_done(generate_docs(&config, &mut book, &Skips::default()).await);

    assert_eq!(report.sources_found, 0);
    assert!(report.written.is_empty());
    assert!(report.segments.is_empty());
    assert!(root.join("dox").is_dir());
    assert_eq!(std::fs::read_dir(root.join("dox")).unwrap().count(), 0);
    assert!(book.summary.chapters[1].articles.is_empty());
    assert!(book.navigation.is_empty());
}

#[tokio::test]
async fn repeated_runs_keep_one_chain() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "src/a.js", "/** A. */");
    write(root, "src/lib/b.js", "/** B. */");

    let mut config = BuildConfig::new(root, &AppConfig::default());
    config.summary_policy = SummaryPolicy::Merge;
    let mut book = two_chapter_book();

    expect_done(generate_docs(&config, &mut book, &Skips::default()).await);
    let second = expect_done(generate_docs(&config, &mut book, &Skips::default()).await);

    assert_eq!(second.segments.iter().map(|s| s.index).collect::<Vec<_>>(), [1, 2]);
    assert_eq!(book.navigation.len(), 2);
    assert_eq!(book.navigation.chain(), ["dox/a.md", "dox/b.md"]);
    let levels: Vec<_> = book.summary.chapters[1]
        .articles
        .iter()
        .map(|a| a.level.as_str())
        .collect();
    assert_eq!(levels, ["2.1", "2.2"]);
}

#[tokio::test]
async fn book_without_chapters_fails() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/a.js", "/** A. */");
    let config = BuildConfig::new(dir.path(), &AppConfig::default());
    let mut book = Book::default();

    let outcome = generate_docs(&config, &mut book, &Skips::default()).await;

    match outcome {
        PipelineOutcome::Failed { stage, message } => {
            assert_eq!(stage, Stage::Summarizing);
            assert!(message.contains("no chapters"));
        }
        PipelineOutcome::Done(_) => panic!("expected failure"),
    }
}
