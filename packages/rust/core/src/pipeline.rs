//! End-to-end doc generation: clean → collect → extract → write → summary →
//! navigation.
//!
//! [`run`] never returns an error. Every fatal failure is logged once and
//! reported as [`PipelineOutcome::Failed`] with the stage it happened in.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{error, info, instrument};

use doxbook_markdown::{CommentParser, DoxParser, MarkdownRenderer, Renderer};
use doxbook_shared::{Article, BuildConfig, NavigationSegment, Result};

use crate::book::BookStore;
use crate::extract::extract;
use crate::prepare::clean;
use crate::writer::persist;

/// Pipeline position. Runs move strictly forward; `Done` and `Failed` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Cleaning,
    Collecting,
    Extracting,
    Writing,
    Summarizing,
    Linking,
    Done,
    Failed,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Cleaning => "cleaning",
            Self::Collecting => "collecting",
            Self::Extracting => "extracting",
            Self::Writing => "writing",
            Self::Summarizing => "summarizing",
            Self::Linking => "linking",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Directory the documents were written to.
    pub output_dir: PathBuf,
    /// Source files matched by the glob.
    pub sources_found: usize,
    /// Documents that parsed and rendered.
    pub documents_extracted: usize,
    /// Sources dropped during extraction.
    pub files_skipped: usize,
    /// Written document paths, in write order.
    pub written: Vec<PathBuf>,
    /// Articles attached to the summary.
    pub articles: Vec<Article>,
    /// Navigation segments created.
    pub segments: Vec<NavigationSegment>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Terminal state of a run.
#[derive(Debug)]
pub enum PipelineOutcome {
    Done(RunReport),
    Failed { stage: Stage, message: String },
}

impl PipelineOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    pub fn report(&self) -> Option<&RunReport> {
        match self {
            Self::Done(report) => Some(report),
            Self::Failed { .. } => None,
        }
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a stage.
    fn stage(&self, stage: Stage, detail: &str);
    /// Called when a stage finished without error.
    fn stage_done(&self, stage: Stage);
    /// Called for each source that produced a document.
    fn file_extracted(&self, path: &Path, current: usize, total: usize);
    /// Called for each source dropped during extraction.
    fn file_skipped(&self, path: &Path, reason: &str);
    /// Called once when the run fails.
    fn failed(&self, stage: Stage, message: &str);
    /// Called once when the run completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&self, _stage: Stage, _detail: &str) {}
    fn stage_done(&self, _stage: Stage) {}
    fn file_extracted(&self, _path: &Path, _current: usize, _total: usize) {}
    fn file_skipped(&self, _path: &Path, _reason: &str) {}
    fn failed(&self, _stage: Stage, _message: &str) {}
    fn done(&self, _report: &RunReport) {}
}

/// Run the pipeline with the built-in parser and renderer.
pub async fn generate_docs(
    config: &BuildConfig,
    book: &mut dyn BookStore,
    progress: &dyn ProgressReporter,
) -> PipelineOutcome {
    run(config, book, &DoxParser, &MarkdownRenderer::default(), progress).await
}

/// Run the full pipeline.
///
/// 1. Clean the output directory
/// 2. Collect sources matching the glob
/// 3. Extract and render doc comments (bad files are skipped)
/// 4. Write one markdown file per document
/// 5. Attach articles to the last summary chapter
/// 6. Append navigation segments
#[instrument(skip_all, fields(root = %config.root.display(), src = %config.src))]
pub async fn run(
    config: &BuildConfig,
    book: &mut dyn BookStore,
    parser: &dyn CommentParser,
    renderer: &dyn Renderer,
    progress: &dyn ProgressReporter,
) -> PipelineOutcome {
    let mut tracker = StageTracker {
        current: Stage::Idle,
        progress,
    };

    match execute(config, book, parser, renderer, &mut tracker).await {
        Ok(report) => tracker.complete(report),
        Err(e) => tracker.fail(e.to_string()),
    }
}

struct StageTracker<'a> {
    current: Stage,
    progress: &'a dyn ProgressReporter,
}

impl StageTracker<'_> {
    fn enter(&mut self, stage: Stage, detail: &str) {
        self.current = stage;
        info!(%stage, "{detail}");
        self.progress.stage(stage, detail);
    }

    fn finish(&self) {
        info!(stage = %self.current, "stage finished");
        self.progress.stage_done(self.current);
    }

    fn complete(self, report: RunReport) -> PipelineOutcome {
        info!(
            stage = %Stage::Done,
            written = report.written.len(),
            skipped = report.files_skipped,
            segments = report.segments.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "doc generation complete"
        );
        self.progress.done(&report);
        PipelineOutcome::Done(report)
    }

    /// Log the failure once and report the stage it happened in.
    fn fail(self, message: String) -> PipelineOutcome {
        let stage = self.current;
        error!(%stage, error = %message, "doc generation failed");
        self.progress.failed(stage, &message);
        PipelineOutcome::Failed { stage, message }
    }
}

async fn execute(
    config: &BuildConfig,
    book: &mut dyn BookStore,
    parser: &dyn CommentParser,
    renderer: &dyn Renderer,
    tracker: &mut StageTracker<'_>,
) -> Result<RunReport> {
    let start = Instant::now();
    config.validate()?;
    let output_dir = config.output_path();

    tracker.enter(
        Stage::Cleaning,
        &format!("cleaning output directory {}", output_dir.display()),
    );
    clean(&output_dir).await?;
    tracker.finish();

    tracker.enter(Stage::Collecting, &format!("reading sources from {}", config.src));
    let sources = doxbook_discovery::collect(&config.root, &config.src, config.concurrency).await?;
    tracker.finish();

    tracker.enter(
        Stage::Extracting,
        &format!("parsing doc comments in {} files", sources.len()),
    );
    let documents = extract(parser, renderer, tracker.progress, &sources);
    let files_skipped = sources.len() - documents.len();
    let documents_extracted = documents.len();
    tracker.finish();

    tracker.enter(
        Stage::Writing,
        &format!("writing {} documents to {}", documents.len(), output_dir.display()),
    );
    let written = persist(&output_dir, documents, config.concurrency).await?;
    tracker.finish();

    tracker.enter(Stage::Summarizing, "adding articles to the summary");
    let articles = book.append_children(&written, &config.output_dir, config.summary_policy)?;
    tracker.finish();

    tracker.enter(Stage::Linking, "linking navigation");
    let segments = book.append_sequence(&articles)?;
    tracker.finish();

    Ok(RunReport {
        output_dir,
        sources_found: sources.len(),
        documents_extracted,
        files_skipped,
        written,
        articles,
        segments,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use doxbook_shared::{AppConfig, Book, DoxbookError, SummaryPolicy};
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl ProgressReporter for Recorder {
        fn stage(&self, stage: Stage, _detail: &str) {
            self.push(format!("enter {stage}"));
        }
        fn stage_done(&self, stage: Stage) {
            self.push(format!("ok {stage}"));
        }
        fn file_extracted(&self, _path: &Path, _current: usize, _total: usize) {}
        fn file_skipped(&self, path: &Path, _reason: &str) {
            self.push(format!("skip {}", path.display()));
        }
        fn failed(&self, stage: Stage, _message: &str) {
            self.push(format!("failed {stage}"));
        }
        fn done(&self, _report: &RunReport) {
            self.push("done".into());
        }
    }

    /// Store whose summary stage always fails.
    struct BrokenStore;

    impl BookStore for BrokenStore {
        fn append_children(&mut self, _: &[PathBuf], _: &str, _: SummaryPolicy) -> Result<Vec<Article>> {
            Err(DoxbookError::Storage("book is read-only".into()))
        }

        fn append_sequence(&mut self, _: &[Article]) -> Result<Vec<NavigationSegment>> {
            unreachable!("linking must not run after a failed summary")
        }
    }

    fn config_for(root: &Path) -> BuildConfig {
        BuildConfig::new(root, &AppConfig::default())
    }

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }

    #[tokio::test]
    async fn stages_run_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/a.js", "/** A. */\nfunction a() {}");
        let recorder = Recorder::default();
        let mut book = Book::with_chapter("API");

        let outcome = generate_docs(&config_for(dir.path()), &mut book, &recorder).await;

        assert!(outcome.is_done());
        let stages = ["cleaning", "collecting", "extracting", "writing", "summarizing", "linking"];
        let mut expected: Vec<String> = stages
            .iter()
            .flat_map(|s| [format!("enter {s}"), format!("ok {s}")])
            .collect();
        expected.push("done".into());
        assert_eq!(recorder.events(), expected);
    }

    #[tokio::test]
    async fn report_counts() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/a.js", "/** A. */");
        write(dir.path(), "src/b.js", "/** broken");
        write(dir.path(), "src/c.js", "/** C. */");
        let mut book = Book::with_chapter("API");

        let outcome = generate_docs(&config_for(dir.path()), &mut book, &SilentProgress).await;

        let report = outcome.report().unwrap();
        assert_eq!(report.output_dir, dir.path().join("dox"));
        assert_eq!(report.sources_found, 3);
        assert_eq!(report.documents_extracted, 2);
        assert_eq!(report.files_skipped, 1);
        assert_eq!(report.written.len(), 2);
        assert_eq!(report.articles.len(), 2);
        assert_eq!(report.segments.len(), 2);
    }

    #[tokio::test]
    async fn store_failure_stops_at_summarizing() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/a.js", "/** A. */");
        let recorder = Recorder::default();

        let outcome = run(
            &config_for(dir.path()),
            &mut BrokenStore,
            &DoxParser,
            &MarkdownRenderer::default(),
            &recorder,
        )
        .await;

        match outcome {
            PipelineOutcome::Failed { stage, message } => {
                assert_eq!(stage, Stage::Summarizing);
                assert!(message.contains("read-only"));
            }
            PipelineOutcome::Done(_) => panic!("expected failure"),
        }
        let events = recorder.events();
        assert_eq!(events.last().map(String::as_str), Some("failed summarizing"));
        assert!(!events.iter().any(|e| e.contains("linking")));
        // Documents written before the failure stay on disk.
        assert!(dir.path().join("dox/a.md").is_file());
    }

    #[tokio::test]
    async fn bad_glob_fails_while_collecting() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path());
        config.src = "src/[oops.js".into();
        let mut book = Book::with_chapter("API");

        let outcome = generate_docs(&config, &mut book, &SilentProgress).await;

        assert!(matches!(
            outcome,
            PipelineOutcome::Failed {
                stage: Stage::Collecting,
                ..
            }
        ));
        assert!(book.navigation.is_empty());
    }

    #[tokio::test]
    async fn invalid_config_fails_before_cleaning() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "keep/me.txt", "x");
        let mut config = config_for(dir.path());
        config.output_dir = "../keep".into();
        let mut book = Book::with_chapter("API");

        let outcome = generate_docs(&config, &mut book, &SilentProgress).await;

        assert!(matches!(outcome, PipelineOutcome::Failed { stage: Stage::Idle, .. }));
        assert!(dir.path().join("keep/me.txt").is_file());
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn every_stage_is_acknowledged_in_the_log() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/a.js", "/** A. */");
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);
        let mut book = Book::with_chapter("API");

        let outcome = generate_docs(&config_for(dir.path()), &mut book, &SilentProgress).await;

        assert!(outcome.is_done());
        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text.matches("stage finished").count(), 6);
        assert!(text.contains("doc generation complete"));
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Summarizing.to_string(), "summarizing");
        assert_eq!(Stage::Failed.as_str(), "failed");
    }
}
