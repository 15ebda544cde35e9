//! Source discovery: expand a glob into files and load them.
//!
//! Expansion walks only the pattern's literal base directory. Reads fan out
//! through [`join_bounded`]; one failed read fails the whole collection.

mod pattern;

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use doxbook_shared::{DoxbookError, Result, SourceFile, join_bounded};

pub use pattern::GlobPattern;

// ---------------------------------------------------------------------------
// Main entry points
// ---------------------------------------------------------------------------

/// Expand `pattern` (relative to `root` unless absolute) and read every match.
///
/// Files come back in walk order: directories depth-first, entries sorted by
/// file name. Callers must not rely on that order across runs.
#[instrument(skip_all, fields(pattern = %pattern, concurrency = concurrency))]
pub async fn collect(root: &Path, pattern: &str, concurrency: usize) -> Result<Vec<SourceFile>> {
    let paths = expand(root, pattern).await?;
    info!(matched = paths.len(), "glob expanded");

    let files = join_bounded(paths, concurrency, |path: PathBuf| async move {
        let contents = tokio::fs::read(&path)
            .await
            .map_err(|e| DoxbookError::io(&path, e))?;
        debug!(path = %path.display(), bytes = contents.len(), "read source file");
        Ok(SourceFile { contents, path })
    })
    .await?;

    Ok(files)
}

/// Resolve a glob to the list of matching regular files.
pub async fn expand(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let glob = GlobPattern::new(pattern)?;
    let base = resolve_base(root, glob.base());

    tokio::task::spawn_blocking(move || walk(&base, &glob))
        .await
        .map_err(|e| DoxbookError::Task(format!("glob walk: {e}")))?
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Anchor a pattern base to the book root.
fn resolve_base(root: &Path, base: &Path) -> PathBuf {
    if base.is_absolute() {
        base.to_path_buf()
    } else if base == Path::new(".") {
        root.to_path_buf()
    } else {
        root.join(base)
    }
}

/// Walk `base` and keep the regular files the glob accepts.
fn walk(base: &Path, glob: &GlobPattern) -> Result<Vec<PathBuf>> {
    if !base.is_dir() {
        debug!(base = %base.display(), "glob base does not exist, nothing to match");
        return Ok(Vec::new());
    }

    let mut walker = WalkDir::new(base).sort_by_file_name().min_depth(1);
    if let Some(depth) = glob.max_depth() {
        walker = walker.max_depth(depth);
    }

    let mut matched = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| base.to_path_buf());
            match e.into_io_error() {
                Some(source) => DoxbookError::io(path, source),
                None => DoxbookError::glob(format!("filesystem loop under {}", path.display())),
            }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(base) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if glob.matches(&relative) {
            matched.push(entry.into_path());
        }
    }

    Ok(matched)
}
