//! Summary appender: generated documents become articles under the last
//! chapter of the book summary.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use doxbook_shared::{Article, Chapter, DoxbookError, Result, Summary, SummaryPolicy};

use crate::extract::document_title;

/// Attach one article per written path to the last chapter of `summary`.
///
/// Returns the new articles in input order, carrying their final levels.
#[instrument(skip_all, fields(written = written.len(), prefix = prefix, policy = %policy))]
pub fn append_to_summary(
    summary: &mut Summary,
    written: &[PathBuf],
    prefix: &str,
    policy: SummaryPolicy,
) -> Result<Vec<Article>> {
    let chapter = summary
        .last_chapter_mut()
        .ok_or_else(|| DoxbookError::validation("book summary has no chapters to attach articles to"))?;

    let prefix = prefix.trim_end_matches('/');
    let mut fresh = Vec::with_capacity(written.len());
    for (i, path) in written.iter().enumerate() {
        fresh.push(Article::generated(
            article_path(prefix, path)?,
            child_level(&chapter.level, i + 1),
            document_title(path),
        ));
    }

    match policy {
        SummaryPolicy::Replace => {
            chapter.articles = fresh.clone();
            Ok(fresh)
        }
        SummaryPolicy::Merge => Ok(merge(chapter, fresh)),
    }
}

/// Keep children the batch does not regenerate, append the batch, renumber.
fn merge(chapter: &mut Chapter, fresh: Vec<Article>) -> Vec<Article> {
    let regenerated: HashSet<&str> = fresh.iter().map(|a| a.path.as_str()).collect();
    let mut children: Vec<Article> = chapter
        .articles
        .drain(..)
        .filter(|a| !regenerated.contains(a.path.as_str()))
        .collect();
    let kept = children.len();
    debug!(kept, added = fresh.len(), "merging chapter articles");

    children.extend(fresh);
    for (i, article) in children.iter_mut().enumerate() {
        article.level = child_level(&chapter.level, i + 1);
    }

    let added = children[kept..].to_vec();
    chapter.articles = children;
    added
}

fn child_level(parent: &str, position: usize) -> String {
    format!("{parent}.{position}")
}

fn article_path(prefix: &str, written: &Path) -> Result<String> {
    let name = written.file_name().ok_or_else(|| {
        DoxbookError::validation(format!("written path {} has no file name", written.display()))
    })?;
    let name = name.to_string_lossy();
    Ok(if prefix.is_empty() {
        name.into_owned()
    } else {
        format!("{prefix}/{name}")
    })
}
