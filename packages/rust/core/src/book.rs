//! The narrow interface the pipeline uses to mutate host book metadata.

use std::path::PathBuf;

use doxbook_shared::{Article, Book, NavigationSegment, Result, SummaryPolicy};

use crate::navigation::append_to_navigation;
use crate::summary::append_to_summary;

/// Host-owned book state the pipeline appends to.
pub trait BookStore {
    /// Attach written documents as children of the last summary chapter.
    fn append_children(
        &mut self,
        written: &[PathBuf],
        prefix: &str,
        policy: SummaryPolicy,
    ) -> Result<Vec<Article>>;

    /// Append articles to the end of the linear navigation order.
    fn append_sequence(&mut self, articles: &[Article]) -> Result<Vec<NavigationSegment>>;
}

impl BookStore for Book {
    fn append_children(
        &mut self,
        written: &[PathBuf],
        prefix: &str,
        policy: SummaryPolicy,
    ) -> Result<Vec<Article>> {
        let added = append_to_summary(&mut self.summary, written, prefix, policy)?;

        // Merging renumbers kept children; keep their segments in step.
        if policy == SummaryPolicy::Merge {
            let children = self.summary.chapters.last().map(|c| c.articles.as_slice());
            for article in children.unwrap_or_default() {
                if let Some(segment) = self.navigation.get_mut(&article.path) {
                    segment.level.clone_from(&article.level);
                }
            }
        }

        Ok(added)
    }

    fn append_sequence(&mut self, articles: &[Article]) -> Result<Vec<NavigationSegment>> {
        append_to_navigation(&mut self.navigation, articles)
    }
}
