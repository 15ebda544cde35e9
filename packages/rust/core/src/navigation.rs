//! Navigation linker: appends articles to the tail of the book's linear
//! prev/next chain.

use tracing::{debug, instrument};

use doxbook_shared::{Article, DoxbookError, Navigation, NavigationSegment, Result};

/// Append one segment per article after the current highest-index segment.
///
/// Articles whose path is already registered are unlinked from their old
/// position first, so a repeated run moves them to the tail instead of
/// forking the chain. Returns the created segments in article order.
///
/// Fails without adding any segment if the new indices would overflow `u32`.
#[instrument(skip_all, fields(articles = articles.len(), existing = navigation.len()))]
pub fn append_to_navigation(
    navigation: &mut Navigation,
    articles: &[Article],
) -> Result<Vec<NavigationSegment>> {
    navigation.sync_paths();
    for article in articles {
        unlink(navigation, &article.path);
    }

    let mut anchor: Option<(String, u32)> = navigation
        .max_segment()
        .map(|(key, segment)| (key.clone(), segment.index));
    let last_index = anchor.as_ref().map_or(0, |(_, index)| *index);
    u32::try_from(articles.len())
        .ok()
        .and_then(|count| last_index.checked_add(count))
        .ok_or_else(|| {
            DoxbookError::validation(format!(
                "navigation index overflow: {} articles after index {last_index}",
                articles.len()
            ))
        })?;

    let mut created = Vec::with_capacity(articles.len());
    for article in articles {
        let index = anchor.as_ref().map_or(0, |(_, index)| *index) + 1;
        let prev = anchor.as_ref().map(|(path, _)| path.clone());

        if let Some(prev_segment) = prev.as_deref().and_then(|path| navigation.get_mut(path)) {
            prev_segment.next = Some(article.path.clone());
        }

        let segment = NavigationSegment {
            index,
            level: article.level.clone(),
            title: article.title.clone(),
            path: article.path.clone(),
            introduction: false,
            prev,
            next: None,
        };
        navigation.0.insert(segment.path.clone(), segment.clone());
        created.push(segment);
        anchor = Some((article.path.clone(), index));
    }

    debug!(created = created.len(), total = navigation.len(), "navigation linked");
    Ok(created)
}

/// Remove `path` from the chain, joining its neighbours.
fn unlink(navigation: &mut Navigation, path: &str) {
    let Some(stale) = navigation.0.remove(path) else {
        return;
    };
    debug!(path, index = stale.index, "re-registering navigation segment");

    if let Some(prev) = stale.prev.as_deref().and_then(|p| navigation.get_mut(p)) {
        prev.next = stale.next.clone();
    }
    if let Some(next) = stale.next.as_deref().and_then(|p| navigation.get_mut(p)) {
        next.prev = stale.prev.clone();
    }
}
