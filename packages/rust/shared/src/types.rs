//! Core domain types: pipeline documents and the host book's summary and
//! navigation.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// File extension given to every generated document.
pub const DOC_EXTENSION: &str = "md";

// ---------------------------------------------------------------------------
// Pipeline documents
// ---------------------------------------------------------------------------

/// A source file as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Raw file contents.
    pub contents: Vec<u8>,
    /// Path the file was read from.
    pub path: PathBuf,
}

/// Rendered markdown for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// Rendered markdown bytes.
    pub contents: Vec<u8>,
    /// Path of the originating source file (not the output path).
    pub path: PathBuf,
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// The book's table of contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Top-level chapters, in reading order.
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

impl Summary {
    /// The chapter new articles are appended under.
    pub fn last_chapter_mut(&mut self) -> Option<&mut Chapter> {
        self.chapters.last_mut()
    }
}

/// A top-level grouping in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Dotted hierarchical index (e.g. `"2"`).
    pub level: String,
    /// Display title.
    pub title: String,
    /// Chapter page, if it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Child articles.
    #[serde(default)]
    pub articles: Vec<Article>,
}

impl Chapter {
    /// Create an empty chapter.
    pub fn new(level: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            title: title.into(),
            path: None,
            articles: Vec::new(),
        }
    }
}

/// A leaf summary entry pointing at one generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Book-relative path of the document (e.g. `dox/widget.md`).
    pub path: String,
    /// Dotted hierarchical index (e.g. `"2.3"`).
    pub level: String,
    /// Display title.
    pub title: String,
    /// Always empty for generated articles.
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default = "default_true")]
    pub exists: bool,
    #[serde(default)]
    pub external: bool,
    #[serde(default)]
    pub introduction: bool,
}

fn default_true() -> bool {
    true
}

impl Article {
    /// Create a leaf article for a generated document.
    pub fn generated(
        path: impl Into<String>,
        level: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            level: level.into(),
            title: title.into(),
            articles: Vec::new(),
            exists: true,
            external: false,
            introduction: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// One node in the book's linear prev/next order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationSegment {
    /// Position in the linear order.
    pub index: u32,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub title: String,
    /// Key of this segment in [`Navigation`]. Filled from the key on load.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub introduction: bool,
    /// Path of the previous segment, `None` at the very first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    /// Path of the next segment, `None` at the very last.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Path-keyed navigation map covering the whole book.
///
/// The map key is the segment's identity; `path` fields are resynced from
/// it on load and by [`Navigation::sync_paths`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Navigation(pub BTreeMap<String, NavigationSegment>);

impl<'de> Deserialize<'de> for Navigation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut navigation = Self(BTreeMap::deserialize(deserializer)?);
        navigation.sync_paths();
        Ok(navigation)
    }
}

impl Navigation {
    pub fn get(&self, path: &str) -> Option<&NavigationSegment> {
        self.0.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut NavigationSegment> {
        self.0.get_mut(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overwrite every segment's `path` with its map key.
    pub fn sync_paths(&mut self) {
        for (key, segment) in &mut self.0 {
            if segment.path != *key {
                segment.path.clone_from(key);
            }
        }
    }

    /// Key and segment with the highest index; on ties the last one in
    /// iteration order.
    pub fn max_segment(&self) -> Option<(&String, &NavigationSegment)> {
        self.0
            .iter()
            .fold(None, |best: Option<(&String, &NavigationSegment)>, (key, segment)| match best {
                Some((_, current)) if segment.index < current.index => best,
                _ => Some((key, segment)),
            })
    }

    /// Segment paths in `next` order, starting from the lowest index.
    ///
    /// Stops at the first dangling or repeated link, so a broken chain yields
    /// fewer paths than [`Navigation::len`].
    pub fn chain(&self) -> Vec<String> {
        let Some((first, _)) = self.0.iter().min_by_key(|(_, segment)| segment.index) else {
            return Vec::new();
        };

        let mut visited = Vec::with_capacity(self.0.len());
        let mut cursor = Some(first.clone());
        while let Some(path) = cursor {
            if visited.contains(&path) {
                break;
            }
            let Some(segment) = self.0.get(&path) else {
                break;
            };
            cursor = segment.next.clone();
            visited.push(path);
        }
        visited
    }
}

// ---------------------------------------------------------------------------
// Book
// ---------------------------------------------------------------------------

/// Host-owned book metadata mutated by the summary and navigation stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Summary,
    #[serde(default)]
    pub navigation: Navigation,
}

impl Book {
    /// A book with a single empty chapter at level `"1"`.
    pub fn with_chapter(title: impl Into<String>) -> Self {
        Self {
            title: None,
            summary: Summary {
                chapters: vec![Chapter::new("1", title)],
            },
            navigation: Navigation::default(),
        }
    }
}
