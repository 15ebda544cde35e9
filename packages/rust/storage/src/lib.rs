//! JSON-file storage for host book metadata.
//!
//! The [`BookFile`] struct owns a [`Book`] loaded from `<root>/book.json`.
//! The CLI is the only writer: it loads the file, hands the book to the
//! pipeline, and saves it back after a successful run.

use std::io::ErrorKind;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use doxbook_shared::{Book, DoxbookError, Result};

/// File name of the book metadata inside a book root.
pub const BOOK_FILE_NAME: &str = "book.json";

/// Primary storage handle: a book plus the file it came from.
#[derive(Debug, Clone)]
pub struct BookFile {
    path: PathBuf,
    book: Book,
}

impl BookFile {
    /// Location of the book file under `root`.
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(BOOK_FILE_NAME)
    }

    /// Load `<root>/book.json`. A missing file is an error.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub async fn load(root: &Path) -> Result<Self> {
        let path = Self::path_in(root);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DoxbookError::Storage(format!(
                    "no book metadata at {} (run `doxbook book init`)",
                    path.display()
                )));
            }
            Err(e) => return Err(DoxbookError::io(&path, e)),
        };

        let book: Book = serde_json::from_slice(&bytes).map_err(|e| {
            DoxbookError::Storage(format!("invalid book metadata in {}: {e}", path.display()))
        })?;
        debug!(
            chapters = book.summary.chapters.len(),
            segments = book.navigation.len(),
            "loaded book"
        );

        Ok(Self { path, book })
    }

    /// Create `<root>/book.json` holding one empty chapter at level `"1"`.
    ///
    /// Refuses to overwrite an existing file.
    #[instrument(skip_all, fields(root = %root.display(), chapter = chapter_title))]
    pub async fn init(root: &Path, chapter_title: &str) -> Result<Self> {
        let path = Self::path_in(root);
        if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| DoxbookError::io(&path, e))?
        {
            return Err(DoxbookError::Storage(format!(
                "book metadata already exists at {}",
                path.display()
            )));
        }

        tokio::fs::create_dir_all(root)
            .await
            .map_err(|e| DoxbookError::io(root, e))?;

        let file = Self {
            path,
            book: Book::with_chapter(chapter_title),
        };
        file.save().await?;
        info!(path = %file.path.display(), "initialized book");
        Ok(file)
    }

    /// Write the book back as pretty JSON (temp file, then rename).
    pub async fn save(&self) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.book)
            .map_err(|e| DoxbookError::Storage(format!("failed to serialize book: {e}")))?;

        let temp = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp, &json)
            .await
            .map_err(|e| DoxbookError::io(&temp, e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| DoxbookError::io(&self.path, e))?;

        debug!(path = %self.path.display(), bytes = json.len(), "saved book");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_book(self) -> Book {
        self.book
    }
}

impl Deref for BookFile {
    type Target = Book;

    fn deref(&self) -> &Book {
        &self.book
    }
}

impl DerefMut for BookFile {
    fn deref_mut(&mut self) -> &mut Book {
        &mut self.book
    }
}
