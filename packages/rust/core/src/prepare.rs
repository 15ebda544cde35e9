//! Output directory reset.

use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use doxbook_shared::{DoxbookError, Result};

/// Remove `dir` and everything in it (if present), then recreate it empty.
pub async fn clean(dir: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => debug!(path = %dir.display(), "removed previous output"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(DoxbookError::io(dir, e)),
    }

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DoxbookError::io(dir, e))
}
