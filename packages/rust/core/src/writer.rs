//! Document writer: one `<stem>.md` per extracted document, flat in the
//! output directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use doxbook_shared::{DOC_EXTENSION, DoxbookError, ExtractedDocument, Result, join_bounded};

/// `<output_dir>/<source stem>.md`. Source directories are flattened.
pub fn output_path(output_dir: &Path, source: &Path) -> Result<PathBuf> {
    let stem = source.file_stem().ok_or_else(|| {
        DoxbookError::validation(format!("source path {} has no file name", source.display()))
    })?;
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(DOC_EXTENSION);
    Ok(output_dir.join(name))
}

/// Write every document and return the written paths in input order.
///
/// Documents that flatten onto an already claimed file name are skipped with
/// a warning; the first one in input order keeps the name. Any write failure
/// fails the whole call.
#[instrument(skip_all, fields(output = %output_dir.display(), documents = documents.len()))]
pub async fn persist(
    output_dir: &Path,
    documents: Vec<ExtractedDocument>,
    concurrency: usize,
) -> Result<Vec<PathBuf>> {
    let mut claimed = HashSet::new();
    let mut jobs = Vec::with_capacity(documents.len());

    for doc in documents {
        let target = output_path(output_dir, &doc.path)?;
        if !claimed.insert(target.clone()) {
            warn!(
                source = %doc.path.display(),
                target = %target.display(),
                "output file name already taken, skipping document"
            );
            continue;
        }
        jobs.push((target, doc.contents));
    }

    let written = join_bounded(jobs, concurrency, |(target, contents)| async move {
        tokio::fs::write(&target, &contents)
            .await
            .map_err(|e| DoxbookError::io(&target, e))?;
        debug!(path = %target.display(), bytes = contents.len(), "wrote document");
        Ok(target)
    })
    .await?;

    info!(count = written.len(), "documents written");
    Ok(written)
}
