//! Bounded fan-out / join-all for batches of independent async operations.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{DoxbookError, Result};

/// Run `task` over every item with at most `limit` in flight.
///
/// Results come back in input order. The first failure aborts every task
/// still running and is returned as-is.
pub async fn join_bounded<I, T, F, Fut>(items: Vec<I>, limit: usize, task: F) -> Result<Vec<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let total = items.len();
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let task = Arc::new(task);
    let mut set = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let sem = Arc::clone(&semaphore);
        let task = Arc::clone(&task);

        set.spawn(async move {
            let _permit = sem
                .acquire()
                .await
                .map_err(|e| DoxbookError::Task(format!("semaphore closed: {e}")))?;
            task(item).await.map(|value| (index, value))
        });
    }

    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(total).collect();

    // Dropping `set` on early return aborts the remaining tasks.
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Ok((index, value))) => slots[index] = Some(value),
            Ok(Err(e)) => return Err(e),
            Err(e) => return Err(DoxbookError::Task(e.to_string())),
        }
    }

    Ok(slots.into_iter().flatten().collect())
}
