//! Observable query results.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{DbError, Store, Table};

/// A query result that refreshes itself when its tables change.
///
/// The query runs once on creation (on the calling thread), then again on
/// Tokio's blocking pool after every committed write to one of its tables.
/// Subscribers only see a new value when it differs from the previous one.
/// Dropping the `LiveQuery` stops the refresh task.
pub struct LiveQuery<T> {
    rx: watch::Receiver<T>,
    task: JoinHandle<()>,
}

impl<T> LiveQuery<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub(crate) fn spawn<F>(store: &Store, tables: &'static [Table], query: F) -> Result<Self, DbError>
    where
        F: Fn(&Store) -> Result<T, DbError> + Send + Sync + 'static,
    {
        let handle = Handle::try_current().map_err(|_| DbError::NoRuntime)?;
        // Subscribe before the first run so no write slips between the two.
        let mut changes = store.subscribe();
        let initial = query(store)?;
        let (tx, rx) = watch::channel(initial);
        let store = store.clone();
        let query = Arc::new(query);

        let task = handle.spawn(async move {
            loop {
                tokio::select! {
                    () = tx.closed() => break,
                    change = changes.recv() => match change {
                        Ok(table) if !tables.contains(&table) => continue,
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::debug!(skipped, "live query lagged, re-running");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }

                let store = store.clone();
                let query = Arc::clone(&query);
                match tokio::task::spawn_blocking(move || (*query)(&store)).await {
                    Ok(Ok(value)) => {
                        tx.send_if_modified(|current| {
                            if *current == value {
                                false
                            } else {
                                *current = value;
                                true
                            }
                        });
                    }
                    Ok(Err(err)) => {
                        tracing::warn!(error = %err, "live query failed, keeping last value");
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "live query task failed, keeping last value");
                    }
                }
            }
        });

        Ok(Self { rx, task })
    }

    /// The most recent value.
    pub fn get(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Waits for the next distinct value.
    ///
    /// Returns `None` once the refresh task has stopped.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// A raw receiver for callers that want to `select!` on updates.
    ///
    /// The receiver outlives nothing: once this `LiveQuery` is dropped it
    /// reports the channel as closed.
    pub fn receiver(&self) -> watch::Receiver<T> {
        self.rx.clone()
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
