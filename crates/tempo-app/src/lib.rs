//! Use cases for the tempo time tracker.
//!
//! [`Tempo`] is the entry point: each public `async fn` on it is one use case.
//! A use case runs its body on Tokio's blocking pool (the store is a
//! synchronous `SQLite` handle) and returns an explicit
//! `Result<T, UseCaseError>`. Store faults, validation faults and panics in
//! the body all come back as `Err`; nothing propagates past this boundary.
//!
//! Dropping a use-case future does not cancel the body: it still runs to
//! completion on the blocking pool.

use std::any::Any;

use tokio::task::JoinError;

use tempo_db::Store;

mod activities;
mod backup;
mod entries;
mod error;
mod goals;
mod stats;
mod tags;

pub use backup::{BACKUP_VERSION, Backup, ExportSummary};
pub use entries::{LogEntry, StartTimer, TaggedEntry};
pub use error::UseCaseError;
pub use goals::SetGoal;

/// Use-case facade over a shared [`Store`].
#[derive(Debug, Clone)]
pub struct Tempo {
    store: Store,
}

impl Tempo {
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// Runs `body` on the blocking pool and converts every fault into `Err`.
    ///
    /// `use_case` names the operation in logs and in
    /// [`UseCaseError::Panicked`].
    pub async fn run<T, F>(&self, use_case: &'static str, body: F) -> Result<T, UseCaseError>
    where
        T: Send + 'static,
        F: FnOnce(&Store) -> Result<T, UseCaseError> + Send + 'static,
    {
        let store = self.store.clone();
        tracing::debug!(use_case, "running use case");
        let result = match tokio::task::spawn_blocking(move || body(&store)).await {
            Ok(result) => result,
            Err(err) => Err(join_error(use_case, err)),
        };
        if let Err(err) = &result {
            tracing::debug!(use_case, error = %err, "use case failed");
        }
        result
    }
}

fn join_error(use_case: &'static str, err: JoinError) -> UseCaseError {
    if err.is_panic() {
        UseCaseError::Panicked {
            use_case,
            message: panic_message(&err.into_panic()),
        }
    } else {
        UseCaseError::Cancelled { use_case }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
