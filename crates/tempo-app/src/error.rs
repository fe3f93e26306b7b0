use std::path::PathBuf;

use thiserror::Error;

use tempo_core::ValidationError;
use tempo_db::DbError;

/// Failure outcome of a use case.
#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error(transparent)]
    Store(DbError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: String },

    #[error("no timer is running")]
    NoRunningTimer,

    #[error("cannot import {}: {message}", path.display())]
    Import { path: PathBuf, message: String },

    #[error("cannot export to {}: {message}", path.display())]
    Export { path: PathBuf, message: String },

    #[error("{use_case} panicked: {message}")]
    Panicked {
        use_case: &'static str,
        message: String,
    },

    #[error("{use_case} was cancelled")]
    Cancelled { use_case: &'static str },
}

impl From<DbError> for UseCaseError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Invalid(invalid) => Self::Invalid(invalid),
            other => Self::Store(other),
        }
    }
}

impl UseCaseError {
    pub(crate) fn not_found(what: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            what,
            id: id.to_string(),
        }
    }
}
