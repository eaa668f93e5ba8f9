use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppHubError {
    #[error("SQLite database error: {0}")]
    RusqliteError(#[from] rusqlite::Error),

    #[error("Database error while {action}: {source}")]
    Database {
        action: String,
        source: rusqlite::Error,
    },

    #[error("Could not assign a unique alias after {attempts} attempts")]
    AliasSpaceExhausted { attempts: u32 },

    #[error("Unexpected storage failure while {action}: {source}")]
    Invariant {
        action: String,
        source: rusqlite::Error,
    },

    #[error("Thread lock poison error")]
    PoisonError,
}

impl<T> From<std::sync::PoisonError<T>> for AppHubError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::PoisonError
    }
}

pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> Result<T, AppHubError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for rusqlite::Result<T> {
    fn with_context<C>(self, context: C) -> Result<T, AppHubError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| AppHubError::Database {
            action: context(),
            source: err,
        })
    }
}
