use thiserror::Error;

/// Unified error type for database operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// Entity not found by the given identifier
    #[error("Entity not found")]
    NotFound,

    /// An EXPLAIN pass failed. `pass` names the logical step so a
    /// multi-section report failure is diagnosable.
    #[error("{pass} explain failed")]
    Explain {
        pass: &'static str,
        #[source]
        source: Box<DbError>,
    },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DbError {
    /// Wrap an error from an EXPLAIN pass with the name of the failing step.
    pub fn explain(pass: &'static str, source: DbError) -> Self {
        DbError::Explain {
            pass,
            source: Box::new(source),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            other => DbError::Other(anyhow::Error::new(other)),
        }
    }
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;
