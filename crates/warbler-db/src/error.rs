use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// A UNIQUE, NOT NULL, CHECK or foreign key constraint rejected the write.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Input refused before it reached the database.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("DB lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Sqlite(rusqlite::Error),
}

impl DbError {
    pub fn is_integrity(&self) -> bool {
        matches!(self, DbError::Integrity(_))
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DbError::Integrity(msg.unwrap_or_else(|| e.to_string()))
            }
            other => DbError::Sqlite(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
