use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Authentication error: {0}")]
    Unauthenticated(String),

    /// Caller is authenticated but is not the host of the room.
    #[error("Only the room host may perform this action")]
    NotHost,

    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness violation at the persistence boundary.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Could not allocate a unique room code after {attempts} attempts")]
    CodeExhausted { attempts: u32 },

    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the caller may safely retry the same request.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound("Resource not found".to_string()),
            sqlx::Error::PoolTimedOut => Self::Timeout("database connection"),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                match code.as_ref() {
                    // PostgreSQL unique_violation
                    "23505" => {
                        if db_err.message().contains("code") {
                            Self::AlreadyExists("Room code already in use".to_string())
                        } else {
                            Self::AlreadyExists("Resource already exists".to_string())
                        }
                    }
                    // PostgreSQL foreign_key_violation
                    "23503" => Self::NotFound("Referenced resource not found".to_string()),
                    // PostgreSQL not_null_violation
                    "23502" => Self::InvalidInput("Required field is missing".to_string()),
                    _ => Self::Database(err),
                }
            }
            _ => Self::Database(err),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("Background task failed: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
