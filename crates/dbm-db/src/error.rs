//! Error types for dbm-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// External client could not be started (D002)
    #[error("[D002] Failed to start '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// External client exited unsuccessfully (D003)
    #[error("[D003] '{command}' failed with exit code {code}: {stderr}")]
    ExecutionError {
        command: String,
        code: i32,
        stderr: String,
    },

    /// Client output could not be interpreted (D004)
    #[error("[D004] Unexpected database output: {0}")]
    InvalidOutput(String),

    /// Not implemented (D005)
    #[error("[D005] Feature not implemented for {backend}: {feature}")]
    NotImplemented { backend: String, feature: String },

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;
