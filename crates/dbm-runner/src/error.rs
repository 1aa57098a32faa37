//! Error types for dbm-runner

use dbm_core::CoreError;
use dbm_db::DbError;
use thiserror::Error;

/// Errors raised while applying upgrades
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Planning or configuration failure
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database client failure
    #[error(transparent)]
    Db(#[from] DbError),

    /// R001: A scripted patch exited unsuccessfully
    #[error("[R001] {kind} patch {path} failed with exit code {code}")]
    ScriptFailed {
        kind: String,
        path: String,
        code: i32,
    },

    /// R002: An external program could not be started
    #[error("[R002] Failed to start '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// R003: The user declined a confirmation
    #[error("[R003] Aborted: {0} was declined")]
    Declined(String),

    /// R004: I/O error with file path context
    #[error("[R004] IO error at {path}: {source}")]
    IoWithPath {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// R005: Applying an upgrade did not record its hashes
    #[error("[R005] Upgrade from {files} was applied but the ledger did not advance")]
    LedgerNotAdvanced { files: String },

    /// R006: The schema diff program failed
    #[error("[R006] Schema diff with '{program}' failed with exit code {code}: {stderr}")]
    DiffFailed {
        program: String,
        code: i32,
        stderr: String,
    },
}

/// Result type alias for RunnerError
pub type RunnerResult<T> = Result<T, RunnerError>;
