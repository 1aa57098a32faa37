//! Error types for dbm-core

use thiserror::Error;

/// Core error type for dbm
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config {path}: {message}")]
    ConfigParseError { path: String, message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: No patch directory was supplied
    #[error("[E004] Patch directory has not been configured. Pass --patches=<dir> or set `patches` in dbm.yml")]
    PatchDirNotConfigured,

    /// E005: Patch directory does not exist
    #[error("[E005] Patch directory not found: {path}")]
    PatchDirNotFound { path: String },

    /// E006: Entry in the patch directory is not a valid patch name
    #[error("[E006] Invalid patch file name \"{path}\": {reason}")]
    InvalidPatchFilename { path: String, reason: String },

    /// E007: Two patch files have identical content
    #[error("[E007] Duplicate patch hash found \"{hash}\" for file \"{path}\" (same content as \"{existing}\")")]
    DuplicatePatchHash {
        hash: String,
        path: String,
        existing: String,
    },

    /// E008: Query mixes ALTER TYPE with routine bodies
    #[error("[E008] Query cannot be executed due to the use of both ALTER TYPEs and CREATE FUNCTIONs. Apply the ALTER TYPE statements manually, then rerun the upgrade without them.")]
    UnsplittableQuery,

    /// E009: A batch was merged from zero upgrades
    #[error("[E009] No upgrade found while merging a batch")]
    EmptyUpgrade,

    /// E010: The ledger returned a value that is not a hex-encoded hash
    #[error("[E010] Invalid hash in ledger: {value}")]
    InvalidLedgerHash { value: String },

    /// E011: No dev instance ancestor exists, not even the base database
    #[error("[E011] Existing database could not be found for '{base}' or any of its dev instances")]
    InstanceNotFound { base: String },

    /// E012: Dev mode against a remote host
    #[error("[E012] Dev mode is only allowed when working with a local database (host is '{host}')")]
    DevModeRequiresLocalHost { host: String },

    /// E013: IO error
    #[error("[E013] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E014: IO error with file path context
    #[error("[E014] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E015: YAML parse error
    #[error("[E015] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
