//! Configuration types and parsing for dbm.yml and connection files

use crate::error::{CoreError, CoreResult};
use crate::paths::resolve_against;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Project configuration file names, in lookup order
pub const PROJECT_CONFIG_FILES: [&str; 2] = ["dbm.yml", "dbm.yaml"];

/// Optional project configuration from dbm.yml
///
/// Every value can be overridden on the command line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Directory containing patch files
    #[serde(default)]
    pub patches: Option<String>,

    /// Saved schema dump checked into the codebase
    #[serde(default)]
    pub schema: Option<String>,

    /// Connection files, merged in order
    #[serde(default)]
    pub db_config: Vec<String>,

    /// Interpreter used for `.py` patches
    #[serde(default = "default_python")]
    pub python: String,

    /// Database used for cluster-level queries (existence checks, cloning)
    #[serde(default = "default_maintenance_database")]
    pub maintenance_database: String,

    /// Command prefix running `psql` as the cluster superuser during `init`
    #[serde(default = "default_superuser_command")]
    pub superuser_command: Vec<String>,

    /// How merged SQL batches are executed
    #[serde(default)]
    pub apply_mode: ApplyMode,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            patches: None,
            schema: None,
            db_config: Vec::new(),
            python: default_python(),
            maintenance_database: default_maintenance_database(),
            superuser_command: default_superuser_command(),
            apply_mode: ApplyMode::default(),
        }
    }
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_maintenance_database() -> String {
    "postgres".to_string()
}

fn default_superuser_command() -> Vec<String> {
    vec![
        "sudo".to_string(),
        "-u".to_string(),
        "postgres".to_string(),
        "psql".to_string(),
    ]
}

/// How a merged SQL upgrade is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    /// The merged script runs as one transaction (default)
    #[default]
    Batched,
    /// Each patch file runs as its own transaction, followed by its ledger insert
    PerFile,
}

impl fmt::Display for ApplyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyMode::Batched => write!(f, "batched"),
            ApplyMode::PerFile => write!(f, "per_file"),
        }
    }
}

impl ProjectConfig {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: ProjectConfig =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load dbm.yml / dbm.yaml from a project directory, falling back to
    /// defaults when neither exists.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in PROJECT_CONFIG_FILES {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }
        log::debug!("No project config in {}, using defaults", dir.display());
        Ok(Self::default())
    }

    fn validate(&self) -> CoreResult<()> {
        if self.python.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "'python' cannot be empty".to_string(),
            });
        }
        if self.superuser_command.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "'superuser_command' needs at least a program name".to_string(),
            });
        }
        if self.maintenance_database.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "'maintenance_database' cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Connection details for the target PostgreSQL cluster
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionConfig {
    /// Server host
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Role to connect as
    pub username: String,

    /// Password handed to the client through `PGPASSWORD`
    #[serde(default)]
    pub password: String,

    /// Base database name
    pub database: String,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

impl ConnectionConfig {
    /// Load and merge JSON connection files; keys in later files win.
    pub fn load_layered(paths: &[PathBuf]) -> CoreResult<Self> {
        if paths.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Connection config location has not been configured. Pass --db_config=<file>"
                    .to_string(),
            });
        }

        let mut merged = serde_json::Map::new();
        for path in paths {
            if !path.exists() {
                return Err(CoreError::ConfigNotFound {
                    path: path.display().to_string(),
                });
            }
            let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
                path: path.display().to_string(),
                source: e,
            })?;
            let layer: serde_json::Value =
                serde_json::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
            let serde_json::Value::Object(layer) = layer else {
                return Err(CoreError::ConfigParseError {
                    path: path.display().to_string(),
                    message: "expected a JSON object".to_string(),
                });
            };
            merged.extend(layer);
        }

        let config: ConnectionConfig = serde_json::from_value(serde_json::Value::Object(merged))
            .map_err(|e| CoreError::ConfigInvalid {
                message: format!("connection config: {}", e),
            })?;
        Ok(config)
    }

    /// Whether the server runs on this machine
    pub fn is_host_local(&self) -> bool {
        self.host == "127.0.0.1" || self.host == "localhost"
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `--patches=`
    pub patches: Option<String>,
    /// `--schema=`
    pub schema: Option<String>,
    /// `--db_config=` (comma separated)
    pub db_config: Vec<String>,
    /// `--dev_mode`
    pub dev_mode: bool,
    /// `-y`
    pub force: bool,
    /// `--per_file`
    pub per_file: bool,
}

/// Fully resolved settings handed to every component
#[derive(Debug, Clone)]
pub struct Settings {
    /// Project directory; relative paths and file listings are based here
    pub project_root: PathBuf,
    /// Patch directory, if configured
    pub patch_dir: Option<PathBuf>,
    /// Saved schema path, if configured
    pub schema_path: Option<PathBuf>,
    /// Target connection
    pub connection: ConnectionConfig,
    /// Work against a hash-named dev instance
    pub dev_mode: bool,
    /// Skip confirmations
    pub force: bool,
    /// Merged batch execution
    pub apply_mode: ApplyMode,
    /// Interpreter for `.py` patches
    pub python: String,
    /// Database used for cluster-level queries
    pub maintenance_database: String,
    /// Superuser `psql` command prefix
    pub superuser_command: Vec<String>,
}

impl Settings {
    /// Combine project configuration with command-line overrides.
    pub fn resolve(
        project_root: &Path,
        config: &ProjectConfig,
        overrides: &ConfigOverrides,
    ) -> CoreResult<Self> {
        let patches = overrides.patches.as_ref().or(config.patches.as_ref());
        let schema = overrides.schema.as_ref().or(config.schema.as_ref());
        let db_config = if overrides.db_config.is_empty() {
            &config.db_config
        } else {
            &overrides.db_config
        };
        let db_config: Vec<PathBuf> = db_config
            .iter()
            .map(|p| resolve_against(project_root, p))
            .collect();

        let connection = ConnectionConfig::load_layered(&db_config)?;
        if overrides.dev_mode && !connection.is_host_local() {
            return Err(CoreError::DevModeRequiresLocalHost {
                host: connection.host.clone(),
            });
        }

        let apply_mode = if overrides.per_file {
            ApplyMode::PerFile
        } else {
            config.apply_mode
        };

        Ok(Self {
            project_root: project_root.to_path_buf(),
            patch_dir: patches.map(|p| resolve_against(project_root, p)),
            schema_path: schema.map(|p| resolve_against(project_root, p)),
            connection,
            dev_mode: overrides.dev_mode,
            force: overrides.force,
            apply_mode,
            python: config.python.clone(),
            maintenance_database: config.maintenance_database.clone(),
            superuser_command: config.superuser_command.clone(),
        })
    }

    /// The configured patch directory
    pub fn patch_dir(&self) -> CoreResult<&Path> {
        self.patch_dir
            .as_deref()
            .ok_or(CoreError::PatchDirNotConfigured)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
