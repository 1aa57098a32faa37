//! Saved schema comparison

use crate::error::{RunnerError, RunnerResult};
use dbm_core::schema::schemas_equal;
use std::io::Write;
use std::path::Path;
use tokio::process::Command;

/// Result of saving the current schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The file was rewritten
    Written,
    /// The saved schema already matched
    Unchanged,
}

/// Diffs a live schema dump against the saved schema file
#[derive(Debug, Clone)]
pub struct SchemaVerifier {
    git: String,
}

impl Default for SchemaVerifier {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
        }
    }
}

impl SchemaVerifier {
    /// Verifier using `git` from `PATH`
    pub fn new() -> Self {
        Self::default()
    }

    /// Verifier using another diff program with git's argument conventions
    pub fn with_git(program: &str) -> Self {
        Self {
            git: program.to_string(),
        }
    }

    /// Colored diff between the saved schema and `current`; empty exactly
    /// when they differ only in whitespace.
    pub async fn diff(&self, saved_path: &Path, current: &str) -> RunnerResult<String> {
        let saved = read_schema(saved_path)?;
        if schemas_equal(&saved, current) {
            return Ok(String::new());
        }

        let mut temp = tempfile::Builder::new()
            .prefix("dbm-schema-")
            .suffix(".sql")
            .tempfile()
            .map_err(|e| RunnerError::IoWithPath {
                path: std::env::temp_dir().display().to_string(),
                source: e,
            })?;
        let temp_path = temp.path().display().to_string();
        temp.write_all(current.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(|e| RunnerError::IoWithPath {
                path: temp_path,
                source: e,
            })?;

        log::debug!("Diffing {} against the live schema", saved_path.display());
        let output = Command::new(&self.git)
            .args([
                "--no-pager",
                "diff",
                "--no-index",
                "--color",
                "--ignore-space-at-eol",
            ])
            .arg(saved_path)
            .arg(temp.path())
            .output()
            .await
            .map_err(|e| RunnerError::SpawnFailed {
                program: self.git.clone(),
                source: e,
            })?;

        // git exits 1 when the files differ.
        let code = output.status.code().unwrap_or(-1);
        if code != 0 && code != 1 {
            return Err(RunnerError::DiffFailed {
                program: self.git.clone(),
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let diff = String::from_utf8_lossy(&output.stdout).to_string();
        if diff.trim().is_empty() {
            return Ok(format!(
                "{} differs from the current schema",
                saved_path.display()
            ));
        }
        Ok(diff)
    }
}

fn read_schema(path: &Path) -> RunnerResult<String> {
    std::fs::read_to_string(path).map_err(|e| RunnerError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })
}

/// Write `current` to `path` unless the saved schema already matches.
pub fn save_schema(path: &Path, current: &str) -> RunnerResult<SaveOutcome> {
    if path.exists() && schemas_equal(&read_schema(path)?, current) {
        return Ok(SaveOutcome::Unchanged);
    }
    std::fs::write(path, current).map_err(|e| RunnerError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    log::info!("Saved schema to {}", path.display());
    Ok(SaveOutcome::Written)
}

#[cfg(test)]
#[path = "verify_test.rs"]
mod tests;
