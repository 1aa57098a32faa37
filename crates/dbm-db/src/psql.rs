//! PostgreSQL backend driving the `psql` and `pg_dump` clients

use crate::error::{DbError, DbResult};
use crate::traits::{
    create_from_template_statement, database_exists_query, rows_indicate_exists, Database,
    DatabaseCatalog,
};
use async_trait::async_trait;
use dbm_core::schema::normalize_dump;
use dbm_core::{ConnectionConfig, Settings};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// PostgreSQL access through the command-line clients
///
/// Every call spawns a fresh client process; the password travels through
/// `PGPASSWORD` in the child environment only.
#[derive(Debug, Clone)]
pub struct PsqlBackend {
    connection: ConnectionConfig,
    database: String,
    maintenance_database: String,
    superuser_command: Vec<String>,
}

impl PsqlBackend {
    /// Backend targeting the configured database
    pub fn new(connection: ConnectionConfig) -> Self {
        let database = connection.database.clone();
        Self {
            connection,
            database,
            maintenance_database: "postgres".to_string(),
            superuser_command: vec![
                "sudo".to_string(),
                "-u".to_string(),
                "postgres".to_string(),
                "psql".to_string(),
            ],
        }
    }

    /// Backend configured from resolved settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            connection: settings.connection.clone(),
            database: settings.connection.database.clone(),
            maintenance_database: settings.maintenance_database.clone(),
            superuser_command: settings.superuser_command.clone(),
        }
    }

    /// Same server and credentials, different database
    pub fn with_database(&self, name: &str) -> Self {
        Self {
            database: name.to_string(),
            ..self.clone()
        }
    }

    /// Handle on the maintenance database used for cluster-level queries
    pub fn maintenance(&self) -> Self {
        self.with_database(&self.maintenance_database)
    }

    fn connection_args(&self) -> Vec<String> {
        vec![
            "-h".to_string(),
            self.connection.host.clone(),
            "-p".to_string(),
            self.connection.port.to_string(),
            "-U".to_string(),
            self.connection.username.clone(),
            "-d".to_string(),
            self.database.clone(),
        ]
    }

    fn client_command(&self, program: &str, before: &[&str]) -> Command {
        let mut command = Command::new(program);
        command
            .args(before)
            .args(self.connection_args())
            .env("PGPASSWORD", &self.connection.password)
            .stdin(Stdio::null());
        command
    }
}

/// Run a prepared command to completion and return its stdout.
async fn run_captured(mut command: Command, program: &str, display: &str) -> DbResult<String> {
    log::debug!("Running {}", display);
    let output = command
        .output()
        .await
        .map_err(|e| DbError::SpawnFailed {
            program: program.to_string(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(DbError::ExecutionError {
            command: display.to_string(),
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|e| DbError::InvalidOutput(e.to_string()))
}

#[async_trait]
impl Database for PsqlBackend {
    async fn query(&self, sql: &str) -> DbResult<String> {
        let command = self.client_command("psql", &["-At", "-c", sql]);
        run_captured(command, "psql", &format!("psql -c on {}", self.database)).await
    }

    async fn query_file(&self, path: &Path) -> DbResult<String> {
        let path_arg = path.display().to_string();
        let command = self.client_command(
            "psql",
            &[
                "-At",
                "-v",
                "ON_ERROR_STOP=1",
                "--single-transaction",
                "-f",
                &path_arg,
            ],
        );
        run_captured(
            command,
            "psql",
            &format!("psql -f {} on {}", path_arg, self.database),
        )
        .await
    }

    async fn dump_schema(&self) -> DbResult<String> {
        let command = self.client_command("pg_dump", &["--schema-only"]);
        let dump = run_captured(
            command,
            "pg_dump",
            &format!("pg_dump --schema-only on {}", self.database),
        )
        .await?;
        Ok(normalize_dump(&dump))
    }

    async fn connect_repl(&self) -> DbResult<()> {
        let status = Command::new("psql")
            .args(self.connection_args())
            .env("PGPASSWORD", &self.connection.password)
            .status()
            .await
            .map_err(|e| DbError::SpawnFailed {
                program: "psql".to_string(),
                source: e,
            })?;
        if !status.success() {
            return Err(DbError::ExecutionError {
                command: "psql".to_string(),
                code: status.code().unwrap_or(-1),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    fn database_name(&self) -> &str {
        &self.database
    }

    fn client_env(&self) -> Vec<(String, String)> {
        vec![
            ("PGHOST".to_string(), self.connection.host.clone()),
            ("PGPORT".to_string(), self.connection.port.to_string()),
            ("PGUSER".to_string(), self.connection.username.clone()),
            ("PGPASSWORD".to_string(), self.connection.password.clone()),
            ("PGDATABASE".to_string(), self.database.clone()),
        ]
    }

    fn db_type(&self) -> &'static str {
        "postgres"
    }
}

#[async_trait]
impl DatabaseCatalog for PsqlBackend {
    async fn database_exists(&self, name: &str) -> DbResult<bool> {
        let rows = self
            .maintenance()
            .query_json(&database_exists_query(name))
            .await?;
        rows_indicate_exists(&rows)
    }

    async fn create_database_from_template(&self, name: &str, template: &str) -> DbResult<()> {
        log::info!("Creating database {} from template {}", name, template);
        self.maintenance()
            .query(&create_from_template_statement(name, template))
            .await?;
        Ok(())
    }

    async fn admin_execute(&self, sql: &str) -> DbResult<String> {
        let Some((program, prefix)) = self.superuser_command.split_first() else {
            return Err(DbError::ConnectionError(
                "no superuser command configured".to_string(),
            ));
        };
        let mut command = Command::new(program);
        command
            .args(prefix)
            .args(["-At", "-c", sql])
            .stdin(Stdio::null());
        run_captured(
            command,
            program,
            &format!("{} -c", self.superuser_command.join(" ")),
        )
        .await
    }
}

#[cfg(test)]
#[path = "psql_test.rs"]
mod tests;
