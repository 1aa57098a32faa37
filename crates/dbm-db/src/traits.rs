//! Database trait definitions

use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

/// Wrap a row-returning query so the server renders its result as one JSON
/// array.
pub fn json_query(sql: &str) -> String {
    format!("SELECT array_to_json(array_agg(t)) FROM ({}) t;", sql)
}

/// Decode the output of a [`json_query`].
///
/// `array_agg` over zero rows yields NULL, which the client prints as an
/// empty line.
pub fn parse_json_rows(output: &str) -> DbResult<Vec<Value>> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str(trimmed) {
        Ok(Value::Array(rows)) => Ok(rows),
        Ok(Value::Null) => Ok(Vec::new()),
        Ok(other) => Err(DbError::InvalidOutput(format!(
            "expected a JSON array, got {}",
            other
        ))),
        Err(e) => Err(DbError::InvalidOutput(e.to_string())),
    }
}

/// Operations against one database
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute SQL text and return the client's unaligned output
    async fn query(&self, sql: &str) -> DbResult<String>;

    /// Execute a SQL file as a single transaction, stopping at the first error
    async fn query_file(&self, path: &Path) -> DbResult<String>;

    /// Execute a row-returning query and decode the rows as JSON objects
    async fn query_json(&self, sql: &str) -> DbResult<Vec<Value>> {
        let output = self.query(&json_query(sql)).await?;
        parse_json_rows(&output)
    }

    /// Schema-only dump of the database
    async fn dump_schema(&self) -> DbResult<String>;

    /// Hand the terminal to an interactive client session
    async fn connect_repl(&self) -> DbResult<()>;

    /// Name of the database this handle targets
    fn database_name(&self) -> &str;

    /// Environment variables that let an external program reach this database
    fn client_env(&self) -> Vec<(String, String)>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// Cluster-level operations, run outside the target database
#[async_trait]
pub trait DatabaseCatalog: Send + Sync {
    /// Check whether a database with this name exists
    async fn database_exists(&self, name: &str) -> DbResult<bool>;

    /// `CREATE DATABASE "<name>" TEMPLATE "<template>"`
    async fn create_database_from_template(&self, name: &str, template: &str) -> DbResult<()>;

    /// Execute SQL with cluster superuser privileges
    async fn admin_execute(&self, sql: &str) -> DbResult<String>;
}

/// Render a string as a single-quoted SQL literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Render a name as a double-quoted SQL identifier, preserving its case.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `CREATE DATABASE` cloning `template`, both names quoted.
pub fn create_from_template_statement(name: &str, template: &str) -> String {
    format!(
        "CREATE DATABASE {} TEMPLATE {}",
        quote_identifier(name),
        quote_identifier(template)
    )
}

/// `CREATE DATABASE` for a fresh database owned by the caller.
pub fn create_database_statement(name: &str) -> String {
    format!("CREATE DATABASE {};", quote_identifier(name))
}

/// Hand a database over to `owner`.
pub fn alter_owner_statement(name: &str, owner: &str) -> String {
    format!(
        "ALTER DATABASE {} OWNER TO {}",
        quote_identifier(name),
        quote_identifier(owner)
    )
}

/// SQL checking whether a database exists, answered on the maintenance
/// database.
pub fn database_exists_query(name: &str) -> String {
    format!(
        "SELECT 1 AS exists FROM pg_database WHERE datname={}",
        quote_literal(name)
    )
}

/// Interpret the rows returned by [`database_exists_query`].
pub(crate) fn rows_indicate_exists(rows: &[Value]) -> DbResult<bool> {
    match rows {
        [] => Ok(false),
        [row] => Ok(row.get("exists").and_then(Value::as_i64) == Some(1)),
        _ => Err(DbError::InvalidOutput(format!(
            "expected at most one pg_database row, got {}",
            rows.len()
        ))),
    }
}

#[cfg(test)]
#[path = "traits_test.rs"]
mod tests;
