//! In-memory database fake for tests
//!
//! Records every statement it receives and keeps a simulated patch ledger:
//! ledger inserts found in executed SQL are applied, and the applied-hash
//! query is answered from that state. A statement containing the configured
//! failure pattern fails as a whole, leaving the ledger untouched.

use crate::error::{DbError, DbResult};
use crate::traits::{create_from_template_statement, json_query, Database, DatabaseCatalog};
use async_trait::async_trait;
use dbm_core::ledger::SELECT_APPLIED_HASHES;
use dbm_core::schema::normalize_dump;
use dbm_core::PatchHash;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};

static INSERT_RE: OnceLock<Regex> = OnceLock::new();
static HASH_LITERAL_RE: OnceLock<Regex> = OnceLock::new();

fn insert_regex() -> &'static Regex {
    INSERT_RE.get_or_init(|| {
        Regex::new(r"(?s)INSERT INTO db_patches \(hash\) VALUES(.*?)(?:;|$)").expect("valid regex")
    })
}

fn hash_literal_regex() -> &'static Regex {
    HASH_LITERAL_RE.get_or_init(|| Regex::new(r"'\\x([0-9a-fA-F]+)'").expect("valid regex"))
}

#[derive(Debug, Default)]
struct MemoryState {
    statements: Vec<String>,
    admin_statements: Vec<String>,
    ledger: BTreeSet<String>,
    databases: BTreeSet<String>,
    schema: String,
    fail_on: Option<String>,
}

/// Database fake holding all state in memory
#[derive(Debug)]
pub struct MemoryDatabase {
    name: String,
    state: Mutex<MemoryState>,
}

impl MemoryDatabase {
    /// Create a fake whose cluster contains only `name`
    pub fn new(name: &str) -> Self {
        let state = MemoryState {
            databases: BTreeSet::from([name.to_string()]),
            ..Default::default()
        };
        Self {
            name: name.to_string(),
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Seed the ledger with hashes
    pub fn mark_applied<'a>(&self, hashes: impl IntoIterator<Item = &'a PatchHash>) -> DbResult<()> {
        let mut state = self.lock()?;
        state
            .ledger
            .extend(hashes.into_iter().map(|h| h.as_str().to_string()));
        Ok(())
    }

    /// Register another database in the simulated cluster
    pub fn add_database(&self, name: &str) -> DbResult<()> {
        self.lock()?.databases.insert(name.to_string());
        Ok(())
    }

    /// Set the text returned by `dump_schema`
    pub fn set_schema(&self, schema: &str) -> DbResult<()> {
        self.lock()?.schema = schema.to_string();
        Ok(())
    }

    /// Make every statement containing `pattern` fail
    pub fn fail_on(&self, pattern: &str) -> DbResult<()> {
        self.lock()?.fail_on = Some(pattern.to_string());
        Ok(())
    }

    /// Statements executed against this database, in order
    pub fn statements(&self) -> DbResult<Vec<String>> {
        Ok(self.lock()?.statements.clone())
    }

    /// Statements executed with superuser privileges, in order
    pub fn admin_statements(&self) -> DbResult<Vec<String>> {
        Ok(self.lock()?.admin_statements.clone())
    }

    /// Hex hashes currently in the ledger
    pub fn applied(&self) -> DbResult<BTreeSet<String>> {
        Ok(self.lock()?.ledger.clone())
    }

    /// Databases in the simulated cluster
    pub fn databases(&self) -> DbResult<BTreeSet<String>> {
        Ok(self.lock()?.databases.clone())
    }

    fn execute(&self, sql: &str) -> DbResult<String> {
        let mut state = self.lock()?;
        state.statements.push(sql.to_string());

        if let Some(pattern) = &state.fail_on {
            if sql.contains(pattern.as_str()) {
                return Err(DbError::ExecutionError {
                    command: "memory".to_string(),
                    code: 3,
                    stderr: format!("statement matched failure pattern '{}'", pattern),
                });
            }
        }

        if sql == json_query(SELECT_APPLIED_HASHES) {
            if state.ledger.is_empty() {
                return Ok(String::new());
            }
            let rows: Vec<Value> = state
                .ledger
                .iter()
                .map(|h| json!({ "hash": format!("\\x{}", h) }))
                .collect();
            return Ok(Value::Array(rows).to_string());
        }

        let inserted: Vec<String> = insert_regex()
            .captures_iter(sql)
            .flat_map(|values| {
                hash_literal_regex()
                    .captures_iter(&values[1])
                    .map(|c| c[1].to_ascii_lowercase())
                    .collect::<Vec<_>>()
            })
            .collect();
        state.ledger.extend(inserted);

        Ok(String::new())
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn query(&self, sql: &str) -> DbResult<String> {
        self.execute(sql)
    }

    async fn query_file(&self, path: &Path) -> DbResult<String> {
        let sql = std::fs::read_to_string(path)
            .map_err(|e| DbError::InvalidOutput(format!("{}: {}", path.display(), e)))?;
        self.execute(&sql)
    }

    async fn dump_schema(&self) -> DbResult<String> {
        Ok(normalize_dump(&self.lock()?.schema))
    }

    async fn connect_repl(&self) -> DbResult<()> {
        Err(DbError::NotImplemented {
            backend: "memory".to_string(),
            feature: "interactive sessions".to_string(),
        })
    }

    fn database_name(&self) -> &str {
        &self.name
    }

    fn client_env(&self) -> Vec<(String, String)> {
        vec![("PGDATABASE".to_string(), self.name.clone())]
    }

    fn db_type(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl DatabaseCatalog for MemoryDatabase {
    async fn database_exists(&self, name: &str) -> DbResult<bool> {
        Ok(self.lock()?.databases.contains(name))
    }

    async fn create_database_from_template(&self, name: &str, template: &str) -> DbResult<()> {
        let mut state = self.lock()?;
        let statement = create_from_template_statement(name, template);
        state.admin_statements.push(statement.clone());
        if !state.databases.contains(template) || state.databases.contains(name) {
            return Err(DbError::ExecutionError {
                command: statement,
                code: 1,
                stderr: "template missing or target already exists".to_string(),
            });
        }
        state.databases.insert(name.to_string());
        Ok(())
    }

    async fn admin_execute(&self, sql: &str) -> DbResult<String> {
        self.lock()?.admin_statements.push(sql.to_string());
        Ok(String::new())
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
