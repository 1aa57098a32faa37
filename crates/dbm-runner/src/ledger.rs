//! Ledger access through a database handle

use crate::error::RunnerResult;
use dbm_core::ledger::{decode_hash_rows, insert_statement, CREATE_LEDGER_TABLE, SELECT_APPLIED_HASHES};
use dbm_core::{PatchHash, PatchSet};
use dbm_db::Database;
use std::collections::{BTreeSet, HashSet};

/// Reads and writes the `db_patches` table of one database
pub struct Ledger<'a> {
    db: &'a dyn Database,
}

impl<'a> Ledger<'a> {
    /// Create a ledger view over `db`
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Hashes recorded as applied
    pub async fn applied_hashes(&self) -> RunnerResult<HashSet<PatchHash>> {
        let rows = self.db.query_json(SELECT_APPLIED_HASHES).await?;
        let hashes = decode_hash_rows(&rows)?;
        log::debug!(
            "Ledger of {} holds {} hashes",
            self.db.database_name(),
            hashes.len()
        );
        Ok(hashes)
    }

    /// Record hashes as applied
    pub async fn record_applied(&self, hashes: &[PatchHash]) -> RunnerResult<()> {
        if hashes.is_empty() {
            return Ok(());
        }
        self.db.query(&insert_statement(hashes)).await?;
        Ok(())
    }

    /// Create the ledger table in a fresh database
    pub async fn create_table(&self) -> RunnerResult<()> {
        self.db.query(CREATE_LEDGER_TABLE).await?;
        Ok(())
    }

    /// Applied hashes with no matching patch file
    pub async fn invalid_hashes(&self, patches: &PatchSet) -> RunnerResult<BTreeSet<PatchHash>> {
        let applied = self.applied_hashes().await?;
        Ok(patches.invalid_hashes(&applied))
    }
}
