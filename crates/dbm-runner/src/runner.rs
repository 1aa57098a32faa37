//! Upgrade execution
//!
//! Repeatedly plans the next upgrade from the ledger, asks for confirmation
//! and applies it. Merged SQL runs as one transaction from a temporary
//! script; queries that cannot run inside a transaction are split into
//! individual statements; scripted patches run as child processes with the
//! connection exported through the libpq environment variables.

use crate::confirm::Confirm;
use crate::error::{RunnerError, RunnerResult};
use crate::ledger::Ledger;
use dbm_core::paths::format_file_list;
use dbm_core::splitter::{must_split, plan_split};
use dbm_core::upgrade::{ScriptUpgrade, SqlUpgrade};
use dbm_core::{ApplyMode, Patch, PatchHash, PatchSet, Settings, Upgrade, UpgradePlanner, SEPARATOR};
use dbm_db::Database;
use std::collections::BTreeSet;
use std::io::Write;
use tokio::process::Command;

/// Prompt shown before splitting a query into separate transactions
pub const SPLIT_PROMPT: &str =
    "Warning: This query cannot be run as a transaction. Split into multiple queries?";

/// Applies pending patches to one database
pub struct UpgradeRunner<'a> {
    db: &'a dyn Database,
    patches: &'a PatchSet,
    settings: &'a Settings,
    confirm: &'a dyn Confirm,
}

impl<'a> UpgradeRunner<'a> {
    /// Create a new upgrade runner
    pub fn new(
        db: &'a dyn Database,
        patches: &'a PatchSet,
        settings: &'a Settings,
        confirm: &'a dyn Confirm,
    ) -> Self {
        Self {
            db,
            patches,
            settings,
            confirm,
        }
    }

    fn ledger(&self) -> Ledger<'a> {
        Ledger::new(self.db)
    }

    /// Plan the next upgrade from the current ledger state
    pub async fn next_upgrade(&self) -> RunnerResult<Option<Upgrade>> {
        let applied = self.ledger().applied_hashes().await?;
        let planner = UpgradePlanner::new(self.patches, &self.settings.project_root);
        Ok(planner.next_upgrade(&applied)?)
    }

    /// Text shown before an upgrade is applied, ending with the question
    pub fn describe(&self, upgrade: &Upgrade) -> String {
        format!(
            "\nUPGRADE TO BE APPLIED\n\n{}\n{}\n\nApply upgrades from the following files?\n{}",
            upgrade.body(),
            SEPARATOR,
            format_file_list(upgrade.files(), &self.settings.project_root, "    ")
        )
    }

    /// Apply every pending upgrade, returning how many were applied
    pub async fn upgrade_all(&self) -> RunnerResult<usize> {
        let mut applied = 0;
        let mut previous: Option<Vec<PatchHash>> = None;

        while let Some(upgrade) = self.next_upgrade().await? {
            if previous.as_deref() == Some(upgrade.hashes()) {
                return Err(RunnerError::LedgerNotAdvanced {
                    files: format_file_list(upgrade.files(), &self.settings.project_root, ""),
                });
            }

            if !self.settings.force && !self.confirm.confirm(&self.describe(&upgrade)) {
                return Err(RunnerError::Declined("upgrade".to_string()));
            }

            self.apply(&upgrade).await?;
            log::info!(
                "Applied {} upgrade covering {} file(s) to {}",
                upgrade.label(),
                upgrade.files().len(),
                self.db.database_name()
            );
            applied += 1;
            previous = Some(upgrade.hashes().to_vec());
        }

        Ok(applied)
    }

    /// Apply a single upgrade, including its ledger inserts
    pub async fn apply(&self, upgrade: &Upgrade) -> RunnerResult<()> {
        match upgrade {
            Upgrade::Sql(sql) => self.apply_sql(sql).await,
            Upgrade::Python(script) => {
                let mut command = Command::new(&self.settings.python);
                command.arg(&script.script);
                self.run_script(command, upgrade.label(), script).await
            }
            Upgrade::Shell(script) => {
                let command = Command::new(&script.script);
                self.run_script(command, upgrade.label(), script).await
            }
        }
    }

    async fn apply_sql(&self, upgrade: &SqlUpgrade) -> RunnerResult<()> {
        if must_split(&upgrade.query) {
            self.execute_split(&upgrade.query).await?;
            return Ok(());
        }

        match self.settings.apply_mode {
            ApplyMode::Batched => {
                let mut script = tempfile::Builder::new()
                    .prefix("dbm-upgrade-")
                    .suffix(".sql")
                    .tempfile()
                    .map_err(|e| RunnerError::IoWithPath {
                        path: std::env::temp_dir().display().to_string(),
                        source: e,
                    })?;
                let path = script.path().display().to_string();
                script
                    .write_all(upgrade.query.as_bytes())
                    .and_then(|_| script.flush())
                    .map_err(|e| RunnerError::IoWithPath { path, source: e })?;
                log::debug!(
                    "Running merged script of {} file(s) from {}",
                    upgrade.files.len(),
                    script.path().display()
                );
                self.db.query_file(script.path()).await?;
            }
            ApplyMode::PerFile => {
                for (file, followup) in upgrade.files.iter().zip(&upgrade.followups) {
                    log::debug!("Running {}", file.display());
                    self.db.query_file(file).await?;
                    if !followup.is_empty() {
                        self.db.query(followup).await?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Run a query as separate statements, each in its own transaction.
    ///
    /// Returns the non-empty outputs joined by newlines.
    pub async fn execute_split(&self, query: &str) -> RunnerResult<String> {
        let statements = plan_split(query)?;
        if !self.settings.force && !self.confirm.confirm(SPLIT_PROMPT) {
            return Err(RunnerError::Declined("query split".to_string()));
        }

        log::debug!("Running query as {} separate statements", statements.len());
        let mut out = Vec::new();
        for statement in &statements {
            let result = self.db.query(statement).await?;
            if !result.is_empty() {
                out.push(result);
            }
        }
        Ok(out.join("\n"))
    }

    async fn run_script(
        &self,
        mut command: Command,
        kind: &str,
        upgrade: &ScriptUpgrade,
    ) -> RunnerResult<()> {
        let program = command.as_std().get_program().to_string_lossy().to_string();
        command
            .env("PATCHES_ROOT", self.patches.dir())
            .envs(self.db.client_env());

        log::debug!("Running {} patch {}", kind, upgrade.script.display());
        let status = command
            .status()
            .await
            .map_err(|e| RunnerError::SpawnFailed { program, source: e })?;

        if !status.success() {
            return Err(RunnerError::ScriptFailed {
                kind: kind.to_string(),
                path: upgrade.script.display().to_string(),
                code: status.code().unwrap_or(-1),
            });
        }

        self.ledger().record_applied(&upgrade.hashes).await
    }

    /// Patches not yet recorded in the ledger, in order
    pub async fn missing_patches(&self) -> RunnerResult<Vec<&'a Patch>> {
        let applied = self.ledger().applied_hashes().await?;
        Ok(self.patches.unapplied(&applied))
    }

    /// Ledger hashes with no matching patch file
    pub async fn invalid_hashes(&self) -> RunnerResult<BTreeSet<PatchHash>> {
        self.ledger().invalid_hashes(self.patches).await
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
