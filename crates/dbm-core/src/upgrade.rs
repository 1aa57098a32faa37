//! Upgrade planning
//!
//! Turns the patch set plus the ledger's applied hashes into the next unit of
//! work. Contiguous SQL patches are merged into one script; Python and shell
//! patches, and SQL patches that must be split, always run alone.

use crate::error::{CoreError, CoreResult};
use crate::ledger::insert_statement;
use crate::patch::{Patch, PatchKind, PatchSet};
use crate::patch_hash::PatchHash;
use crate::paths::format_file_list;
use crate::splitter::{cannot_split, must_split};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Separator line used in merged scripts and confirmation output
pub const SEPARATOR: &str = "--------------------------------------------------";

/// One or more SQL patches merged into a single script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlUpgrade {
    /// Merged script including ledger inserts
    pub query: String,

    /// Patch files in application order
    pub files: Vec<PathBuf>,

    /// Hashes aligned with `files`
    pub hashes: Vec<PatchHash>,

    /// Ledger insert for each entry of `files`, for file-by-file replay
    pub followups: Vec<String>,
}

/// A single patch executed as an external program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptUpgrade {
    /// Program to execute
    pub script: PathBuf,

    /// Patch files (always exactly the script)
    pub files: Vec<PathBuf>,

    /// Hash of the script
    pub hashes: Vec<PatchHash>,
}

/// The next unit of work to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upgrade {
    /// Merged SQL patches
    Sql(SqlUpgrade),
    /// A Python patch
    Python(ScriptUpgrade),
    /// A shell patch
    Shell(ScriptUpgrade),
}

impl Upgrade {
    /// Patch files covered by this upgrade
    pub fn files(&self) -> &[PathBuf] {
        match self {
            Upgrade::Sql(u) => &u.files,
            Upgrade::Python(u) | Upgrade::Shell(u) => &u.files,
        }
    }

    /// Hashes recorded once this upgrade is applied
    pub fn hashes(&self) -> &[PatchHash] {
        match self {
            Upgrade::Sql(u) => &u.hashes,
            Upgrade::Python(u) | Upgrade::Shell(u) => &u.hashes,
        }
    }

    /// Short label for the upgrade kind
    pub fn label(&self) -> &'static str {
        match self {
            Upgrade::Sql(_) => "SQL",
            Upgrade::Python(_) => "Python",
            Upgrade::Shell(_) => "Shell Script",
        }
    }

    /// The text shown to the user before applying: the SQL or the script path
    pub fn body(&self) -> String {
        match self {
            Upgrade::Sql(u) => u.query.clone(),
            Upgrade::Python(u) | Upgrade::Shell(u) => u.script.display().to_string(),
        }
    }

    fn from_patch(patch: &Patch) -> Self {
        let files = vec![patch.path.clone()];
        let hashes = vec![patch.hash.clone()];
        match patch.kind {
            PatchKind::Sql => Upgrade::Sql(SqlUpgrade {
                query: patch.content.clone(),
                files,
                hashes,
                followups: vec![String::new()],
            }),
            PatchKind::Python => Upgrade::Python(ScriptUpgrade {
                script: patch.path.clone(),
                files,
                hashes,
            }),
            PatchKind::Shell => Upgrade::Shell(ScriptUpgrade {
                script: patch.path.clone(),
                files,
                hashes,
            }),
        }
    }
}

/// Computes the next upgrade from the patch set and the ledger state.
///
/// Holds no cursor: every call plans from the applied hashes it is given.
pub struct UpgradePlanner<'a> {
    patches: &'a PatchSet,
    display_root: &'a Path,
}

impl<'a> UpgradePlanner<'a> {
    /// Create a planner; file names in merged scripts are shown relative to
    /// `display_root`.
    pub fn new(patches: &'a PatchSet, display_root: &'a Path) -> Self {
        Self {
            patches,
            display_root,
        }
    }

    /// Plan the next upgrade, or `None` when every patch has been applied.
    ///
    /// Fails with [`CoreError::UnsplittableQuery`] when the next patch must be
    /// split but defines a routine.
    pub fn next_upgrade(&self, applied: &HashSet<PatchHash>) -> CoreResult<Option<Upgrade>> {
        let batch = self.next_batch(applied)?;
        if batch.is_empty() {
            return Ok(None);
        }

        if batch.len() == 1 {
            if let Upgrade::Python(_) | Upgrade::Shell(_) = &batch[0] {
                log::debug!("Next upgrade is a {} script", batch[0].label());
                return Ok(batch.into_iter().next());
            }
        }

        let sql: Vec<SqlUpgrade> = batch
            .into_iter()
            .filter_map(|u| match u {
                Upgrade::Sql(s) => Some(s),
                Upgrade::Python(_) | Upgrade::Shell(_) => None,
            })
            .collect();
        log::debug!("Merging {} SQL patches into one upgrade", sql.len());
        self.combine_sql_upgrades(sql).map(|u| Some(Upgrade::Sql(u)))
    }

    /// Collect the leading run of unapplied patches that can be applied
    /// together.
    fn next_batch(&self, applied: &HashSet<PatchHash>) -> CoreResult<Vec<Upgrade>> {
        let mut batch = Vec::new();
        for patch in self.patches.unapplied(applied) {
            let upgrade = Upgrade::from_patch(patch);
            let standalone = match &upgrade {
                Upgrade::Sql(u) => must_split(&format!("{};", u.query)),
                Upgrade::Python(_) | Upgrade::Shell(_) => true,
            };
            if standalone {
                if batch.is_empty() {
                    if let Upgrade::Sql(u) = &upgrade {
                        if cannot_split(&u.query) {
                            log::debug!(
                                "{} must be split but defines a routine",
                                patch.path.display()
                            );
                            return Err(CoreError::UnsplittableQuery);
                        }
                    }
                    batch.push(upgrade);
                }
                break;
            }
            batch.push(upgrade);
        }
        Ok(batch)
    }

    /// Merge single-patch SQL upgrades into one script.
    pub fn combine_sql_upgrades(&self, upgrades: Vec<SqlUpgrade>) -> CoreResult<SqlUpgrade> {
        if upgrades.is_empty() {
            return Err(CoreError::EmptyUpgrade);
        }

        let mut out = Vec::new();
        let mut files = Vec::new();
        let mut hashes = Vec::new();
        let mut followups = Vec::new();
        for upgrade in upgrades {
            out.push(format!(
                "{}\n-- Upgrades:\n{}",
                SEPARATOR,
                format_file_list(&upgrade.files, self.display_root, "--     ")
            ));
            out.push(String::new());
            out.push(upgrade.query.trim().to_string());
            out.push(String::new());
            let insert = insert_statement(&upgrade.hashes);
            out.push(insert.clone());
            followups.push(insert);
            files.extend(upgrade.files);
            hashes.extend(upgrade.hashes);
        }

        Ok(SqlUpgrade {
            query: out.join("\n"),
            files,
            hashes,
            followups,
        })
    }
}

#[cfg(test)]
#[path = "upgrade_test.rs"]
mod tests;
