//! Upgrade command implementation

use anyhow::Result;
use dbm_db::Database;
use dbm_runner::{SchemaVerifier, UpgradeRunner};
use std::path::Path;

use crate::cli::GlobalArgs;
use crate::commands::common::confirmer;
use crate::context::RuntimeContext;

/// Execute the upgrade command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::for_command(global).await?;
    let schema_path = ctx.schema_path()?;
    run_upgrade(&ctx, schema_path).await
}

/// Apply pending upgrades, then report schema and ledger drift.
pub(crate) async fn run_upgrade(ctx: &RuntimeContext, schema_path: &Path) -> Result<()> {
    let force = ctx.settings.force;
    let runner = UpgradeRunner::new(
        &ctx.target,
        ctx.patches()?,
        &ctx.settings,
        confirmer(force),
    );

    let applied = runner.upgrade_all().await?;
    if applied == 0 && !force {
        println!("Database is already up to date.");
    }

    if !force {
        let current = ctx.target.dump_schema().await?;
        let diff = SchemaVerifier::new().diff(schema_path, &current).await?;
        if !diff.is_empty() {
            log::warn!("Live schema differs from {}", schema_path.display());
            println!("Warning: Current schema does not match saved schema in codebase.");
            println!("{}", diff);
        }
    }

    let invalid = runner.invalid_hashes().await?;
    if !invalid.is_empty() {
        for hash in &invalid {
            log::warn!("Ledger hash {} matches no patch file", hash.short());
        }
        println!(
            "Warning: This database has {} invalid hashes applied.",
            invalid.len()
        );
    }
    Ok(())
}
