//! Init command implementation

use anyhow::{Context, Result};
use dbm_db::traits::{alter_owner_statement, create_database_statement};
use dbm_db::DatabaseCatalog;
use dbm_runner::Ledger;

use crate::cli::GlobalArgs;
use crate::commands::common::confirm_or_exit;
use crate::commands::upgrade::run_upgrade;
use crate::context::RuntimeContext;

/// Execute the init command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let schema_path = ctx.schema_path()?;
    confirm_or_exit(
        ctx.settings.force,
        "This will initialize your local database, continue?",
    )?;

    let database = &ctx.settings.connection.database;
    let owner = &ctx.settings.connection.username;
    ctx.base
        .admin_execute(&create_database_statement(database))
        .await
        .with_context(|| format!("Failed to create database {}", database))?;
    ctx.base
        .admin_execute(&alter_owner_statement(database, owner))
        .await
        .with_context(|| format!("Failed to hand {} to {}", database, owner))?;
    Ledger::new(&ctx.base)
        .create_table()
        .await
        .context("Failed to create the patch ledger")?;
    println!("Initialized database {}", database);

    if ctx.settings.dev_mode {
        ctx.rewind_dev_instance().await?;
    }
    run_upgrade(&ctx, schema_path).await
}
