//! Save current schema command implementation

use anyhow::Result;
use dbm_db::Database;
use dbm_runner::{save_schema, SaveOutcome};

use crate::cli::GlobalArgs;
use crate::commands::common::confirm_or_exit;
use crate::context::RuntimeContext;

/// Execute the save_current_schema command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::for_command(global).await?;
    let schema_path = ctx.schema_path()?;
    confirm_or_exit(
        ctx.settings.force,
        &format!(
            "This will override changes to {}, continue?",
            schema_path.display()
        ),
    )?;

    let current = ctx.target.dump_schema().await?;
    match save_schema(schema_path, &current)? {
        SaveOutcome::Written => println!("Saved schema to {}", schema_path.display()),
        SaveOutcome::Unchanged => println!(
            "{} already matches the current schema.",
            schema_path.display()
        ),
    }
    Ok(())
}
