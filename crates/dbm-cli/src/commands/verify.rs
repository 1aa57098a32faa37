//! Verify command implementation

use anyhow::Result;
use dbm_db::Database;
use dbm_runner::{SchemaVerifier, UpgradeRunner};

use crate::cli::GlobalArgs;
use crate::commands::common::{confirmer, ExitCode};
use crate::context::RuntimeContext;

/// Execute the verify command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::for_command(global).await?;
    let schema_path = ctx.schema_path()?;
    let mut failed = false;

    let current = ctx.target.dump_schema().await?;
    let diff = SchemaVerifier::new().diff(schema_path, &current).await?;
    if !diff.is_empty() {
        println!("{}", diff);
        failed = true;
    }

    let runner = UpgradeRunner::new(
        &ctx.target,
        ctx.patches()?,
        &ctx.settings,
        confirmer(ctx.settings.force),
    );
    let missing = runner.missing_patches().await?;
    if !missing.is_empty() {
        println!("Missing patches:");
        for patch in &missing {
            println!("{}", patch.path.display());
        }
        failed = true;
    }

    if failed {
        return Err(ExitCode(1).into());
    }
    Ok(())
}
