//! Show upgrade command implementation

use anyhow::Result;
use dbm_runner::UpgradeRunner;

use crate::cli::GlobalArgs;
use crate::commands::common::confirmer;
use crate::context::RuntimeContext;

/// Execute the show_upgrade command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::for_command(global).await?;
    let runner = UpgradeRunner::new(
        &ctx.target,
        ctx.patches()?,
        &ctx.settings,
        confirmer(ctx.settings.force),
    );

    if let Some(upgrade) = runner.next_upgrade().await? {
        println!("{}: {}", upgrade.label(), upgrade.body());
    }
    Ok(())
}
