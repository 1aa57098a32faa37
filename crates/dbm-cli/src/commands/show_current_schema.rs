//! Show current schema command implementation

use anyhow::Result;
use dbm_db::Database;

use crate::cli::GlobalArgs;
use crate::context::RuntimeContext;

/// Execute the show_current_schema command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::for_command(global).await?;
    println!("{}", ctx.target.dump_schema().await?);
    Ok(())
}
