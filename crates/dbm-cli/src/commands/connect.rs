//! Connect command implementation

use anyhow::Result;
use dbm_db::Database;

use crate::cli::GlobalArgs;
use crate::context::RuntimeContext;

/// Execute the connect command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::for_command(global).await?;
    ctx.target.connect_repl().await?;
    Ok(())
}
