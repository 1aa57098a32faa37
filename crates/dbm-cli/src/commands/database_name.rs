//! Database name command implementation

use anyhow::Result;
use dbm_db::Database;

use crate::cli::GlobalArgs;
use crate::context::RuntimeContext;

/// Execute the database_name command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::for_command(global).await?;
    println!("{}", ctx.target.database_name());
    Ok(())
}
