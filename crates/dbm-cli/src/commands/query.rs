//! Query command implementation

use anyhow::{Context, Result};
use dbm_db::Database;
use tokio::io::AsyncReadExt;

use crate::cli::GlobalArgs;
use crate::context::RuntimeContext;

/// Execute the query command with SQL read from stdin
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::for_command(global).await?;

    let mut sql = String::new();
    tokio::io::stdin()
        .read_to_string(&mut sql)
        .await
        .context("Failed to read SQL from stdin")?;

    print!("{}", ctx.target.query(&sql).await?);
    Ok(())
}
