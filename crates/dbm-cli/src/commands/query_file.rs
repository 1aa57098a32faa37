//! Query file command implementation

use anyhow::Result;
use dbm_core::paths::resolve_against;
use dbm_db::Database;

use crate::cli::{GlobalArgs, QueryFileArgs};
use crate::context::RuntimeContext;

/// Execute the query_file command
pub async fn execute(args: &QueryFileArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::for_command(global).await?;
    let cwd = std::env::current_dir()?;
    let file = resolve_against(&cwd, &args.file);
    print!("{}", ctx.target.query_file(&file).await?);
    Ok(())
}
