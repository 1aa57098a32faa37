//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// dbm - forward-only PostgreSQL patch manager
#[derive(Parser, Debug)]
#[command(name = "dbm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Connection config files (comma-separated, later files override earlier ones)
    #[arg(
        long = "db_config",
        global = true,
        value_delimiter = ',',
        env = "DBM_DB_CONFIG"
    )]
    pub db_config: Vec<String>,

    /// Patch directory
    #[arg(long, global = true)]
    pub patches: Option<String>,

    /// Saved schema file
    #[arg(long, global = true)]
    pub schema: Option<String>,

    /// Answer yes to every confirmation
    #[arg(short = 'y', global = true)]
    pub yes: bool,

    /// Work against a database named after the current patch list
    #[arg(long = "dev_mode", global = true)]
    pub dev_mode: bool,

    /// Required alongside --dev_mode for every command except init
    #[arg(long = "WARNING__permit_data_loss", global = true)]
    pub permit_data_loss: bool,

    /// Run each patch file in its own transaction instead of one merged script
    #[arg(long = "per_file", global = true)]
    pub per_file: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
#[command(rename_all = "snake_case")]
pub enum Commands {
    /// Create the database and ledger, then apply every patch
    Init,

    /// Apply pending patches
    Upgrade,

    /// Print the next upgrade without applying it
    ShowUpgrade,

    /// Print the live schema
    ShowCurrentSchema,

    /// Overwrite the saved schema with the live schema
    SaveCurrentSchema,

    /// Fail unless the database is fully patched and matches the saved schema
    Verify,

    /// Print the name of the target database
    DatabaseName,

    /// Open an interactive psql session
    Connect,

    /// Run SQL read from stdin
    Query,

    /// Run a SQL file as a single transaction
    QueryFile(QueryFileArgs),
}

/// Arguments for the query_file command
#[derive(Args, Debug)]
pub struct QueryFileArgs {
    /// SQL file to execute
    pub file: String,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
