//! dbm CLI - forward-only PostgreSQL patch manager

use clap::Parser;

mod cli;
mod commands;
mod context;

use cli::Cli;
use commands::common::ExitCode;
use commands::{
    connect, database_name, init, query, query_file, save_current_schema, show_current_schema,
    show_upgrade, upgrade, verify,
};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        cli::Commands::Init => init::execute(&cli.global).await,
        cli::Commands::Upgrade => upgrade::execute(&cli.global).await,
        cli::Commands::ShowUpgrade => show_upgrade::execute(&cli.global).await,
        cli::Commands::ShowCurrentSchema => show_current_schema::execute(&cli.global).await,
        cli::Commands::SaveCurrentSchema => save_current_schema::execute(&cli.global).await,
        cli::Commands::Verify => verify::execute(&cli.global).await,
        cli::Commands::DatabaseName => database_name::execute(&cli.global).await,
        cli::Commands::Connect => connect::execute(&cli.global).await,
        cli::Commands::Query => query::execute(&cli.global).await,
        cli::Commands::QueryFile(args) => query_file::execute(args, &cli.global).await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(code) => std::process::ExitCode::from(code.0),
            None => {
                eprintln!("Error: {:#}", err);
                std::process::ExitCode::FAILURE
            }
        },
    }
}
