//! CLI command implementations

pub(crate) mod common;
pub(crate) mod connect;
pub(crate) mod database_name;
pub(crate) mod init;
pub(crate) mod query;
pub(crate) mod query_file;
pub(crate) mod save_current_schema;
pub(crate) mod show_current_schema;
pub(crate) mod show_upgrade;
pub(crate) mod upgrade;
pub(crate) mod verify;
