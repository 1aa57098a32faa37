//! dbm-db - Database abstraction layer for dbm
//!
//! This crate provides the `Database` and `DatabaseCatalog` traits and an
//! implementation that drives the PostgreSQL command-line clients. An
//! in-memory fake is available behind the `test-support` feature.

pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod psql;
pub mod traits;

pub use error::{DbError, DbResult};
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryDatabase;
pub use psql::PsqlBackend;
pub use traits::{Database, DatabaseCatalog};
