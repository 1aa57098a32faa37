//! dbm-core - Core library for dbm
//!
//! This crate provides patch discovery, content hashing, the ledger SQL
//! helpers, upgrade planning, query splitting, dev instance naming and
//! configuration parsing shared by the database and runner crates.

pub mod checksum;
pub mod config;
pub mod error;
pub mod instance;
pub mod ledger;
pub mod patch;
pub mod patch_hash;
pub mod paths;
pub mod schema;
pub mod splitter;
pub mod upgrade;

pub use checksum::{compute_instance_checksum, compute_patch_checksum};
pub use config::{ApplyMode, ConfigOverrides, ConnectionConfig, ProjectConfig, Settings};
pub use error::{CoreError, CoreResult};
pub use instance::InstanceNamer;
pub use patch::{Patch, PatchKind, PatchSet};
pub use patch_hash::PatchHash;
pub use upgrade::{ScriptUpgrade, SqlUpgrade, Upgrade, UpgradePlanner, SEPARATOR};
