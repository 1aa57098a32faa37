//! dbm-runner - Upgrade execution for dbm
//!
//! This crate drives a `Database` through the patch ledger: planning and
//! applying upgrades, provisioning dev instances and comparing the live
//! schema against the saved one.

pub mod confirm;
pub mod error;
pub mod instance;
pub mod ledger;
pub mod runner;
pub mod verify;

pub use confirm::{AlwaysConfirm, Confirm};
pub use error::{RunnerError, RunnerResult};
pub use instance::DevInstance;
pub use ledger::Ledger;
pub use runner::UpgradeRunner;
pub use verify::{save_schema, SaveOutcome, SchemaVerifier};
