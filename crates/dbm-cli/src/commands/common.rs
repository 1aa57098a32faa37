//! Shared utilities for CLI commands

use dbm_runner::{AlwaysConfirm, Confirm};
use std::fmt;
use std::io::{BufRead, Write};

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main never prints it.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Reads y/n answers from the terminal.
pub(crate) struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/n] ", prompt);
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(_) => false,
        }
    }
}

/// An answer counts as yes when it starts with `y` or `Y`.
pub(crate) fn is_affirmative(answer: &str) -> bool {
    answer.starts_with(['y', 'Y'])
}

/// The confirmer for this invocation: automatic with `-y`, interactive otherwise.
pub(crate) fn confirmer(force: bool) -> &'static dyn Confirm {
    if force {
        &AlwaysConfirm
    } else {
        &StdinConfirm
    }
}

/// Ask a yes/no question unless forced; a refusal ends the process with code 1.
pub(crate) fn confirm_or_exit(force: bool, prompt: &str) -> anyhow::Result<()> {
    if confirmer(force).confirm(prompt) {
        Ok(())
    } else {
        Err(ExitCode(1).into())
    }
}
