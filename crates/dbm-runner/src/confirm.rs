//! Confirmation seam between the runner and the terminal

/// Asks the user before a destructive or irreversible step.
pub trait Confirm: Send + Sync {
    /// Show `prompt` and return whether the user agreed
    fn confirm(&self, prompt: &str) -> bool;
}

/// Answers yes without asking; used with `-y`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        log::debug!("Auto-confirming: {}", prompt.lines().last().unwrap_or_default());
        true
    }
}
